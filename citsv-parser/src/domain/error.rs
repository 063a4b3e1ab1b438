//! Identifier derivation errors.
//!
//! Every variant means the agency rule tables no longer match the live feed.
//! None of them are recoverable inside a run.

use std::num::ParseIntError;

/// Failure to derive a canonical stop ID from a raw stop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StopIdError {
    /// The stop code looked numeric but does not fit a stop ID
    #[error("stop code {code:?} is not a valid stop ID: {source}")]
    InvalidCode { code: String, source: ParseIntError },

    /// The raw stop id has no embedded digit run
    #[error("unexpected stop ID {stop_id:?}: no digits")]
    NoDigits { stop_id: String },

    /// The leading letters are not a known zone
    #[error("stop ID {stop_id:?} starts with unknown zone {prefix:?}")]
    UnknownZone { stop_id: String, prefix: String },

    /// The trailing classification letter is missing or unknown
    #[error("stop ID {stop_id:?} ends with unknown suffix {}", display_suffix(.suffix))]
    UnknownSuffix {
        stop_id: String,
        suffix: Option<char>,
    },

    /// Zone base + suffix offset + digits does not fit
    #[error("stop ID {stop_id:?} overflows the stop ID range")]
    Overflow { stop_id: String },
}

fn display_suffix(suffix: &Option<char>) -> String {
    match suffix {
        Some(c) => format!("{c:?}"),
        None => "(none)".to_string(),
    }
}

/// Failure to resolve a canonical route ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteIdError {
    /// The raw route id is all digits but does not parse
    #[error("route ID {route_id:?} is not a valid number: {source}")]
    InvalidId {
        route_id: String,
        source: ParseIntError,
    },

    /// The raw route id is not numeric and neither is the short name
    #[error("route {route_id:?} short name {short_name:?} is not a number: {source}")]
    InvalidShortName {
        route_id: String,
        short_name: String,
        source: ParseIntError,
    },
}
