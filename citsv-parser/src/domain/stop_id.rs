//! Canonical stop ID derivation.

use std::collections::HashMap;
use std::fmt;

use super::error::StopIdError;
use super::raw::RawStop;

/// Stop code the feed uses when a stop has no public code.
const NO_STOP_CODE: &str = "0";

/// A canonical, non-negative stop ID.
///
/// Either the stop's own numeric code, or a value derived from the raw stop id
/// as `zone base + suffix offset + digits`. Derivation is stable across feed
/// regenerations as long as the raw stop id is unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(u32);

impl StopId {
    pub fn new(value: u32) -> Self {
        StopId(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zone prefix → base offset (multiples of 100,000).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneTable {
    bases: HashMap<String, u32>,
}

impl ZoneTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone. A prefix added twice keeps the last base.
    pub fn with_zone(mut self, prefix: &str, base: u32) -> Self {
        self.bases.insert(prefix.to_string(), base);
        self
    }

    pub fn base(&self, prefix: &str) -> Option<u32> {
        self.bases.get(prefix).copied()
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// Trailing classification letter → sub-offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixTable {
    offsets: HashMap<char, u32>,
}

impl SuffixTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suffix(mut self, letter: char, offset: u32) -> Self {
        self.offsets.insert(letter, offset);
        self
    }

    pub fn offset(&self, letter: char) -> Option<u32> {
        self.offsets.get(&letter).copied()
    }
}

/// Maps raw stops to canonical stop IDs.
#[derive(Debug, Clone, Default)]
pub struct StopIdEncoder {
    zones: ZoneTable,
    suffixes: SuffixTable,
    /// stop_id → code, consulted only when the feed has no usable code.
    code_overrides: HashMap<String, String>,
}

impl StopIdEncoder {
    pub fn new(zones: ZoneTable, suffixes: SuffixTable) -> Self {
        Self {
            zones,
            suffixes,
            code_overrides: HashMap::new(),
        }
    }

    pub fn with_code_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.code_overrides = overrides;
        self
    }

    /// The stop's public code.
    ///
    /// Blank codes and the "0" sentinel count as absent, in which case a
    /// configured override for the stop id is returned instead.
    pub fn stop_code<'a>(&'a self, stop: &'a RawStop) -> Option<&'a str> {
        match stop.stop_code.as_deref() {
            Some(code) if !code.is_empty() && code != NO_STOP_CODE => Some(code),
            _ => self.code_overrides.get(&stop.stop_id).map(String::as_str),
        }
    }

    /// Derive the canonical ID for a stop.
    ///
    /// A purely numeric stop code is used as-is. Otherwise the ID is built from
    /// the raw stop id's zone prefix, trailing letter and first digit run.
    pub fn encode(&self, stop: &RawStop) -> Result<StopId, StopIdError> {
        if let Some(code) = self.stop_code(stop)
            && is_digits_only(code)
        {
            return code
                .parse()
                .map(StopId)
                .map_err(|source| StopIdError::InvalidCode {
                    code: code.to_string(),
                    source,
                });
        }
        self.derive(&stop.stop_id)
    }

    fn derive(&self, stop_id: &str) -> Result<StopId, StopIdError> {
        let Some(digits) = first_digit_run(stop_id) else {
            return Err(StopIdError::NoDigits {
                stop_id: stop_id.to_string(),
            });
        };

        let prefix = zone_prefix(stop_id);
        let base = self
            .zones
            .base(prefix)
            .ok_or_else(|| StopIdError::UnknownZone {
                stop_id: stop_id.to_string(),
                prefix: prefix.to_string(),
            })?;

        let suffix = stop_id.chars().last().filter(|c| c.is_alphabetic());
        let offset = suffix
            .and_then(|c| self.suffixes.offset(c))
            .ok_or_else(|| StopIdError::UnknownSuffix {
                stop_id: stop_id.to_string(),
                suffix,
            })?;

        let overflow = || StopIdError::Overflow {
            stop_id: stop_id.to_string(),
        };
        let digits: u32 = digits.parse().map_err(|_| overflow())?;

        base.checked_add(offset)
            .and_then(|id| id.checked_add(digits))
            .map(StopId)
            .ok_or_else(overflow)
    }
}

/// True for a non-empty string of ASCII digits.
pub(crate) fn is_digits_only(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Leading run of non-digit characters.
fn zone_prefix(stop_id: &str) -> &str {
    let end = stop_id
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(stop_id.len());
    &stop_id[..end]
}

fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}
