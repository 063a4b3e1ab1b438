//! Top-level conversion error.
//!
//! Every variant is fatal for the run. Record-level variants carry the
//! offending raw record so the log line is enough to triage the feed.

use crate::config::ConfigError;
use crate::domain::{RouteId, RouteIdError, StopId, StopIdError};
use crate::feed::FeedError;
use crate::headsign::UnexpectedMerge;
use crate::output::OutputError;
use crate::service::ServiceDateError;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    /// A stop could not be classified
    #[error("{source} in {record}")]
    StopId { record: String, source: StopIdError },

    /// A route has no usable numeric ID
    #[error("{source} in {record}")]
    RouteId {
        record: String,
        source: RouteIdError,
    },

    /// Two distinct raw stops encode to the same ID
    #[error("stop ID {id} is produced by both {first:?} and {second:?}")]
    DuplicateStopId {
        id: StopId,
        first: String,
        second: String,
    },

    /// Two distinct raw routes resolve to the same ID
    #[error("route ID {id} is produced by both {first:?} and {second:?}")]
    DuplicateRouteId {
        id: RouteId,
        first: String,
        second: String,
    },

    #[error(transparent)]
    ServiceDate(#[from] ServiceDateError),

    /// Two headsigns of a direction cannot be merged
    #[error("{source} (direction {direction})")]
    Merge {
        direction: u8,
        source: UnexpectedMerge,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}
