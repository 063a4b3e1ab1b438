//! Feed reading error types.

use std::path::PathBuf;

/// Errors that can occur while reading a GTFS feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The feed path could not be opened
    #[error("failed to open feed {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The feed archive is unreadable
    #[error("invalid feed archive {}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    /// A required GTFS file is absent
    #[error("feed is missing required file {0}")]
    MissingFile(&'static str),

    /// A row of a GTFS file does not match the expected columns
    #[error("invalid record in {file}: {source}")]
    Csv {
        file: &'static str,
        source: csv::Error,
    },
}
