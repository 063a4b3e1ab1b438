//! Writing the converted model to disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::convert::ConvertedFeed;

/// Errors writing output files.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Directory or file could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Model could not be serialized
    #[error("failed to serialize {name}: {source}")]
    Json {
        name: &'static str,
        source: serde_json::Error,
    },
}

/// Where converted files go: a directory and a file name prefix.
#[derive(Debug, Clone)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub prefix: String,
}

impl OutputTarget {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Path of an output file, with the prefix applied.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{name}", self.prefix))
    }

    /// Hidden sibling of [`Self::file`] that a file is staged in before it
    /// replaces the real one.
    fn staging_file(&self, name: &str) -> PathBuf {
        self.dir.join(format!(".{}{name}.tmp", self.prefix))
    }

    /// Write agency info, routes, stops, directions and service ids as pretty JSON.
    ///
    /// Creates the output directory if it doesn't exist. Every file is
    /// serialized and staged before any existing output is replaced, so a
    /// failure leaves the previous files untouched. Returns the files written.
    pub fn write(&self, feed: &ConvertedFeed) -> Result<Vec<PathBuf>, OutputError> {
        let files = [
            ("agency.json", to_json("agency.json", &feed.agency)?),
            ("routes.json", to_json("routes.json", &feed.routes)?),
            ("stops.json", to_json("stops.json", &feed.stops)?),
            ("directions.json", to_json("directions.json", &feed.directions)?),
            ("services.json", to_json("services.json", &feed.service_ids)?),
        ];

        std::fs::create_dir_all(&self.dir).map_err(|source| OutputError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut staged = Vec::with_capacity(files.len());
        for (name, json) in &files {
            let staging = self.staging_file(name);
            if let Err(e) = write_file(&staging, json) {
                discard(&staged);
                return Err(e);
            }
            staged.push((staging, self.file(name)));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (staging, path) in staged {
            std::fs::rename(&staging, &path).map_err(|source| OutputError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

fn to_json<T: Serialize + ?Sized>(name: &'static str, value: &T) -> Result<String, OutputError> {
    serde_json::to_string_pretty(value).map_err(|source| OutputError::Json { name, source })
}

fn write_file(path: &Path, contents: &str) -> Result<(), OutputError> {
    std::fs::write(path, contents).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (staging, _) in staged {
        if let Err(e) = std::fs::remove_file(staging) {
            warn!("failed to remove {}: {e}", staging.display());
        }
    }
}
