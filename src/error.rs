use std::path::PathBuf;
use thiserror::Error;

/// Failures the tagger can run into.
///
/// None of these are fatal to a host: parse and patch errors are
/// recovered at the file boundary, snapshot errors at the element
/// boundary, and I/O errors are recorded per file by the batch driver.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("failed to serialize props snapshot for {identity}: {source}")]
    SnapshotSerialization {
        identity: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("insertion at byte {offset} is outside the source text ({len} bytes) or not on a char boundary")]
    Patch { offset: u32, len: usize },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid include pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T, E = TransformError> = std::result::Result<T, E>;
