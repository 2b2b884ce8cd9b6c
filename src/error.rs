//! Error types for the roster pipeline.
//!
//! The library reports through [`RosterError`]; the binary wraps it in `anyhow`.
//! Data-quality problems (out-of-range scores, grading gaps, missing subjects)
//! are never errors: they degrade to `None` inside the table.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Input table is structurally malformed (missing identity, group or
    /// subject columns, or a row that does not match the subject layout).
    #[error("data shape error: {message}")]
    DataShape { message: String },

    /// A query ran before the pipeline finalized its table.
    #[error("roster has not been processed yet")]
    NotProcessed,

    /// No record belongs to the requested group.
    #[error("group '{group}' not found in the roster")]
    GroupNotFound { group: String },

    /// Configuration failed validation.
    #[error("config error: {message}")]
    Config { message: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RosterError>;

impl RosterError {
    pub fn data_shape(msg: impl Into<String>) -> Self {
        Self::DataShape {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn group_not_found(group: impl Into<String>) -> Self {
        Self::GroupNotFound {
            group: group.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
