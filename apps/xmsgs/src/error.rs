//! Error types shared by the reader, engine, and configuration layers.
//!
//! A filtered-out message is never an error; these variants only describe
//! conditions that abort the whole run.

use std::path::PathBuf;

/// Fatal conditions raised while configuring or reading build logs.
#[derive(Debug, thiserror::Error)]
pub enum XmsgsError {
    /// A log file could not be parsed as an `.xmsgs` document.
    #[error("malformed log '{}': {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    /// A log file does not exist or could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A filter or config value was rejected before any log was read.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl XmsgsError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        XmsgsError::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, XmsgsError>;
