//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating [`Settings`](crate::Settings).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for [`Settings`](crate::Settings).
    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A required API key is not set.
    #[error("missing API key: set {0}")]
    MissingKey(&'static str),
}
