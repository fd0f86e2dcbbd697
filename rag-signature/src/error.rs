//! Signature errors.

use thiserror::Error;

/// Errors raised while filling or parsing a signature.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SignatureError {
    /// A declared input field was not supplied.
    #[error("{signature}: missing input field `{field}`")]
    MissingInput {
        /// Signature name.
        signature: String,
        /// Field name.
        field: String,
    },

    /// An input value does not match its declared kind.
    #[error("input field `{field}` must be {expected}")]
    InvalidInput {
        /// Field name.
        field: String,
        /// Expected kind, as rendered to the model.
        expected: String,
    },

    /// The completion has no value for an output field without a default.
    #[error("missing output field `{field}`")]
    MissingOutput {
        /// Field name.
        field: String,
    },

    /// An output value could not be coerced to its declared kind.
    #[error("output field `{field}`: {reason}")]
    InvalidOutput {
        /// Field name.
        field: String,
        /// What went wrong.
        reason: String,
    },

    /// The completion does not follow the requested structure at all.
    #[error("unparseable completion: {0}")]
    Unparseable(String),

    /// A prediction could not be converted into the requested type.
    #[error("prediction conversion failed: {0}")]
    Conversion(#[from] serde_json::Error),
}

impl SignatureError {
    /// Whether the error came from reading the model's completion.
    ///
    /// Such failures may succeed with a different prompt format.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            SignatureError::MissingOutput { .. }
                | SignatureError::InvalidOutput { .. }
                | SignatureError::Unparseable(_)
        )
    }
}
