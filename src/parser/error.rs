//! Error types for input classification.

use thiserror::Error;

/// Errors that can occur while classifying user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// Input was empty or contained only whitespace
    #[error("URL or BV id must not be empty!")]
    EmptyInput,

    /// Input is neither a URL, a BV id, nor something mentioning the platform domain
    #[error("Unrecognized input format!")]
    UnrecognizedInputFormat {
        /// The trimmed input that failed every rule
        input: String,
    },
}

impl ClassifyError {
    /// Creates an `UnrecognizedInputFormat` error for the given input.
    #[must_use]
    pub fn unrecognized(input: &str) -> Self {
        Self::UnrecognizedInputFormat {
            input: input.to_string(),
        }
    }
}
