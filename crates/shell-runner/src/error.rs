//! Error types for process execution

use thiserror::Error;

/// Unified error type for process execution
///
/// Runtime lifecycle anomalies (failed launch, timeout kill, kill
/// races) are reported through [`crate::StartInfo`] and
/// [`crate::ExitResult`], not through this type. Only contract
/// violations and internal I/O plumbing surface as errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Process options failed validation at construction
    #[error("invalid process options: {reason}")]
    InvalidOptions {
        /// Why the options were rejected
        reason: String,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid-options error
    pub fn invalid_options(reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
