//! Error types for backend domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing backend domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendDomainError {
    /// The backend name is empty after trimming.
    #[error("backend name must not be empty")]
    EmptyBackendName,

    /// The backend name exceeds the 100-character limit.
    #[error("backend name exceeds 100 character limit: {0}")]
    BackendNameTooLong(String),

    /// The module path is empty.
    #[error("backend module path must not be empty")]
    EmptyModulePath,

    /// The system secret is too short to derive key material from.
    #[error("system secret must be at least {minimum} bytes long, got {actual}")]
    SecretTooShort {
        /// Minimum accepted length in bytes.
        minimum: usize,
        /// Length of the rejected secret in bytes.
        actual: usize,
    },
}
