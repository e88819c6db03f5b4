//! Error contract of the vendor registry.

use crate::backend::domain::{BackendDomainError, BackendName};
use std::sync::Arc;
use thiserror::Error;

/// Result type for vendor registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors returned by the vendor registry.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The registration name failed validation.
    #[error("could not register backend: {0}")]
    InvalidName(#[from] BackendDomainError),

    /// A backend is already registered under the name.
    #[error("vendor backend {0} already registered")]
    Duplicate(BackendName),

    /// No backend is registered under the name.
    #[error("vendor backend {0} not registered")]
    NotRegistered(String),

    /// The backend was registered together with an initialization failure.
    #[error("vendor backend {name} failed initialization: {source}")]
    DeferredInit {
        /// Registered name.
        name: BackendName,
        /// Failure recorded at registration time.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The registry lock was poisoned by a panicking thread.
    #[error("vendor registry lock poisoned: {0}")]
    Poisoned(String),
}
