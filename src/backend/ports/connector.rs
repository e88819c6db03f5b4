//! Server-facing connector contract.
//!
//! A connector resolves one backend, connects it once, and hands out
//! managers built on the resulting connection. Callers never need to call
//! [`BackendConnector::connect`] before asking for a manager; every factory
//! resolves and connects on demand.

use super::contract::{
    ClientManager, ConnectionHandle, GroupManager, JwkManager, OAuth2Storer, PolicyManager,
};
use super::module::ModuleError;
use super::registry::RegistryError;
use crate::backend::domain::ConnectionStatus;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Resolution and dispatch contract implemented by every connector kind.
pub trait BackendConnector: Send + Sync {
    /// Describes the selected backend, e.g. ``module `/opt/x.so` ``.
    fn describe(&self) -> String;

    /// Returns the current lifecycle status.
    ///
    /// Blocks while another thread is resolving or connecting the backend,
    /// and then reports the outcome of that attempt.
    fn status(&self) -> ConnectionStatus;

    /// Resolves the backend if needed and connects it once.
    ///
    /// Calling `connect` again after a success returns the held handle
    /// without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, [`ConnectorError::Connect`] when the
    /// backend cannot connect, and [`ConnectorError::Unreachable`] when the
    /// new connection does not answer a ping.
    fn connect(&self) -> ConnectorResult<ConnectionHandle>;

    /// Builds the client registry.
    ///
    /// # Errors
    ///
    /// Returns any error [`BackendConnector::connect`] can return.
    fn new_client_manager(&self) -> ConnectorResult<Arc<dyn ClientManager>>;

    /// Builds the group registry.
    ///
    /// # Errors
    ///
    /// Returns any error [`BackendConnector::connect`] can return.
    fn new_group_manager(&self) -> ConnectorResult<Arc<dyn GroupManager>>;

    /// Builds the key registry.
    ///
    /// # Errors
    ///
    /// Returns any error [`BackendConnector::connect`] can return.
    fn new_jwk_manager(&self) -> ConnectorResult<Arc<dyn JwkManager>>;

    /// Builds the OAuth2 store on top of `client_manager`.
    ///
    /// # Errors
    ///
    /// Returns any error [`BackendConnector::connect`] can return.
    fn new_oauth2_manager(
        &self,
        client_manager: Arc<dyn ClientManager>,
    ) -> ConnectorResult<Arc<dyn OAuth2Storer>>;

    /// Builds the policy store.
    ///
    /// # Errors
    ///
    /// Returns any error [`BackendConnector::connect`] can return.
    fn new_policy_manager(&self) -> ConnectorResult<Arc<dyn PolicyManager>>;
}

/// Errors returned by connectors.
#[derive(Debug, Clone, Error)]
pub enum ConnectorError {
    /// The native module could not be opened.
    #[error("failed to open backend module {}: {source}", .path.display())]
    Load {
        /// Configured module path.
        path: PathBuf,
        /// Opener failure.
        source: ModuleError,
    },

    /// The module does not export a required entry point.
    #[error("backend module {} does not export `{symbol}`", .path.display())]
    SymbolNotFound {
        /// Configured module path.
        path: PathBuf,
        /// Missing entry-point name.
        symbol: &'static str,
    },

    /// The module exports the entry point with an unexpected shape.
    #[error(
        "backend module {} exports `{symbol}` with the wrong signature: expected `{expected}`, found `{found}`",
        .path.display()
    )]
    SignatureMismatch {
        /// Configured module path.
        path: PathBuf,
        /// Entry-point name.
        symbol: &'static str,
        /// Expected signature.
        expected: &'static str,
        /// What the module declared instead.
        found: String,
    },

    /// The backend failed to connect to its store.
    #[error("could not connect to database through {backend}: {source}")]
    Connect {
        /// Backend description.
        backend: String,
        /// Backend failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The backend connected but the connection does not answer.
    #[error("{backend} connected but the database did not answer a ping: {source}")]
    Unreachable {
        /// Backend description.
        backend: String,
        /// Ping failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The vendor registry could not supply the backend.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
