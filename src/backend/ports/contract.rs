//! The operation set every storage backend exposes.
//!
//! A backend turns a connection string into a live [`ConnectionHandle`] and
//! builds the five manager objects the server runs on top of that handle.
//! What the managers do with the store is up to the backend; this layer only
//! resolves and forwards.

use crate::backend::domain::KeyMaterial;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::Span;

/// Error type produced by backend implementations.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for backend implementation calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Live database or session object returned by [`BackendContract::connect`].
pub trait StoreConnection: Send + Sync + fmt::Debug {
    /// Checks that the store answers.
    ///
    /// # Errors
    ///
    /// Returns the driver error when the store cannot be reached.
    fn ping(&self) -> BackendResult<()>;

    /// Exposes the concrete connection so a backend can recover its own type.
    fn as_any(&self) -> &dyn Any;
}

/// Shared, read-only handle to a live store connection.
pub type ConnectionHandle = Arc<dyn StoreConnection>;

/// Secret hashing capability used by client managers.
pub trait Hasher: Send + Sync {
    /// Hashes `data`.
    ///
    /// # Errors
    ///
    /// Returns an error when hashing fails.
    fn hash(&self, data: &[u8]) -> BackendResult<Vec<u8>>;

    /// Checks that `data` matches `hash`.
    ///
    /// # Errors
    ///
    /// Returns an error when the values do not match.
    fn compare(&self, hash: &[u8], data: &[u8]) -> BackendResult<()>;
}

/// OAuth2 client registry.
pub trait ClientManager: Send + Sync + fmt::Debug {}

/// Warden group registry.
pub trait GroupManager: Send + Sync + fmt::Debug {}

/// JSON Web Key registry.
pub trait JwkManager: Send + Sync + fmt::Debug {}

/// OAuth2 token, code and session storage.
pub trait OAuth2Storer: Send + Sync + fmt::Debug {}

/// Access-control policy store.
pub trait PolicyManager: Send + Sync + fmt::Debug {}

/// Contract shared by statically registered and dynamically loaded backends.
#[cfg_attr(test, mockall::automock)]
pub trait BackendContract: Send + Sync {
    /// Opens a connection to the store described by `url`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the connection cannot be established.
    fn connect(&self, url: &str) -> BackendResult<ConnectionHandle>;

    /// Builds the client registry.
    fn new_client_manager(
        &self,
        connection: ConnectionHandle,
        hasher: Arc<dyn Hasher>,
    ) -> Arc<dyn ClientManager>;

    /// Builds the group registry.
    fn new_group_manager(&self, connection: ConnectionHandle) -> Arc<dyn GroupManager>;

    /// Builds the key registry, sealing keys with `key_material`.
    fn new_jwk_manager(
        &self,
        connection: ConnectionHandle,
        key_material: KeyMaterial,
    ) -> Arc<dyn JwkManager>;

    /// Builds the OAuth2 store on top of an existing client registry.
    fn new_oauth2_manager(
        &self,
        connection: ConnectionHandle,
        client_manager: Arc<dyn ClientManager>,
        logger: Span,
    ) -> Arc<dyn OAuth2Storer>;

    /// Builds the policy store.
    fn new_policy_manager(&self, connection: ConnectionHandle) -> Arc<dyn PolicyManager>;
}
