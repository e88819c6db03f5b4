//! In-memory backend implementation.

use crate::backend::{
    domain::{BackendName, KeyMaterial},
    ports::{
        BackendContract, BackendError, BackendResult, ClientManager, ConnectionHandle,
        GroupManager, Hasher, JwkManager, OAuth2Storer, PolicyManager, RegistryResult,
        StoreConnection,
    },
    services::VendorRegistry,
};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::Span;

/// Name the in-memory backend registers under.
pub const MEMORY_BACKEND_NAME: &str = "mem";

/// Registers a fresh [`InMemoryBackend`] as [`MEMORY_BACKEND_NAME`].
///
/// # Errors
///
/// Returns registry errors, e.g. when the name is already taken.
pub fn register_memory_backend(registry: &VendorRegistry) -> RegistryResult<BackendName> {
    registry.register(MEMORY_BACKEND_NAME, Arc::new(InMemoryBackend::new()), None)
}

/// Which manager a factory call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerKind {
    /// Client registry.
    Client,
    /// Group registry.
    Group,
    /// Key registry.
    Jwk,
    /// OAuth2 store.
    OAuth2,
    /// Policy store.
    Policy,
}

/// A factory call observed by the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryCall {
    /// Manager that was built.
    pub kind: ManagerKind,
    /// Connection string of the connection the manager was built on.
    pub connection_url: String,
    /// Fingerprint of the key material, for key registries.
    pub key_fingerprint: Option<String>,
}

/// Connection produced by [`InMemoryBackend::connect`].
#[derive(Debug, Clone)]
pub struct InMemoryConnection {
    url: String,
    reachable: bool,
}

impl InMemoryConnection {
    /// Returns the connection string the connection was opened with.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StoreConnection for InMemoryConnection {
    fn ping(&self) -> BackendResult<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(format!("in-memory store at {} is unreachable", self.url).into())
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Manager produced by the in-memory backend.
///
/// One type stands in for all five manager kinds; it records which kind it
/// is and which connection it was built on.
#[derive(Debug, Clone)]
pub struct InMemoryManager {
    kind: ManagerKind,
    connection: ConnectionHandle,
}

impl InMemoryManager {
    /// Returns the manager kind.
    #[must_use]
    pub const fn kind(&self) -> ManagerKind {
        self.kind
    }

    /// Returns the connection the manager was built on.
    #[must_use]
    pub const fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }
}

impl ClientManager for InMemoryManager {}
impl GroupManager for InMemoryManager {}
impl JwkManager for InMemoryManager {}
impl OAuth2Storer for InMemoryManager {}
impl PolicyManager for InMemoryManager {}

#[derive(Debug, Default)]
struct InMemoryBackendState {
    connect_attempts: usize,
    connect_failure: Option<String>,
    unreachable: bool,
    factory_calls: Vec<FactoryCall>,
}

/// Thread-safe in-memory backend.
///
/// Failure modes can be switched on to exercise connector error paths.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<RwLock<InMemoryBackendState>>,
}

impl InMemoryBackend {
    /// Creates a backend that connects successfully.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `connect` calls fail with `message`.
    pub fn fail_connect(&self, message: impl Into<String>) {
        self.write_state().connect_failure = Some(message.into());
    }

    /// Makes subsequent `connect` calls succeed again.
    pub fn restore_connect(&self) {
        self.write_state().connect_failure = None;
    }

    /// Makes connections opened from now on fail their ping.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.write_state().unreachable = unreachable;
    }

    /// Returns how many times `connect` was called.
    #[must_use]
    pub fn connect_attempts(&self) -> usize {
        self.read_state().connect_attempts
    }

    /// Returns every factory call seen so far, in order.
    #[must_use]
    pub fn factory_calls(&self) -> Vec<FactoryCall> {
        self.read_state().factory_calls.clone()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, InMemoryBackendState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, InMemoryBackendState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn build(
        &self,
        kind: ManagerKind,
        connection: ConnectionHandle,
        key_material: Option<&KeyMaterial>,
    ) -> Arc<InMemoryManager> {
        let connection_url = connection
            .as_any()
            .downcast_ref::<InMemoryConnection>()
            .map(|conn| conn.url().to_owned())
            .unwrap_or_default();
        self.write_state().factory_calls.push(FactoryCall {
            kind,
            connection_url,
            key_fingerprint: key_material.map(KeyMaterial::fingerprint),
        });
        Arc::new(InMemoryManager { kind, connection })
    }
}

impl fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("connect_attempts", &self.connect_attempts())
            .finish_non_exhaustive()
    }
}

impl BackendContract for InMemoryBackend {
    fn connect(&self, url: &str) -> BackendResult<ConnectionHandle> {
        let mut state = self.write_state();
        state.connect_attempts += 1;
        if let Some(message) = &state.connect_failure {
            let err: BackendError = message.clone().into();
            return Err(err);
        }
        Ok(Arc::new(InMemoryConnection {
            url: url.to_owned(),
            reachable: !state.unreachable,
        }))
    }

    fn new_client_manager(
        &self,
        connection: ConnectionHandle,
        _hasher: Arc<dyn Hasher>,
    ) -> Arc<dyn ClientManager> {
        self.build(ManagerKind::Client, connection, None)
    }

    fn new_group_manager(&self, connection: ConnectionHandle) -> Arc<dyn GroupManager> {
        self.build(ManagerKind::Group, connection, None)
    }

    fn new_jwk_manager(
        &self,
        connection: ConnectionHandle,
        key_material: KeyMaterial,
    ) -> Arc<dyn JwkManager> {
        self.build(ManagerKind::Jwk, connection, Some(&key_material))
    }

    fn new_oauth2_manager(
        &self,
        connection: ConnectionHandle,
        _client_manager: Arc<dyn ClientManager>,
        _logger: Span,
    ) -> Arc<dyn OAuth2Storer> {
        self.build(ManagerKind::OAuth2, connection, None)
    }

    fn new_policy_manager(&self, connection: ConnectionHandle) -> Arc<dyn PolicyManager> {
        self.build(ManagerKind::Policy, connection, None)
    }
}
