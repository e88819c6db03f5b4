//! Resolve-once, connect-once lifecycle shared by every connector kind.
//!
//! [`Connector`] owns the lifecycle state machine
//! (`Unresolved → Resolved → Connected`) and forwards factory calls to the
//! resolved [`BackendContract`]. How a backend is found is delegated to a
//! [`BackendResolver`]: the dynamic loader and the vendor registry each
//! provide one.

use crate::backend::{
    domain::{BackendDescriptor, ConnectionStatus, KeyMaterial},
    ports::{
        BackendConnector, BackendContract, ClientManager, ConnectionHandle, ConnectorError,
        ConnectorResult, GroupManager, Hasher, JwkManager, OAuth2Storer, PolicyManager,
    },
};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Span;

/// Finds the backend implementation a connector dispatches to.
pub trait BackendResolver: Send + Sync {
    /// Describes the backend for logs and errors.
    fn describe(&self) -> String;

    /// Produces the backend implementation.
    ///
    /// Called at most once per successful resolution; a failed call may be
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns the resolution failure.
    fn resolve(&self) -> ConnectorResult<Arc<dyn BackendContract>>;
}

/// Auxiliary inputs handed to manager factories.
#[derive(Clone)]
pub struct ConnectorContext {
    hasher: Arc<dyn Hasher>,
    logger: Span,
}

impl ConnectorContext {
    /// Creates a context that passes the current span to OAuth2 stores.
    #[must_use]
    pub fn new(hasher: Arc<dyn Hasher>) -> Self {
        Self {
            hasher,
            logger: Span::current(),
        }
    }

    /// Replaces the span handed to OAuth2 stores.
    #[must_use]
    pub fn with_logger(mut self, logger: Span) -> Self {
        self.logger = logger;
        self
    }
}

impl fmt::Debug for ConnectorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorContext")
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

enum LifecycleState {
    Unresolved,
    Resolved(Arc<dyn BackendContract>),
    Connected {
        backend: Arc<dyn BackendContract>,
        connection: ConnectionHandle,
    },
}

impl LifecycleState {
    const fn status(&self) -> ConnectionStatus {
        match self {
            Self::Unresolved => ConnectionStatus::Unresolved,
            Self::Resolved(_) => ConnectionStatus::Resolved,
            Self::Connected { .. } => ConnectionStatus::Connected,
        }
    }
}

/// Connector generic over how its backend is resolved.
pub struct Connector<R> {
    resolver: R,
    database_url: String,
    key_material: KeyMaterial,
    context: ConnectorContext,
    state: Mutex<LifecycleState>,
}

impl<R: BackendResolver> Connector<R> {
    /// Creates an unresolved connector for `descriptor`.
    ///
    /// The descriptor supplies the connection string and key material; the
    /// resolver decides which backend answers them.
    #[must_use]
    pub fn new(resolver: R, descriptor: &BackendDescriptor, context: ConnectorContext) -> Self {
        Self {
            resolver,
            database_url: descriptor.database_url().to_owned(),
            key_material: descriptor.key_material().clone(),
            context,
            state: Mutex::new(LifecycleState::Unresolved),
        }
    }

    /// Returns the resolver.
    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    // Held across resolve, connect and ping; `status` and `Debug` wait for it.
    // A panic while the lock is held cannot leave a half-written state: every
    // transition is a single assignment.
    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drives the state machine to `Connected` and returns its contents.
    fn connected(&self) -> ConnectorResult<(Arc<dyn BackendContract>, ConnectionHandle)> {
        let mut state = self.lock_state();

        if let LifecycleState::Connected {
            backend,
            connection,
        } = &*state
        {
            return Ok((Arc::clone(backend), Arc::clone(connection)));
        }

        let backend = if let LifecycleState::Resolved(backend) = &*state {
            Arc::clone(backend)
        } else {
            let resolved = self.resolver.resolve()?;
            tracing::debug!(backend = %self.resolver.describe(), "resolved database backend");
            *state = LifecycleState::Resolved(Arc::clone(&resolved));
            resolved
        };

        let connection = self.open_connection(backend.as_ref())?;
        *state = LifecycleState::Connected {
            backend: Arc::clone(&backend),
            connection: Arc::clone(&connection),
        };
        Ok((backend, connection))
    }

    fn open_connection(&self, backend: &dyn BackendContract) -> ConnectorResult<ConnectionHandle> {
        let description = self.resolver.describe();
        let connection =
            backend
                .connect(&self.database_url)
                .map_err(|err| ConnectorError::Connect {
                    backend: description.clone(),
                    source: Arc::from(err),
                })?;

        tracing::info!(backend = %description, "successfully connected through database backend");
        tracing::debug!(backend = %description, connection = ?connection, "database backend connection");

        if let Err(err) = connection.ping() {
            tracing::error!(
                backend = %description,
                error = %err,
                "could not ping database connection from backend"
            );
            return Err(ConnectorError::Unreachable {
                backend: description,
                source: Arc::from(err),
            });
        }
        Ok(connection)
    }
}

impl<R: BackendResolver> BackendConnector for Connector<R> {
    fn describe(&self) -> String {
        self.resolver.describe()
    }

    fn status(&self) -> ConnectionStatus {
        self.lock_state().status()
    }

    fn connect(&self) -> ConnectorResult<ConnectionHandle> {
        self.connected().map(|(_, connection)| connection)
    }

    fn new_client_manager(&self) -> ConnectorResult<Arc<dyn ClientManager>> {
        let (backend, connection) = self.connected()?;
        Ok(backend.new_client_manager(connection, Arc::clone(&self.context.hasher)))
    }

    fn new_group_manager(&self) -> ConnectorResult<Arc<dyn GroupManager>> {
        let (backend, connection) = self.connected()?;
        Ok(backend.new_group_manager(connection))
    }

    fn new_jwk_manager(&self) -> ConnectorResult<Arc<dyn JwkManager>> {
        let (backend, connection) = self.connected()?;
        tracing::debug!(
            backend = %self.resolver.describe(),
            key_fingerprint = %self.key_material.fingerprint(),
            "building key manager"
        );
        Ok(backend.new_jwk_manager(connection, self.key_material.clone()))
    }

    fn new_oauth2_manager(
        &self,
        client_manager: Arc<dyn ClientManager>,
    ) -> ConnectorResult<Arc<dyn OAuth2Storer>> {
        let (backend, connection) = self.connected()?;
        Ok(backend.new_oauth2_manager(connection, client_manager, self.context.logger.clone()))
    }

    fn new_policy_manager(&self) -> ConnectorResult<Arc<dyn PolicyManager>> {
        let (backend, connection) = self.connected()?;
        Ok(backend.new_policy_manager(connection))
    }
}

impl<R: BackendResolver> fmt::Debug for Connector<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("backend", &self.resolver.describe())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
