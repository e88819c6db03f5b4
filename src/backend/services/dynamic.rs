//! Dynamic loader connector: backends shipped as native modules.
//!
//! The module is opened once per connector. All six entry points are then
//! resolved and checked against their expected signatures in one pass, so a
//! module that is missing an operation, or exports one with the wrong
//! shape, fails before any of its code runs.

use super::connector::{BackendResolver, Connector};
use crate::backend::{
    domain::KeyMaterial,
    ports::{
        BackendContract, BackendResult, ClientManager, ConnectEntry, ConnectFn, ConnectionHandle,
        ConnectorError, ConnectorResult, EntrySignature, GroupManager, Hasher, JwkManager,
        ModuleOpener, ModuleSymbol, NativeModule, NewClientManagerEntry, NewClientManagerFn,
        NewGroupManagerEntry, NewGroupManagerFn, NewJwkManagerEntry, NewJwkManagerFn,
        NewOAuth2ManagerEntry, NewOAuth2ManagerFn, NewPolicyManagerEntry, NewPolicyManagerFn,
        OAuth2Storer, PolicyManager, SignatureMismatch,
    },
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::Span;

/// Connector that dispatches to a backend loaded from a native module.
pub type DynamicLoaderConnector = Connector<ModuleResolver>;

/// Resolves a backend by opening a native module.
pub struct ModuleResolver {
    path: PathBuf,
    opener: Arc<dyn ModuleOpener>,
    module: OnceLock<Arc<dyn NativeModule>>,
}

impl ModuleResolver {
    /// Creates a resolver for the module at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, opener: Arc<dyn ModuleOpener>) -> Self {
        Self {
            path: path.into(),
            opener,
            module: OnceLock::new(),
        }
    }

    /// Returns the configured module path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` once the module has been opened.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.module.get().is_some()
    }

    fn load(&self) -> ConnectorResult<Arc<dyn NativeModule>> {
        if let Some(module) = self.module.get() {
            return Ok(Arc::clone(module));
        }

        tracing::debug!(module = %self.path.display(), "opening backend module");
        let opened = self
            .opener
            .open(&self.path)
            .map_err(|source| ConnectorError::Load {
                path: self.path.clone(),
                source,
            })?;
        Ok(Arc::clone(self.module.get_or_init(|| opened)))
    }
}

impl BackendResolver for ModuleResolver {
    fn describe(&self) -> String {
        format!("module `{}`", self.path.display())
    }

    fn resolve(&self) -> ConnectorResult<Arc<dyn BackendContract>> {
        let module = self.load()?;
        tracing::debug!(module = %module.path().display(), "resolving backend entry points");
        let table = EntryPointTable::resolve(&self.path, module.as_ref())?;
        Ok(Arc::new(ModuleBackend {
            table,
            _module: module,
        }))
    }
}

/// Verified function pointers for every contract operation.
#[derive(Clone, Copy)]
struct EntryPointTable {
    connect: ConnectFn,
    new_client_manager: NewClientManagerFn,
    new_group_manager: NewGroupManagerFn,
    new_jwk_manager: NewJwkManagerFn,
    new_oauth2_manager: NewOAuth2ManagerFn,
    new_policy_manager: NewPolicyManagerFn,
}

impl EntryPointTable {
    fn resolve(path: &Path, module: &dyn NativeModule) -> ConnectorResult<Self> {
        Ok(Self {
            connect: resolve_entry::<ConnectEntry>(path, module)?,
            new_client_manager: resolve_entry::<NewClientManagerEntry>(path, module)?,
            new_group_manager: resolve_entry::<NewGroupManagerEntry>(path, module)?,
            new_jwk_manager: resolve_entry::<NewJwkManagerEntry>(path, module)?,
            new_oauth2_manager: resolve_entry::<NewOAuth2ManagerEntry>(path, module)?,
            new_policy_manager: resolve_entry::<NewPolicyManagerEntry>(path, module)?,
        })
    }
}

fn resolve_entry<S: EntrySignature>(
    path: &Path,
    module: &dyn NativeModule,
) -> ConnectorResult<S::Function> {
    let entry = match module.lookup(S::NAME) {
        Some(ModuleSymbol::Entry(entry)) => entry,
        Some(ModuleSymbol::Foreign) => {
            return Err(signature_mismatch::<S>(
                path,
                SignatureMismatch::foreign_symbol().found,
            ));
        }
        None => {
            return Err(ConnectorError::SymbolNotFound {
                path: path.to_path_buf(),
                symbol: S::NAME,
            });
        }
    };

    let function = entry
        .verify::<S>()
        .map_err(|mismatch| signature_mismatch::<S>(path, mismatch.found))?;
    tracing::debug!(module = %path.display(), symbol = S::NAME, "resolved backend entry point");
    Ok(function)
}

fn signature_mismatch<S: EntrySignature>(path: &Path, found: String) -> ConnectorError {
    ConnectorError::SignatureMismatch {
        path: path.to_path_buf(),
        symbol: S::NAME,
        expected: S::SIGNATURE,
        found,
    }
}

/// Backend contract backed by a module's verified entry points.
struct ModuleBackend {
    table: EntryPointTable,
    // Managers may hold code and vtables from the module; keep it referenced
    // for as long as the backend is.
    _module: Arc<dyn NativeModule>,
}

impl BackendContract for ModuleBackend {
    fn connect(&self, url: &str) -> BackendResult<ConnectionHandle> {
        (self.table.connect)(url)
    }

    fn new_client_manager(
        &self,
        connection: ConnectionHandle,
        hasher: Arc<dyn Hasher>,
    ) -> Arc<dyn ClientManager> {
        (self.table.new_client_manager)(connection, hasher)
    }

    fn new_group_manager(&self, connection: ConnectionHandle) -> Arc<dyn GroupManager> {
        (self.table.new_group_manager)(connection)
    }

    fn new_jwk_manager(
        &self,
        connection: ConnectionHandle,
        key_material: KeyMaterial,
    ) -> Arc<dyn JwkManager> {
        (self.table.new_jwk_manager)(connection, key_material)
    }

    fn new_oauth2_manager(
        &self,
        connection: ConnectionHandle,
        client_manager: Arc<dyn ClientManager>,
        logger: Span,
    ) -> Arc<dyn OAuth2Storer> {
        (self.table.new_oauth2_manager)(connection, client_manager, logger)
    }

    fn new_policy_manager(&self, connection: ConnectionHandle) -> Arc<dyn PolicyManager> {
        (self.table.new_policy_manager)(connection)
    }
}
