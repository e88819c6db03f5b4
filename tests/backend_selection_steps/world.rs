//! Shared world state for backend selection BDD scenarios.

use std::sync::Arc;

use authstore::backend::{
    adapters::memory::{InMemoryBackend, InMemoryModule, InMemoryModuleOpener},
    domain::{BackendDescriptor, BackendSelector, KeyMaterial},
    ports::{
        BackendConnector, BackendResult, ConnectEntry, ConnectorError, EntrySignature, Hasher,
        ModuleOpener, NewClientManagerEntry, NewGroupManagerEntry, NewJwkManagerEntry,
        NewOAuth2ManagerEntry, NewPolicyManagerEntry,
    },
    services::{ConnectorContext, VendorRegistry, open_connector},
};
use rstest::fixture;

mod exported {
    authstore::export_backend_module!(
        authstore::backend::adapters::memory::InMemoryBackend::new()
    );
}

const SECRET: &str = "behaviour-test-system-secret";
const DATABASE_URL: &str = "mem://scenario";

#[derive(Debug)]
struct PlainHasher;

impl Hasher for PlainHasher {
    fn hash(&self, data: &[u8]) -> BackendResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn compare(&self, hash: &[u8], data: &[u8]) -> BackendResult<()> {
        if hash == data {
            Ok(())
        } else {
            Err("hash mismatch".into())
        }
    }
}

/// Scenario world for backend selection behaviour tests.
pub struct SelectionWorld {
    /// Registry vendored backends are registered in.
    pub registry: Arc<VendorRegistry>,
    /// Backend registered by "a vendor backend named ..." steps.
    pub backend: InMemoryBackend,
    /// Modules available to the dynamic loader.
    pub modules: Vec<InMemoryModule>,
    /// Selector chosen by the deployment.
    pub selector: Option<BackendSelector>,
    /// Connector built on first use.
    pub connector: Option<Box<dyn BackendConnector>>,
    /// Outcome of the last connector call.
    pub last_result: Option<Result<(), ConnectorError>>,
}

impl SelectionWorld {
    /// Creates a world with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(VendorRegistry::new()),
            backend: InMemoryBackend::new(),
            modules: Vec::new(),
            selector: None,
            connector: None,
            last_result: None,
        }
    }

    /// Returns the connector, building it from the selected backend.
    pub fn connector(&mut self) -> Result<&dyn BackendConnector, eyre::Report> {
        if self.connector.is_none() {
            let selector = self
                .selector
                .clone()
                .ok_or_else(|| eyre::eyre!("no backend selected in scenario world"))?;
            let descriptor = BackendDescriptor::new(
                selector,
                DATABASE_URL,
                KeyMaterial::from_secret(SECRET)?,
            );
            let opener: Arc<dyn ModuleOpener> = Arc::new(
                self.modules
                    .iter()
                    .cloned()
                    .fold(InMemoryModuleOpener::new(), InMemoryModuleOpener::with_module),
            );
            self.connector = Some(open_connector(
                &descriptor,
                ConnectorContext::new(Arc::new(PlainHasher)),
                &self.registry,
                &opener,
            ));
        }
        self.connector
            .as_deref()
            .ok_or_else(|| eyre::eyre!("connector was not built"))
    }

    /// Returns the error of the last connector call.
    pub fn last_error(&self) -> Result<&ConnectorError, eyre::Report> {
        match &self.last_result {
            Some(Err(err)) => Ok(err),
            Some(Ok(())) => Err(eyre::eyre!("expected the last call to fail")),
            None => Err(eyre::eyre!("no connector call recorded in scenario world")),
        }
    }
}

impl Default for SelectionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SelectionWorld {
    SelectionWorld::default()
}

/// Builds a module at `path` exporting every entry point.
pub fn complete_module(path: &str) -> InMemoryModule {
    InMemoryModule::new(path)
        .with_entry(ConnectEntry::NAME, exported::Connect)
        .with_entry(NewClientManagerEntry::NAME, exported::NewClientManager)
        .with_entry(NewGroupManagerEntry::NAME, exported::NewGroupManager)
        .with_entry(NewJwkManagerEntry::NAME, exported::NewJWKManager)
        .with_entry(NewOAuth2ManagerEntry::NAME, exported::NewOAuth2Manager)
        .with_entry(NewPolicyManagerEntry::NAME, exported::NewPolicyManager)
}
