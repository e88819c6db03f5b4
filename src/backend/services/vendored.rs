//! Registry connector: backends linked into the server binary.

use super::connector::{BackendResolver, Connector};
use super::registry::VendorRegistry;
use crate::backend::{
    domain::BackendName,
    ports::{BackendContract, ConnectorResult},
};
use std::sync::Arc;

/// Connector that dispatches to a backend from the vendor registry.
pub type RegistryConnector = Connector<RegistryResolver>;

/// Resolves a backend by name from a [`VendorRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryResolver {
    name: BackendName,
    registry: Arc<VendorRegistry>,
}

impl RegistryResolver {
    /// Creates a resolver for the backend registered as `name`.
    #[must_use]
    pub const fn new(name: BackendName, registry: Arc<VendorRegistry>) -> Self {
        Self { name, registry }
    }

    /// Returns the backend name.
    #[must_use]
    pub const fn name(&self) -> &BackendName {
        &self.name
    }
}

impl BackendResolver for RegistryResolver {
    fn describe(&self) -> String {
        format!("vendor backend `{}`", self.name)
    }

    fn resolve(&self) -> ConnectorResult<Arc<dyn BackendContract>> {
        Ok(self.registry.get(self.name.as_str())?)
    }
}
