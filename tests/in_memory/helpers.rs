//! Shared fixtures for in-memory backend resolution tests.

use std::sync::Arc;

use authstore::backend::{
    domain::{BackendDescriptor, BackendName, BackendSelector, KeyMaterial},
    ports::{BackendResult, Hasher},
    services::ConnectorContext,
};

/// System secret used by every fixture descriptor.
pub const SECRET: &str = "integration-test-system-secret";

/// Connection string used by every fixture descriptor.
pub const DATABASE_URL: &str = "mem://integration";

/// Hasher that stores data as-is.
#[derive(Debug)]
pub struct PlainHasher;

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

/// Connector context with a [`PlainHasher`].
pub fn context() -> ConnectorContext {
    ConnectorContext::new(Arc::new(PlainHasher))
}

/// Descriptor selecting the vendored backend `name`.
pub fn vendored(name: &str) -> BackendDescriptor {
    BackendDescriptor::new(
        BackendSelector::Vendored(BackendName::new(name).expect("valid backend name")),
        DATABASE_URL,
        KeyMaterial::from_secret(SECRET).expect("secret long enough"),
    )
}

/// Descriptor selecting the module at `path`.
pub fn module(path: &str) -> BackendDescriptor {
    BackendDescriptor::new(
        BackendSelector::Module(path.into()),
        DATABASE_URL,
        KeyMaterial::from_secret(SECRET).expect("secret long enough"),
    )
}
