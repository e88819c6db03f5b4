//! Backend selection as supplied by deployment configuration.

use super::{BackendName, KeyMaterial};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which backend implementation a deployment selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSelector {
    /// A native module loaded from a filesystem path.
    Module(PathBuf),
    /// A statically linked backend registered under a name.
    Vendored(BackendName),
}

impl fmt::Display for BackendSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(path) => write!(f, "module `{}`", path.display()),
            Self::Vendored(name) => write!(f, "vendor backend `{name}`"),
        }
    }
}

/// Immutable description of the backend a connector resolves and connects.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    selector: BackendSelector,
    database_url: String,
    key_material: KeyMaterial,
}

impl BackendDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(
        selector: BackendSelector,
        database_url: impl Into<String>,
        key_material: KeyMaterial,
    ) -> Self {
        Self {
            selector,
            database_url: database_url.into(),
            key_material,
        }
    }

    /// Returns the backend selector.
    #[must_use]
    pub const fn selector(&self) -> &BackendSelector {
        &self.selector
    }

    /// Returns the module path when the dynamic strategy is selected.
    #[must_use]
    pub fn module_path(&self) -> Option<&Path> {
        match &self.selector {
            BackendSelector::Module(path) => Some(path),
            BackendSelector::Vendored(_) => None,
        }
    }

    /// Returns the connection string for the underlying store.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the key material for key-registry managers.
    #[must_use]
    pub const fn key_material(&self) -> &KeyMaterial {
        &self.key_material
    }
}

// The connection string may embed credentials.
impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("selector", &self.selector)
            .field("database_url", &"<redacted>")
            .field("key_material", &self.key_material)
            .finish()
    }
}
