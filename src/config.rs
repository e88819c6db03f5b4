//! Backend selection from configuration files and the environment.
//!
//! Configuration lives in a `[backend]` table:
//!
//! ```toml
//! [backend]
//! database_url = "postgres://hydra:secret@db:5432/hydra"
//! vendor_plugin = "oracle"          # or: plugin = "/opt/hydra/libbackend.so"
//! system_secret = "a-long-random-system-secret"
//! ```
//!
//! The environment variables [`ENV_DATABASE_URL`], [`ENV_DATABASE_PLUGIN`],
//! [`ENV_DATABASE_VENDOR_PLUGIN`] and [`ENV_SYSTEM_SECRET`] override the file.

use crate::backend::domain::{
    BackendDescriptor, BackendDomainError, BackendName, BackendSelector, KeyMaterial,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides `backend.database_url`.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Overrides `backend.plugin`.
pub const ENV_DATABASE_PLUGIN: &str = "DATABASE_PLUGIN";
/// Overrides `backend.vendor_plugin`.
pub const ENV_DATABASE_VENDOR_PLUGIN: &str = "DATABASE_VENDOR_PLUGIN";
/// Overrides `backend.system_secret`.
pub const ENV_SYSTEM_SECRET: &str = "SYSTEM_SECRET";

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors returned while loading backend configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read configuration file {}: {source}", .path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// I/O failure.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Neither a module path nor a vendor name is configured.
    #[error("no database backend selected: set `plugin` or `vendor_plugin`")]
    MissingSelector,

    /// Both a module path and a vendor name are configured.
    #[error("`plugin` and `vendor_plugin` are mutually exclusive")]
    AmbiguousSelector,

    /// No connection string is configured.
    #[error("no database url configured")]
    MissingDatabaseUrl,

    /// No system secret is configured.
    #[error("no system secret configured")]
    MissingSecret,

    /// A configured value failed domain validation.
    #[error(transparent)]
    Domain(#[from] BackendDomainError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    backend: BackendConfig,
}

/// Raw backend settings before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Connection string for the underlying store.
    pub database_url: Option<String>,
    /// Path of a native backend module.
    pub plugin: Option<PathBuf>,
    /// Name of a vendored backend.
    pub vendor_plugin: Option<String>,
    /// Secret the key material is derived from.
    pub system_secret: Option<String>,
}

impl BackendConfig {
    /// Parses the `[backend]` table of a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is malformed or
    /// contains unknown keys.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let file: ConfigFile = toml::from_str(source)?;
        Ok(file.backend)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it cannot be parsed.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`; empty values are ignored.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(ENV_DATABASE_URL) {
            self.database_url = Some(url);
        }
        if let Some(plugin) = get(ENV_DATABASE_PLUGIN) {
            self.plugin = Some(PathBuf::from(plugin));
        }
        if let Some(vendor) = get(ENV_DATABASE_VENDOR_PLUGIN) {
            self.vendor_plugin = Some(vendor);
        }
        if let Some(secret) = get(ENV_SYSTEM_SECRET) {
            self.system_secret = Some(secret);
        }
        self
    }

    /// Validates the settings into a [`BackendDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`],
    /// [`ConfigError::MissingSelector`], [`ConfigError::AmbiguousSelector`]
    /// or [`ConfigError::MissingSecret`] for absent or conflicting settings,
    /// and [`ConfigError::Domain`] when a value fails validation.
    pub fn into_descriptor(self) -> ConfigResult<BackendDescriptor> {
        let database_url = self
            .database_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let selector = match (self.plugin, self.vendor_plugin) {
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousSelector),
            (Some(path), None) => {
                if path.as_os_str().is_empty() {
                    return Err(BackendDomainError::EmptyModulePath.into());
                }
                BackendSelector::Module(path)
            }
            (None, Some(name)) => BackendSelector::Vendored(BackendName::new(name)?),
            (None, None) => return Err(ConfigError::MissingSelector),
        };

        let secret = self.system_secret.ok_or(ConfigError::MissingSecret)?;
        let key_material = KeyMaterial::from_secret(&secret)?;

        Ok(BackendDescriptor::new(selector, database_url, key_material))
    }
}
