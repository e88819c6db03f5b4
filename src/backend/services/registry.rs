//! Vendor registry of statically linked backends.
//!
//! Backends compiled into the server register themselves under a name
//! during start-up; connectors later look them up by that name. The
//! registry is an explicit value owned by the start-up sequence and shared
//! through an [`Arc`], and a single mutex serializes registration against
//! lookup.

use crate::backend::{
    domain::BackendName,
    ports::{BackendContract, BackendError, RegistryError, RegistryResult},
};
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Summary of one registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredBackend {
    /// Registered name.
    pub name: BackendName,
    /// When the backend was registered.
    pub registered_at: DateTime<Utc>,
    /// `false` when the backend was registered with an initialization error.
    pub initialized: bool,
}

struct RegistryEntry {
    backend: Arc<dyn BackendContract>,
    init_error: Option<Arc<dyn std::error::Error + Send + Sync>>,
    registered_at: DateTime<Utc>,
}

/// Name-keyed table of statically linked backends.
pub struct VendorRegistry {
    entries: Mutex<HashMap<BackendName, RegistryEntry>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl VendorRegistry {
    /// Creates an empty registry using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty registry that timestamps entries with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Registers `backend` under `name`.
    ///
    /// A backend whose preparation failed may still be registered with
    /// `init_error` set; the failure is surfaced by [`VendorRegistry::get`]
    /// instead of at registration time.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidName`] when `name` fails validation
    /// and [`RegistryError::Duplicate`] when `name` is already taken. A
    /// rejected registration leaves the existing entry untouched.
    pub fn register(
        &self,
        name: &str,
        backend: Arc<dyn BackendContract>,
        init_error: Option<BackendError>,
    ) -> RegistryResult<BackendName> {
        let backend_name = BackendName::new(name)?;
        let mut entries = self.lock()?;

        if entries.contains_key(&backend_name) {
            return Err(RegistryError::Duplicate(backend_name));
        }

        match &init_error {
            Some(err) => tracing::warn!(
                backend = %backend_name,
                error = %err,
                "registering vendor backend with an initialization failure"
            ),
            None => tracing::debug!(backend = %backend_name, "registering vendor backend"),
        }

        entries.insert(
            backend_name.clone(),
            RegistryEntry {
                backend,
                init_error: init_error.map(Arc::from),
                registered_at: self.clock.utc(),
            },
        );
        Ok(backend_name)
    }

    /// Looks up the backend registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] when no backend has the name
    /// and [`RegistryError::DeferredInit`] when the backend was registered
    /// with an initialization error.
    pub fn get(&self, name: &str) -> RegistryResult<Arc<dyn BackendContract>> {
        let backend_name =
            BackendName::new(name).map_err(|_| RegistryError::NotRegistered(name.to_owned()))?;
        let entries = self.lock()?;
        let entry = entries
            .get(&backend_name)
            .ok_or_else(|| RegistryError::NotRegistered(backend_name.to_string()))?;

        if let Some(err) = &entry.init_error {
            return Err(RegistryError::DeferredInit {
                name: backend_name,
                source: Arc::clone(err),
            });
        }
        Ok(Arc::clone(&entry.backend))
    }

    /// Returns `true` when a backend is registered under `name`, usable or not.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry lock is poisoned.
    pub fn contains(&self, name: &str) -> RegistryResult<bool> {
        let Ok(backend_name) = BackendName::new(name) else {
            return Ok(false);
        };
        Ok(self.lock()?.contains_key(&backend_name))
    }

    /// Returns the number of registered backends.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry lock is poisoned.
    pub fn len(&self) -> RegistryResult<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` when nothing has been registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry lock is poisoned.
    pub fn is_empty(&self) -> RegistryResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Lists every registered backend, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Poisoned`] when the registry lock is poisoned.
    pub fn entries(&self) -> RegistryResult<Vec<RegisteredBackend>> {
        let entries = self.lock()?;
        let mut listed: Vec<RegisteredBackend> = entries
            .iter()
            .map(|(name, entry)| RegisteredBackend {
                name: name.clone(),
                registered_at: entry.registered_at,
                initialized: entry.init_error.is_none(),
            })
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    fn lock(&self) -> RegistryResult<MutexGuard<'_, HashMap<BackendName, RegistryEntry>>> {
        self.entries
            .lock()
            .map_err(|err| RegistryError::Poisoned(err.to_string()))
    }
}

impl Default for VendorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VendorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .entries
            .lock()
            .map(|entries| entries.keys().map(ToString::to_string).collect())
            .unwrap_or_default();
        f.debug_struct("VendorRegistry")
            .field("backends", &names)
            .finish_non_exhaustive()
    }
}
