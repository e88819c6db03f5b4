//! In-memory native modules.
//!
//! Stand in for shared objects on disk: a module is a table from exported
//! symbol names to symbols, and the opener hands modules out by path.

use crate::backend::ports::{EntryPoint, ModuleError, ModuleOpener, ModuleSymbol, NativeModule};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A native module whose exports live in a map.
#[derive(Debug, Clone)]
pub struct InMemoryModule {
    path: PathBuf,
    symbols: HashMap<String, ModuleSymbol>,
}

impl InMemoryModule {
    /// Creates a module with no exports.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            symbols: HashMap::new(),
        }
    }

    /// Exports `entry` as `name`.
    #[must_use]
    pub fn with_entry(self, name: impl Into<String>, entry: EntryPoint) -> Self {
        self.with_symbol(name, ModuleSymbol::Entry(entry))
    }

    /// Exports an arbitrary symbol as `name`.
    #[must_use]
    pub fn with_symbol(mut self, name: impl Into<String>, symbol: ModuleSymbol) -> Self {
        self.symbols.insert(name.into(), symbol);
        self
    }

    /// Removes the export called `name`.
    #[must_use]
    pub fn without(mut self, name: &str) -> Self {
        self.symbols.remove(name);
        self
    }
}

impl NativeModule for InMemoryModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn lookup(&self, symbol: &str) -> Option<ModuleSymbol> {
        self.symbols.get(symbol).copied()
    }
}

/// Opener that serves [`InMemoryModule`]s by path.
#[derive(Debug, Default)]
pub struct InMemoryModuleOpener {
    modules: HashMap<PathBuf, InMemoryModule>,
    opens: AtomicUsize,
}

impl InMemoryModuleOpener {
    /// Creates an opener that knows no modules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `module` available at its own path.
    #[must_use]
    pub fn with_module(mut self, module: InMemoryModule) -> Self {
        self.modules.insert(module.path.clone(), module);
        self
    }

    /// Returns how many times a module was opened successfully.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl ModuleOpener for InMemoryModuleOpener {
    fn open(&self, path: &Path) -> Result<Arc<dyn NativeModule>, ModuleError> {
        let module = self
            .modules
            .get(path)
            .cloned()
            .ok_or_else(|| ModuleError::NotFound(path.to_path_buf()))?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(module))
    }
}
