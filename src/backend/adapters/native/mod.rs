//! `libloading` adapter for native backend modules.

use crate::backend::ports::{
    ENTRY_POINT_MAGIC, EntryPoint, ModuleError, ModuleOpener, ModuleSymbol, NativeModule,
};
use libloading::Library;
use std::mem::ManuallyDrop;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opens backend modules with the platform dynamic loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibloadingModuleOpener;

impl LibloadingModuleOpener {
    /// Creates an opener.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ModuleOpener for LibloadingModuleOpener {
    fn open(&self, path: &Path) -> Result<Arc<dyn NativeModule>, ModuleError> {
        if !path.exists() {
            return Err(ModuleError::NotFound(path.to_path_buf()));
        }

        // SAFETY: opening a module runs its initialisers. Backend modules are
        // deployment artefacts chosen by the operator and trusted as such.
        let library = unsafe { Library::new(path) }.map_err(ModuleError::open)?;
        tracing::info!(module = %path.display(), "loaded backend module");

        Ok(Arc::new(LibloadingModule {
            path: path.to_path_buf(),
            library: ManuallyDrop::new(library),
        }))
    }
}

/// A module opened through `libloading`.
///
/// Modules stay mapped for the life of the process: managers handed out by
/// the module keep pointers into its code.
struct LibloadingModule {
    path: PathBuf,
    library: ManuallyDrop<Library>,
}

impl NativeModule for LibloadingModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn lookup(&self, symbol: &str) -> Option<ModuleSymbol> {
        // SAFETY: the symbol is read as an address only; nothing behind it is
        // interpreted until the magic tag has been checked below.
        let address: *const EntryPoint =
            unsafe { self.library.get::<*const EntryPoint>(symbol.as_bytes()) }
                .ok()
                .map(|found| *found)?;

        if address.is_null() {
            return None;
        }

        // SAFETY: `address` points into memory mapped from the module. The
        // first word is read without assuming alignment or layout.
        let magic = unsafe { address.cast::<u64>().read_unaligned() };
        if magic != ENTRY_POINT_MAGIC {
            return Some(ModuleSymbol::Foreign);
        }

        // SAFETY: the magic tag marks a static `EntryPoint` emitted by
        // `export_backend_module!`, which lives as long as the module.
        Some(ModuleSymbol::Entry(unsafe { address.read() }))
    }
}
