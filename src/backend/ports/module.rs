//! Native module ABI and the ports used to open modules.
//!
//! A backend module exports one static [`EntryPoint`] per contract
//! operation, named exactly after the operation (`Connect`,
//! `NewClientManager`, `NewGroupManager`, `NewJWKManager`,
//! `NewOAuth2Manager`, `NewPolicyManager`). Each descriptor carries a magic
//! tag, the ABI version it was built against, and the textual signature of
//! its function pointer. The loader compares all three against the
//! [`EntrySignature`] it expects before it ever calls through the pointer,
//! so a module built against a different contract is rejected at load time
//! instead of crashing on first use.
//!
//! Modules must be built with the same compiler and the same version of this
//! crate as the server; the signature check catches contract drift, not ABI
//! drift between toolchains.

use super::contract::{
    BackendResult, ClientManager, ConnectionHandle, GroupManager, Hasher, JwkManager,
    OAuth2Storer, PolicyManager,
};
use crate::backend::domain::KeyMaterial;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::Span;

/// Version of the entry-point layout and calling convention.
pub const ENTRY_POINT_ABI_VERSION: u32 = 1;

/// Tag stored in the first word of every entry-point descriptor.
pub const ENTRY_POINT_MAGIC: u64 = 0x6175_7468_7374_6f72;

/// Exported descriptor for one backend operation.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct EntryPoint {
    magic: u64,
    abi_version: u32,
    signature: &'static str,
    function: *const (),
}

// SAFETY: an entry point is an immutable pair of a static string and a
// function pointer; neither carries thread affinity.
unsafe impl Send for EntryPoint {}
// SAFETY: see `Send` above.
unsafe impl Sync for EntryPoint {}

impl EntryPoint {
    /// Builds a descriptor for `function` with the signature of `S`.
    #[must_use]
    pub fn new<S: EntrySignature>(function: S::Function) -> Self {
        Self::erased(S::SIGNATURE, S::erase(function))
    }

    /// Builds a descriptor from an already type-erased function pointer.
    ///
    /// Used by [`export_backend_module!`](crate::export_backend_module) in
    /// `static` initialisers.
    #[doc(hidden)]
    #[must_use]
    pub const fn erased(signature: &'static str, function: *const ()) -> Self {
        Self::from_raw_parts(ENTRY_POINT_MAGIC, ENTRY_POINT_ABI_VERSION, signature, function)
    }

    /// Builds a descriptor from every field, including the header.
    #[doc(hidden)]
    #[must_use]
    pub const fn from_raw_parts(
        magic: u64,
        abi_version: u32,
        signature: &'static str,
        function: *const (),
    ) -> Self {
        Self {
            magic,
            abi_version,
            signature,
            function,
        }
    }

    /// Returns the ABI version the descriptor was built against.
    #[must_use]
    pub const fn abi_version(&self) -> u32 {
        self.abi_version
    }

    /// Returns the declared function signature.
    #[must_use]
    pub const fn signature(&self) -> &'static str {
        self.signature
    }

    /// Checks the descriptor against `S` and returns the typed function.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureMismatch`] when the magic tag, the ABI version or
    /// the declared signature differ from what `S` expects.
    pub fn verify<S: EntrySignature>(&self) -> Result<S::Function, SignatureMismatch> {
        if self.magic != ENTRY_POINT_MAGIC {
            return Err(SignatureMismatch::foreign_symbol());
        }
        if self.abi_version != ENTRY_POINT_ABI_VERSION {
            return Err(SignatureMismatch {
                found: format!(
                    "entry point built for ABI version {} (expected {ENTRY_POINT_ABI_VERSION})",
                    self.abi_version
                ),
            });
        }
        if self.signature != S::SIGNATURE {
            return Err(SignatureMismatch {
                found: self.signature.to_owned(),
            });
        }
        // SAFETY: the descriptor declares exactly the signature of
        // `S::Function` under the current ABI version, and descriptors are
        // only produced by `erase` for that same function type.
        Ok(unsafe { S::restore(self.function) })
    }
}

/// What a descriptor declared instead of the expected signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMismatch {
    /// Human readable description of the shape that was found.
    pub found: String,
}

impl SignatureMismatch {
    /// Mismatch for a symbol that is not an entry-point descriptor at all.
    #[must_use]
    pub fn foreign_symbol() -> Self {
        Self {
            found: "symbol is not an entry-point descriptor".to_owned(),
        }
    }
}

/// Static description of one contract entry point.
pub trait EntrySignature {
    /// Exported symbol name.
    const NAME: &'static str;

    /// Textual function signature compared at load time.
    const SIGNATURE: &'static str;

    /// Function pointer type of the entry point.
    type Function: Copy;

    /// Erases the function pointer for storage in an [`EntryPoint`].
    fn erase(function: Self::Function) -> *const ();

    /// Restores a function pointer erased by [`EntrySignature::erase`].
    ///
    /// # Safety
    ///
    /// `raw` must have been produced by `erase` for this same signature.
    unsafe fn restore(raw: *const ()) -> Self::Function;
}

macro_rules! entry_signatures {
    ($(
        $(#[$meta:meta])*
        $marker:ident, $alias:ident = $name:literal => $fn_ty:ty;
    )*) => {
        $(
            #[doc = concat!("Function pointer type of the `", $name, "` entry point.")]
            pub type $alias = $fn_ty;

            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $marker;

            impl EntrySignature for $marker {
                const NAME: &'static str = $name;
                const SIGNATURE: &'static str = stringify!($fn_ty);
                type Function = $alias;

                fn erase(function: Self::Function) -> *const () {
                    function as *const ()
                }

                unsafe fn restore(raw: *const ()) -> Self::Function {
                    // SAFETY: guaranteed by the caller; see trait docs.
                    unsafe { std::mem::transmute::<*const (), $alias>(raw) }
                }
            }
        )*
    };
}

entry_signatures! {
    /// `Connect(url) -> ConnectionHandle`.
    ConnectEntry, ConnectFn = "Connect" =>
        fn(&str) -> BackendResult<ConnectionHandle>;
    /// `NewClientManager(handle, hasher) -> ClientManager`.
    NewClientManagerEntry, NewClientManagerFn = "NewClientManager" =>
        fn(ConnectionHandle, Arc<dyn Hasher>) -> Arc<dyn ClientManager>;
    /// `NewGroupManager(handle) -> GroupManager`.
    NewGroupManagerEntry, NewGroupManagerFn = "NewGroupManager" =>
        fn(ConnectionHandle) -> Arc<dyn GroupManager>;
    /// `NewJWKManager(handle, key) -> JWKManager`.
    NewJwkManagerEntry, NewJwkManagerFn = "NewJWKManager" =>
        fn(ConnectionHandle, KeyMaterial) -> Arc<dyn JwkManager>;
    /// `NewOAuth2Manager(handle, clients, logger) -> OAuth2Storer`.
    NewOAuth2ManagerEntry, NewOAuth2ManagerFn = "NewOAuth2Manager" =>
        fn(ConnectionHandle, Arc<dyn ClientManager>, Span) -> Arc<dyn OAuth2Storer>;
    /// `NewPolicyManager(handle) -> PolicyManager`.
    NewPolicyManagerEntry, NewPolicyManagerFn = "NewPolicyManager" =>
        fn(ConnectionHandle) -> Arc<dyn PolicyManager>;
}

/// A symbol looked up in a native module.
#[derive(Debug, Clone, Copy)]
pub enum ModuleSymbol {
    /// The symbol is an entry-point descriptor.
    Entry(EntryPoint),
    /// The symbol exists but does not carry the entry-point magic tag.
    Foreign,
}

/// An opened native module.
pub trait NativeModule: Send + Sync {
    /// Returns the path the module was opened from.
    fn path(&self) -> &Path;

    /// Looks up an exported symbol by exact name.
    ///
    /// Returns `None` when the module does not export `symbol`.
    fn lookup(&self, symbol: &str) -> Option<ModuleSymbol>;
}

/// Opens native modules from the filesystem.
pub trait ModuleOpener: Send + Sync {
    /// Opens the module at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError::NotFound`] when nothing exists at `path` and
    /// [`ModuleError::Open`] when the file cannot be loaded as a module.
    fn open(&self, path: &Path) -> Result<Arc<dyn NativeModule>, ModuleError>;
}

/// Errors returned by module openers.
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    /// No file exists at the requested path.
    #[error("no module file at {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be loaded.
    #[error("module could not be loaded: {0}")]
    Open(Arc<dyn std::error::Error + Send + Sync>),
}

impl ModuleError {
    /// Wraps a loader error.
    pub fn open(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Open(Arc::new(err))
    }
}
