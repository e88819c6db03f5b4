//! In-memory adapters for backend resolution tests and local deployments.

mod backend;
mod module;

pub use backend::{
    FactoryCall, InMemoryBackend, InMemoryConnection, InMemoryManager, MEMORY_BACKEND_NAME,
    ManagerKind, register_memory_backend,
};
pub use module::{InMemoryModule, InMemoryModuleOpener};
