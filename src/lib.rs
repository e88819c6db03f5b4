//! Authstore: storage backend resolution for an identity server.
//!
//! This crate lets an identity and authorization server obtain its
//! storage-backed subsystems from a backend selected at deployment time
//! rather than compiled permanently into the server.
//!
//! # Architecture
//!
//! Authstore follows hexagonal architecture principles:
//!
//! - **Domain**: Pure selection and lifecycle types with no infrastructure dependencies
//! - **Ports**: The backend contract, the native module ABI, and the connector interface
//! - **Adapters**: Native module loading, in-memory stand-ins, and `PostgreSQL` connections
//!
//! # Modules
//!
//! - [`backend`]: Backend contract, vendor registry and connectors
//! - [`config`]: Backend selection from configuration files and the environment

pub mod backend;
pub mod config;

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
