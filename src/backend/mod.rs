//! Storage backend resolution and dispatch.
//!
//! The server builds its client, group, key, OAuth2 and policy managers from
//! a backend chosen at deployment time. A backend is either a native module
//! loaded from disk or an implementation linked into the binary and
//! registered by name. Both kinds satisfy the same contract and sit behind
//! the same connector, so the rest of the server does not care which one it
//! got. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Resolution and lifecycle services in [`services`]

pub mod adapters;
pub mod domain;
mod export;
pub mod ports;
pub mod services;
