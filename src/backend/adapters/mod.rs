//! Adapter implementations for backend ports.

pub mod memory;
pub mod native;
pub mod postgres;
