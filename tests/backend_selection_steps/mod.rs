//! Step definitions for backend selection scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
