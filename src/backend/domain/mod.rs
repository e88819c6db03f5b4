//! Domain model for storage backend selection.
//!
//! The backend domain describes which backend a deployment selects, the
//! connection string and key material handed to it, and the lifecycle
//! status a connector moves through. All infrastructure concerns are kept
//! outside the domain boundary.

mod descriptor;
mod error;
mod key;
mod name;
mod status;

pub use descriptor::{BackendDescriptor, BackendSelector};
pub use error::BackendDomainError;
pub use key::{KeyMaterial, MIN_SECRET_LENGTH};
pub use name::BackendName;
pub use status::ConnectionStatus;
