//! Application services for backend resolution and dispatch.

mod connector;
mod dynamic;
mod registry;
mod selection;
mod vendored;

pub use connector::{BackendResolver, Connector, ConnectorContext};
pub use dynamic::{DynamicLoaderConnector, ModuleResolver};
pub use registry::{RegisteredBackend, VendorRegistry};
pub use selection::open_connector;
pub use vendored::{RegistryConnector, RegistryResolver};
