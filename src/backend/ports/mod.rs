//! Port contracts for backend resolution and dispatch.
//!
//! Ports define the seams between the connector services and everything
//! they talk to: the backend implementation itself, the manager objects it
//! produces, native modules on disk, and the server that consumes
//! connectors.

pub mod connector;
pub mod contract;
pub mod module;
pub mod registry;

pub use connector::{BackendConnector, ConnectorError, ConnectorResult};
pub use contract::{
    BackendContract, BackendError, BackendResult, ClientManager, ConnectionHandle, GroupManager,
    Hasher, JwkManager, OAuth2Storer, PolicyManager, StoreConnection,
};
pub use module::{
    ConnectEntry, ConnectFn, ENTRY_POINT_ABI_VERSION, ENTRY_POINT_MAGIC, EntryPoint,
    EntrySignature, ModuleError, ModuleOpener, ModuleSymbol, NativeModule, NewClientManagerEntry,
    NewClientManagerFn, NewGroupManagerEntry, NewGroupManagerFn, NewJwkManagerEntry,
    NewJwkManagerFn, NewOAuth2ManagerEntry, NewOAuth2ManagerFn, NewPolicyManagerEntry,
    NewPolicyManagerFn, SignatureMismatch,
};
pub use registry::{RegistryError, RegistryResult};
