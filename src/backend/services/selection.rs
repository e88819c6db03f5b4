//! Picks the connector kind a backend descriptor asks for.

use super::connector::{Connector, ConnectorContext};
use super::dynamic::ModuleResolver;
use super::registry::VendorRegistry;
use super::vendored::RegistryResolver;
use crate::backend::{
    domain::{BackendDescriptor, BackendSelector},
    ports::{BackendConnector, ModuleOpener},
};
use std::sync::Arc;

/// Builds an unresolved connector for `descriptor`.
///
/// Module selectors get a dynamic loader connector that opens modules
/// through `opener`; vendored selectors get a registry connector that looks
/// the name up in `registry`. Nothing is opened or connected here.
#[must_use]
pub fn open_connector(
    descriptor: &BackendDescriptor,
    context: ConnectorContext,
    registry: &Arc<VendorRegistry>,
    opener: &Arc<dyn ModuleOpener>,
) -> Box<dyn BackendConnector> {
    tracing::debug!(backend = %descriptor.selector(), "selecting database backend");
    match descriptor.selector() {
        BackendSelector::Module(path) => Box::new(Connector::new(
            ModuleResolver::new(path.clone(), Arc::clone(opener)),
            descriptor,
            context,
        )),
        BackendSelector::Vendored(name) => Box::new(Connector::new(
            RegistryResolver::new(name.clone(), Arc::clone(registry)),
            descriptor,
            context,
        )),
    }
}
