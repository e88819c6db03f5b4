//! Vendored backends resolved through the registry.

use std::sync::Arc;

use super::helpers::{DATABASE_URL, context, vendored};
use authstore::backend::{
    adapters::memory::{
        InMemoryBackend, InMemoryModuleOpener, MEMORY_BACKEND_NAME, ManagerKind,
        register_memory_backend,
    },
    domain::ConnectionStatus,
    ports::{BackendConnector, ConnectorError, ModuleOpener, RegistryError},
    services::{RegistryConnector, RegistryResolver, VendorRegistry, open_connector},
};
use rstest::{fixture, rstest};

#[fixture]
fn registry() -> Arc<VendorRegistry> {
    Arc::new(VendorRegistry::new())
}

fn opener() -> Arc<dyn ModuleOpener> {
    Arc::new(InMemoryModuleOpener::new())
}

#[rstest]
fn memory_backend_serves_every_manager_over_one_connection(registry: Arc<VendorRegistry>) {
    let backend = InMemoryBackend::new();
    registry
        .register(MEMORY_BACKEND_NAME, Arc::new(backend.clone()), None)
        .expect("registration should succeed");
    let connector = open_connector(&vendored("mem"), context(), &registry, &opener());

    let clients = connector.new_client_manager().expect("client manager");
    connector
        .new_oauth2_manager(clients)
        .expect("oauth2 store");
    connector.new_policy_manager().expect("policy manager");

    assert_eq!(connector.status(), ConnectionStatus::Connected);
    assert_eq!(backend.connect_attempts(), 1);
    let calls = backend.factory_calls();
    assert_eq!(
        calls.iter().map(|call| call.kind).collect::<Vec<_>>(),
        vec![ManagerKind::Client, ManagerKind::OAuth2, ManagerKind::Policy]
    );
    assert!(calls.iter().all(|call| call.connection_url == DATABASE_URL));
}

#[rstest]
fn registration_helper_registers_under_mem(registry: Arc<VendorRegistry>) {
    let name = register_memory_backend(&registry).expect("registration should succeed");

    assert_eq!(name.as_str(), MEMORY_BACKEND_NAME);
    assert!(registry.contains(" mem ").expect("lock healthy"));
    assert!(!registry.contains("MEM").expect("lock healthy"));
    assert!(matches!(
        register_memory_backend(&registry),
        Err(RegistryError::Duplicate(_))
    ));
}

#[rstest]
fn registry_connector_waits_for_late_registration(registry: Arc<VendorRegistry>) {
    let connector = RegistryConnector::new(
        RegistryResolver::new(
            authstore::backend::domain::BackendName::new("mem").expect("valid name"),
            Arc::clone(&registry),
        ),
        &vendored("mem"),
        context(),
    );

    assert!(matches!(
        connector.connect(),
        Err(ConnectorError::Registry(RegistryError::NotRegistered(_)))
    ));

    register_memory_backend(&registry).expect("registration should succeed");
    connector.connect().expect("resolution is retried");

    assert_eq!(connector.status(), ConnectionStatus::Connected);
    assert_eq!(connector.resolver().name().as_str(), "mem");
}

#[rstest]
fn error_messages_name_the_backend(registry: Arc<VendorRegistry>) {
    let backend = InMemoryBackend::new();
    backend.fail_connect("server closed the connection unexpectedly");
    registry
        .register("mem", Arc::new(backend), None)
        .expect("registration should succeed");
    let connector = open_connector(&vendored("mem"), context(), &registry, &opener());

    let err = connector.connect().err().expect("connect should fail");

    assert_eq!(
        err.to_string(),
        "could not connect to database through vendor backend `mem`: \
         server closed the connection unexpectedly"
    );
}
