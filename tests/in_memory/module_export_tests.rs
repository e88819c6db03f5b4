//! Entry points produced by `export_backend_module!`.

use std::sync::Arc;

use super::helpers::{DATABASE_URL, context, module};
use authstore::backend::{
    adapters::{
        memory::{InMemoryModule, InMemoryModuleOpener},
        native::LibloadingModuleOpener,
    },
    domain::ConnectionStatus,
    ports::{
        BackendConnector, ConnectEntry, ConnectorError, ENTRY_POINT_ABI_VERSION, EntrySignature,
        ModuleError, ModuleOpener, NewClientManagerEntry, NewGroupManagerEntry,
        NewJwkManagerEntry, NewOAuth2ManagerEntry, NewPolicyManagerEntry,
    },
    services::{VendorRegistry, open_connector},
};
use rstest::rstest;

const MODULE_PATH: &str = "/opt/hydra/libexported.so";

mod exported {
    authstore::export_backend_module!(
        authstore::backend::adapters::memory::InMemoryBackend::new()
    );
}

fn exported_module() -> InMemoryModule {
    InMemoryModule::new(MODULE_PATH)
        .with_entry(ConnectEntry::NAME, exported::Connect)
        .with_entry(NewClientManagerEntry::NAME, exported::NewClientManager)
        .with_entry(NewGroupManagerEntry::NAME, exported::NewGroupManager)
        .with_entry(NewJwkManagerEntry::NAME, exported::NewJWKManager)
        .with_entry(NewOAuth2ManagerEntry::NAME, exported::NewOAuth2Manager)
        .with_entry(NewPolicyManagerEntry::NAME, exported::NewPolicyManager)
}

#[rstest]
fn exported_entry_points_carry_their_signatures() {
    assert_eq!(exported::Connect.signature(), ConnectEntry::SIGNATURE);
    assert_eq!(exported::NewJWKManager.signature(), NewJwkManagerEntry::SIGNATURE);
    assert_eq!(exported::NewPolicyManager.abi_version(), ENTRY_POINT_ABI_VERSION);
    assert!(exported::NewGroupManager.verify::<NewGroupManagerEntry>().is_ok());
    assert!(exported::NewGroupManager.verify::<NewPolicyManagerEntry>().is_err());
}

#[rstest]
fn exported_module_drives_a_dynamic_connector() {
    let opener = Arc::new(InMemoryModuleOpener::new().with_module(exported_module()));
    let shared: Arc<dyn ModuleOpener> = opener.clone();
    let registry = Arc::new(VendorRegistry::new());
    let connector = open_connector(&module(MODULE_PATH), context(), &registry, &shared);

    let connection = connector.connect().expect("exported Connect should succeed");
    connection.ping().expect("in-memory store answers");
    let clients = connector.new_client_manager().expect("client manager");
    connector.new_oauth2_manager(clients).expect("oauth2 store");
    connector.new_group_manager().expect("group manager");
    connector.new_jwk_manager().expect("key manager");
    connector.new_policy_manager().expect("policy manager");

    assert_eq!(connector.status(), ConnectionStatus::Connected);
    assert_eq!(opener.open_count(), 1);
    assert!(format!("{connection:?}").contains(DATABASE_URL));
}

#[rstest]
fn module_without_an_export_is_rejected_before_connecting() {
    let opener: Arc<dyn ModuleOpener> = Arc::new(
        InMemoryModuleOpener::new().with_module(exported_module().without("NewOAuth2Manager")),
    );
    let registry = Arc::new(VendorRegistry::new());
    let connector = open_connector(&module(MODULE_PATH), context(), &registry, &opener);

    assert!(matches!(
        connector.new_policy_manager(),
        Err(ConnectorError::SymbolNotFound {
            symbol: "NewOAuth2Manager",
            ..
        })
    ));
    assert_eq!(connector.status(), ConnectionStatus::Unresolved);
}

#[rstest]
fn native_opener_reports_missing_module_files() {
    let opener: Arc<dyn ModuleOpener> = Arc::new(LibloadingModuleOpener::new());
    let registry = Arc::new(VendorRegistry::new());
    let connector = open_connector(
        &module("/definitely/not/here/libbackend.so"),
        context(),
        &registry,
        &opener,
    );

    let err = connector.connect().err().expect("load should fail");

    assert!(matches!(
        err,
        ConnectorError::Load {
            source: ModuleError::NotFound(_),
            ..
        }
    ));
}
