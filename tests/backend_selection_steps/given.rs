//! Given steps for backend selection BDD scenarios.

use std::sync::Arc;

use super::world::{SelectionWorld, complete_module};
use authstore::backend::domain::{BackendName, BackendSelector};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a vendor backend named "{name}" is registered"#)]
fn vendor_backend_registered(world: &mut SelectionWorld, name: String) -> Result<(), eyre::Report> {
    world
        .registry
        .register(&name, Arc::new(world.backend.clone()), None)
        .wrap_err("register vendor backend for scenario")?;
    Ok(())
}

#[given(r#"a vendor backend named "{name}" is registered with the failure "{failure}""#)]
fn vendor_backend_registered_with_failure(
    world: &mut SelectionWorld,
    name: String,
    failure: String,
) -> Result<(), eyre::Report> {
    world
        .registry
        .register(&name, Arc::new(world.backend.clone()), Some(failure.into()))
        .wrap_err("register failing vendor backend for scenario")?;
    Ok(())
}

#[given("the store does not answer pings")]
fn store_unreachable(world: &mut SelectionWorld) {
    world.backend.set_unreachable(true);
}

#[given(r#"the deployment selects vendor backend "{name}""#)]
fn selects_vendor_backend(world: &mut SelectionWorld, name: String) -> Result<(), eyre::Report> {
    world.selector = Some(BackendSelector::Vendored(BackendName::new(name)?));
    Ok(())
}

#[given(r#"a backend module at "{path}" exporting every entry point"#)]
fn complete_module_at(world: &mut SelectionWorld, path: String) {
    world.modules.push(complete_module(&path));
}

#[given(r#"a backend module at "{path}" without "{symbol}""#)]
fn partial_module_at(world: &mut SelectionWorld, path: String, symbol: String) {
    world.modules.push(complete_module(&path).without(&symbol));
}

#[given(r#"the deployment selects the module at "{path}""#)]
fn selects_module(world: &mut SelectionWorld, path: String) {
    world.selector = Some(BackendSelector::Module(path.into()));
}
