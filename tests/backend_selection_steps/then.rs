//! Then steps for backend selection BDD scenarios.

use super::world::SelectionWorld;
use authstore::backend::ports::{ConnectorError, RegistryError};
use rstest_bdd_macros::then;

#[then("the backend was connected {count:usize} times")]
fn backend_connected_times(world: &SelectionWorld, count: usize) -> Result<(), eyre::Report> {
    let attempts = world.backend.connect_attempts();
    if attempts != count {
        return Err(eyre::eyre!("expected {count} connect calls, saw {attempts}"));
    }
    Ok(())
}

#[then(r#"the connector status is "{status}""#)]
fn connector_status(world: &mut SelectionWorld, status: String) -> Result<(), eyre::Report> {
    let actual = world.connector()?.status();
    if actual.as_str() != status {
        return Err(eyre::eyre!("expected status {status}, found {actual}"));
    }
    Ok(())
}

#[then("connecting fails because the backend is not registered")]
fn fails_not_registered(world: &SelectionWorld) -> Result<(), eyre::Report> {
    let err = world.last_error()?;
    if !matches!(err, ConnectorError::Registry(RegistryError::NotRegistered(_))) {
        return Err(eyre::eyre!("expected not-registered error, got {err:?}"));
    }
    Ok(())
}

#[then(r#"connecting fails mentioning "{text}""#)]
fn fails_mentioning(world: &SelectionWorld, text: String) -> Result<(), eyre::Report> {
    let err = world.last_error()?;
    if !err.to_string().contains(&text) {
        return Err(eyre::eyre!("expected error mentioning '{text}', got '{err}'"));
    }
    Ok(())
}

#[then("connecting fails because the store is unreachable")]
fn fails_unreachable(world: &SelectionWorld) -> Result<(), eyre::Report> {
    let err = world.last_error()?;
    if !matches!(err, ConnectorError::Unreachable { .. }) {
        return Err(eyre::eyre!("expected unreachable error, got {err:?}"));
    }
    Ok(())
}

#[then(r#"connecting fails because "{symbol}" is not exported"#)]
fn fails_symbol_missing(world: &SelectionWorld, symbol: String) -> Result<(), eyre::Report> {
    let err = world.last_error()?;
    match err {
        ConnectorError::SymbolNotFound { symbol: missing, .. } if *missing == symbol => Ok(()),
        other => Err(eyre::eyre!("expected missing `{symbol}`, got {other:?}")),
    }
}
