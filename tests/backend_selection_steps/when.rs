//! When steps for backend selection BDD scenarios.

use super::world::SelectionWorld;
use rstest_bdd_macros::when;

#[when("the server connects")]
fn server_connects(world: &mut SelectionWorld) -> Result<(), eyre::Report> {
    let result = world.connector()?.connect().map(|_| ());
    world.last_result = Some(result);
    Ok(())
}

#[when("the server builds the policy manager")]
fn server_builds_policy_manager(world: &mut SelectionWorld) -> Result<(), eyre::Report> {
    world
        .connector()?
        .new_policy_manager()
        .map_err(|err| eyre::eyre!("policy manager failed: {err}"))?;
    Ok(())
}

#[when("the server builds the group manager")]
fn server_builds_group_manager(world: &mut SelectionWorld) -> Result<(), eyre::Report> {
    world
        .connector()?
        .new_group_manager()
        .map_err(|err| eyre::eyre!("group manager failed: {err}"))?;
    Ok(())
}
