//! `hdb components list|drop|reset`

use crate::args::ComponentsAction;
use crate::console::CliConsole;
use crate::router::Session;
use hdb_core::api::Operations;
use hdb_core::api::components::{
    RETAIN_COMPONENTS, drop_component, get_components, removable_components,
};
use hdb_core::{ApiClient, HdbResult, Prompter, ResolvedConfig};

/// Returns true when at least one component was dropped
pub async fn run(
    session: &Session,
    target: &ResolvedConfig,
    action: ComponentsAction,
) -> HdbResult<bool> {
    let client = ApiClient::new(target)?;
    let console = &session.console;

    match action {
        ComponentsAction::List => {
            list(&client, console).await?;
            Ok(false)
        }
        ComponentsAction::Drop => drop_selected(&client, &session.prompter, console).await,
        ComponentsAction::Reset => reset(&client, &session.prompter, console).await,
    }
}

async fn list(api: &dyn Operations, console: &CliConsole) -> HdbResult<()> {
    let entries = get_components(api).await?;
    if entries.is_empty() {
        console.info("No components found.");
        return Ok(());
    }
    console.info("Available components:");
    for entry in entries {
        println!("  - {}", entry.name);
    }
    Ok(())
}

async fn drop_selected(
    api: &dyn Operations,
    prompter: &dyn Prompter,
    console: &CliConsole,
) -> HdbResult<bool> {
    let candidates = removable_components(&get_components(api).await?);
    if candidates.is_empty() {
        console.info("No components available for deletion.");
        return Ok(false);
    }

    let chosen: Vec<String> = prompter
        .multi_select("Select components to drop", &candidates)?
        .into_iter()
        .filter_map(|i| candidates.get(i).cloned())
        .collect();
    if chosen.is_empty() {
        console.info("No components selected.");
        return Ok(false);
    }

    let question = format!("Are you sure you want to delete [{}]?", chosen.join(", "));
    if !prompter.confirm(&question, false)? {
        console.info("Nothing dropped.");
        return Ok(false);
    }

    drop_all(api, console, &chosen).await?;
    Ok(true)
}

async fn reset(
    api: &dyn Operations,
    prompter: &dyn Prompter,
    console: &CliConsole,
) -> HdbResult<bool> {
    let candidates = removable_components(&get_components(api).await?);
    if candidates.is_empty() {
        console.info("No components available for deletion.");
        return Ok(false);
    }

    let question = format!(
        "Are you sure you want to delete all components except [{}]?",
        RETAIN_COMPONENTS.join(", ")
    );
    if !prompter.confirm(&question, false)? {
        console.info("Nothing dropped.");
        return Ok(false);
    }

    drop_all(api, console, &candidates).await?;
    Ok(true)
}

async fn drop_all(api: &dyn Operations, console: &CliConsole, names: &[String]) -> HdbResult<()> {
    for name in names {
        let result = drop_component(api, name).await?;
        match result.get("message").and_then(|m| m.as_str()) {
            Some(message) => console.success(message),
            None => console.success(&format!("Dropped {name}")),
        }
    }
    Ok(())
}
