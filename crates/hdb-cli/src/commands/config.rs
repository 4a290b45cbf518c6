//! `hdb config <action>`

use crate::args::{ConfigAction, GlobalArgs};
use crate::router::Session;
use colored::*;
use hdb_core::config::{SelectionDocument, flows};
use hdb_core::HdbResult;

pub async fn run(session: &Session, action: ConfigAction, global: &GlobalArgs) -> HdbResult<()> {
    let console = &session.console;
    let store = session.paths.selection_store();

    match action {
        ConfigAction::Init => super::init::run(session).await,

        ConfigAction::AddEnv => {
            let added = flows::add_environment(&store, &session.prompter)?;
            console.success(&format!(
                "Environment {} added with {} instance(s)",
                added.name,
                added.instances.len()
            ));
            if let Some(instance) = added.default_instance {
                console.info(&format!("Default target: {} ({})", added.name, instance));
            }
            Ok(())
        }

        ConfigAction::AddInstance => {
            let added = flows::add_instance(&store, &session.prompter)?;
            if added.added {
                console.success(&format!(
                    "Instance {} added to {}",
                    added.instance, added.environment
                ));
            } else {
                console.info(&format!(
                    "Instance {} is already part of {}",
                    added.instance, added.environment
                ));
            }
            Ok(())
        }

        ConfigAction::Select => {
            console.info("Environment/instance selection will occur when running commands");
            Ok(())
        }

        ConfigAction::List => {
            let document = store.read(Some(SelectionDocument::default()))?;
            if document.is_empty() {
                console.info("No environments found");
            } else {
                for line in listing(&document) {
                    println!("{line}");
                }
            }
            Ok(())
        }

        ConfigAction::Use { name } => {
            let environment = name.as_deref().or(global.env.as_deref());
            let chosen = flows::use_default(
                &store,
                &session.prompter,
                environment,
                global.instance.as_deref(),
            )?;
            console.success(&format!(
                "Default set to {} ({})",
                chosen.environment, chosen.instance
            ));
            Ok(())
        }
    }
}

/// Every environment with its username and instances; the saved default
/// is marked
fn listing(document: &SelectionDocument) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, env) in &document.environments {
        let is_default_env = document.default_env.as_deref() == Some(name.as_str());
        lines.push(if is_default_env {
            format!("{} {}", name.bold(), "(default)".green())
        } else {
            name.bold().to_string()
        });
        lines.push(format!("  Username: {}", env.username).dimmed().to_string());
        lines.push("  Instances:".dimmed().to_string());
        for url in &env.instances {
            let marker = if is_default_env && document.default_instance.as_deref() == Some(url.as_str()) {
                " *"
            } else {
                ""
            };
            lines.push(format!("  - {url}{marker}").dimmed().to_string());
        }
        lines.push(String::new());
    }
    lines
}
