//! Interactive configuration flows behind `hdb config`

use super::environment::{DEFAULT_USERNAME, Environment};
use super::instance::{normalize_instance_list, normalize_instance_url, validate_environment_name};
use super::selection::SelectionStore;
use crate::error::{HdbError, HdbResult};
use crate::prompt::Prompter;
use serde_json::json;
use tracing::info;

/// Hint shown with every instance URL prompt
pub const INSTANCE_URL_HINT: &str = "Format: https://<instance_hostname>:9925, or just the hostname (e.g. my-instance.harperfabric.com)";

/// Outcome of [`add_environment`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedEnvironment {
    pub name: String,
    pub instances: Vec<String>,
    /// Set when the new environment was made the default
    pub default_instance: Option<String>,
}

/// Outcome of [`add_instance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedInstance {
    pub environment: String,
    pub instance: String,
    /// False when the instance was already part of the environment
    pub added: bool,
}

/// The persisted default after [`use_default`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTarget {
    pub environment: String,
    pub instance: String,
}

/// Ask for a new environment and store it.
///
/// Invalid names and instance URLs are reported and asked again. The entry
/// loop only ends on an empty answer once at least one instance was given.
pub fn add_environment(
    store: &SelectionStore,
    prompter: &dyn Prompter,
) -> HdbResult<AddedEnvironment> {
    let document = store.load()?;

    let name = loop {
        let answer = prompter.input("Environment name (e.g. DEV, STAGING, PROD)", None)?;
        match validate_environment_name(&answer) {
            Ok(name) if document.environments.contains_key(&name) => {
                prompter.report_invalid(&format!("Environment {name} already exists"));
            }
            Ok(name) => break name,
            Err(e) => prompter.report_invalid(&e.to_string()),
        }
    };

    let username = prompter.input("Username", Some(DEFAULT_USERNAME))?;
    let username = match username.trim() {
        "" => DEFAULT_USERNAME.to_string(),
        trimmed => trimmed.to_string(),
    };
    let password = prompter.password("Password")?;

    let mut environment = Environment::new(username, password, Vec::new());
    loop {
        let prompt = if environment.instances.is_empty() {
            format!("Instance URL ({INSTANCE_URL_HINT})")
        } else {
            "Another instance URL (leave empty to finish)".to_string()
        };
        let answer = prompter.input(&prompt, None)?;

        if answer.trim().is_empty() {
            if environment.instances.is_empty() {
                prompter.report_invalid("At least one instance URL is required");
                continue;
            }
            break;
        }

        match normalize_instance_list(&answer) {
            Ok(urls) => {
                for url in urls {
                    environment.add_instance(url);
                }
            }
            Err(e) => prompter.report_invalid(&e.to_string()),
        }
    }

    let instances = environment.instances.clone();
    store.merge(json!({ "environments": { name.as_str(): environment } }))?;
    info!("Added environment {} with {} instance(s)", name, instances.len());

    let has_default = document.default_env.is_some();
    let make_default = prompter.confirm(
        &format!("Set {name} as the default environment?"),
        !has_default,
    )?;

    let default_instance = if make_default {
        let instance = pick_instance(prompter, &instances, "Select default instance")?;
        store.merge(json!({ "defaultEnv": name, "defaultInstance": instance }))?;
        Some(instance)
    } else {
        None
    };

    Ok(AddedEnvironment {
        name,
        instances,
        default_instance,
    })
}

/// Add one instance to an existing environment, keeping the ones it has
pub fn add_instance(store: &SelectionStore, prompter: &dyn Prompter) -> HdbResult<AddedInstance> {
    let document = store.load()?;
    if document.is_empty() {
        return Err(HdbError::NoEnvironmentsConfigured);
    }

    let names = document.environment_names();
    let name = pick(prompter, &names, "Select environment")?;
    let mut environment = document.environment(&name)?.clone();

    let instance = loop {
        let answer = prompter.input(&format!("Instance URL ({INSTANCE_URL_HINT})"), None)?;
        match normalize_instance_url(&answer) {
            Ok(url) => break url,
            Err(e) => prompter.report_invalid(&e.to_string()),
        }
    };

    let added = environment.add_instance(instance.clone());
    if added {
        // Arrays replace on merge, so send the full union
        store.merge(json!({
            "environments": { name.as_str(): { "instances": environment.instances } }
        }))?;
        info!("Added instance {} to {}", instance, name);
    }

    Ok(AddedInstance {
        environment: name,
        instance,
        added,
    })
}

/// Persist the default environment and instance.
///
/// `environment` is uppercased and must exist. Without `instance`, a
/// single-instance environment uses its only instance and otherwise the
/// operator picks one.
pub fn use_default(
    store: &SelectionStore,
    prompter: &dyn Prompter,
    environment: Option<&str>,
    instance: Option<&str>,
) -> HdbResult<DefaultTarget> {
    let document = store.load()?;
    if document.is_empty() {
        return Err(HdbError::NoEnvironmentsConfigured);
    }

    let name = match environment {
        Some(name) => name.trim().to_ascii_uppercase(),
        None => pick(
            prompter,
            &document.environment_names(),
            "Select environment to use as default",
        )?,
    };
    let env = document.environment(&name)?;

    let instance = match instance {
        Some(raw) => normalize_instance_url(raw)?,
        None => pick_instance(prompter, &env.instances, "Select instance to use as default")?,
    };
    if !env.has_instance(&instance) {
        return Err(HdbError::instance_not_found(instance, name));
    }

    store.merge(json!({ "defaultEnv": name, "defaultInstance": instance }))?;
    info!("Default target set to {} ({})", name, instance);

    Ok(DefaultTarget {
        environment: name,
        instance,
    })
}

fn pick(prompter: &dyn Prompter, items: &[String], prompt: &str) -> HdbResult<String> {
    let index = prompter.select(prompt, items)?;
    items
        .get(index)
        .cloned()
        .ok_or_else(|| HdbError::other("Selection out of range"))
}

fn pick_instance(prompter: &dyn Prompter, instances: &[String], prompt: &str) -> HdbResult<String> {
    match instances {
        [] => Err(HdbError::validation("environment", "no instances configured")),
        [only] => Ok(only.clone()),
        many => pick(prompter, many, prompt),
    }
}
