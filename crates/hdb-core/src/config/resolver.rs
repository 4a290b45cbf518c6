//! Target resolution
//!
//! Decides which environment and instance a command runs against. Rules are
//! tried in strict priority order and the first one that applies wins:
//!
//! 1. runtime override (`HDB_ENV` + `HDB_INSTANCE`), trusted as-is
//! 2. CLI flags (`--env` + `--instance`), the environment must exist
//! 3. the persisted default, behind a short auto-confirm window
//! 4. interactive selection
//!
//! A stale default or a declined auto-confirm falls through to rule 4.

use super::environment::{DEFAULT_USERNAME, Environment};
use super::instance::normalize_instance_url;
use super::overrides::{CliOverrides, RuntimeOverrides};
use super::resolved::{ResolvedConfig, TargetSource};
use super::selection::{DefaultSelection, SelectionDocument, SelectionStore};
use crate::error::{HdbError, HdbResult};
use crate::prompt::Prompter;
use std::time::Duration;
use tracing::{debug, warn};

/// How long the persisted default waits for an override key
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(3);

/// Produces one [`ResolvedConfig`] per invocation
pub struct EnvironmentResolver<'a> {
    selection: &'a SelectionStore,
    prompter: &'a dyn Prompter,
    runtime: RuntimeOverrides,
    flags: CliOverrides,
    confirm_timeout: Duration,
}

impl<'a> EnvironmentResolver<'a> {
    pub fn new(selection: &'a SelectionStore, prompter: &'a dyn Prompter) -> Self {
        Self {
            selection,
            prompter,
            runtime: RuntimeOverrides::default(),
            flags: CliOverrides::default(),
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }

    pub fn with_runtime_overrides(mut self, runtime: RuntimeOverrides) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_cli_overrides(mut self, flags: CliOverrides) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Resolve the target for this invocation.
    ///
    /// An unreadable selection document is fatal here; lookups that miss
    /// fail with the matching named error.
    pub async fn resolve(&self) -> HdbResult<ResolvedConfig> {
        let document = self.selection.read(None)?;

        if let Some(resolved) = self.from_runtime(&document) {
            debug!("Target from runtime override: {:?}", resolved);
            return Ok(resolved);
        }

        if let Some(resolved) = self.from_flags(&document)? {
            debug!("Target from CLI flags: {:?}", resolved);
            return Ok(resolved);
        }

        if let Some(resolved) = self.from_default(&document).await? {
            debug!("Target from saved default: {:?}", resolved);
            return Ok(resolved);
        }

        self.from_selection(&document)
    }

    fn from_runtime(&self, document: &SelectionDocument) -> Option<ResolvedConfig> {
        let (name, instance) = self.runtime.target()?;

        let stored = document
            .environments
            .get(name)
            .or_else(|| document.environments.get(&name.to_ascii_uppercase()));

        let (username, password) = match stored {
            Some(env) => (env.username.clone(), env.password.clone()),
            None => {
                if self.runtime.username.is_none() {
                    warn!(
                        "Environment {} is not configured and no credentials were given, using {}",
                        name, DEFAULT_USERNAME
                    );
                }
                (
                    self.runtime
                        .username
                        .clone()
                        .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
                    self.runtime.password.clone().unwrap_or_default(),
                )
            }
        };

        Some(ResolvedConfig::new(
            name,
            instance.trim(),
            username,
            password,
            TargetSource::RuntimeOverride,
        ))
    }

    fn from_flags(&self, document: &SelectionDocument) -> HdbResult<Option<ResolvedConfig>> {
        if self.flags.is_partial() {
            warn!("--env and --instance must be given together; ignoring the one that was set");
        }
        let Some((env, instance)) = self.flags.target() else {
            return Ok(None);
        };

        let name = env.trim().to_ascii_uppercase();
        let environment = document.environment(&name)?;
        let instance_url = normalize_instance_url(instance)?;
        if !environment.has_instance(&instance_url) {
            debug!("{} is not a saved instance of {}", instance_url, name);
        }

        Ok(Some(resolved(
            &name,
            environment,
            instance_url,
            TargetSource::CliFlags,
        )))
    }

    async fn from_default(&self, document: &SelectionDocument) -> HdbResult<Option<ResolvedConfig>> {
        match document.default_selection() {
            DefaultSelection::Unset => Ok(None),
            DefaultSelection::Stale { name, instance } => {
                warn!("Invalid default environment or instance: {} - {}", name, instance);
                Ok(None)
            }
            DefaultSelection::Valid {
                name,
                environment,
                instance,
            } => {
                let prompt = format!("Using default environment: {name} ({instance})");
                if self.prompter.auto_confirm(&prompt, self.confirm_timeout).await? {
                    Ok(Some(resolved(
                        name,
                        environment,
                        instance.to_string(),
                        TargetSource::PersistedDefault,
                    )))
                } else {
                    debug!("Default target declined, falling back to selection");
                    Ok(None)
                }
            }
        }
    }

    fn from_selection(&self, document: &SelectionDocument) -> HdbResult<ResolvedConfig> {
        if document.is_empty() {
            return Err(HdbError::NoEnvironmentsConfigured);
        }

        let names = document.environment_names();
        let index = self.prompter.select("Select environment", &names)?;
        let name = names
            .get(index)
            .ok_or_else(|| HdbError::other("Selection out of range"))?;
        let environment = document.environment(name)?;

        let instance_url = match environment.instances.as_slice() {
            [] => {
                return Err(HdbError::validation(
                    "environment",
                    format!("{name} has no instances; add one with `hdb config add-instance`"),
                ));
            }
            [only] => only.clone(),
            many => {
                let index = self.prompter.select("Select instance", many)?;
                many.get(index)
                    .cloned()
                    .ok_or_else(|| HdbError::other("Selection out of range"))?
            }
        };

        Ok(resolved(
            name,
            environment,
            instance_url,
            TargetSource::Interactive,
        ))
    }
}

fn resolved(
    name: &str,
    environment: &Environment,
    instance_url: String,
    source: TargetSource,
) -> ResolvedConfig {
    ResolvedConfig::new(
        name,
        instance_url,
        environment.username.clone(),
        environment.password.clone(),
        source,
    )
}
