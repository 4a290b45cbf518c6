//! The target chosen for one invocation

use super::environment::mask_secret;
use std::fmt;

/// Which rule of the resolver produced the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    /// `HDB_ENV` + `HDB_INSTANCE`
    RuntimeOverride,
    /// `--env` + `--instance`
    CliFlags,
    /// The persisted default, auto-confirmed
    PersistedDefault,
    /// Picked by the operator
    Interactive,
}

impl TargetSource {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RuntimeOverride => "environment variables",
            Self::CliFlags => "command-line flags",
            Self::PersistedDefault => "saved default",
            Self::Interactive => "interactive selection",
        }
    }
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Environment, instance and credentials for the current command.
///
/// Produced once by [`EnvironmentResolver`](super::EnvironmentResolver) and
/// handed by reference to whatever talks to the instance. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub environment: String,
    pub instance_url: String,
    pub username: String,
    password: String,
    pub source: TargetSource,
}

impl ResolvedConfig {
    pub fn new(
        environment: impl Into<String>,
        instance_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        source: TargetSource,
    ) -> Self {
        Self {
            environment: environment.into(),
            instance_url: instance_url.into(),
            username: username.into(),
            password: password.into(),
            source,
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn masked_password(&self) -> String {
        mask_secret(&self.password)
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("environment", &self.environment)
            .field("instance_url", &self.instance_url)
            .field("username", &self.username)
            .field("password", &self.masked_password())
            .field("source", &self.source)
            .finish()
    }
}
