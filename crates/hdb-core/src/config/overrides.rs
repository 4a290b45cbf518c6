//! Explicit target hints: process environment variables and CLI flags

use super::environment::mask_secret;
use std::fmt;

/// Runtime override for the environment name
pub const ENV_VAR_ENVIRONMENT: &str = "HDB_ENV";
/// Runtime override for the instance URL
pub const ENV_VAR_INSTANCE: &str = "HDB_INSTANCE";
/// Username used with a runtime override and handed to the executable
pub const ENV_VAR_USERNAME: &str = "CLI_TARGET_USERNAME";
/// Password used with a runtime override and handed to the executable
pub const ENV_VAR_PASSWORD: &str = "CLI_TARGET_PASSWORD";

/// Target hints read from the process environment
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RuntimeOverrides {
    pub environment: Option<String>,
    pub instance: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RuntimeOverrides {
    /// Read the overrides from the current process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the overrides through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            environment: get(ENV_VAR_ENVIRONMENT),
            instance: get(ENV_VAR_INSTANCE),
            username: get(ENV_VAR_USERNAME),
            password: lookup(ENV_VAR_PASSWORD),
        }
    }

    pub fn with_target(mut self, environment: impl Into<String>, instance: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self.instance = Some(instance.into());
        self
    }

    /// Environment and instance, only when both are given
    pub fn target(&self) -> Option<(&str, &str)> {
        match (self.environment.as_deref(), self.instance.as_deref()) {
            (Some(env), Some(instance)) if !env.is_empty() && !instance.is_empty() => {
                Some((env, instance))
            }
            _ => None,
        }
    }
}

impl fmt::Debug for RuntimeOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeOverrides")
            .field("environment", &self.environment)
            .field("instance", &self.instance)
            .field("username", &self.username)
            .field("password", &self.password.as_deref().map(mask_secret))
            .finish()
    }
}

/// `--env` / `--instance` as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub env: Option<String>,
    pub instance: Option<String>,
}

impl CliOverrides {
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Environment and instance, only when both flags were given
    pub fn target(&self) -> Option<(&str, &str)> {
        match (self.env.as_deref(), self.instance.as_deref()) {
            (Some(env), Some(instance)) => Some((env, instance)),
            _ => None,
        }
    }

    /// Exactly one of the two flags was given
    pub fn is_partial(&self) -> bool {
        self.env.is_some() != self.instance.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_runtime_target_needs_both_values() {
        let vars: HashMap<&str, &str> = [(ENV_VAR_ENVIRONMENT, "PROD")].into_iter().collect();
        let overrides = RuntimeOverrides::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(overrides.environment.as_deref(), Some("PROD"));
        assert!(overrides.target().is_none());

        let overrides = overrides.with_target("PROD", "https://p:9925");
        assert_eq!(overrides.target(), Some(("PROD", "https://p:9925")));
    }

    #[test]
    fn test_blank_runtime_values_are_unset() {
        let overrides = RuntimeOverrides::from_lookup(|_| Some("  ".to_string()));
        assert!(overrides.environment.is_none());
        assert!(overrides.instance.is_none());
        assert!(overrides.target().is_none());
    }

    #[test]
    fn test_runtime_debug_masks_password() {
        let overrides = RuntimeOverrides {
            password: Some("topsecret".into()),
            ..Default::default()
        };
        assert!(!format!("{overrides:?}").contains("topsecret"));
    }

    #[test]
    fn test_cli_target() {
        let flags = CliOverrides::default().with_env("dev");
        assert!(flags.target().is_none());
        assert!(flags.is_partial());

        let flags = flags.with_instance("a");
        assert_eq!(flags.target(), Some(("dev", "a")));
        assert!(!flags.is_partial());
        assert!(!CliOverrides::default().is_partial());
    }
}
