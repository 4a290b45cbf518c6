//! Environment records stored in the selection document

use serde::{Deserialize, Serialize};
use std::fmt;

/// Username used when none is given
pub const DEFAULT_USERNAME: &str = "HDB_ADMIN";

/// A named credential set and the instances it can reach.
///
/// The name is the key in [`SelectionDocument::environments`]; every
/// committed environment carries at least one normalized instance URL.
///
/// [`SelectionDocument::environments`]: super::SelectionDocument::environments
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub instances: Vec<String>,
}

impl Environment {
    /// Create an environment from already normalized instance URLs
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        instances: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut env = Self {
            username: username.into(),
            password: password.into(),
            instances: Vec::new(),
        };
        for url in instances {
            env.add_instance(url);
        }
        env
    }

    /// Check whether `url` is one of this environment's instances
    pub fn has_instance(&self, url: &str) -> bool {
        self.instances.iter().any(|i| i == url)
    }

    /// Add an instance, returning false if it was already present
    pub fn add_instance(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.has_instance(&url) {
            return false;
        }
        self.instances.push(url);
        true
    }

    /// Password suitable for display
    pub fn masked_password(&self) -> String {
        mask_secret(&self.password)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("username", &self.username)
            .field("password", &self.masked_password())
            .field("instances", &self.instances)
            .finish()
    }
}

/// Mask a secret for logs and terminal output
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        "(empty)".to_string()
    } else {
        "*".repeat(secret.chars().count().min(8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dedupes_instances() {
        let env = Environment::new(
            "admin",
            "secret",
            vec!["https://a:9925".to_string(), "https://a:9925".to_string()],
        );
        assert_eq!(env.instances, vec!["https://a:9925"]);
    }

    #[test]
    fn test_add_instance() {
        let mut env = Environment::new("admin", "", vec!["https://a:9925".to_string()]);
        assert!(env.add_instance("https://b:9925"));
        assert!(!env.add_instance("https://a:9925"));
        assert!(env.has_instance("https://b:9925"));
        assert_eq!(env.instances.len(), 2);
    }

    #[test]
    fn test_debug_never_prints_password() {
        let env = Environment::new("admin", "hunter2-very-long", vec![]);
        let debug = format!("{env:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("********"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(empty)");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("0123456789abcdef"), "********");
    }

    #[test]
    fn test_missing_password_deserializes_as_empty() {
        let env: Environment =
            serde_json::from_str(r#"{"username":"u","instances":["https://a:9925"]}"#).unwrap();
        assert_eq!(env.password, "");
    }
}
