//! Selection document (`.hdbconfig.json`)

use super::environment::Environment;
use super::merge::deep_merge;
use crate::error::{HdbError, HdbResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the selection document
pub const CONFIG_FILE: &str = ".hdbconfig.json";

/// Persisted environments plus the default target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDocument {
    #[serde(default)]
    pub environments: BTreeMap<String, Environment>,

    #[serde(default)]
    pub default_env: Option<String>,

    #[serde(default)]
    pub default_instance: Option<String>,
}

/// The persisted default, checked against the document it lives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultSelection<'a> {
    /// `defaultEnv` or `defaultInstance` is missing
    Unset,
    /// Both fields reference an existing environment and one of its instances
    Valid {
        name: &'a str,
        environment: &'a Environment,
        instance: &'a str,
    },
    /// Both fields are set but no longer resolve
    Stale { name: &'a str, instance: &'a str },
}

impl SelectionDocument {
    /// Look up an environment by its stored name
    pub fn environment(&self, name: &str) -> HdbResult<&Environment> {
        self.environments
            .get(name)
            .ok_or_else(|| HdbError::environment_not_found(name))
    }

    pub fn environment_names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    /// Classify the persisted default
    pub fn default_selection(&self) -> DefaultSelection<'_> {
        let (Some(name), Some(instance)) = (
            self.default_env.as_deref(),
            self.default_instance.as_deref(),
        ) else {
            return DefaultSelection::Unset;
        };

        match self.environments.get(name) {
            Some(environment) if environment.has_instance(instance) => DefaultSelection::Valid {
                name,
                environment,
                instance,
            },
            _ => DefaultSelection::Stale { name, instance },
        }
    }

    /// First free name among `BASE`, `BASE_COPY`, `BASE_COPY_2`, ...
    pub fn unique_name(&self, base: &str) -> String {
        if !self.environments.contains_key(base) {
            return base.to_string();
        }
        let copy = format!("{base}_COPY");
        if !self.environments.contains_key(&copy) {
            return copy;
        }
        (2..)
            .map(|n| format!("{base}_COPY_{n}"))
            .find(|candidate| !self.environments.contains_key(candidate))
            .unwrap_or(copy)
    }
}

/// Durable access to the selection document
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the document.
    ///
    /// When the file is missing or does not parse, `default` is returned if
    /// given; otherwise the failure is reported as
    /// [`HdbError::ConfigCorrupt`].
    pub fn read(&self, default: Option<SelectionDocument>) -> HdbResult<SelectionDocument> {
        let parsed = fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<SelectionDocument>(&content).map_err(|e| e.to_string())
            });

        match (parsed, default) {
            (Ok(document), _) => Ok(document),
            (Err(message), Some(default)) => {
                debug!("Using default selection document ({}): {}", self.path.display(), message);
                Ok(default)
            }
            (Err(message), None) => Err(HdbError::config_corrupt(&self.path, message)),
        }
    }

    /// Load the document for an update: a missing file is an empty
    /// document, an unreadable one is [`HdbError::ConfigCorrupt`] so it is
    /// never overwritten.
    pub fn load(&self) -> HdbResult<SelectionDocument> {
        if self.exists() {
            self.read(None)
        } else {
            Ok(SelectionDocument::default())
        }
    }

    /// Write the whole document: sorted keys, 2-space indentation, replaced
    /// through a temporary sibling file
    pub fn write(&self, document: &SelectionDocument) -> HdbResult<()> {
        // Going through Value sorts every object's keys
        let value = serde_json::to_value(document)?;
        let mut content = serde_json::to_string_pretty(&value)?;
        content.push('\n');

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| HdbError::io_at(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| HdbError::io_at(&self.path, e))?;

        debug!("Saved {}", self.path.display());
        Ok(())
    }

    /// Deep-merge `updates` into the stored document and write the result.
    ///
    /// Arrays in `updates` replace the stored ones; union them first when
    /// that is what is wanted.
    pub fn merge(&self, updates: Value) -> HdbResult<SelectionDocument> {
        let current = self.load()?;
        let mut value = serde_json::to_value(&current)?;
        deep_merge(&mut value, updates);

        let document: SelectionDocument = serde_json::from_value(value)
            .map_err(|e| HdbError::validation("configuration update", e.to_string()))?;
        self.write(&document)?;
        Ok(document)
    }
}
