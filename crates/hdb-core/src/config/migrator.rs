//! One-way import of legacy credential entries into the selection document

use super::credentials_file::{CredentialStore, ENV_FILE_TEMPLATE, update_text};
use super::environment::{DEFAULT_USERNAME, Environment};
use super::instance::{normalize_instance_url, validate_environment_name};
use super::selection::SelectionStore;
use crate::error::HdbResult;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Name given to the environment described by the unnamespaced keys
pub const LEGACY_IMPLICIT_ENVIRONMENT: &str = "DEFAULT";

const ENV_PREFIX: &str = "ENV_";
const USERNAME_SUFFIX: &str = "_USERNAME";
const PASSWORD_SUFFIX: &str = "_PASSWORD";
const INSTANCES_SUFFIX: &str = "_INSTANCES";

const FLAT_TARGET: &str = "HARPERDB_TARGET";
const FLAT_USERNAME: &str = "CLI_TARGET_USERNAME";
const FLAT_PASSWORD: &str = "CLI_TARGET_PASSWORD";

/// Raw legacy fields for one environment, as found in the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyEnvironment {
    pub username: Option<String>,
    pub password: Option<String>,
    pub instances: Option<String>,
}

impl LegacyEnvironment {
    /// Build the stored record: username falls back to the admin name,
    /// password to empty, and instances are normalized. Invalid instances
    /// are dropped with a warning; `None` when none remain.
    fn to_environment(&self, name: &str) -> Option<Environment> {
        let mut instances = Vec::new();
        for raw in self
            .instances
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            match normalize_instance_url(raw) {
                Ok(url) => instances.push(url),
                Err(e) => warn!("Skipping instance of legacy environment {}: {}", name, e),
            }
        }

        if instances.is_empty() {
            warn!("Legacy environment {} has no usable instances, not migrated", name);
            return None;
        }

        let username = self
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        Some(Environment::new(
            username,
            self.password.clone().unwrap_or_default(),
            instances,
        ))
    }
}

/// Group legacy keys by environment name.
///
/// `ENV_<NAME>_{USERNAME,PASSWORD,INSTANCES}` entries are grouped by
/// `<NAME>`. The unnamespaced `HARPERDB_TARGET` / `CLI_TARGET_*` keys form
/// the implicit [`LEGACY_IMPLICIT_ENVIRONMENT`] unless the target still
/// holds a `<placeholder>`.
pub fn collect_legacy_environments(
    entries: &BTreeMap<String, String>,
) -> BTreeMap<String, LegacyEnvironment> {
    let mut groups: BTreeMap<String, LegacyEnvironment> = BTreeMap::new();

    for (key, value) in entries {
        let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let (name, field) = if let Some(name) = rest.strip_suffix(USERNAME_SUFFIX) {
            (name, USERNAME_SUFFIX)
        } else if let Some(name) = rest.strip_suffix(PASSWORD_SUFFIX) {
            (name, PASSWORD_SUFFIX)
        } else if let Some(name) = rest.strip_suffix(INSTANCES_SUFFIX) {
            (name, INSTANCES_SUFFIX)
        } else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let group = groups.entry(name.to_string()).or_default();
        let slot = match field {
            USERNAME_SUFFIX => &mut group.username,
            PASSWORD_SUFFIX => &mut group.password,
            _ => &mut group.instances,
        };
        *slot = Some(value.clone());
    }

    if let Some(target) = entries.get(FLAT_TARGET) {
        let target = target.trim();
        if !target.is_empty() && !target.contains('<') {
            let password = entries
                .get(FLAT_PASSWORD)
                .filter(|p| p.as_str() != "<password>")
                .cloned();
            groups
                .entry(LEGACY_IMPLICIT_ENVIRONMENT.to_string())
                .or_insert(LegacyEnvironment {
                    username: entries.get(FLAT_USERNAME).cloned(),
                    password,
                    instances: Some(target.to_string()),
                });
        }
    }

    groups
}

/// Keys in `entries` that belong to the legacy group `name`
fn group_entries(entries: &BTreeMap<String, String>, name: &str) -> BTreeMap<String, String> {
    let mut keys: Vec<String> = [USERNAME_SUFFIX, PASSWORD_SUFFIX, INSTANCES_SUFFIX]
        .iter()
        .map(|suffix| format!("{ENV_PREFIX}{name}{suffix}"))
        .collect();
    if name == LEGACY_IMPLICIT_ENVIRONMENT {
        keys.extend([FLAT_TARGET, FLAT_USERNAME, FLAT_PASSWORD].map(String::from));
    }
    keys.into_iter()
        .filter_map(|key| entries.get(&key).map(|value| (key, value.clone())))
        .collect()
}

/// One environment moved by a migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedEnvironment {
    /// Name in the legacy file
    pub source: String,
    /// Name it was stored under
    pub target: String,
}

impl MigratedEnvironment {
    /// Whether a name clash forced a suffixed name
    pub fn renamed(&self) -> bool {
        self.source != self.target
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: Vec<MigratedEnvironment>,
    /// Legacy groups that could not be imported and were left in the
    /// credential file
    pub skipped: Vec<String>,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.migrated.is_empty()
    }
}

/// Moves legacy environments from the credential file into the selection
/// document. Safe to run before every command.
pub struct Migrator<'a> {
    credentials: &'a CredentialStore,
    selection: &'a SelectionStore,
}

impl<'a> Migrator<'a> {
    pub fn new(credentials: &'a CredentialStore, selection: &'a SelectionStore) -> Self {
        Self {
            credentials,
            selection,
        }
    }

    /// Run the migration.
    ///
    /// Existing environments are never overwritten: a clash stores the
    /// legacy record as `<NAME>_COPY`. An unreadable selection document is
    /// an error and is left untouched. Once at least one environment was
    /// written, the credential file is reset to its template, keeping the
    /// entries of any group that could not be imported.
    pub fn run(&self) -> HdbResult<MigrationReport> {
        if !self.credentials.exists() {
            debug!("No credential file at {}", self.credentials.path().display());
            return Ok(MigrationReport::default());
        }

        let entries = self.credentials.read()?;
        let legacy = collect_legacy_environments(&entries);
        if legacy.is_empty() {
            return Ok(MigrationReport::default());
        }

        let mut document = self.selection.load()?;
        let mut report = MigrationReport::default();

        for (raw_name, fields) in &legacy {
            let name = match validate_environment_name(raw_name) {
                Ok(name) => name,
                Err(e) => {
                    warn!("Skipping legacy environment {}: {}", raw_name, e);
                    report.skipped.push(raw_name.clone());
                    continue;
                }
            };
            let Some(environment) = fields.to_environment(&name) else {
                report.skipped.push(raw_name.clone());
                continue;
            };

            let target = document.unique_name(&name);
            if target != name {
                warn!("Environment {} already exists, migrating as {}", name, target);
            }
            document.environments.insert(target.clone(), environment);
            report.migrated.push(MigratedEnvironment {
                source: name,
                target,
            });
        }

        if report.is_empty() {
            return Ok(report);
        }

        self.selection.write(&document)?;
        if report.skipped.is_empty() {
            self.credentials.reset_to_template()?;
        } else {
            let kept: BTreeMap<String, String> = report
                .skipped
                .iter()
                .flat_map(|name| group_entries(&entries, name))
                .collect();
            self.credentials
                .write_text(&update_text(ENV_FILE_TEMPLATE, &kept))?;
            warn!(
                "Left {} legacy environment(s) in {}: {}",
                report.skipped.len(),
                self.credentials.path().display(),
                report.skipped.join(", ")
            );
        }
        info!(
            "Migrated {} legacy environment(s) into {}",
            report.migrated.len(),
            self.selection.path().display()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_groups_namespaced_keys() {
        let groups = collect_legacy_environments(&entries(&[
            ("ENV_DEV_USERNAME", "foo"),
            ("ENV_DEV_PASSWORD", "bar"),
            ("ENV_DEV_INSTANCES", "a,b"),
            ("ENV_STAGING_EU_INSTANCES", "c"),
            ("UNRELATED", "x"),
            ("ENV_DEV_OTHER", "y"),
        ]));

        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups["DEV"],
            LegacyEnvironment {
                username: Some("foo".into()),
                password: Some("bar".into()),
                instances: Some("a,b".into()),
            }
        );
        assert_eq!(groups["STAGING_EU"].instances.as_deref(), Some("c"));
        assert_eq!(groups["STAGING_EU"].username, None);
    }

    #[test]
    fn test_flat_keys_form_implicit_environment() {
        let groups = collect_legacy_environments(&entries(&[
            ("HARPERDB_TARGET", "https://node:9925"),
            ("CLI_TARGET_USERNAME", "admin"),
            ("CLI_TARGET_PASSWORD", "<password>"),
        ]));
        let implicit = &groups[LEGACY_IMPLICIT_ENVIRONMENT];
        assert_eq!(implicit.username.as_deref(), Some("admin"));
        assert_eq!(implicit.password, None);
        assert_eq!(implicit.instances.as_deref(), Some("https://node:9925"));
    }

    #[test]
    fn test_placeholder_target_is_ignored() {
        let groups = collect_legacy_environments(&entries(&[(
            "HARPERDB_TARGET",
            "https://<instance>:9925",
        )]));
        assert!(groups.is_empty());
    }

    #[test]
    fn test_environment_defaults() {
        let legacy = LegacyEnvironment {
            instances: Some(" a , bad host ,b".into()),
            ..Default::default()
        };
        let env = legacy.to_environment("X").unwrap();
        assert_eq!(env.username, DEFAULT_USERNAME);
        assert_eq!(env.password, "");
        assert_eq!(env.instances, vec!["https://a:9925", "https://b:9925"]);
    }

    #[test]
    fn test_environment_without_instances_is_skipped() {
        let legacy = LegacyEnvironment {
            username: Some("u".into()),
            ..Default::default()
        };
        assert!(legacy.to_environment("X").is_none());
    }

    #[test]
    fn test_group_entries() {
        let all = entries(&[
            ("ENV_QA_USERNAME", "qa"),
            ("ENV_QA_INSTANCES", "bad host"),
            ("ENV_DEV_INSTANCES", "a"),
            ("HARPERDB_TARGET", "node"),
        ]);

        let qa = group_entries(&all, "QA");
        assert_eq!(qa, entries(&[("ENV_QA_USERNAME", "qa"), ("ENV_QA_INSTANCES", "bad host")]));

        let implicit = group_entries(&all, LEGACY_IMPLICIT_ENVIRONMENT);
        assert_eq!(implicit, entries(&[("HARPERDB_TARGET", "node")]));
    }
}
