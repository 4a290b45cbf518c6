//! Project configuration
//!
//! Two files live in the project directory:
//!
//! - `.hdbconfig.json`, the selection document. This is the canonical
//!   store for environments and the persisted default target.
//! - `.env.harperdb`, the legacy credential file. It is only read as an
//!   import source by the [`Migrator`] and reset to a key-less template
//!   once its environments have been moved over.
//!
//! # Example
//!
//! ```no_run
//! use hdb_core::config::{EnvironmentResolver, Migrator, ProjectPaths};
//! # async fn run(prompter: &dyn hdb_core::Prompter) -> hdb_core::HdbResult<()> {
//! let paths = ProjectPaths::current()?;
//! let credentials = paths.credential_store();
//! let selection = paths.selection_store();
//!
//! Migrator::new(&credentials, &selection).run()?;
//! let target = EnvironmentResolver::new(&selection, prompter).resolve().await?;
//! println!("{} -> {}", target.environment, target.instance_url);
//! # Ok(())
//! # }
//! ```

mod credentials_file;
mod environment;
pub mod flows;
mod instance;
mod merge;
mod migrator;
mod overrides;
mod project;
mod resolved;
mod resolver;
mod selection;

pub use credentials_file::{CredentialStore, ENV_FILE, ENV_FILE_TEMPLATE, parse_credentials, update_text};
pub use environment::{DEFAULT_USERNAME, Environment, mask_secret};
pub use instance::{
    DEFAULT_PORT, DEFAULT_SCHEME, normalize_instance_list, normalize_instance_url,
    validate_environment_name,
};
pub use merge::{deep_merge, merged};
pub use migrator::{
    LEGACY_IMPLICIT_ENVIRONMENT, LegacyEnvironment, MigratedEnvironment, MigrationReport,
    Migrator, collect_legacy_environments,
};
pub use overrides::{
    CliOverrides, ENV_VAR_ENVIRONMENT, ENV_VAR_INSTANCE, ENV_VAR_PASSWORD, ENV_VAR_USERNAME,
    RuntimeOverrides,
};
pub use project::{GITIGNORE, GitignoreUpdate, InitReport, ProjectPaths, missing_ignore_entries};
pub use resolved::{ResolvedConfig, TargetSource};
pub use resolver::{DEFAULT_CONFIRM_TIMEOUT, EnvironmentResolver};
pub use selection::{CONFIG_FILE, DefaultSelection, SelectionDocument, SelectionStore};
