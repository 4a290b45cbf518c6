//! hdb core library
//!
//! Everything the `hdb` binary needs below the argument parser: the two
//! on-disk configuration stores and the one-way migration between them,
//! environment/instance resolution, the interactive configuration flows,
//! and the plumbing that talks to an instance (HTTP operations API and the
//! local `harperdb` executable).

pub mod api;
pub mod config;
pub mod error;
pub mod exec;
pub mod prompt;

// Re-export commonly used types
pub use api::ApiClient;
pub use config::{
    CliOverrides, CredentialStore, Environment, EnvironmentResolver, Migrator, ProjectPaths,
    ResolvedConfig, RuntimeOverrides, SelectionDocument, SelectionStore, TargetSource,
};
pub use error::{HdbError, HdbResult, UnifiedError};
pub use exec::ExecutableRunner;
pub use prompt::Prompter;
