//! Core error types and traits for hdb

use thiserror::Error;

/// Result type alias for hdb operations
pub type HdbResult<T> = Result<T, HdbError>;

/// Common interface over hdb errors.
///
/// - error_code(): stable identifier, used in debug logs
/// - message(): human-readable message without the category prefix
/// - exit_code(): process exit status for the top-level handler
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> String;

    /// Exit status the process should terminate with
    fn exit_code(&self) -> u8;

    /// Whether this is the operator backing out rather than a failure
    fn is_cancellation(&self) -> bool {
        false
    }
}

/// Main error type for hdb
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HdbError {
    /// The selection document exists but cannot be parsed
    #[error("Error parsing {path}: {message}")]
    ConfigCorrupt { path: String, message: String },

    /// The legacy credential file is missing or malformed
    #[error("Error reading {path}: {message}")]
    CredentialParse { path: String, message: String },

    /// A named environment is not configured
    #[error("Environment \"{name}\" not found")]
    EnvironmentNotFound { name: String },

    /// An instance URL is not part of the environment it was looked up in
    #[error("Instance \"{instance}\" not found in environment \"{environment}\"")]
    InstanceNotFound {
        instance: String,
        environment: String,
    },

    /// The selection document holds no environments at all
    #[error("No environments configured. Run `hdb config add-env` to add one first.")]
    NoEnvironmentsConfigured,

    /// Malformed operator input (environment name, instance URL, parameters)
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The project directory has not been set up with `hdb init`
    #[error("Missing configuration file(s). Run `hdb init` first.")]
    NotInitialized,

    /// Filesystem errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// Transport-level HTTP failures
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
    },

    /// The instance answered an operation with a non-success status
    #[error("Operation failed with status {status}: {body}")]
    Api { status: u16, body: String },

    /// The external executable could not be started or exited non-zero
    #[error("{command}: {message}")]
    Process {
        command: String,
        message: String,
        code: Option<i32>,
    },

    /// The operator declined a confirmation or backed out of a prompt
    #[error("Cancelled by user")]
    Cancelled,

    /// Ctrl-C was pressed while the terminal was in raw mode
    #[error("Interrupted")]
    Interrupted,

    /// Generic error
    #[error("{message}")]
    Other { message: String },
}
