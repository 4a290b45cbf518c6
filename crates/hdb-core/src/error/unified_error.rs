//! UnifiedError trait implementation for HdbError

use super::types::{HdbError, UnifiedError};

/// Exit status for any failed invocation
pub const EXIT_FAILURE: u8 = 1;
/// Exit status when the operator declines to continue
pub const EXIT_CANCELLED: u8 = 2;
/// Exit status after Ctrl-C / SIGINT
pub const EXIT_INTERRUPTED: u8 = 130;

impl UnifiedError for HdbError {
    fn error_code(&self) -> &str {
        match self {
            Self::ConfigCorrupt { .. } => "HDB_CONFIG_CORRUPT",
            Self::CredentialParse { .. } => "HDB_CREDENTIAL_PARSE",
            Self::EnvironmentNotFound { .. } => "HDB_ENVIRONMENT_NOT_FOUND",
            Self::InstanceNotFound { .. } => "HDB_INSTANCE_NOT_FOUND",
            Self::NoEnvironmentsConfigured => "HDB_NO_ENVIRONMENTS",
            Self::Validation { .. } => "HDB_VALIDATION",
            Self::NotInitialized => "HDB_NOT_INITIALIZED",
            Self::Io { .. } => "HDB_IO",
            Self::Json { .. } => "HDB_JSON",
            Self::Http { .. } => "HDB_HTTP",
            Self::Api { .. } => "HDB_API",
            Self::Process { .. } => "HDB_PROCESS",
            Self::Cancelled => "HDB_CANCELLED",
            Self::Interrupted => "HDB_INTERRUPTED",
            Self::Other { .. } => "HDB_OTHER",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Io { message, .. } => message.clone(),
            Self::Json { message } => message.clone(),
            Self::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Self::Cancelled => EXIT_CANCELLED,
            Self::Interrupted => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }

    fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
