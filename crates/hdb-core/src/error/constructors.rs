//! Constructor methods for HdbError

use super::types::HdbError;
use std::path::Path;

impl HdbError {
    /// Create a corrupt-configuration error for `path`
    pub fn config_corrupt(path: &Path, message: impl Into<String>) -> Self {
        Self::ConfigCorrupt {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create a credential-file parse error for `path`
    pub fn credential_parse(path: &Path, message: impl Into<String>) -> Self {
        Self::CredentialParse {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn environment_not_found(name: impl Into<String>) -> Self {
        Self::EnvironmentNotFound { name: name.into() }
    }

    pub fn instance_not_found(instance: impl Into<String>, environment: impl Into<String>) -> Self {
        Self::InstanceNotFound {
            instance: instance.into(),
            environment: environment.into(),
        }
    }

    /// Create a validation error for an operator-supplied field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    /// Create an IO error that names the file involved
    pub fn io_at(path: &Path, error: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", path.display(), error),
            path: Some(path.display().to_string()),
        }
    }

    /// Create a new JSON error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }

    /// Create an HTTP error for a request to `url`
    pub fn http(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            url: Some(url.into()),
            status_code: None,
        }
    }

    pub fn process(command: impl Into<String>, message: impl Into<String>, code: Option<i32>) -> Self {
        Self::Process {
            command: command.into(),
            message: message.into(),
            code,
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}
