//! Instance URL normalization and environment name validation

use crate::error::{HdbError, HdbResult};
use reqwest::Url;

/// Scheme every instance URL is rewritten to
pub const DEFAULT_SCHEME: &str = "https";
/// Operations API port every instance URL is rewritten to
pub const DEFAULT_PORT: u16 = 9925;

const INSTANCE_FIELD: &str = "instance URL";
const NAME_FIELD: &str = "environment name";

/// Rewrite a bare hostname or a full URL into `https://<host>:9925`.
///
/// `foo`, `foo:1234`, `http://foo` and `https://FOO:9925/path` all name the
/// same logical instance. Normalizing an already normalized URL returns it
/// unchanged.
pub fn normalize_instance_url(input: &str) -> HdbResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(HdbError::validation(INSTANCE_FIELD, "must not be empty"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| HdbError::validation(INSTANCE_FIELD, format!("{trimmed}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(HdbError::validation(
            INSTANCE_FIELD,
            format!("{trimmed}: unsupported scheme '{}'", url.scheme()),
        ));
    }

    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| HdbError::validation(INSTANCE_FIELD, format!("{trimmed}: missing host")))?;

    Ok(format!("{DEFAULT_SCHEME}://{host}:{DEFAULT_PORT}"))
}

/// Normalize a comma-separated list of instances, dropping duplicates and
/// empty entries. Fails on the first invalid entry.
pub fn normalize_instance_list(input: &str) -> HdbResult<Vec<String>> {
    let mut instances: Vec<String> = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let url = normalize_instance_url(part)?;
        if !instances.contains(&url) {
            instances.push(url);
        }
    }
    Ok(instances)
}

/// Validate an environment name and return its stored (uppercase) form.
///
/// Names are restricted to ASCII letters, digits and underscores.
pub fn validate_environment_name(input: &str) -> HdbResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(HdbError::validation(NAME_FIELD, "must not be empty"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(HdbError::validation(
            NAME_FIELD,
            "Name can only contain letters, numbers, and underscores",
        ));
    }
    Ok(trimmed.to_ascii_uppercase())
}
