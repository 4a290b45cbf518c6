//! `hdb api <operation> [--key=value ...]`

use crate::router::Session;
use hdb_core::api::{Operations, parse_operation_params};
use hdb_core::{ApiClient, HdbError, HdbResult, ResolvedConfig};
use serde_json::Value;
use std::path::Path;

pub async fn run(
    session: &Session,
    target: &ResolvedConfig,
    operation: &str,
    params: &[String],
    output: Option<&Path>,
) -> HdbResult<()> {
    let params = parse_operation_params(params)?;
    let client = ApiClient::new(target)?;

    session
        .console
        .info(&format!("Executing operation: {operation}"));
    let result = client.operation(operation, params).await?;
    let rendered = render(&result)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n")).map_err(|e| HdbError::io_at(path, e))?;
            session
                .console
                .success(&format!("Result written to {}", path.display()));
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Pretty JSON, or the raw text for non-JSON responses
pub fn render(result: &Value) -> HdbResult<String> {
    match result {
        Value::String(text) => Ok(text.clone()),
        other => Ok(serde_json::to_string_pretty(other)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render() {
        assert_eq!(render(&json!({"a": 1})).unwrap(), "{\n  \"a\": 1\n}");
        assert_eq!(render(&json!("plain text")).unwrap(), "plain text");
    }
}
