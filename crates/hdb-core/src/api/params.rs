//! `--key=value` operation parameters

use crate::error::{HdbError, HdbResult};
use serde_json::{Map, Number, Value};

const JSON_KEY: &str = "json";

/// Turn `--key=value` / `key=value` arguments into operation parameters.
///
/// Leading dashes are stripped and a bare `--flag` means `true`. `true`,
/// `false` and numeric values become JSON booleans and numbers. The `json`
/// key must hold a JSON object, which is merged over the other parameters.
pub fn parse_operation_params(args: &[String]) -> HdbResult<Map<String, Value>> {
    let mut params = Map::new();
    let mut json_params: Vec<Map<String, Value>> = Vec::new();

    for arg in args {
        let stripped = arg.trim_start_matches('-');
        let (key, value) = match stripped.split_once('=') {
            Some((key, value)) => (key.trim(), Some(value)),
            None => (stripped.trim(), None),
        };
        if key.is_empty() {
            return Err(HdbError::validation("parameter", format!("missing key in '{arg}'")));
        }

        if key == JSON_KEY {
            let raw = value.ok_or_else(|| HdbError::validation("--json", "expects a JSON object"))?;
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(object)) => json_params.push(object),
                Ok(_) => return Err(HdbError::validation("--json", "expects a JSON object")),
                Err(e) => {
                    return Err(HdbError::validation(
                        "--json",
                        format!("Failed to parse JSON parameter: {e}"),
                    ));
                }
            }
            continue;
        }

        let value = match value {
            Some(raw) => coerce(raw),
            None => Value::Bool(true),
        };
        params.insert(key.to_string(), value);
    }

    for object in json_params {
        params.extend(object);
    }
    Ok(params)
}

fn coerce(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        if raw.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')) {
            return Value::Number(number);
        }
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_simple_and_json_params_merge() {
        let params = parse_operation_params(&args(&["--a=1", "b=two", "--json={\"c\":true}"])).unwrap();
        assert_eq!(Value::Object(params), json!({ "a": 1, "b": "two", "c": true }));
    }

    #[test]
    fn test_json_wins_over_simple_params() {
        let params =
            parse_operation_params(&args(&["--json={\"a\":{\"x\":[1]}}", "--a=plain"])).unwrap();
        assert_eq!(params["a"], json!({ "x": [1] }));
    }

    #[test]
    fn test_value_coercion() {
        let params = parse_operation_params(&args(&[
            "--flag",
            "--off=false",
            "--ratio=0.5",
            "--name=inf",
            "--empty=",
            "--url=https://x?y=z",
        ]))
        .unwrap();
        assert_eq!(params["flag"], json!(true));
        assert_eq!(params["off"], json!(false));
        assert_eq!(params["ratio"], json!(0.5));
        assert_eq!(params["name"], json!("inf"));
        assert_eq!(params["empty"], json!(""));
        assert_eq!(params["url"], json!("https://x?y=z"));
    }

    #[test]
    fn test_invalid_json_is_validation_error() {
        for bad in ["--json={nope", "--json=[1,2]", "--json"] {
            let err = parse_operation_params(&args(&[bad])).unwrap_err();
            assert!(matches!(err, HdbError::Validation { .. }), "{bad}: {err:?}");
        }
    }

    #[test]
    fn test_missing_key_is_rejected() {
        assert!(parse_operation_params(&args(&["--=x"])).is_err());
        assert!(parse_operation_params(&args(&["--"])).is_err());
    }
}
