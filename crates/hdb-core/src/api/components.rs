//! Deployed component operations

use super::client::Operations;
use crate::error::{HdbError, HdbResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Components that drop and reset never remove
pub const RETAIN_COMPONENTS: &[&str] = &["prometheus_exporter", "status-check"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComponentEntry {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ComponentListing {
    #[serde(default)]
    entries: Vec<ComponentEntry>,
}

/// `get_components`
pub async fn get_components(api: &dyn Operations) -> HdbResult<Vec<ComponentEntry>> {
    let response = api.operation("get_components", Map::new()).await?;
    let listing: ComponentListing = serde_json::from_value(response)
        .map_err(|e| HdbError::json(format!("Unexpected get_components response: {e}")))?;
    debug!("{} component(s) deployed", listing.entries.len());
    Ok(listing.entries)
}

/// `drop_component { project }`
pub async fn drop_component(api: &dyn Operations, project: &str) -> HdbResult<Value> {
    let mut params = Map::new();
    params.insert("project".to_string(), Value::String(project.to_string()));
    api.operation("drop_component", params).await
}

/// Names of the components that may be dropped
pub fn removable_components(entries: &[ComponentEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| !RETAIN_COMPONENTS.contains(&entry.name.as_str()))
        .map(|entry| entry.name.clone())
        .collect()
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records each request
    #[derive(Default)]
    pub struct FakeOperations {
        responses: Mutex<VecDeque<HdbResult<Value>>>,
        pub calls: Mutex<Vec<(String, Map<String, Value>)>>,
    }

    impl FakeOperations {
        pub fn new(responses: impl IntoIterator<Item = HdbResult<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Operations for FakeOperations {
        async fn operation(&self, name: &str, params: Map<String, Value>) -> HdbResult<Value> {
            self.calls.lock().unwrap().push((name.to_string(), params));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Value::Null))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeOperations;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_components_parses_entries() {
        let api = FakeOperations::new([Ok(json!({
            "name": "components",
            "entries": [{ "name": "app", "size": 1 }, { "name": "status-check" }]
        }))]);

        let entries = get_components(&api).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(removable_components(&entries), vec!["app"]);
        assert_eq!(api.calls()[0].0, "get_components");
    }

    #[tokio::test]
    async fn test_unexpected_listing_is_json_error() {
        let api = FakeOperations::new([Ok(json!("oops"))]);
        assert!(matches!(
            get_components(&api).await.unwrap_err(),
            HdbError::Json { .. }
        ));
    }

    #[tokio::test]
    async fn test_drop_component_sends_project() {
        let api = FakeOperations::new([Ok(json!({ "message": "dropped" }))]);

        let result = drop_component(&api, "app").await.unwrap();

        assert_eq!(result["message"], "dropped");
        let calls = api.calls();
        assert_eq!(calls[0].0, "drop_component");
        assert_eq!(calls[0].1["project"], "app");
    }

    #[test]
    fn test_retained_components_are_never_removable() {
        let entries: Vec<ComponentEntry> = ["prometheus_exporter", "a", "status-check", "b"]
            .iter()
            .map(|name| ComponentEntry {
                name: name.to_string(),
            })
            .collect();
        assert_eq!(removable_components(&entries), vec!["a", "b"]);
    }
}
