//! HTTP client for the operations API

use crate::config::ResolvedConfig;
use crate::error::{HdbError, HdbResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const USER_AGENT: &str = concat!("hdb/", env!("CARGO_PKG_VERSION"));

/// Anything that can run a named operation against an instance
#[async_trait]
pub trait Operations: Send + Sync {
    async fn operation(&self, name: &str, params: Map<String, Value>) -> HdbResult<Value>;
}

/// Operations API client bound to one resolved target
pub struct ApiClient {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl ApiClient {
    pub fn new(target: &ResolvedConfig) -> HdbResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HdbError::http(format!("Failed to create HTTP client: {e}"), &target.instance_url))?;

        Ok(Self {
            client,
            url: target.instance_url.clone(),
            username: target.username.clone(),
            password: target.password().to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Operations for ApiClient {
    /// POST the operation and decode the response.
    ///
    /// Non-2xx statuses become [`HdbError::Api`] carrying the response body.
    /// A success body that is not JSON is returned as a JSON string.
    async fn operation(&self, name: &str, params: Map<String, Value>) -> HdbResult<Value> {
        let body = operation_body(name, params);
        info!("Running API operation: {}", name);
        debug!("Request body keys: {:?}", body.as_object().map(|o| o.keys().collect::<Vec<_>>()));

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("{} answered {} ({} bytes)", self.url, status, text.len());

        if !status.is_success() {
            return Err(HdbError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

/// Request body for `name`; the `operation` key always names `name`
pub fn operation_body(name: &str, params: Map<String, Value>) -> Value {
    let mut body = params;
    body.insert("operation".to_string(), Value::String(name.to_string()));
    Value::Object(body)
}
