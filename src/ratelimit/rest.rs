//! Networked counter store speaking an Upstash-style REST protocol.
//!
//! Commands are single GET requests (`/incr/{key}`, `/expire/{key}/{ttl}`,
//! `/get/{key}`) authenticated with a bearer token. Responses carry a JSON
//! body of the form `{"result": <value>}` where the value may be an integer,
//! a stringified integer, or null for an absent key.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::store::{CounterStore, StoreError};

/// REST-based counter store client.
///
/// Preferred over the in-memory fallback because the counts are shared across
/// process instances, giving consistent decisions when the service is scaled
/// horizontally.
pub struct RestCounterStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct CommandResponse {
    result: Option<Value>,
}

impl RestCounterStore {
    /// Create a new client for the given endpoint and access token.
    pub fn new(url: &str, token: &str) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn command(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "Sending counter store command");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Query(format!(
                "counter store returned status {status}"
            )));
        }

        let body: CommandResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        Ok(body.result)
    }
}

#[async_trait]
impl CounterStore for RestCounterStore {
    async fn incr(&self, key: &str) -> Result<u64, StoreError> {
        let result = self.command(&format!("incr/{key}")).await?;
        result
            .as_ref()
            .and_then(parse_count)
            .ok_or_else(|| StoreError::Malformed(format!("non-numeric incr result: {result:?}")))
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
        self.command(&format!("expire/{key}/{ttl_secs}")).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        // A missing or malformed record reads as absent rather than an error.
        let result = self.command(&format!("get/{key}")).await?;
        Ok(result.as_ref().and_then(parse_count))
    }
}

/// Interpret a counter value from a response payload. The store may return
/// counts as JSON numbers or as strings.
fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_count_accepts_numbers_and_strings() {
        assert_eq!(parse_count(&json!(3)), Some(3));
        assert_eq!(parse_count(&json!("42")), Some(42));
    }

    #[test]
    fn test_parse_count_rejects_garbage() {
        assert_eq!(parse_count(&json!(null)), None);
        assert_eq!(parse_count(&json!("not-a-number")), None);
        assert_eq!(parse_count(&json!(-1)), None);
        assert_eq!(parse_count(&json!({"nested": true})), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = RestCounterStore::new("https://counter.example.com/", "token").unwrap();
        assert_eq!(store.base_url, "https://counter.example.com");
    }

    #[test]
    fn test_response_body_shape() {
        let body: CommandResponse = serde_json::from_str(r#"{"result": 7}"#).unwrap();
        assert_eq!(body.result.as_ref().and_then(parse_count), Some(7));

        let body: CommandResponse = serde_json::from_str(r#"{"result": null}"#).unwrap();
        assert!(body.result.as_ref().and_then(parse_count).is_none());
    }
}
