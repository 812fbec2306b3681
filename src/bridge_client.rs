//! HTTP client for the local answer backend
//!
//! The bridge forwards `ask_gemini` queries as `{"query": ...}` to a single
//! fixed endpoint and turns whatever comes back into answer text.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;

#[derive(Debug, Serialize)]
struct BackendQuery<'a> {
    query: &'a str,
}

#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn ask(&self, query: &str) -> Result<String, AppError>;
}

#[derive(Debug, Clone)]
pub struct HttpAnswerClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpAnswerClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl AnswerProvider for HttpAnswerClient {
    async fn ask(&self, query: &str) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&BackendQuery { query })
            .send()
            .await
            .map_err(|err| {
                AppError::backend(format!(
                    "failed to reach backend at {}: {err}",
                    self.endpoint
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint = %self.endpoint, "backend returned non-success status");
        }

        let body = response.text().await.map_err(|err| {
            AppError::backend(format!("failed to read backend response: {err}"))
        })?;
        debug!(bytes = body.len(), "backend response received");

        Ok(extract_answer(&body))
    }
}

/// Picks the answer text out of a backend body.
///
/// A string `response` member wins, then a string `text` member. Anything else
/// (non-JSON, non-object, or neither member present as a string) yields the raw
/// body. An empty string member is a real answer and is returned as-is.
pub fn extract_answer(body: &str) -> String {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    ["response", "text"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
