use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{config::GatewayConfig, errors::AppError};

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn single_prompt(text: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text }],
            }],
        }
    }
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

pub struct GeminiApiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiApiClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.generate_content_url(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl ContentGenerator for GeminiApiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        debug!(endpoint = %self.endpoint, prompt_chars = prompt.chars().count(), "sending gemini request");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateContentRequest::single_prompt(prompt))
            .send()
            .await
            .map_err(|err| {
                // reqwest errors carry the URL, which includes the key
                AppError::upstream(format!("gemini request failed: {}", err.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            AppError::upstream(format!(
                "failed to read gemini response: {}",
                err.without_url()
            ))
        })?;

        if !status.is_success() {
            return Err(AppError::upstream(format!(
                "gemini returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|err| AppError::upstream(format!("gemini response is not JSON: {err}")))?;

        candidate_text(&payload)
            .map(str::to_string)
            .ok_or_else(|| AppError::upstream("gemini response has no candidate text"))
    }
}

/// Text of the first part of the first candidate.
pub fn candidate_text(payload: &Value) -> Option<&str> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        extract::Query,
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn client_for(router: Router) -> GeminiApiClient {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock gemini");
        let addr = listener.local_addr().expect("mock gemini addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock gemini");
        });

        let config = GatewayConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("test-key".to_string()),
            "GEMINI_API_BASE" => Some(format!("http://{addr}/v1beta")),
            _ => None,
        })
        .expect("gateway config");
        GeminiApiClient::new(&config)
    }

    #[test]
    fn request_body_escapes_prompt() {
        let body = serde_json::to_value(GenerateContentRequest::single_prompt("say \"hi\"\n"))
            .expect("request serialization");
        assert_eq!(
            body,
            json!({ "contents": [{ "parts": [{ "text": "say \"hi\"\n" }] }] })
        );
    }

    #[test]
    fn candidate_text_reads_first_part() {
        let payload = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "first" }, { "text": "second" }] } },
                { "content": { "parts": [{ "text": "other" }] } }
            ]
        });
        assert_eq!(candidate_text(&payload), Some("first"));
        assert_eq!(candidate_text(&json!({ "candidates": [] })), None);
    }

    #[tokio::test]
    async fn generate_sends_key_and_prompt() {
        let router = Router::new().route(
            "/v1beta/models/gemini-1.5-flash:generateContent",
            post(
                |Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                    let prompt = body
                        .pointer("/contents/0/parts/0/text")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    let key = query.get("key").cloned().unwrap_or_default();
                    Json(json!({
                        "candidates": [{
                            "content": { "parts": [{ "text": format!("{key}:{prompt}") }] }
                        }]
                    }))
                },
            ),
        );
        let client = client_for(router).await;

        let text = client.generate("hello").await.expect("gemini answer");
        assert_eq!(text, "test-key:hello");
    }

    #[tokio::test]
    async fn generate_surfaces_http_failures() {
        let router = Router::new().route(
            "/v1beta/models/gemini-1.5-flash:generateContent",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
        );
        let client = client_for(router).await;

        let error = client.generate("hello").await.expect_err("must fail");
        assert!(matches!(error, AppError::Upstream { .. }));
        assert!(error.to_string().contains("HTTP 429"));
    }
}
