//! Axum handlers for the gateway
//!
//! `POST /mcp` accepts the bridge's `{"query": ...}` body (and looser shapes)
//! and answers with `{"response": ...}`.

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::{domain::query::extract_query, errors::AppError, GatewayState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub response: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn ask(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<AnswerResponse>, AppError> {
    let raw = String::from_utf8_lossy(&body);
    let query = extract_query(&raw);
    info!(
        body_bytes = body.len(),
        query_chars = query.chars().count(),
        "gateway query received"
    );

    let response = state.generator.generate(&query).await?;
    Ok(Json(AnswerResponse { response }))
}
