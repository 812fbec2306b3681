use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub mod bridge_client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod gemini_client;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod stdio;

use bridge_client::AnswerProvider;
use gemini_client::ContentGenerator;

/// State of the stdio bridge.
#[derive(Clone)]
pub struct AppState {
    pub answer_provider: Arc<dyn AnswerProvider>,
}

impl AppState {
    pub fn new(answer_provider: Arc<dyn AnswerProvider>) -> Self {
        Self { answer_provider }
    }
}

/// State of the HTTP gateway.
#[derive(Clone)]
pub struct GatewayState {
    pub generator: Arc<dyn ContentGenerator>,
}

impl GatewayState {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }
}

pub fn build_gateway_app(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/mcp", post(http::handlers::ask))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
