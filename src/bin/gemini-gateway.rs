use std::sync::Arc;

use gemini_mcp_bridge::{
    build_gateway_app, config::GatewayConfig, gemini_client::GeminiApiClient, logging,
    GatewayState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = GatewayConfig::from_env()?;
    let bind_socket = config.bind_socket()?;
    let state = GatewayState::new(Arc::new(GeminiApiClient::new(&config)));
    let app = build_gateway_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        model = %config.model,
        "gateway starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
