use std::sync::Arc;

use gemini_mcp_bridge::{
    bridge_client::HttpAnswerClient, config::BridgeConfig, logging, stdio::transport::serve_stdio,
    AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = BridgeConfig::from_env()?;
    let client = HttpAnswerClient::new(config.backend_url.clone());
    let state = AppState::new(Arc::new(client));

    info!(backend_url = %config.backend_url, "bridge starting on stdio");

    serve_stdio(&state).await?;
    Ok(())
}
