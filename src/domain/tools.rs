//! Tools exposed via Model Context Protocol
//!
//! The bridge exposes exactly one tool, `ask_gemini`, which forwards its query
//! to the configured `AnswerProvider`.

use rust_mcp_sdk::{
    macros,
    schema::{CallToolRequestParams, CallToolResult, ContentBlock, TextContent, Tool},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{errors::AppError, AppState};

pub const ASK_GEMINI_TOOL: &str = "ask_gemini";

#[macros::mcp_tool(name = "ask_gemini", description = "Ask Gemini AI a question")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct AskGeminiTool {
    /// The question to ask Gemini
    pub query: String,
}

pub fn build_tools_list() -> Vec<Tool> {
    vec![AskGeminiTool::tool()]
}

/// Runs a `tools/call` request and returns the MCP `CallToolResult` payload.
pub async fn handle_tools_call(state: &AppState, params: Option<Value>) -> Result<Value, AppError> {
    let raw_params =
        params.ok_or_else(|| AppError::invalid_params("tools/call requires params"))?;

    let tool_call: CallToolRequestParams = serde_json::from_value(raw_params)
        .map_err(|_| AppError::invalid_params("tools/call requires a tool name"))?;

    match tool_call.name.as_str() {
        ASK_GEMINI_TOOL => {
            let arguments: AskGeminiTool =
                serde_json::from_value(json!(tool_call.arguments.unwrap_or_default())).map_err(
                    |_| AppError::invalid_params("ask_gemini requires a string `query` argument"),
                )?;

            let answer = state.answer_provider.ask(&arguments.query).await?;
            info!(answer_chars = answer.chars().count(), "ask_gemini answered");

            serde_json::to_value(CallToolResult {
                content: vec![ContentBlock::from(TextContent::new(answer, None, None))],
                is_error: None,
                meta: None,
                structured_content: None,
            })
            .map_err(|err| AppError::internal(format!("tool result serialization: {err}")))
        }
        other => Err(AppError::UnknownTool(other.to_string())),
    }
}
