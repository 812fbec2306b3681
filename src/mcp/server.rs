//! The MCP dispatch engine
//!
//! Decodes one JSON-RPC message, routes its method to a canned result or to the
//! `ask_gemini` tool, and builds the response envelope. Notifications are
//! dispatched but never answered.

use std::time::Instant;

use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ListPromptsResult, ListResourcesResult, ListToolsResult,
    ServerCapabilities, ServerCapabilitiesTools,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::tools::{build_tools_list, handle_tools_call};
use crate::mcp::rpc::{app_error_to_json_rpc, json_rpc_result};
use crate::{errors::AppError, AppState};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SERVER_NAME: &str = "gemini-mcp-server";
pub const AUDIT_STRING_LIMIT: usize = 80;

const INITIALIZED_NOTIFICATION: &str = "notifications/initialized";
const NOTIFICATION_PREFIX: &str = "notifications/";

/// Handles one decoded JSON value. Returns `None` when nothing must be written.
pub async fn handle_json_rpc_value(state: &AppState, payload: Value) -> Option<Value> {
    let Value::Object(mut object) = payload else {
        return Some(app_error_to_json_rpc(
            Value::Null,
            &AppError::invalid_request("expected a JSON object"),
        ));
    };

    let request_id = object.remove("id");
    let Some(method) = object.remove("method").and_then(|method| match method {
        Value::String(method) => Some(method),
        _ => None,
    }) else {
        return Some(app_error_to_json_rpc(
            request_id.unwrap_or(Value::Null),
            &AppError::invalid_request("method must be a string"),
        ));
    };

    handle_json_rpc_request(state, request_id, &method, object.remove("params")).await
}

/// Dispatches a request and audits it. `id` is `None` for notifications.
pub async fn handle_json_rpc_request(
    state: &AppState,
    id: Option<Value>,
    method: &str,
    params: Option<Value>,
) -> Option<Value> {
    let started_at = Instant::now();
    let audit_params = redact_audit_params(params.as_ref());

    let outcome = dispatch(state, method, params).await;

    info!(
        method = %method,
        params = %audit_params,
        outcome = if outcome.is_ok() { "success" } else { "failure" },
        duration_ms = started_at.elapsed().as_millis(),
        "mcp action audited"
    );

    match (id, outcome) {
        (_, Ok(None)) => None,
        (None, Ok(Some(_))) => None,
        (None, Err(err)) => {
            warn!(method = %method, error = %err, "notification failed");
            None
        }
        (Some(id), Ok(Some(result))) => Some(json_rpc_result(id, result)),
        (Some(id), Err(err)) => Some(app_error_to_json_rpc(id, &err)),
    }
}

/// Routes a method. `Ok(None)` marks a notification method that never replies.
async fn dispatch(
    state: &AppState,
    method: &str,
    params: Option<Value>,
) -> Result<Option<Value>, AppError> {
    let result = match method {
        "initialize" => {
            log_client_hello(params.as_ref());
            to_result(&initialize_result())?
        }
        INITIALIZED_NOTIFICATION => {
            debug!("client finished initialization");
            return Ok(None);
        }
        "tools/list" => to_result(&ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: build_tools_list(),
        })?,
        "resources/list" => to_result(&ListResourcesResult {
            meta: None,
            next_cursor: None,
            resources: vec![],
        })?,
        "prompts/list" => to_result(&ListPromptsResult {
            meta: None,
            next_cursor: None,
            prompts: vec![],
        })?,
        "tools/call" => handle_tools_call(state, params).await?,
        other if other.starts_with(NOTIFICATION_PREFIX) => {
            debug!(method = %other, "ignoring notification");
            return Ok(None);
        }
        other => return Err(AppError::UnknownMethod(other.to_string())),
    };

    Ok(Some(result))
}

pub fn initialize_result() -> InitializeResult {
    InitializeResult {
        server_info: Implementation {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        protocol_version: PROTOCOL_VERSION.into(),
        instructions: None,
        meta: None,
    }
}

fn log_client_hello(params: Option<&Value>) {
    let client = params
        .and_then(|params| params.pointer("/clientInfo/name"))
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let offered_version = params
        .and_then(|params| params.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or("unspecified");

    debug!(client = %client, offered_version = %offered_version, "initialize received");
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|err| AppError::internal(format!("result serialization: {err}")))
}

pub fn redact_audit_params(params: Option<&Value>) -> Value {
    params.map(redact_audit_value).unwrap_or(Value::Null)
}

/// Masks sensitive keys and shortens long strings so queries stay out of logs.
pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        Value::String(text) => {
            let total = text.chars().count();
            if total <= AUDIT_STRING_LIMIT {
                return value.clone();
            }
            let head: String = text.chars().take(AUDIT_STRING_LIMIT).collect();
            Value::String(format!("{head}...({total} chars)"))
        }
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "authorization" | "bearer" | "api_key" | "apikey"
    ) || ["token", "secret", "password", "credential"]
        .iter()
        .any(|needle| normalized.contains(needle))
}
