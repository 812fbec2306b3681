//! JSON-RPC envelopes and error mapping
//!
//! Responses echo the request id verbatim, so they are built as plain JSON
//! rather than through the SDK's envelope types, which only model string and
//! integer ids.

use serde_json::{json, Value};

use crate::errors::AppError;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PARSE_ERROR: i32 = -32700;
pub const INTERNAL_ERROR: i32 = -32603;

pub fn parse_error() -> Value {
    json_rpc_error(Value::Null, PARSE_ERROR, "Parse error")
}

/// Every dispatch failure surfaces as an internal error carrying its message.
pub fn app_error_to_json_rpc(id: Value, err: &AppError) -> Value {
    json_rpc_error(id, INTERNAL_ERROR, &err.rpc_message())
}

pub fn json_rpc_error(id: Value, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
}

pub fn json_rpc_result(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result
    })
}
