//! Model Context Protocol (MCP) request handling
//!
//! Provides JSON-RPC envelope construction and method routing for the bridge.

pub mod rpc;
pub mod server;
