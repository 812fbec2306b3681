//! HTTP surface of the gateway binary
//!
//! Provides the `/mcp` answer endpoint the bridge posts to, plus `/health`.

pub mod handlers;
