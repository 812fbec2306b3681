//! Domain logic behind the protocol surfaces
//!
//! `tools` backs the bridge's `ask_gemini` tool; `query` backs the gateway.

pub mod query;
pub mod tools;
