//! Standard-stream transport for the bridge

pub mod transport;
