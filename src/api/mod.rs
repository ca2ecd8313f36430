//! HTTP API: server, response types and log streaming.

pub mod logs;
pub mod server;
pub mod types;
