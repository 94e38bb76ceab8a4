//! Remote tool-invocation transport (Model Context Protocol over stdio).
//!
//! `tools/list` is rendered from the action registry and `tools/call` takes
//! the same validate → gate → dispatch path as a local proposal.

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
