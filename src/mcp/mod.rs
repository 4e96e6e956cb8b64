//! MCP (Model Context Protocol) server implementations.
//!
//! This module exposes the habit tracker to MCP clients over stdio.

#[cfg(feature = "mcp")]
pub mod habits_server;

#[cfg(feature = "mcp")]
pub use habits_server::HabitsServer;
