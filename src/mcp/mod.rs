//! MCP (Model Context Protocol) tool layer
//!
//! Tool registry, transport-neutral dispatcher, and the JSON-RPC adapter
//! used by both the HTTP `/mcp` endpoint and the stdio transport.

pub mod dispatch;
pub mod handler;
pub mod protocol;
pub mod tools;

pub use dispatch::{Dispatcher, Envelope};
pub use handler::JsonRpcHandler;
pub use protocol::{
    methods, InitializeResult, McpHandler, McpRequest, McpResponse, McpServer, ToolCallResult,
};
pub use tools::{ToolOutput, ToolRegistry, TOOL_REGISTRY};
