//! Sylius MCP - catalog tools over JSON-RPC and REST
//!
//! A small set of callable tools (greeting, clock, and read-only queries
//! against a Sylius-style product catalog) served through one dispatcher.

pub mod catalog;
pub mod error;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod storage;
pub mod types;

pub use catalog::Catalog;
pub use error::{Result, SyliusError};
pub use storage::Storage;
pub use types::*;
