//! MCP (Model Context Protocol) server.
//!
//! Exposes a single tool, `summaries_parquet_file`, that reports the row and
//! column counts of a Parquet file in a fixed data directory.
//!
//! # Feature Gate
//!
//! This module requires the `mcp` feature flag:
//! ```toml
//! [dependencies]
//! research-router = { version = "...", features = ["mcp"] }
//! ```
//!
//! # Architecture
//!
//! ```text
//! MCP Client
//!   ↓ summaries_parquet_file(filename)
//! ResearchMcpServer
//!   ↓ ToolRegistry::call (argument validation)
//!   ↓ spawn_blocking
//! SummaryProvider::summarize (footer only)
//!   ↓
//! "Parquet file '<f>' has <r> rows and <c> columns." → MCP Client
//! ```

pub mod params;
pub mod registry;
pub mod server;
pub mod transport;

pub use params::SummaryParams;
pub use registry::{RegisteredTool, ToolCallError, ToolRegistry};
pub use server::ResearchMcpServer;
pub use transport::{serve_http, serve_stdio};
