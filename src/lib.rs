//! Yahoo Finance MCP Server Library
//!
//! Exposes Yahoo Finance market data (prices, company info, news, corporate
//! actions, financial statements, holders and analyst recommendations) as
//! Model Context Protocol tools.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the server handler and transports
//! - **domains**: Business logic organized by bounded contexts
//!   - **finance**: Provider abstraction, Yahoo client, table shapes and projections
//!   - **tools**: One MCP tool per file, plus the router and registry
//!
//! # Example
//!
//! ```rust,no_run
//! use yfinance_mcp_server::{core::Config, core::McpServer, core::TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

pub use core::{Config, Error, McpServer, Result};
