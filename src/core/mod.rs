//! Core module containing shared infrastructure components.
//!
//! Configuration, errors, the [`McpServer`] handler and the transports that
//! carry it.

pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
