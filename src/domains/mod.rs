//! Domains module containing business logic organized by bounded contexts.
//!
//! - `finance` - market data: parameter kinds, tables, the provider contract
//!   and its Yahoo Finance implementation
//! - `tools` - the MCP tools exposed to clients

pub mod finance;
pub mod tools;
