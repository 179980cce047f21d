//! Tools domain module.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `router.rs` - Dynamic ToolRouter builder used by the rmcp transports
//! - `registry.rs` - Name-based dispatch for the HTTP JSON-RPC endpoint
//! - `error.rs` - The user-visible error taxonomy
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `earnings.rs`)
//! 2. Define params, `execute()`, `to_tool()` and `create_route()`
//! 3. Export in `definitions/mod.rs`
//! 4. Add the route in `router.rs` using `with_route()`
//! 5. Add a dispatch arm in `registry.rs`

pub mod definitions;
mod error;
pub mod registry;
pub mod router;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use router::build_tool_router;
