//! Tool definitions module.
//!
//! One file per tool. Every tool resolves its ticker through
//! [`common::resolve`] before fetching anything.

pub mod actions;
pub mod common;
pub mod history;
pub mod holders;
pub mod info;
pub mod news;
pub mod recommendations;
pub mod statement;

pub use actions::{StockActionsParams, StockActionsTool};
pub use history::{HistoricalPricesTool, HistoryParams};
pub use holders::{HolderInfoParams, HolderInfoTool};
pub use info::{StockInfoParams, StockInfoTool};
pub use news::{NewsParams, NewsTool};
pub use recommendations::{RecommendationsParams, RecommendationsTool};
pub use statement::{FinancialStatementParams, FinancialStatementTool};
