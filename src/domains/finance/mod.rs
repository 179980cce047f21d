//! Market-data bounded context.
//!
//! - `kinds` - closed parameter enumerations and their wire names
//! - `table` - row-major and column-major tables and their JSON records
//! - `projection` - the info allow-list
//! - `news` - story extraction and rendering
//! - `provider` - the upstream contract every tool talks to
//! - `yahoo` - the Yahoo Finance implementation

pub mod error;
pub mod kinds;
pub mod news;
pub mod projection;
pub mod provider;
pub mod table;
pub mod yahoo;

pub use error::{ProviderError, ProviderResult};
pub use kinds::{FinancialType, HolderType, Interval, Period, RecommendationType, UnknownVariant};
pub use projection::{InfoBag, project_info};
pub use provider::{Instrument, MarketDataProvider};
pub use table::{Cell, ColumnKey, Record, RowTable, TimeSeriesTable};
pub use yahoo::YahooProvider;
