// Shared crate - domain types, pure view helpers and logging bootstrap

pub mod logging;
pub mod types;
pub mod view;

pub use logging::{init_logging, init_logging_with, parse_level_filter};
pub use types::{AssetDetail, AssetSummary, ParseTimeframeError, PricePoint, PriceSeries, Timeframe};
pub use view::{description_text, filter_assets, matches_query, toggle_label, truncate_description};
