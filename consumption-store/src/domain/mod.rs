pub mod app_config;
pub mod consumption;

pub use app_config::AppConfigRow;
pub use consumption::{Aggregation, ConsumptionRecord, DailySummary, ParseAggregationError};
