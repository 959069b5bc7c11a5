pub mod db;
pub mod domain;

pub use domain::{Aggregation, AppConfigRow, ConsumptionRecord, DailySummary};
