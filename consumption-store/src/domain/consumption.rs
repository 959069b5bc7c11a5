use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use time::{Date, OffsetDateTime};

/// Granularity of a stored time-series record. Matches the level names used
/// by the Eloverblik API, which are also what `consumption_data` stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    #[default]
    Hour,
    Day,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown aggregation level: {0}")]
pub struct ParseAggregationError(String);

impl FromStr for Aggregation {
    type Err = ParseAggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(ParseAggregationError(s.to_string())),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Month => "Month",
            Self::Year => "Year",
        })
    }
}

/// One row of `consumption_data`, keyed by
/// (metering_point_id, timestamp, aggregation_level).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ConsumptionRecord {
    pub metering_point_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub aggregation_level: String,
    pub quantity: Option<f64>,
    pub quality: Option<String>,
    pub business_type: Option<String>,
    pub measurement_unit: Option<String>,
}

/// Per-day aggregate over the trailing summary window. `total_consumption`
/// and `avg_consumption` are null when every quantity that day was null.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DailySummary {
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    pub total_consumption: Option<f64>,
    pub avg_consumption: Option<f64>,
    pub data_points: i64,
}

fn serialize_date<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn aggregation_parses_case_insensitively() {
        assert_eq!("Hour".parse::<Aggregation>(), Ok(Aggregation::Hour));
        assert_eq!("hour".parse::<Aggregation>(), Ok(Aggregation::Hour));
        assert_eq!("DAY".parse::<Aggregation>(), Ok(Aggregation::Day));
        assert_eq!("Month".parse::<Aggregation>(), Ok(Aggregation::Month));
        assert_eq!("year".parse::<Aggregation>(), Ok(Aggregation::Year));
    }

    #[test]
    fn aggregation_rejects_unknown_levels() {
        let err = "Quarter".parse::<Aggregation>().unwrap_err();
        assert_eq!(err.to_string(), "unknown aggregation level: Quarter");
    }

    #[test]
    fn aggregation_display_round_trips() {
        for agg in [
            Aggregation::Hour,
            Aggregation::Day,
            Aggregation::Month,
            Aggregation::Year,
        ] {
            assert_eq!(agg.to_string().parse::<Aggregation>(), Ok(agg));
        }
    }

    #[test]
    fn record_serializes_timestamp_as_rfc3339() {
        let record = ConsumptionRecord {
            metering_point_id: "571313000000000001".to_string(),
            timestamp: datetime!(2024-01-01 02:00:00 UTC),
            aggregation_level: "Hour".to_string(),
            quantity: Some(1.25),
            quality: Some("A04".to_string()),
            business_type: Some("A04".to_string()),
            measurement_unit: Some("KWH".to_string()),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["timestamp"], "2024-01-01T02:00:00Z");
        assert_eq!(value["quantity"], 1.25);
        assert_eq!(value["aggregation_level"], "Hour");
    }

    #[test]
    fn summary_serializes_date_as_calendar_day() {
        let summary = DailySummary {
            date: date!(2024 - 01 - 15),
            total_consumption: Some(12.5),
            avg_consumption: Some(0.52),
            data_points: 24,
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["date"], "2024-01-15");
        assert_eq!(value["data_points"], 24);
    }
}
