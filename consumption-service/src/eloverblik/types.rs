//! Wire shapes for the Eloverblik time-series documents.
//!
//! The upstream API nests readings as series -> periods -> points and is
//! loose about scalar types: `position` and `out_Quantity.quantity` arrive
//! as either JSON numbers or strings depending on the endpoint version, so
//! both are decoded leniently into options.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub result: String,
}

/// Body of `POST /meterdata/gettimeseries/{from}/{to}/{aggregation}`.
#[derive(Debug, Serialize)]
pub struct TimeSeriesRequest {
    #[serde(rename = "meteringPoints")]
    pub metering_points: MeteringPointList,
}

#[derive(Debug, Serialize)]
pub struct MeteringPointList {
    #[serde(rename = "meteringPoint")]
    pub metering_point: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeries {
    #[serde(default, rename = "businessType")]
    pub business_type: Option<String>,
    #[serde(default, rename = "measurement_Unit.name")]
    pub measurement_unit: Option<String>,
    #[serde(default, rename = "Period")]
    pub periods: Vec<Period>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Period {
    #[serde(default, rename = "timeInterval")]
    pub time_interval: Option<TimeInterval>,
    #[serde(default, rename = "Point")]
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeInterval {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Point {
    /// 1-based offset within the period.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub position: Option<u32>,
    #[serde(default, rename = "out_Quantity.quantity", deserialize_with = "lenient_f64")]
    pub quantity: Option<f64>,
    #[serde(default, rename = "out_Quantity.quality")]
    pub quality: Option<String>,
}

/// A value that clients may send as a single string or as an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(value) => value.trim().is_empty(),
            Self::Many(values) => values.is_empty(),
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_realistic_time_series_document() {
        let series: Vec<TimeSeries> = serde_json::from_str(
            r#"[
                {
                    "mRID": "571313000000000001",
                    "businessType": "A04",
                    "curveType": "A01",
                    "measurement_Unit.name": "KWH",
                    "Period": [
                        {
                            "resolution": "PT1H",
                            "timeInterval": {
                                "start": "2024-01-01T23:00:00Z",
                                "end": "2024-01-02T23:00:00Z"
                            },
                            "Point": [
                                {
                                    "position": "1",
                                    "out_Quantity.quantity": "0.923",
                                    "out_Quantity.quality": "A04"
                                },
                                {
                                    "position": "2",
                                    "out_Quantity.quantity": "1.154",
                                    "out_Quantity.quality": "A04"
                                }
                            ]
                        }
                    ]
                }
            ]"#,
        )
        .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].business_type.as_deref(), Some("A04"));
        assert_eq!(series[0].measurement_unit.as_deref(), Some("KWH"));

        let period = &series[0].periods[0];
        let interval = period.time_interval.as_ref().unwrap();
        assert_eq!(interval.start.as_deref(), Some("2024-01-01T23:00:00Z"));
        assert_eq!(period.points.len(), 2);
        assert_eq!(period.points[0].position, Some(1));
        assert_eq!(period.points[0].quantity, Some(0.923));
        assert_eq!(period.points[1].quality.as_deref(), Some("A04"));
    }

    #[test]
    fn position_and_quantity_accept_numbers_and_strings() {
        let point: Point = serde_json::from_str(
            r#"{"position": 3, "out_Quantity.quantity": 1.5, "out_Quantity.quality": "A04"}"#,
        )
        .unwrap();
        assert_eq!(point.position, Some(3));
        assert_eq!(point.quantity, Some(1.5));

        let point: Point = serde_json::from_str(
            r#"{"position": "3", "out_Quantity.quantity": "1.5"}"#,
        )
        .unwrap();
        assert_eq!(point.position, Some(3));
        assert_eq!(point.quantity, Some(1.5));
    }

    #[test]
    fn unparseable_scalars_become_none() {
        let point: Point = serde_json::from_str(
            r#"{"position": "abc", "out_Quantity.quantity": "n/a"}"#,
        )
        .unwrap();
        assert_eq!(point.position, None);
        assert_eq!(point.quantity, None);

        let point: Point =
            serde_json::from_str(r#"{"position": null, "out_Quantity.quantity": null}"#).unwrap();
        assert_eq!(point.position, None);
        assert_eq!(point.quantity, None);
    }

    #[test]
    fn missing_nested_fields_deserialize_as_empty() {
        let series: TimeSeries = serde_json::from_str(r#"{"businessType": "A04"}"#).unwrap();
        assert!(series.periods.is_empty());

        let period: Period = serde_json::from_str(r#"{}"#).unwrap();
        assert!(period.time_interval.is_none());
        assert!(period.points.is_empty());
    }

    #[test]
    fn metering_points_accept_one_or_many() {
        let one: OneOrMany = serde_json::from_str(r#""571313000000000001""#).unwrap();
        assert_eq!(one.into_vec(), vec!["571313000000000001".to_string()]);

        let many: OneOrMany = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(many.into_vec(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn request_body_uses_the_upstream_field_names() {
        let body = TimeSeriesRequest {
            metering_points: MeteringPointList {
                metering_point: vec!["571313000000000001".to_string()],
            },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value["meteringPoints"]["meteringPoint"][0],
            "571313000000000001"
        );
    }
}
