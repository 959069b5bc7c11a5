//! Diagnostic route that exercises the upstream path end to end with
//! credentials from the service configuration instead of the database.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, OffsetDateTime};

use consumption_store::Aggregation;

use crate::api::{parse_date, AppState};
use crate::error::ApiError;

/// Upstream cap on a single gettimeseries range, endpoints inclusive.
pub const MAX_RANGE_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleParams {
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
}

/// Fetch hourly time series for the configured sample metering point and
/// return the raw upstream payload wrapped in request metadata.
pub async fn test_data(
    State(state): State<AppState>,
    Query(params): Query<SampleParams>,
) -> Result<Json<Value>, ApiError> {
    let Some(sample) = state.sample.clone() else {
        return Err(ApiError::NotConfigured);
    };

    let date_from = params.date_from.as_deref().filter(|d| !d.is_empty());
    let date_to = params.date_to.as_deref().filter(|d| !d.is_empty());
    let (from, to) = match (date_from, date_to) {
        (Some(from), Some(to)) => (parse_date(from, "dateFrom")?, parse_date(to, "dateTo")?),
        _ => default_sample_range(OffsetDateTime::now_utc().date()),
    };
    validate_range(from, to)?;

    tracing::info!(from = %from, to = %to, "fetching sample consumption data");

    // Bypasses the cached token so the whole credential chain is exercised.
    let access_token = state
        .client
        .fetch_access_token(&sample.refresh_token)
        .await?;
    let payload = state
        .client
        .time_series(
            &access_token,
            from,
            to,
            Aggregation::Hour,
            std::slice::from_ref(&sample.metering_point),
        )
        .await?;

    let mut body = serde_json::Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(
        "timestamp".to_string(),
        Value::String(
            OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
        ),
    );
    body.insert(
        "dateRange".to_string(),
        json!({ "from": from.to_string(), "to": to.to_string() }),
    );
    body.insert(
        "meteringPoint".to_string(),
        Value::String(sample.metering_point.clone()),
    );
    match payload {
        Value::Object(fields) => body.extend(fields),
        other => {
            body.insert("result".to_string(), other);
        }
    }

    Ok(Json(Value::Object(body)))
}

/// Nine days ago through two days ago: recent enough to be interesting,
/// old enough for the upstream readings to have settled.
pub fn default_sample_range(today: Date) -> (Date, Date) {
    let to = today.saturating_sub(Duration::days(2));
    let from = to.saturating_sub(Duration::days(7));
    (from, to)
}

/// Reject reversed ranges and inclusive spans over [`MAX_RANGE_DAYS`].
pub fn validate_range(from: Date, to: Date) -> Result<(), ApiError> {
    if to < from {
        return Err(ApiError::Validation(
            "dateTo must not be before dateFrom".to_string(),
        ));
    }

    let span_days = (to - from).whole_days() + 1;
    if span_days > MAX_RANGE_DAYS {
        return Err(ApiError::Validation(format!(
            "Date range too large. Maximum {MAX_RANGE_DAYS} days allowed."
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn default_range_runs_from_nine_to_two_days_ago() {
        let (from, to) = default_sample_range(date!(2024 - 03 - 15));
        assert_eq!(from, date!(2024 - 03 - 06));
        assert_eq!(to, date!(2024 - 03 - 13));
    }

    #[test]
    fn default_range_always_validates() {
        let (from, to) = default_sample_range(date!(2024 - 03 - 15));
        assert!(validate_range(from, to).is_ok());
    }

    #[test]
    fn ranges_up_to_thirty_inclusive_days_pass() {
        let from = date!(2024 - 01 - 01);
        assert!(validate_range(from, from).is_ok());
        assert!(validate_range(from, date!(2024 - 01 - 30)).is_ok());
    }

    #[test]
    fn thirty_one_day_ranges_are_rejected() {
        let err = validate_range(date!(2024 - 01 - 01), date!(2024 - 01 - 31)).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn reversed_ranges_are_rejected() {
        let err = validate_range(date!(2024 - 01 - 10), date!(2024 - 01 - 09)).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
