use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use consumption_store::db::consumption_queries::{self, RecordFilter};
use consumption_store::{ConsumptionRecord, DailySummary};

use crate::api::{parse_aggregation, parse_date, start_of_day, AppState};
use crate::eloverblik::types::TimeSeries;
use crate::error::ApiError;
use crate::transform;

const DEFAULT_SUMMARY_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataParams {
    #[serde(default)]
    pub metering_point: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub aggregation: Option<String>,
}

/// Stored records matching the query, newest first. Date filters are
/// calendar days interpreted as midnight UTC; both bounds are inclusive.
pub async fn data(
    State(state): State<AppState>,
    Query(params): Query<DataParams>,
) -> Result<Json<Vec<ConsumptionRecord>>, ApiError> {
    let filter = RecordFilter {
        metering_point: params.metering_point.filter(|p| !p.is_empty()),
        from: params
            .date_from
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| parse_date(d, "dateFrom"))
            .transpose()?
            .map(start_of_day),
        to: params
            .date_to
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| parse_date(d, "dateTo"))
            .transpose()?
            .map(start_of_day),
        aggregation: parse_aggregation(params.aggregation.as_deref())?,
    };

    let records = consumption_queries::query_records(&state.pool, &filter).await?;
    Ok(Json(records))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    #[serde(default)]
    pub metering_point_id: Option<String>,
    #[serde(default)]
    pub time_series_data: Option<Vec<TimeSeries>>,
    #[serde(default)]
    pub aggregation: Option<String>,
}

/// Normalize an Eloverblik time-series document and upsert it.
pub async fn store(
    State(state): State<AppState>,
    Json(request): Json<StoreRequest>,
) -> Result<Json<Value>, ApiError> {
    metrics::counter!("http_ingest_requests_total").increment(1);

    let metering_point_id = request.metering_point_id.filter(|id| !id.trim().is_empty());
    let (Some(metering_point_id), Some(series)) = (metering_point_id, request.time_series_data)
    else {
        return Err(ApiError::Validation("Missing required data".to_string()));
    };

    let aggregation = parse_aggregation(request.aggregation.as_deref())?;

    let batch = transform::normalize_series(&metering_point_id, &series, aggregation);
    if batch.skipped > 0 {
        metrics::counter!("timeseries_points_skipped_total").increment(batch.skipped as u64);
        tracing::warn!(
            metering_point_id = %metering_point_id,
            skipped = batch.skipped,
            "skipped unusable time series points"
        );
    }

    let stored = consumption_queries::upsert_records(&state.pool, &batch.records).await?;
    metrics::counter!("consumption_records_upserted_total").increment(stored);
    tracing::info!(metering_point_id = %metering_point_id, stored, "stored consumption records");

    Ok(Json(json!({
        "success": true,
        "message": "Data stored successfully",
        "records": stored,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryParams {
    #[serde(default)]
    pub metering_point: Option<String>,
    #[serde(default)]
    pub period: Option<i64>,
}

/// Per-day totals over the trailing `period` days (default 30).
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Vec<DailySummary>>, ApiError> {
    let period_days = params.period.unwrap_or(DEFAULT_SUMMARY_DAYS);
    if period_days < 1 {
        return Err(ApiError::Validation(
            "period must be a positive number of days".to_string(),
        ));
    }

    let summaries = consumption_queries::daily_summary(
        &state.pool,
        params.metering_point.as_deref().filter(|p| !p.is_empty()),
        period_days,
    )
    .await?;

    Ok(Json(summaries))
}
