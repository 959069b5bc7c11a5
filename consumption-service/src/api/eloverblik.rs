use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::{parse_aggregation, parse_date, AppState};
use crate::eloverblik::types::OneOrMany;
use crate::error::ApiError;

/// Proxy the metering-point listing, passing the upstream payload through.
pub async fn metering_points(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let access_token = state.tokens.access_token().await?;
    let payload = state.client.metering_points(&access_token).await?;
    Ok(Json(payload))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRequest {
    #[serde(default)]
    pub metering_points: Option<OneOrMany>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub aggregation: Option<String>,
}

/// Proxy a time-series fetch. `meteringPoints` may be a single id or a
/// list; the upstream payload is passed through untouched.
pub async fn consumption(
    State(state): State<AppState>,
    Json(request): Json<ConsumptionRequest>,
) -> Result<Json<Value>, ApiError> {
    let metering_points = request.metering_points.filter(|p| !p.is_empty());
    let date_from = request.date_from.filter(|d| !d.is_empty());
    let date_to = request.date_to.filter(|d| !d.is_empty());

    let (Some(metering_points), Some(date_from), Some(date_to)) =
        (metering_points, date_from, date_to)
    else {
        return Err(ApiError::Validation(
            "Missing required parameters".to_string(),
        ));
    };

    let from = parse_date(&date_from, "dateFrom")?;
    let to = parse_date(&date_to, "dateTo")?;
    let aggregation = parse_aggregation(request.aggregation.as_deref())?;

    let access_token = state.tokens.access_token().await?;
    let payload = state
        .client
        .time_series(
            &access_token,
            from,
            to,
            aggregation,
            &metering_points.into_vec(),
        )
        .await?;

    Ok(Json(payload))
}
