use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use consumption_store::domain::ParseAggregationError;
use consumption_store::Aggregation;

use crate::config::SampleCredentials;
use crate::eloverblik::token::TokenManager;
use crate::eloverblik::EloverblikClient;
use crate::error::ApiError;

pub mod auth;
pub mod consumption;
pub mod demo;
pub mod eloverblik;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub client: Arc<EloverblikClient>,
    pub tokens: TokenManager,
    pub sample: Option<SampleCredentials>,
}

/// The full API surface. CORS is permissive so a separately served dashboard
/// can call the service directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/status", get(auth::status))
        .route("/api/auth/configure", post(auth::configure))
        .route("/api/consumption/data", get(consumption::data))
        .route("/api/consumption/store", post(consumption::store))
        .route("/api/consumption/summary", get(consumption::summary))
        .route("/api/eloverblik/metering-points", get(eloverblik::metering_points))
        .route("/api/eloverblik/consumption", post(eloverblik::consumption))
        .route("/api/test-data", get(demo::test_data))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` query or body field.
pub(crate) fn parse_date(value: &str, field: &str) -> Result<Date, ApiError> {
    Date::parse(value, DATE_FORMAT)
        .map_err(|_| ApiError::Validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

/// Parse an aggregation level, defaulting to hourly when absent.
pub(crate) fn parse_aggregation(value: Option<&str>) -> Result<Aggregation, ApiError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(Aggregation::default()),
        Some(raw) => raw
            .parse()
            .map_err(|e: ParseAggregationError| ApiError::Validation(e.to_string())),
    }
}

/// Interpret a calendar date as midnight UTC.
pub(crate) fn start_of_day(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}
