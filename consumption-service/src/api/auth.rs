use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use consumption_store::db::app_config;

use crate::api::AppState;
use crate::eloverblik::types::OneOrMany;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub configured: bool,
}

/// Whether a refresh token has been stored.
pub async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let configured = app_config::is_configured(&state.pool).await?;
    Ok(Json(StatusResponse { configured }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub metering_points: Option<OneOrMany>,
}

#[derive(Debug, Serialize)]
pub struct ConfigureResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Store the refresh token. Metering points are required in the request but
/// not persisted; data queries name their metering point per request.
pub async fn configure(
    State(state): State<AppState>,
    Json(request): Json<ConfigureRequest>,
) -> Result<Json<ConfigureResponse>, ApiError> {
    let refresh_token = request.refresh_token.filter(|t| !t.trim().is_empty());
    let metering_points = request.metering_points.filter(|p| !p.is_empty());

    let (Some(refresh_token), Some(_)) = (refresh_token, metering_points) else {
        return Err(ApiError::Validation(
            "Refresh token and metering points required".to_string(),
        ));
    };

    app_config::set_refresh_token(&state.pool, &refresh_token).await?;
    tracing::info!("stored new eloverblik refresh token");

    Ok(Json(ConfigureResponse {
        success: true,
        message: "Configuration saved",
    }))
}
