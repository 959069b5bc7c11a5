//! HTTP client for the Eloverblik customer API.

use std::time::{Duration, Instant};

use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use time::Date;

use consumption_store::Aggregation;

use crate::config::EloverblikConfig;
use crate::error::ApiError;

pub mod token;
pub mod types;

use types::{MeteringPointList, TimeSeriesRequest, TokenResponse};

pub struct EloverblikClient {
    http: reqwest::Client,
    base_url: String,
}

impl EloverblikClient {
    pub fn new(cfg: &EloverblikConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange a refresh token for a short-lived access token.
    pub async fn fetch_access_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        let response = self
            .send(
                "token",
                self.http
                    .get(format!("{}/token", self.base_url))
                    .header(AUTHORIZATION, format!("Bearer {refresh_token}")),
            )
            .await?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("token response decode failed: {e}")))?;

        Ok(body.result)
    }

    /// List the metering points visible to the access token. The payload is
    /// passed through to callers untouched.
    pub async fn metering_points(&self, access_token: &str) -> Result<Value, ApiError> {
        let response = self
            .send(
                "meteringpoints",
                self.http
                    .get(format!("{}/meteringpoints/meteringpoints", self.base_url))
                    .header(AUTHORIZATION, format!("Bearer {access_token}")),
            )
            .await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("meteringpoints response decode failed: {e}")))
    }

    /// Fetch time series for the given metering points and inclusive date
    /// range. The payload is passed through to callers untouched.
    pub async fn time_series(
        &self,
        access_token: &str,
        from: Date,
        to: Date,
        aggregation: Aggregation,
        metering_points: &[String],
    ) -> Result<Value, ApiError> {
        let url = format!(
            "{}/meterdata/gettimeseries/{}/{}/{}",
            self.base_url, from, to, aggregation
        );
        let body = TimeSeriesRequest {
            metering_points: MeteringPointList {
                metering_point: metering_points.to_vec(),
            },
        };

        let response = self
            .send(
                "gettimeseries",
                self.http
                    .post(url)
                    .header(AUTHORIZATION, format!("Bearer {access_token}"))
                    .json(&body),
            )
            .await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("gettimeseries response decode failed: {e}")))
    }

    async fn send(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let started = Instant::now();
        let result = request.send().await;
        metrics::histogram!("eloverblik_request_seconds").record(started.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            metrics::counter!("eloverblik_upstream_errors_total").increment(1);
            ApiError::Upstream(format!("{endpoint} request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            metrics::counter!("eloverblik_upstream_errors_total").increment(1);
            tracing::error!(endpoint, status = %status, body = %body, "eloverblik request failed");
            return Err(ApiError::Upstream(format!(
                "{endpoint} returned status {status}"
            )));
        }

        Ok(response)
    }
}
