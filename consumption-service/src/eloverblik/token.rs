//! Access-token lifecycle for the Eloverblik API.
//!
//! The upstream token endpoint does not report an expiry, so a fixed TTL is
//! assumed and the token is refreshed once it comes within the margin.
//! Concurrent requests may each trigger a refresh before the first write
//! lands; the duplicated upstream call is accepted and last write wins.

use std::sync::Arc;

use sqlx::PgPool;
use time::{Duration, OffsetDateTime};

use consumption_store::db::app_config;
use consumption_store::AppConfigRow;

use crate::eloverblik::EloverblikClient;
use crate::error::ApiError;

/// Assumed lifetime of an access token.
pub const ACCESS_TOKEN_TTL: Duration = Duration::hours(24);
/// A cached token this close to expiry is treated as expired.
pub const EXPIRY_MARGIN: Duration = Duration::minutes(5);

/// Outcome of the freshness check against the stored credential row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDecision {
    UseCached(String),
    Refresh { refresh_token: String },
}

/// Decide whether the cached access token is still usable at `now`.
pub fn decide(row: &AppConfigRow, now: OffsetDateTime) -> Result<TokenDecision, ApiError> {
    let refresh_token = row
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::NotConfigured)?;

    if let (Some(token), Some(expires_at)) = (&row.access_token, row.token_expires_at) {
        if expires_at > now + EXPIRY_MARGIN {
            return Ok(TokenDecision::UseCached(token.clone()));
        }
    }

    Ok(TokenDecision::Refresh {
        refresh_token: refresh_token.to_string(),
    })
}

#[derive(Clone)]
pub struct TokenManager {
    pool: PgPool,
    client: Arc<EloverblikClient>,
}

impl TokenManager {
    pub fn new(pool: PgPool, client: Arc<EloverblikClient>) -> Self {
        Self { pool, client }
    }

    /// Return a usable access token, refreshing and persisting one if the
    /// cached token is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, ApiError> {
        let row = app_config::fetch(&self.pool).await?;

        match decide(&row, OffsetDateTime::now_utc())? {
            TokenDecision::UseCached(token) => Ok(token),
            TokenDecision::Refresh { refresh_token } => {
                let token = self.client.fetch_access_token(&refresh_token).await?;
                let expires_at = OffsetDateTime::now_utc() + ACCESS_TOKEN_TTL;
                app_config::set_access_token(&self.pool, &token, expires_at).await?;

                metrics::counter!("eloverblik_token_refresh_total").increment(1);
                tracing::info!(expires_at = %expires_at, "refreshed eloverblik access token");
                Ok(token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn configured_row(access_token: Option<&str>, expires_at: Option<OffsetDateTime>) -> AppConfigRow {
        AppConfigRow {
            refresh_token: Some("refresh-token".to_string()),
            access_token: access_token.map(str::to_string),
            token_expires_at: expires_at,
        }
    }

    #[test]
    fn cached_token_is_used_while_clear_of_the_margin() {
        let now = datetime!(2024-01-01 12:00:00 UTC);
        let row = configured_row(Some("cached"), Some(datetime!(2024-01-01 12:05:01 UTC)));

        assert_eq!(
            decide(&row, now).unwrap(),
            TokenDecision::UseCached("cached".to_string())
        );
    }

    #[test]
    fn token_expiring_within_the_margin_is_refreshed() {
        let now = datetime!(2024-01-01 12:00:00 UTC);
        // Exactly at the margin boundary counts as expired.
        let row = configured_row(Some("cached"), Some(datetime!(2024-01-01 12:05:00 UTC)));

        assert_eq!(
            decide(&row, now).unwrap(),
            TokenDecision::Refresh {
                refresh_token: "refresh-token".to_string()
            }
        );
    }

    #[test]
    fn expired_token_is_refreshed() {
        let now = datetime!(2024-01-01 12:00:00 UTC);
        let row = configured_row(Some("cached"), Some(datetime!(2024-01-01 11:00:00 UTC)));

        assert!(matches!(
            decide(&row, now).unwrap(),
            TokenDecision::Refresh { .. }
        ));
    }

    #[test]
    fn missing_cached_token_is_refreshed() {
        let now = datetime!(2024-01-01 12:00:00 UTC);

        let row = configured_row(None, None);
        assert!(matches!(
            decide(&row, now).unwrap(),
            TokenDecision::Refresh { .. }
        ));

        // A token without a recorded expiry cannot be trusted either.
        let row = configured_row(Some("cached"), None);
        assert!(matches!(
            decide(&row, now).unwrap(),
            TokenDecision::Refresh { .. }
        ));
    }

    #[test]
    fn missing_refresh_token_is_not_configured() {
        let now = datetime!(2024-01-01 12:00:00 UTC);

        let row = AppConfigRow::default();
        assert!(matches!(
            decide(&row, now),
            Err(ApiError::NotConfigured)
        ));

        let row = AppConfigRow {
            refresh_token: Some(String::new()),
            ..AppConfigRow::default()
        };
        assert!(matches!(decide(&row, now), Err(ApiError::NotConfigured)));
    }
}
