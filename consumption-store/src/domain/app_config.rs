use time::OffsetDateTime;

/// Credential state from the singleton `app_config` row.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct AppConfigRow {
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub token_expires_at: Option<OffsetDateTime>,
}
