use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EloverblikConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Optional credentials for the /api/test-data diagnostic route. The
    /// regular routes use the refresh token stored in the database instead.
    pub refresh_token: Option<String>,
    pub metering_point: Option<String>,
}

impl Default for EloverblikConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            refresh_token: None,
            metering_point: None,
        }
    }
}

/// Refresh token and metering point for the diagnostic route, present only
/// when both are configured and non-empty.
#[derive(Debug, Clone)]
pub struct SampleCredentials {
    pub refresh_token: String,
    pub metering_point: String,
}

impl EloverblikConfig {
    pub fn sample_credentials(&self) -> Option<SampleCredentials> {
        match (&self.refresh_token, &self.metering_point) {
            (Some(token), Some(point)) if !token.is_empty() && !point.is_empty() => {
                Some(SampleCredentials {
                    refresh_token: token.clone(),
                    metering_point: point.clone(),
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub eloverblik: EloverblikConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path =
            env::var("CONSUMPTION_CONFIG").unwrap_or_else(|_| "consumption-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_base_url() -> String {
    "https://api.eloverblik.dk/customerapi/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}
