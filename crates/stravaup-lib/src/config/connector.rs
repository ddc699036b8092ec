use serde::{Deserialize, Serialize};

/// Strava's upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://www.strava.com/api/v3/uploads";

/// Tunables for the upload connector and the HTTP client behind it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectorConfig {
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
    /// Whole-request timeout in seconds.
    pub timeout: u32,
    #[serde(rename = "connectTimeout")]
    pub connect_timeout: u32,
    #[serde(rename = "idleConnTimeout")]
    pub idle_conn_timeout: u32,
    #[serde(rename = "maxIdleConnsPerHost")]
    pub max_idle_conns_per_host: u32,
    /// Skip TLS certificate validation. Off unless explicitly enabled.
    #[serde(rename = "acceptInvalidCerts")]
    pub accept_invalid_certs: bool,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.into(),
            timeout: 120,
            connect_timeout: 10,
            idle_conn_timeout: 90,
            max_idle_conns_per_host: 4,
            accept_invalid_certs: false,
            user_agent: concat!("stravaup/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}
