//! Shared HTTP client built from `ConnectorConfig`.
//!
//! Wraps `reqwest::Client` and rebuilds it when configuration changes.
//! The client is safe to clone (internally `Arc`-ed) and can be shared
//! across upload tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::connector::ConnectorConfig;
use crate::errors::{Result, UploadError};

/// A shared HTTP client that rebuilds itself when `ConnectorConfig` changes.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<RwLock<reqwest::Client>>,
}

impl HttpClient {
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        let client = Self::build_client(config)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(client)),
        })
    }

    pub fn from_defaults() -> Result<Self> {
        Self::new(&ConnectorConfig::default())
    }

    /// Get a clone of the current `reqwest::Client`.
    pub async fn get_client(&self) -> reqwest::Client {
        self.inner.read().await.clone()
    }

    /// Rebuild the inner client from an updated `ConnectorConfig`.
    pub async fn update_from_config(&self, config: &ConnectorConfig) -> Result<()> {
        let new_client = Self::build_client(config)?;
        *self.inner.write().await = new_client;
        Ok(())
    }

    fn build_client(config: &ConnectorConfig) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout as u64))
            .connect_timeout(Duration::from_secs(config.connect_timeout as u64))
            .pool_max_idle_per_host(config.max_idle_conns_per_host as usize)
            .pool_idle_timeout(Duration::from_secs(config.idle_conn_timeout as u64))
            .user_agent(config.user_agent.clone());

        if config.accept_invalid_certs {
            tracing::warn!(
                upload_url = %config.upload_url,
                "TLS certificate validation is DISABLED for upload connections"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(UploadError::Http)
    }
}
