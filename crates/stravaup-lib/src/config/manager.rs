//! `config.json` next to `settings.json` in the stravaup directory.
//!
//! The file holds a [`ConnectorConfig`]. Changes go through [`ConfigManager::set`]
//! or [`ConfigManager::reset`], which validate, write the file and rebuild the
//! bound [`HttpClient`] so later uploads see the new timeouts and TLS mode.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::RwLock;

use super::connector::ConnectorConfig;
use crate::errors::{Result, UploadError};
use crate::http_client::HttpClient;

/// `~/.stravaup`, or `/tmp/.stravaup` when `HOME` is unset.
pub fn default_config_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"));
    home.join(".stravaup")
}

pub struct ConfigManager {
    path: PathBuf,
    config: RwLock<ConnectorConfig>,
    http: RwLock<Option<HttpClient>>,
}

impl ConfigManager {
    /// Load `<dir>/config.json`.
    ///
    /// A missing file is written out with defaults. A file that doesn't parse
    /// is left alone for the user to fix and defaults are used for this run.
    pub async fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("config.json");
        let config = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "Ignoring unreadable config: {e}");
                ConnectorConfig::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let defaults = ConnectorConfig::default();
                save(&path, &defaults).await?;
                defaults
            }
            Err(e) => {
                return Err(UploadError::Config(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        validate(&config)?;

        Ok(Self {
            path,
            config: RwLock::new(config),
            http: RwLock::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn current(&self) -> ConnectorConfig {
        self.config.read().await.clone()
    }

    /// Rebuild `http` from the config after every successful change.
    pub async fn bind_http_client(&self, http: HttpClient) {
        *self.http.write().await = Some(http);
    }

    /// Change one key, addressed by its `config.json` name.
    ///
    /// Nothing is written unless the key exists and the resulting config is valid.
    pub async fn set(&self, key: &str, value: Value) -> Result<ConnectorConfig> {
        let mut fields = match serde_json::to_value(self.current().await)? {
            Value::Object(fields) => fields,
            _ => return Err(UploadError::Config("config is not a JSON object".into())),
        };
        match fields.get_mut(key) {
            Some(slot) => *slot = value,
            None => return Err(UploadError::Config(format!("Unknown config key: {key}"))),
        }
        let next: ConnectorConfig = serde_json::from_value(Value::Object(fields))
            .map_err(|e| UploadError::Config(format!("Invalid value for {key}: {e}")))?;

        self.commit(next.clone()).await?;
        Ok(next)
    }

    pub async fn reset(&self) -> Result<()> {
        self.commit(ConnectorConfig::default()).await
    }

    async fn commit(&self, next: ConnectorConfig) -> Result<()> {
        validate(&next)?;
        save(&self.path, &next).await?;
        if let Some(http) = self.http.read().await.as_ref() {
            http.update_from_config(&next).await?;
        }
        *self.config.write().await = next;
        Ok(())
    }
}

fn validate(config: &ConnectorConfig) -> Result<()> {
    if !(config.upload_url.starts_with("https://") || config.upload_url.starts_with("http://")) {
        return Err(UploadError::Config(format!(
            "uploadUrl must be an http(s) URL, got {:?}",
            config.upload_url
        )));
    }
    if config.timeout == 0 || config.connect_timeout == 0 {
        return Err(UploadError::Config("timeouts must be at least 1 second".into()));
    }
    Ok(())
}

async fn save(path: &Path, config: &ConnectorConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, serde_json::to_string_pretty(config)?).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_back(dir: &Path) -> ConnectorConfig {
        let text = std::fs::read_to_string(dir.join("config.json")).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_first_load_writes_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mgr = ConfigManager::load(tmp.path()).await.unwrap();
        assert_eq!(mgr.current().await, ConnectorConfig::default());
        assert_eq!(read_back(tmp.path()), ConnectorConfig::default());
    }

    #[tokio::test]
    async fn test_partial_file_fills_in_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("config.json"),
            r#"{"uploadUrl":"http://127.0.0.1:9/uploads","timeout":42}"#,
        )
        .unwrap();

        let cfg = ConfigManager::load(tmp.path()).await.unwrap().current().await;
        assert_eq!(cfg.upload_url, "http://127.0.0.1:9/uploads");
        assert_eq!(cfg.timeout, 42);
        assert_eq!(cfg.connect_timeout, ConnectorConfig::default().connect_timeout);
    }

    #[tokio::test]
    async fn test_unparseable_file_is_kept() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ timeout: 5").unwrap();

        let mgr = ConfigManager::load(tmp.path()).await.unwrap();
        assert_eq!(mgr.current().await, ConnectorConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ timeout: 5");
    }

    #[tokio::test]
    async fn test_set_persists_one_key() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mgr = ConfigManager::load(tmp.path()).await.unwrap();

        let cfg = mgr.set("acceptInvalidCerts", Value::Bool(true)).await.unwrap();
        assert!(cfg.accept_invalid_certs);
        assert_eq!(cfg.timeout, 120);
        assert_eq!(read_back(tmp.path()), cfg);
        assert_eq!(mgr.current().await, cfg);
    }

    #[tokio::test]
    async fn test_set_rejects_bad_input_without_writing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mgr = ConfigManager::load(tmp.path()).await.unwrap();

        let cases = [
            ("maxRetries", Value::from(3)),
            ("timeout", Value::from("soon")),
            ("timeout", Value::from(0)),
            ("uploadUrl", Value::from("ftp://example.test/uploads")),
        ];
        for (key, value) in cases {
            let err = mgr.set(key, value).await.unwrap_err();
            assert!(matches!(err, UploadError::Config(_)), "{key}: {err}");
        }
        assert_eq!(mgr.current().await, ConnectorConfig::default());
        assert_eq!(read_back(tmp.path()), ConnectorConfig::default());
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mgr = ConfigManager::load(tmp.path()).await.unwrap();
        mgr.set("timeout", Value::from(5)).await.unwrap();

        mgr.reset().await.unwrap();
        assert_eq!(mgr.current().await, ConnectorConfig::default());
        assert_eq!(read_back(tmp.path()), ConnectorConfig::default());
    }

    #[tokio::test]
    async fn test_bound_client_is_rebuilt() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mgr = ConfigManager::load(tmp.path()).await.unwrap();
        let http = HttpClient::new(&mgr.current().await).unwrap();
        mgr.bind_http_client(http.clone()).await;

        mgr.set("userAgent", Value::from("stravaup-test")).await.unwrap();
        let _client = http.get_client().await;
    }
}
