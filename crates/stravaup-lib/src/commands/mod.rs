pub mod config_cmd;
pub mod open;
pub mod token;
pub mod upload;

use std::path::PathBuf;
use std::sync::Arc;

use clap::ArgMatches;

use crate::config::manager::{default_config_dir, ConfigManager};
use crate::config::settings::SettingsStore;
use crate::errors::{Result, UploadError};
use crate::http_client::HttpClient;

/// Shared state handed to every command handler.
pub struct Services {
    pub config_manager: Arc<ConfigManager>,
    pub http_client: HttpClient,
    pub config_dir: PathBuf,
    pub json: bool,
}

impl Services {
    /// Load configuration from `config_dir` (or `~/.stravaup`) and build the HTTP client.
    pub async fn initialize(config_dir: Option<PathBuf>, json: bool) -> Result<Self> {
        let config_dir = config_dir.unwrap_or_else(default_config_dir);
        let config_manager = Arc::new(ConfigManager::load(&config_dir).await?);
        let http_client = HttpClient::new(&config_manager.current().await)?;
        config_manager.bind_http_client(http_client.clone()).await;

        Ok(Self {
            config_manager,
            http_client,
            config_dir,
            json,
        })
    }

    pub fn settings(&self) -> SettingsStore {
        SettingsStore::new(&self.config_dir)
    }
}

/// Route a parsed subcommand to its handler.
pub async fn dispatch_command(name: &str, matches: &ArgMatches, services: &Services) -> Result<()> {
    match name {
        "upload" => upload::handle_upload(matches, services).await,
        "open" => open::handle_open(matches, services).await,
        "token" => token::handle_token(matches, services),
        "config" => config_cmd::handle_config(matches, services).await,
        other => Err(UploadError::Command(format!("unknown command: {other}"))),
    }
}
