//! Key/value settings store backed by `settings.json`.
//!
//! Holds the Strava access token under [`STRAVA_TOKEN_KEY`]. Values are plain
//! JSON so other keys can live next to it without a schema change. A
//! non-empty [`TOKEN_ENV`] variable takes precedence over the stored token.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::errors::{Result, UploadError};

/// Well-known key of the Strava access token.
pub const STRAVA_TOKEN_KEY: &str = "strava_token";

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "STRAVA_TOKEN";

/// Message used whenever the token is absent or empty.
pub const NO_TOKEN_MESSAGE: &str = "No authorisation token configured.";

pub struct SettingsStore {
    path: PathBuf,
    token_env: &'static str,
}

impl SettingsStore {
    /// Open the store at `<dir>/settings.json`. The file is created lazily on first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("settings.json"),
            token_env: TOKEN_ENV,
        }
    }

    /// Read the token override from `var` instead of [`TOKEN_ENV`].
    pub fn with_token_env(mut self, var: &'static str) -> Self {
        self.token_env = var;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a string setting. Missing file, missing key and non-string values all yield `None`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.load()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    /// Store a string setting, creating the file and its directory as needed.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&map)
    }

    /// Remove a setting. Returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut map = self.load()?;
        let existed = map.remove(key).is_some();
        if existed {
            self.save(&map)?;
        }
        Ok(existed)
    }

    /// The Strava token in effect, or a configuration error when none is set.
    ///
    /// The environment override is checked first; an empty value there falls
    /// through to `settings.json`.
    pub fn token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(self.token_env) {
            if !token.is_empty() {
                tracing::debug!(var = self.token_env, "Using access token from environment");
                return Ok(token);
            }
        }
        match self.get(STRAVA_TOKEN_KEY)? {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(UploadError::Config(NO_TOKEN_MESSAGE.into())),
        }
    }

    fn load(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let data = std::fs::read_to_string(&self.path).map_err(|e| {
            UploadError::Config(format!(
                "Failed to read settings {}: {}",
                self.path.display(),
                e
            ))
        })?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(map) => Ok(map),
            _ => Err(UploadError::Config(format!(
                "Settings file {} is not a JSON object",
                self.path.display()
            ))),
        }
    }

    fn save(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                UploadError::Config(format!("Failed to create settings dir: {}", e))
            })?;
        }
        let data = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, data)
            .map_err(|e| UploadError::Config(format!("Failed to write settings: {}", e)))?;
        Ok(())
    }
}
