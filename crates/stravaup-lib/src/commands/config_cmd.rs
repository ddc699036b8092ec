//! Config CLI command — view and modify configuration.
//!
//! Subcommands: show, set, reset, path.
//! Named `config_cmd` to avoid conflict with the `config` module.

use clap::{Arg, ArgMatches, Command};
use serde_json::Value;

use super::Services;
use crate::errors::{Result, UploadError};
use crate::output;

pub fn config_command() -> Command {
    Command::new("config")
        .aliases(["c", "conf"])
        .about("Show or change connector configuration")
        .subcommand(Command::new("show").about("Print the current configuration"))
        .subcommand(
            Command::new("set")
                .about("Change one configuration key")
                .arg(Arg::new("key").required(true).help("Key, e.g. acceptInvalidCerts"))
                .arg(Arg::new("value").required(true).help("New value (JSON or plain text)")),
        )
        .subcommand(Command::new("reset").about("Restore default configuration"))
        .subcommand(Command::new("path").about("Print the configuration file path"))
}

/// Interpret a command-line value: valid JSON is taken as-is, anything else as a string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub async fn handle_config(matches: &ArgMatches, services: &Services) -> Result<()> {
    let mgr = &services.config_manager;
    match matches.subcommand() {
        Some(("set", sub)) => {
            let key = sub
                .get_one::<String>("key")
                .ok_or_else(|| UploadError::Command("missing key".into()))?;
            let raw = sub
                .get_one::<String>("value")
                .ok_or_else(|| UploadError::Command("missing value".into()))?;

            let config = mgr.set(key, parse_value(raw)).await?;

            if key == "acceptInvalidCerts" && config.accept_invalid_certs {
                output::warning("TLS certificate validation is now disabled for uploads.");
            }
            output::success(&format!("{key} updated"));
            Ok(())
        }
        Some(("reset", _)) => {
            mgr.reset().await?;
            output::success("Configuration reset to defaults");
            Ok(())
        }
        Some(("path", _)) => {
            println!("{}", mgr.path().display());
            Ok(())
        }
        _ => {
            let config = mgr.current().await;
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| UploadError::Config(format!("Failed to serialize config: {}", e)))?;
            println!("{}", json);
            Ok(())
        }
    }
}
