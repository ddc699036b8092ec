use std::sync::Arc;

use clap::{ArgMatches, Command};

use super::Services;
use crate::cloud::{CloudClient, StravaUploader};
use crate::errors::Result;
use crate::notifications::LogNotifier;
use crate::output;

pub fn open_command() -> Command {
    Command::new("open").about("Check that a Strava access token is configured")
}

pub async fn handle_open(_matches: &ArgMatches, services: &Services) -> Result<()> {
    let config = services.config_manager.current().await;
    let uploader = StravaUploader::with_http(
        services.http_client.clone(),
        &config,
        Arc::new(LogNotifier),
    )
    .with_settings(services.settings());

    uploader.authenticate().await?;
    if !services.json {
        output::success(&format!("{}: access token configured.", uploader.name()));
    }
    Ok(())
}
