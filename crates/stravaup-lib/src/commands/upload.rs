//! `upload` command: send one activity file to Strava and wait for the verdict.

use std::path::Path;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};

use super::Services;
use crate::cloud::{ActivityKind, StravaUploader, UploadRequest};
use crate::errors::{Result, UploadError};
use crate::http_client::HttpClient;
use crate::notifications::{ChannelNotifier, LogNotifier, NotifierSet};
use crate::output;

pub fn upload_command() -> Command {
    Command::new("upload")
        .about("Upload a gzip-compressed TCX activity file")
        .arg(
            Arg::new("file")
                .required(true)
                .value_name("FILE")
                .help("Activity file (.tcx.gz)"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .short('n')
                .help("Activity name shown on Strava (default: file name)"),
        )
        .arg(
            Arg::new("kind")
                .long("kind")
                .short('k')
                .default_value("ride")
                .value_parser(["ride", "run", "swim"])
                .help("Activity type"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .help("Access token to use instead of the stored one"),
        )
        .arg(
            Arg::new("insecure")
                .long("insecure")
                .action(ArgAction::SetTrue)
                .help("Accept invalid TLS certificates for this upload"),
        )
}

/// Activity name derived from a path: the file name without `.gz` / `.tcx`.
pub fn default_activity_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let trimmed = file_name.strip_suffix(".gz").unwrap_or(&file_name);
    let trimmed = trimmed
        .strip_suffix(".tcx")
        .or_else(|| trimmed.strip_suffix(".TCX"))
        .unwrap_or(trimmed);
    trimmed.to_string()
}

/// `--token` if given, else whatever the settings store resolves.
fn resolve_token(matches: &ArgMatches, services: &Services) -> Result<String> {
    match matches.get_one::<String>("token") {
        Some(token) => Ok(token.clone()),
        None => services.settings().token(),
    }
}

pub async fn handle_upload(matches: &ArgMatches, services: &Services) -> Result<()> {
    let file = matches
        .get_one::<String>("file")
        .ok_or_else(|| UploadError::Command("missing FILE argument".into()))?;
    let path = Path::new(file);
    let kind: ActivityKind = matches
        .get_one::<String>("kind")
        .map(|k| k.parse())
        .transpose()?
        .unwrap_or_default();
    let name = matches
        .get_one::<String>("name")
        .cloned()
        .unwrap_or_else(|| default_activity_name(path));

    let token = resolve_token(matches, services)?;

    if !file.ends_with(".gz") && !services.json {
        output::warning("File does not end in .gz; Strava expects gzip-compressed TCX.");
    }
    let payload = tokio::fs::read(path).await?;

    let mut config = services.config_manager.current().await;
    let http = if matches.get_flag("insecure") {
        config.accept_invalid_certs = true;
        HttpClient::new(&config)?
    } else {
        services.http_client.clone()
    };

    let (channel, mut rx) = ChannelNotifier::new();
    let notifier = NotifierSet::new().with(LogNotifier).with(channel);
    let uploader = StravaUploader::with_http(http, &config, Arc::new(notifier));

    let pending = uploader.submit_upload(UploadRequest::new(token, payload, &name, kind))?;
    tracing::info!(handle = %pending.handle, name = %pending.remote_name, "Upload submitted");

    let completion = rx.recv().await.ok_or_else(|| {
        UploadError::Application("upload finished without reporting a result".into())
    })?;

    if services.json {
        println!("{}", serde_json::to_string_pretty(&completion)?);
    }

    if completion.outcome.success {
        if !services.json {
            match completion.outcome.upload_id {
                Some(id) => output::success(&format!(
                    "{}: {} (upload id {})",
                    completion.remote_name,
                    completion.message(),
                    id
                )),
                None => output::success(&format!(
                    "{}: {}",
                    completion.remote_name,
                    completion.message()
                )),
            }
        }
        Ok(())
    } else {
        Err(UploadError::Cloud {
            service: "Strava".into(),
            message: completion.outcome.message,
        })
    }
}
