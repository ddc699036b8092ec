use clap::{Arg, ArgMatches, Command};

use super::Services;
use crate::config::settings::STRAVA_TOKEN_KEY;
use crate::errors::{Result, UploadError};
use crate::output;

pub fn token_command() -> Command {
    Command::new("token")
        .about("Manage the stored Strava access token")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("set")
                .about("Store an access token")
                .arg(Arg::new("token").required(true).help("Strava access token")),
        )
        .subcommand(Command::new("show").about("Show the stored token (masked)"))
        .subcommand(Command::new("clear").about("Remove the stored token"))
}

pub fn handle_token(matches: &ArgMatches, services: &Services) -> Result<()> {
    let settings = services.settings();
    match matches.subcommand() {
        Some(("set", sub)) => {
            let token = sub
                .get_one::<String>("token")
                .ok_or_else(|| UploadError::Command("missing token".into()))?;
            if token.is_empty() {
                return Err(UploadError::Command("token must not be empty".into()));
            }
            settings.set(STRAVA_TOKEN_KEY, token)?;
            output::success(&format!("Token saved to {}", settings.path().display()));
            Ok(())
        }
        Some(("show", _)) => {
            let token = settings.token()?;
            if services.json {
                println!("{}", serde_json::json!({ "token": output::mask_secret(&token) }));
            } else {
                println!("{}", output::mask_secret(&token));
            }
            Ok(())
        }
        Some(("clear", _)) => {
            if settings.remove(STRAVA_TOKEN_KEY)? {
                output::success("Token removed.");
            } else {
                output::info("No token was stored.");
            }
            Ok(())
        }
        _ => Err(UploadError::Command("expected one of: set, show, clear".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn services(tmp: &tempfile::TempDir) -> Services {
        Services::initialize(Some(tmp.path().to_path_buf()), false)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_set_show_clear() {
        let tmp = tempfile::TempDir::new().unwrap();
        let services = services(&tmp).await;

        let m = token_command().get_matches_from(["token", "set", "abcdef123456"]);
        handle_token(&m, &services).unwrap();
        assert_eq!(services.settings().token().unwrap(), "abcdef123456");

        let m = token_command().get_matches_from(["token", "show"]);
        handle_token(&m, &services).unwrap();

        let m = token_command().get_matches_from(["token", "clear"]);
        handle_token(&m, &services).unwrap();
        assert!(services.settings().token().is_err());
    }

    #[tokio::test]
    async fn test_show_without_token_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let services = services(&tmp).await;
        let m = token_command().get_matches_from(["token", "show"]);
        assert!(matches!(
            handle_token(&m, &services),
            Err(UploadError::Config(_))
        ));
    }

    #[test]
    fn test_token_requires_subcommand() {
        assert!(token_command().try_get_matches_from(["token"]).is_err());
    }
}
