use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Application(String),

    #[error("Cloud error ({service}): {message}")]
    Cloud { service: String, message: String },

    #[error("Command error: {0}")]
    Command(String),
}

pub type Result<T> = std::result::Result<T, UploadError>;

/// Logs a fatal error and exits the process with code 1.
pub fn handle_fatal(err: UploadError) -> ! {
    tracing::error!("Fatal error: {}", err);
    std::process::exit(1)
}

/// Maps an `UploadError` to user-friendly CLI output with actionable suggestions.
pub fn handle_command_error(err: &UploadError) {
    use crate::output;

    match err {
        UploadError::Config(msg) => {
            output::error(&format!("Configuration error: {}", msg));
            if msg.contains("token") {
                output::info("Run `stravaup token set <TOKEN>` to store your Strava access token.");
            }
        }
        UploadError::Http(e) => {
            output::error(&format!("Network error: {}", e));
            output::info("Check your internet connection.");
        }
        UploadError::Cloud { service, message } => {
            output::error(&format!("{} error: {}", service, message));
            output::info("Check your network connection and access token.");
        }
        UploadError::Io(e) => {
            output::error(&format!("File error: {}", e));
        }
        UploadError::Command(msg) => {
            output::error(&format!("Error: {}", msg));
        }
        _ => {
            output::error(&format!("{}", err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = UploadError::Config("No authorisation token configured.".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: No authorisation token configured."
        );
    }

    #[test]
    fn test_application_error_is_verbatim() {
        let err = UploadError::Application("rate limit exceeded".into());
        assert_eq!(err.to_string(), "rate limit exceeded");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.tcx.gz");
        let err: UploadError = io.into();
        assert!(matches!(err, UploadError::Io(_)));
        assert!(err.to_string().contains("missing.tcx.gz"));
    }

    #[test]
    fn test_handle_command_error_does_not_panic() {
        handle_command_error(&UploadError::Config("no token".into()));
        handle_command_error(&UploadError::Command("unknown command".into()));
        handle_command_error(&UploadError::Cloud {
            service: "Strava".into(),
            message: "Authorization Error".into(),
        });
    }
}
