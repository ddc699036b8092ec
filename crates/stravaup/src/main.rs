use std::path::PathBuf;

use stravaup_lib::cli::{build_cli, is_verbose};
use stravaup_lib::commands::{dispatch_command, Services};
use stravaup_lib::errors::{handle_command_error, handle_fatal, UploadError};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let verbose = is_verbose(&matches);
    stravaup_lib::logger::init(verbose);
    stravaup_lib::logger::set_verbose(verbose);

    let json = matches.get_flag("json");
    let config_dir = matches.get_one::<String>("config-dir").map(PathBuf::from);

    let services = match Services::initialize(config_dir, json).await {
        Ok(services) => services,
        Err(e) => handle_fatal(e),
    };

    match matches.subcommand() {
        Some((name, sub_matches)) => {
            tracing::debug!(command = name, "Executing command");
            if let Err(e) = dispatch_command(name, sub_matches, &services).await {
                handle_command_error(&e);
                std::process::exit(1);
            }
        }
        None => {
            if let Err(e) = build_cli().print_help().map_err(|e| {
                UploadError::Application(format!("Failed to print help: {e}"))
            }) {
                handle_fatal(e);
            }
        }
    }
}
