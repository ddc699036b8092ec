use crate::commands::{config_cmd, open, token, upload};

/// Creates the root clap Command with global `--verbose` and `--json` flags.
///
/// When combined with `--json`, verbose output is suppressed to keep JSON clean.
pub fn create_root_command() -> clap::Command {
    clap::Command::new("stravaup")
        .about("Upload activity files to Strava")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(clap::ArgAction::SetTrue)
                .help("Enable verbose output"),
        )
        .arg(
            clap::Arg::new("json")
                .long("json")
                .global(true)
                .action(clap::ArgAction::SetTrue)
                .help("Output in JSON format"),
        )
        .arg(
            clap::Arg::new("config-dir")
                .long("config-dir")
                .global(true)
                .value_name("DIR")
                .help("Directory holding config.json and settings.json (default ~/.stravaup)"),
        )
}

/// Root command with every subcommand attached.
pub fn build_cli() -> clap::Command {
    create_root_command()
        .subcommand(upload::upload_command())
        .subcommand(open::open_command())
        .subcommand(token::token_command())
        .subcommand(config_cmd::config_command())
}

/// Returns whether verbose mode is active based on parsed matches.
pub fn is_verbose(matches: &clap::ArgMatches) -> bool {
    let verbose = matches.get_flag("verbose");
    let json = matches.get_flag("json");
    verbose && !json
}
