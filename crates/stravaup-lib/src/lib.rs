// stravaup-lib: Strava upload connector and the CLI plumbing around it

pub mod cli;
pub mod cloud;
pub mod commands;
pub mod config;
pub mod errors;
pub mod http_client;
pub mod logger;
pub mod notifications;
pub mod output;
