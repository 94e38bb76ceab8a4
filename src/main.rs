#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use sysops_agent::Config;
use sysops_agent::app::dispatch::{dispatch, usage_exit};
use sysops_agent::cli::Cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };
    config.apply_env_overrides();
    Ok(config)
}

fn log_level(verbose: u8, configured: &str) -> Level {
    match verbose {
        0 => configured.parse().unwrap_or(Level::WARN),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if let Some(code) = usage_exit(&cli) {
        return Ok(code);
    }
    let config = load_config(&cli)?;

    // stdout carries protocol traffic in serve mode, so logs go to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose, &config.log_level))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install log subscriber: {e}");
    }

    dispatch(cli, config).await
}
