//! Good Air Day command-line interface.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod format;
mod util;

use cli::{Cli, Commands, OutputFormat};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let output = cli.output.as_ref();

    // --json overrides any per-command format flag
    let json = cli.json;
    let pick = move |format: OutputFormat| if json { OutputFormat::Json } else { format };

    match cli.command {
        Commands::Current { format } => {
            commands::current::cmd_current(&config, pick(format), output).await
        }
        Commands::Forecast { hours, format } => {
            commands::forecast::cmd_forecast(&config, hours, pick(format), output)
        }
        Commands::Traffic { format } => {
            commands::traffic::cmd_traffic(&config, pick(format), output).await
        }
        Commands::Weather { format } => {
            commands::weather::cmd_weather(&config, pick(format), output).await
        }
        Commands::Routes { format } => {
            commands::routes::cmd_routes(&config, pick(format), output).await
        }
        Commands::Emissions { format } => {
            commands::emissions::cmd_emissions(&config, pick(format), output).await
        }
        Commands::History { limit, csv } => {
            commands::history::cmd_history(&config, limit, csv, output, cli.quiet)
        }
        Commands::Clear { yes } => commands::clear::cmd_clear(&config, yes, cli.quiet),
        Commands::Set {
            threshold,
            interval,
        } => commands::set::cmd_set(&config, threshold, interval, cli.quiet),
        Commands::Watch { interval, count } => {
            commands::watch::cmd_watch(&config, interval, count, cli.quiet).await
        }
    }
}
