//! Emissions command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;

use goodair_core::{ApiClient, emissions};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::format_emissions_text;
use crate::util::{resolve_location, write_output};

pub async fn cmd_emissions(
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let client = ApiClient::new()?;
    let api = config.api_config();
    let location = resolve_location(&client, config).await;

    let (summary, estimates) = emissions::fetch_estimates(&client, &api, &location)
        .await
        .context("Failed to estimate emissions")?;

    let content = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&json!({
                "density": summary.density,
                "estimates": estimates,
            }))? + "\n"
        }
        OutputFormat::Text => format_emissions_text(summary.density, &estimates),
    };

    write_output(output, &content)
}
