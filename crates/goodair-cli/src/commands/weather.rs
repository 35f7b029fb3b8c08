//! Weather command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};

use goodair_core::{ApiClient, weather};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::format_weather_text;
use crate::util::{resolve_location, write_output};

pub async fn cmd_weather(
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let client = ApiClient::new()?;
    let api = config.api_config();
    let location = resolve_location(&client, config).await;

    let observation = weather::fetch_current(&client, &api, &location)
        .await
        .context("Failed to fetch weather")?;

    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&observation)? + "\n",
        OutputFormat::Text => format_weather_text(&observation),
    };

    write_output(output, &content)
}
