//! Routes command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};

use goodair_core::{ApiClient, routes};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::format_routes_text;
use crate::util::{resolve_location, write_output};

pub async fn cmd_routes(
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let client = ApiClient::new()?;
    let api = config.api_config();
    let location = resolve_location(&client, config).await;

    let summary = routes::fetch_incidents(&client, &api, &location)
        .await
        .context("Failed to fetch traffic incidents")?;

    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&summary)? + "\n",
        OutputFormat::Text => format_routes_text(&summary),
    };

    write_output(output, &content)
}
