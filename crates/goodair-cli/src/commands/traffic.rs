//! Traffic command implementation.

use std::path::PathBuf;

use anyhow::Result;

use goodair_core::{ApiClient, traffic};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::format_traffic_text;
use crate::util::{resolve_location, write_output};

pub async fn cmd_traffic(
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let client = ApiClient::new()?;
    let api = config.api_config();
    let location = resolve_location(&client, config).await;

    let summary = traffic::fetch_flow_or_fallback(&client, &api, &location).await;

    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&summary)? + "\n",
        OutputFormat::Text => format_traffic_text(&summary),
    };

    write_output(output, &content)
}
