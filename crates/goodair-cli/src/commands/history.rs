//! History command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};

use goodair_store::SampleQuery;

use crate::config::Config;
use crate::format::format_history_text;
use crate::util::{open_store, write_output};

pub fn cmd_history(
    config: &Config,
    limit: u32,
    csv: bool,
    output: Option<&PathBuf>,
    quiet: bool,
) -> Result<()> {
    let store = open_store(config)?;

    if csv {
        // CSV exports the full window; --limit applies to the table view
        let mut buf = Vec::new();
        let count = store
            .export_csv(&mut buf)
            .context("Failed to export history")?;
        let content = String::from_utf8(buf).context("Exported CSV was not valid UTF-8")?;
        write_output(output, &content)?;
        if !quiet {
            eprintln!("Exported {} samples", count);
        }
        return Ok(());
    }

    let mut query = SampleQuery::new();
    if limit > 0 {
        // Newest N, shown oldest first
        query = query.newest_first().limit(limit);
    }
    let mut samples = store.query_samples(&query)?;
    if limit > 0 {
        samples.reverse();
    }

    if samples.is_empty() {
        if !quiet {
            eprintln!("No samples stored yet");
        }
        return Ok(());
    }

    write_output(output, &format_history_text(&samples))
}
