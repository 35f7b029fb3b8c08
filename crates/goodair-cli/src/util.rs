//! Shared helpers for command implementations.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use goodair_core::{ApiClient, LocationResolver};
use goodair_types::Location;

use crate::config::Config;

/// Write content to the output file, or stdout when none is given.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Resolve the location: a fixed config location wins, otherwise the
/// fallback chain runs (device position has no CLI tier, so this goes
/// straight to IP lookup and then the default city).
pub async fn resolve_location(client: &ApiClient, config: &Config) -> Location {
    if let Some(location) = config.fixed_location() {
        return location;
    }
    LocationResolver::new(client.clone(), config.api_config())
        .resolve()
        .await
}

/// Open the store at the configured path.
pub fn open_store(config: &Config) -> Result<goodair_store::Store> {
    let path = config.database_path();
    goodair_store::Store::open(&path)
        .with_context(|| format!("Failed to open database: {}", path.display()))
}
