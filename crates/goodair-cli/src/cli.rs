//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use goodair_types::REFRESH_INTERVALS_MS;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "goodair")]
#[command(author, version, about = "CLI for the Good Air Day dashboard", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current air quality reading
    Current {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a synthetic hourly AQI forecast
    Forecast {
        /// Number of hourly points
        #[arg(long, default_value = "96")]
        hours: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show current traffic flow and density
    Traffic {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the current weather observation
    Weather {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show active traffic incidents as route segments
    Routes {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show per-vehicle-class CO2e emission estimates
    Emissions {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show stored samples from the local window
    History {
        /// Maximum number of samples to show (0 for all)
        #[arg(short, long, default_value = "0")]
        limit: u32,

        /// Export as CSV instead of a table
        #[arg(long)]
        csv: bool,
    },

    /// Clear stored samples and reset settings to defaults
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Update notification settings
    Set {
        /// Notification threshold (AQI, 0-500)
        #[arg(long)]
        threshold: Option<u16>,

        /// Refresh interval in milliseconds
        #[arg(long, value_parser = parse_refresh_interval)]
        interval: Option<u64>,
    },

    /// Continuously poll and store readings
    Watch {
        /// Polling interval in seconds
        #[arg(short, long, default_value = "300")]
        interval: u64,

        /// Number of readings to take before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,
    },
}

/// Parse a refresh interval, restricted to the dashboard's choices.
fn parse_refresh_interval(s: &str) -> Result<u64, String> {
    let ms: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if REFRESH_INTERVALS_MS.contains(&ms) {
        Ok(ms)
    } else {
        Err(format!(
            "Invalid interval '{}'. Valid values: {:?} milliseconds",
            ms, REFRESH_INTERVALS_MS
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_refresh_interval_accepts_choices() {
        assert_eq!(parse_refresh_interval("60000"), Ok(60_000));
        assert_eq!(parse_refresh_interval("3600000"), Ok(3_600_000));
    }

    #[test]
    fn test_parse_refresh_interval_rejects_other_values() {
        assert!(parse_refresh_interval("90000").is_err());
        assert!(parse_refresh_interval("abc").is_err());
    }
}
