//! Clear command implementation.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::config::Config;
use crate::util::open_store;

pub fn cmd_clear(config: &Config, yes: bool, quiet: bool) -> Result<()> {
    let mut store = open_store(config)?;
    let count = store.count_samples()?;

    if count == 0 && !quiet {
        eprintln!("The window is already empty; settings will still be reset");
    }

    if !yes && !confirm(count)? {
        eprintln!("Aborted");
        return Ok(());
    }

    store.clear()?;
    if !quiet {
        println!("Cleared {} samples and reset settings to defaults", count);
    }
    Ok(())
}

/// Ask for confirmation on stdin. Anything but "y"/"yes" aborts.
fn confirm(count: u64) -> Result<bool> {
    eprint!("Delete {} stored samples and reset settings? [y/N] ", count);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
