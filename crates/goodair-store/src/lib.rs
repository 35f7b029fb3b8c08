//! Local data persistence for Good Air Day.
//!
//! This crate provides SQLite-based storage for the dashboard's rolling
//! window of air-quality samples and the user's settings.
//!
//! # Features
//!
//! - Append-only sample window capped at 288 entries (24 h at 5-minute
//!   resolution); the oldest rows are evicted automatically
//! - Single-row settings table with range validation
//! - `clear()` wipes the window and resets settings in one transaction
//! - Time-range queries and CSV export
//!
//! # Example
//!
//! ```no_run
//! use goodair_store::{Store, SampleQuery};
//!
//! let store = Store::open_default()?;
//!
//! // Query the last 10 samples
//! let query = SampleQuery::new().newest_first().limit(10);
//! let samples = store.query_samples(&query)?;
//! # Ok::<(), goodair_store::Error>(())
//! ```

mod error;
mod queries;
mod schema;
mod store;

pub use error::{Error, Result};
pub use queries::SampleQuery;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/goodair/data.db`
/// - macOS: `~/Library/Application Support/goodair/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\goodair\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("goodair")
        .join("data.db")
}
