//! Main store implementation.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

use goodair_types::{AirQualitySample, Pollutants, Settings, SAMPLE_WINDOW_CAP};

use crate::error::{Error, Result};
use crate::queries::SampleQuery;
use crate::schema;

/// SQLite-based store for the rolling sample window and user settings.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        // WAL mode for better concurrent read performance
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        // Initialize schema
        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }
}

// Sample operations
impl Store {
    /// Append a sample, then evict the oldest rows beyond the window
    /// capacity. After any number of appends the table holds at most
    /// [`SAMPLE_WINDOW_CAP`] rows.
    pub fn insert_sample(&mut self, sample: &AirQualitySample) -> Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO samples (captured_at, aqi, pm25, pm10, no2, o3, co)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                sample.timestamp.unix_timestamp(),
                sample.aqi,
                sample.pollutants.pm25,
                sample.pollutants.pm10,
                sample.pollutants.no2,
                sample.pollutants.o3,
                sample.pollutants.co,
            ],
        )?;
        let id = tx.last_insert_rowid();

        let evicted = tx.execute(
            "DELETE FROM samples WHERE id NOT IN
                (SELECT id FROM samples ORDER BY captured_at DESC, id DESC LIMIT ?1)",
            [SAMPLE_WINDOW_CAP as i64],
        )?;
        if evicted > 0 {
            debug!("Evicted {} samples beyond the rolling window", evicted);
        }

        tx.commit()?;
        Ok(id)
    }

    /// Query samples with filters.
    pub fn query_samples(&self, query: &SampleQuery) -> Result<Vec<AirQualitySample>> {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(since) = query.since {
            conditions.push("captured_at >= ?");
            params.push(Box::new(since.unix_timestamp()));
        }

        if let Some(until) = query.until {
            conditions.push("captured_at <= ?");
            params.push(Box::new(until.unix_timestamp()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order = if query.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT captured_at, aqi, pm25, pm10, no2, o3, co
             FROM samples {} ORDER BY captured_at {}, id {}",
            where_clause, order, order
        );

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let samples = stmt
            .query_map(params_ref.as_slice(), |row| {
                Ok(AirQualitySample {
                    timestamp: OffsetDateTime::from_unix_timestamp(row.get(0)?).unwrap(),
                    aqi: row.get::<_, i64>(1)? as u16,
                    pollutants: Pollutants {
                        pm25: row.get(2)?,
                        pm10: row.get(3)?,
                        no2: row.get(4)?,
                        o3: row.get(5)?,
                        co: row.get(6)?,
                    },
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(samples)
    }

    /// Get the most recent sample.
    pub fn latest_sample(&self) -> Result<Option<AirQualitySample>> {
        let query = SampleQuery::new().newest_first().limit(1);
        let mut samples = self.query_samples(&query)?;
        Ok(samples.pop())
    }

    /// Count stored samples.
    pub fn count_samples(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM samples", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Delete all samples and reset settings to defaults, atomically.
    pub fn clear(&mut self) -> Result<()> {
        let defaults = Settings::default();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM samples", [])?;
        tx.execute(
            "INSERT OR REPLACE INTO settings (id, notification_threshold, refresh_interval_ms)
             VALUES (1, ?1, ?2)",
            rusqlite::params![defaults.notification_threshold, defaults.refresh_interval_ms],
        )?;
        tx.commit()?;
        info!("Cleared sample window and reset settings to defaults");
        Ok(())
    }
}

// Settings operations
impl Store {
    /// Read settings, falling back to defaults when none are stored yet.
    pub fn settings(&self) -> Result<Settings> {
        let stored = self
            .conn
            .query_row(
                "SELECT notification_threshold, refresh_interval_ms FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok(Settings {
                        notification_threshold: row.get::<_, i64>(0)? as u16,
                        refresh_interval_ms: row.get::<_, i64>(1)? as u64,
                    })
                },
            )
            .optional()?;

        Ok(stored.unwrap_or_default())
    }

    /// Validate and persist settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the threshold is above
    /// [`goodair_types::MAX_AQI`] or the interval is not one of the
    /// supported values;
    /// nothing is written in that case.
    pub fn update_settings(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| Error::Validation(e.to_string()))?;

        self.conn.execute(
            "INSERT OR REPLACE INTO settings (id, notification_threshold, refresh_interval_ms)
             VALUES (1, ?1, ?2)",
            rusqlite::params![settings.notification_threshold, settings.refresh_interval_ms],
        )?;
        debug!(
            "Updated settings: threshold={}, interval={}ms",
            settings.notification_threshold, settings.refresh_interval_ms
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct CsvRow {
    timestamp: String,
    aqi: u16,
    pm25: f32,
    pm10: f32,
    no2: f32,
    o3: f32,
    co: f32,
}

// Export operations
impl Store {
    /// Write all stored samples as CSV, oldest first. Returns the number
    /// of rows written.
    pub fn export_csv<W: std::io::Write>(&self, writer: W) -> Result<usize> {
        let samples = self.query_samples(&SampleQuery::new())?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        for sample in &samples {
            csv_writer.serialize(CsvRow {
                timestamp: sample
                    .timestamp
                    .format(&time::format_description::well_known::Rfc3339)
                    .unwrap_or_else(|_| sample.timestamp.unix_timestamp().to_string()),
                aqi: sample.aqi,
                pm25: sample.pollutants.pm25,
                pm10: sample.pollutants.pm10,
                no2: sample.pollutants.no2,
                o3: sample.pollutants.o3,
                co: sample.pollutants.co,
            })?;
        }
        csv_writer.flush()?;

        Ok(samples.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goodair_types::MAX_AQI;
    use time::Duration;

    fn sample_at(offset_minutes: i64, aqi: u16) -> AirQualitySample {
        AirQualitySample {
            timestamp: OffsetDateTime::UNIX_EPOCH + Duration::minutes(offset_minutes),
            aqi,
            pollutants: Pollutants {
                pm25: 40.0,
                pm10: 90.0,
                no2: 20.0,
                o3: 10.0,
                co: 0.9,
            },
        }
    }

    #[test]
    fn test_insert_and_latest() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(store.latest_sample().unwrap().is_none());

        store.insert_sample(&sample_at(0, 90)).unwrap();
        store.insert_sample(&sample_at(5, 110)).unwrap();

        let latest = store.latest_sample().unwrap().unwrap();
        assert_eq!(latest.aqi, 110);
        assert_eq!(store.count_samples().unwrap(), 2);
    }

    #[test]
    fn test_window_cap_holds() {
        let mut store = Store::open_in_memory().unwrap();

        for i in 0..(SAMPLE_WINDOW_CAP as i64 + 50) {
            store.insert_sample(&sample_at(i * 5, 100)).unwrap();
        }

        assert_eq!(store.count_samples().unwrap(), SAMPLE_WINDOW_CAP as u64);

        // The survivors are the newest ones
        let oldest = store.query_samples(&SampleQuery::new().limit(1)).unwrap();
        assert_eq!(
            oldest[0].timestamp,
            OffsetDateTime::UNIX_EPOCH + Duration::minutes(50 * 5)
        );
    }

    #[test]
    fn test_range_query() {
        let mut store = Store::open_in_memory().unwrap();
        for i in 0..10 {
            store.insert_sample(&sample_at(i * 5, 100 + i as u16)).unwrap();
        }

        let since = OffsetDateTime::UNIX_EPOCH + Duration::minutes(20);
        let until = OffsetDateTime::UNIX_EPOCH + Duration::minutes(35);
        let samples = store
            .query_samples(&SampleQuery::new().since(since).until(until))
            .unwrap();

        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].aqi, 104);
        assert_eq!(samples[3].aqi, 107);
    }

    #[test]
    fn test_newest_first_ordering() {
        let mut store = Store::open_in_memory().unwrap();
        for i in 0..5 {
            store.insert_sample(&sample_at(i * 5, 100 + i as u16)).unwrap();
        }

        let samples = store
            .query_samples(&SampleQuery::new().newest_first().limit(2))
            .unwrap();
        assert_eq!(samples[0].aqi, 104);
        assert_eq!(samples[1].aqi, 103);
    }

    #[test]
    fn test_settings_default_and_update() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.settings().unwrap(), Settings::default());

        let custom = Settings {
            notification_threshold: 200,
            refresh_interval_ms: 60_000,
        };
        store.update_settings(&custom).unwrap();
        assert_eq!(store.settings().unwrap(), custom);
    }

    #[test]
    fn test_settings_validation_rejected() {
        let store = Store::open_in_memory().unwrap();

        let over = Settings {
            notification_threshold: MAX_AQI + 1,
            ..Settings::default()
        };
        assert!(matches!(
            store.update_settings(&over),
            Err(Error::Validation(_))
        ));

        let bad_interval = Settings {
            refresh_interval_ms: 1234,
            ..Settings::default()
        };
        assert!(matches!(
            store.update_settings(&bad_interval),
            Err(Error::Validation(_))
        ));

        // Nothing was persisted
        assert_eq!(store.settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_clear_resets_samples_and_settings() {
        let mut store = Store::open_in_memory().unwrap();
        store.insert_sample(&sample_at(0, 90)).unwrap();
        store
            .update_settings(&Settings {
                notification_threshold: 300,
                refresh_interval_ms: 600_000,
            })
            .unwrap();

        store.clear().unwrap();

        assert_eq!(store.count_samples().unwrap(), 0);
        assert_eq!(store.settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_csv_export() {
        let mut store = Store::open_in_memory().unwrap();
        store.insert_sample(&sample_at(0, 90)).unwrap();
        store.insert_sample(&sample_at(5, 120)).unwrap();

        let mut buf = Vec::new();
        let written = store.export_csv(&mut buf).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,aqi,pm25,pm10,no2,o3,co"
        );
        assert!(lines.next().unwrap().contains(",90,"));
        assert!(lines.next().unwrap().contains(",120,"));
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.db");

        let mut store = Store::open(&path).unwrap();
        store.insert_sample(&sample_at(0, 80)).unwrap();
        drop(store);

        // Reopen and read back
        let store = Store::open(&path).unwrap();
        assert_eq!(store.count_samples().unwrap(), 1);
    }
}
