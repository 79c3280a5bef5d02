use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, SubsecRound};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::models::{WeightRecord, format_timestamp, parse_timestamp};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.ensure_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.ensure_schema()?;
        Ok(db)
    }

    /// Runs on every open. The table layout matches snapshots written by
    /// earlier versions of the tracker, so there is nothing to migrate.
    fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS weights (
                    id integer PRIMARY KEY,
                    date timestamp NOT NULL,
                    weight integer NOT NULL
                );",
            )
            .context("Failed to create weights table")?;
        Ok(())
    }

    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close database")
    }

    fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<WeightRecord> {
        let date_str: String = row.get(1)?;
        let timestamp = parse_timestamp(&date_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                format!("unrecognised timestamp '{date_str}'").into(),
            )
        })?;
        Ok(WeightRecord {
            id: row.get(0)?,
            timestamp,
            weight_fixed: row.get(2)?,
        })
    }

    // --- Weights ---

    /// Append one record. The connection is in autocommit mode, so the row
    /// is durable once this returns.
    ///
    /// The stored text keeps microseconds; the returned record carries the
    /// same truncated timestamp that `scan_all` reads back.
    pub fn insert_weight(
        &self,
        timestamp: NaiveDateTime,
        weight_fixed: i64,
    ) -> Result<WeightRecord> {
        let timestamp = timestamp.trunc_subsecs(6);
        self.conn
            .execute(
                "INSERT INTO weights (date, weight) VALUES (?1, ?2)",
                params![format_timestamp(timestamp), weight_fixed],
            )
            .context("Failed to commit weight record")?;
        let id = self.conn.last_insert_rowid();
        debug!(id, weight_fixed, "inserted weight record");
        Ok(WeightRecord {
            id,
            timestamp,
            weight_fixed,
        })
    }

    pub fn scan_all(&self) -> Result<Vec<WeightRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, date, weight FROM weights ORDER BY id ASC")?;
        let records = stmt
            .query_map([], Self::record_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read weight records")?;
        Ok(records)
    }
}
