use anyhow::Result;
use chrono::Local;
use tracing::info;

use crate::config::TrackerConfig;
use crate::db::Database;
use crate::export;
use crate::models::{WeightRecord, encode_weight};
use crate::sync::{self, BlobStore, SyncOutcome};
use crate::trend::{ChartSink, TrendSeries};

/// What a single run did, for the caller to report.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub sync: SyncOutcome,
    pub added: Option<WeightRecord>,
    pub record_count: usize,
}

/// The tracker pipeline: sync, store, export, chart.
///
/// Each operation opens the store it needs and closes it before returning.
/// With no remote the tracker works on the local file only.
pub struct Tracker<'a> {
    config: TrackerConfig,
    remote: Option<&'a dyn BlobStore>,
}

impl<'a> Tracker<'a> {
    pub fn new(config: TrackerConfig, remote: Option<&'a dyn BlobStore>) -> Self {
        Self { config, remote }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn pull(&self) -> Result<SyncOutcome> {
        match self.remote {
            Some(remote) => {
                sync::pull_snapshot(remote, &self.config.remote_name, &self.config.store_path)
            }
            None => Ok(SyncOutcome::Offline),
        }
    }

    pub fn push(&self) -> Result<()> {
        match self.remote {
            Some(remote) => {
                sync::push_snapshot(remote, &self.config.remote_name, &self.config.store_path)
            }
            None => Ok(()),
        }
    }

    /// Validate, append, close, upload. Assumes `pull` already ran this
    /// invocation.
    #[cfg(test)]
    fn record(&self, raw: &str) -> Result<WeightRecord> {
        let weight_fixed = encode_weight(raw)?;
        self.insert(weight_fixed)
    }

    fn insert(&self, weight_fixed: i64) -> Result<WeightRecord> {
        let db = Database::open(&self.config.store_path)?;
        let record = db.insert_weight(Local::now().naive_local(), weight_fixed)?;
        db.close()?;
        self.push()?;
        info!(id = record.id, weight_fixed, "recorded weight");
        Ok(record)
    }

    pub fn records(&self) -> Result<Vec<WeightRecord>> {
        let db = Database::open(&self.config.store_path)?;
        let records = db.scan_all()?;
        db.close()?;
        Ok(records)
    }

    pub fn export(&self, records: &[WeightRecord]) -> Result<()> {
        export::export_csv(records, &self.config.export_path)?;
        info!(path = %self.config.export_path.display(), rows = records.len(), "exported csv");
        Ok(())
    }

    /// One full invocation. Blank input means nothing new to record; any
    /// other input goes to the encoder as given.
    ///
    /// Input is encoded before the remote is contacted, so rejected input
    /// changes nothing locally or remotely.
    pub fn run(&self, input: Option<&str>, chart: &dyn ChartSink) -> Result<RunReport> {
        let weight_fixed = match input.filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(encode_weight(raw)?),
            None => None,
        };

        let sync = self.pull()?;
        let added = weight_fixed.map(|w| self.insert(w)).transpose()?;

        let records = self.records()?;
        self.export(&records)?;
        chart.render(&TrendSeries::from_records(&records))?;

        Ok(RunReport {
            sync,
            added,
            record_count: records.len(),
        })
    }
}
