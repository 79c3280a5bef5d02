use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::WeightRecord;

pub const CSV_HEADER: [&str; 3] = ["id", "date", "weight"];

/// Write records as CSV. `weight` is the raw fixed-point integer, not the
/// decimal display value.
pub fn write_csv<W: Write>(records: &[WeightRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;
    for record in records {
        wtr.write_record([
            record.id.to_string(),
            record.timestamp_text(),
            record.weight_fixed.to_string(),
        ])
        .with_context(|| format!("Failed to write CSV row for record {}", record.id))?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Overwrites `destination` unconditionally.
pub fn export_csv(records: &[WeightRecord], destination: &Path) -> Result<()> {
    let file = File::create(destination)
        .with_context(|| format!("Failed to create export file: {}", destination.display()))?;
    write_csv(records, file)
        .with_context(|| format!("Failed to export to {}", destination.display()))
}
