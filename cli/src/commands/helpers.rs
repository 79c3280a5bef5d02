use std::io::{self, BufRead, Write};

use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use weigh_core::models::WeightRecord;
use weigh_core::trend::TrendSeries;

pub(crate) const PROMPT_HINT: &str = "ONE DECIMAL PLACE EXACTLY (example: 100.0)";

/// Ask for a weight on stderr and read one line from stdin.
pub(crate) fn prompt_weight() -> Result<Option<String>> {
    let stdin = io::stdin();
    read_weight(&mut stdin.lock(), &mut io::stderr())
}

/// `None` for a blank line or end of input: nothing to record this run.
pub(crate) fn read_weight<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<Option<String>> {
    write!(out, "Weight: [{PROMPT_HINT}] ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

pub(crate) fn format_weight(v: f64) -> String {
    format!("{v:.1}")
}

pub(crate) fn print_records_table(records: &[WeightRecord]) {
    #[derive(Tabled)]
    struct RecordRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight")]
        weight: String,
    }

    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| RecordRow {
            id: r.id,
            date: r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            weight: format_weight(r.weight()),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_trend_table(trend: &TrendSeries) {
    #[derive(Tabled)]
    struct TrendRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight")]
        raw: String,
        #[tabled(rename = "5-day avg")]
        avg_5: String,
        #[tabled(rename = "10-day avg")]
        avg_10: String,
    }

    let rows: Vec<TrendRow> = (0..trend.len())
        .map(|i| TrendRow {
            date: trend.dates[i].format("%-m-%d").to_string(),
            raw: format_weight(trend.raw[i]),
            avg_5: format!("{:.2}", trend.smoothed_5[i]),
            avg_10: format!("{:.2}", trend.smoothed_10[i]),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}
