use anyhow::Result;

use weigh_core::service::Tracker;
use weigh_core::sync::SyncOutcome;
use weigh_core::trend::{ChartSink, TrendSeries};

use super::helpers::{format_weight, print_records_table, print_trend_table};

/// Record `input` if there is any, then refresh the CSV export and the chart.
pub(crate) fn cmd_run(tracker: &Tracker, chart: &dyn ChartSink, input: Option<&str>) -> Result<()> {
    let report = tracker.run(input, chart)?;
    let config = tracker.config();

    if report.sync == SyncOutcome::NotFound {
        eprintln!("No remote store found, starting a new one.");
    }

    match report.added {
        Some(record) => println!(
            "Added {} (entry {}). Saving updated CSV.",
            format_weight(record.weight()),
            record.id
        ),
        None => println!("No data to add. Saving CSV."),
    }

    println!(
        "Exported {} entries to {}",
        report.record_count,
        config.export_path.display()
    );
    if report.record_count > 0 {
        println!("Chart written to {}", config.chart_path.display());
    }

    Ok(())
}

pub(crate) fn cmd_history(tracker: &Tracker, json: bool) -> Result<()> {
    tracker.pull()?;
    let records = tracker.records()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        eprintln!("No weight entries found. Use `weigh log <WEIGHT>` to record one.");
    } else {
        print_records_table(&records);
    }

    Ok(())
}

pub(crate) fn cmd_trend(tracker: &Tracker, json: bool) -> Result<()> {
    tracker.pull()?;
    let trend = TrendSeries::from_records(&tracker.records()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
    } else if trend.is_empty() {
        eprintln!("No weight entries found. Use `weigh log <WEIGHT>` to record one.");
    } else {
        print_trend_table(&trend);
    }

    Ok(())
}
