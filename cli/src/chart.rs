use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use plotters::prelude::*;
use tracing::info;

use weigh_core::trend::{ChartSink, TrendSeries};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Renders the trend as an SVG line chart: raw weights plus the 5- and
/// 10-point averages, dates on the x axis as `month-day`.
pub struct SvgChart {
    path: PathBuf,
    size: (u32, u32),
}

impl SvgChart {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            size: (1024, 640),
        }
    }
}

/// Fractional days since the epoch, so the x axis is a plain `f64` range.
#[allow(clippy::cast_precision_loss)]
fn to_day_number(ts: NaiveDateTime) -> f64 {
    let utc = ts.and_utc();
    utc.timestamp() as f64 / SECONDS_PER_DAY
        + f64::from(utc.timestamp_subsec_micros()) / (SECONDS_PER_DAY * 1e6)
}

fn day_label(day: f64) -> String {
    DateTime::from_timestamp((day * SECONDS_PER_DAY).round() as i64, 0)
        .map(|dt| dt.naive_utc().format("%-m-%d").to_string())
        .unwrap_or_default()
}

/// Min and max of all values, widened so flat or single-point data still
/// gets a visible range.
fn padded_bounds<'a>(values: impl Iterator<Item = &'a f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    (lo - pad, hi + pad)
}

impl ChartSink for SvgChart {
    fn render(&self, trend: &TrendSeries) -> Result<()> {
        if trend.is_empty() {
            info!("no records yet, skipping chart");
            return Ok(());
        }

        let xs: Vec<f64> = trend.dates.iter().copied().map(to_day_number).collect();
        let (x_min, x_max) = padded_bounds(xs.iter(), 0.5);
        let (y_min, y_max) = padded_bounds(
            trend
                .raw
                .iter()
                .chain(&trend.smoothed_5)
                .chain(&trend.smoothed_10),
            1.0,
        );

        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|x| day_label(*x))
            .y_label_formatter(&|y| format!("{y:.1}"))
            .draw()?;

        let lines: [(&[f64], &RGBColor, &str); 3] = [
            (trend.smoothed_5.as_slice(), &BLUE, "5-day average"),
            (trend.smoothed_10.as_slice(), &GREEN, "10-day average"),
            (trend.raw.as_slice(), &RED, "daily weights"),
        ];
        for (values, color, label) in lines {
            chart
                .draw_series(LineSeries::new(
                    xs.iter().copied().zip(values.iter().copied()),
                    color,
                ))?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()
            .with_context(|| format!("Failed to write chart: {}", self.path.display()))?;
        info!(path = %self.path.display(), points = trend.len(), "chart written");
        Ok(())
    }
}
