use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{WEIGHT_SCALE, WeightRecord};

pub const SHORT_WINDOW: usize = 5;
pub const LONG_WINDOW: usize = 10;

/// Trailing moving average over fixed-point weights, descaled to display
/// units.
///
/// Output has the same length as `series`. Element `i` averages
/// `series[i + 1 - window ..= i]`, or everything from the start while fewer
/// than `window` values are available. A zero window is treated as one.
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(window: usize, series: &[i64]) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(series.len());
    let mut sum: i128 = 0;

    for (i, &value) in series.iter().enumerate() {
        sum += i128::from(value);
        if i >= window {
            sum -= i128::from(series[i - window]);
        }
        let count = (i + 1).min(window);
        out.push(sum as f64 / count as f64 / WEIGHT_SCALE);
    }

    out
}

/// Three weight series aligned on the record timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    pub dates: Vec<NaiveDateTime>,
    pub raw: Vec<f64>,
    pub smoothed_5: Vec<f64>,
    pub smoothed_10: Vec<f64>,
}

impl TrendSeries {
    pub fn from_records(records: &[WeightRecord]) -> Self {
        let fixed: Vec<i64> = records.iter().map(|r| r.weight_fixed).collect();
        TrendSeries {
            dates: records.iter().map(|r| r.timestamp).collect(),
            raw: records.iter().map(WeightRecord::weight).collect(),
            smoothed_5: moving_average(SHORT_WINDOW, &fixed),
            smoothed_10: moving_average(LONG_WINDOW, &fixed),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Where a trend ends up: a chart file, a window, a test recorder.
pub trait ChartSink {
    fn render(&self, trend: &TrendSeries) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn approx_eq(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(values: &[i64]) -> f64 {
        values.iter().sum::<i64>() as f64 / values.len() as f64
    }

    #[test]
    fn test_moving_average_preserves_length() {
        let series: Vec<i64> = (0..23).map(|i| 1800 + i % 7).collect();
        for window in [0, 1, 2, 5, 10, 50] {
            assert_eq!(moving_average(window, &series).len(), series.len());
        }
        assert!(moving_average(5, &[]).is_empty());
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_moving_average_window_one_is_descaled_identity() {
        let series = vec![1805, 1802, 1798, 1790, 0, 12345];
        let expected: Vec<f64> = series.iter().map(|&x| x as f64 / 10.0).collect();
        assert!(approx_eq(&moving_average(1, &series), &expected));
    }

    #[test]
    fn test_moving_average_zero_window_behaves_as_one() {
        let series = vec![1805, 1802, 1798];
        assert_eq!(moving_average(0, &series), moving_average(1, &series));
    }

    #[test]
    fn test_moving_average_constant_series() {
        for window in [1, 3, 5, 10] {
            for n in [1, 4, 12] {
                let out = moving_average(window, &vec![1000; n]);
                assert_eq!(out, vec![100.0; n]);
            }
        }
    }

    #[test]
    fn test_moving_average_partial_windows_at_start() {
        let series = vec![1800, 1810, 1790, 1820];
        let out = moving_average(5, &series);
        assert!((out[0] - 180.0).abs() < 1e-9);
        assert!((out[1] - 180.5).abs() < 1e-9);
        assert!((out[2] - 180.0).abs() < 1e-9);
        assert!((out[3] - 180.5).abs() < 1e-9);
    }

    #[test]
    fn test_moving_average_full_window_slides() {
        let series: Vec<i64> = vec![1800, 1795, 1802, 1788, 1791, 1799, 1785, 1780, 1776, 1790];
        let out = moving_average(5, &series);
        let expected = mean(&series[3..8]) / 10.0;
        assert!((out[7] - expected).abs() < 1e-9);

        let long = moving_average(10, &series);
        assert!((long[9] - mean(&series) / 10.0).abs() < 1e-9);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_moving_average_large_weights_do_not_overflow() {
        let w = crate::models::encode_weight("922337203685477580.7").unwrap();
        let out = moving_average(5, &[w, w, w]);
        let expected = w as f64 / 10.0;
        for v in out {
            assert!(((v - expected) / expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_trend_series_from_records() {
        let records: Vec<WeightRecord> = [1805, 1802, 1798]
            .into_iter()
            .enumerate()
            .map(|(i, weight_fixed)| WeightRecord {
                id: i64::try_from(i).unwrap() + 1,
                timestamp: NaiveDate::from_ymd_opt(2024, 2, u32::try_from(i).unwrap() + 1)
                    .unwrap()
                    .and_hms_opt(7, 0, 0)
                    .unwrap(),
                weight_fixed,
            })
            .collect();

        let trend = TrendSeries::from_records(&records);
        assert_eq!(trend.len(), 3);
        assert!(approx_eq(&trend.raw, &[180.5, 180.2, 179.8]));
        assert!(approx_eq(&trend.smoothed_5, &[180.5, 180.35, 180.166_666_666_666_66]));
        assert_eq!(trend.smoothed_5, trend.smoothed_10);
        assert_eq!(trend.dates[2], records[2].timestamp);
    }

    #[test]
    fn test_trend_series_empty() {
        let trend = TrendSeries::from_records(&[]);
        assert!(trend.is_empty());
        assert_eq!(trend, TrendSeries::default());
    }
}
