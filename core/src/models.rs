use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

/// Text layout used for the `date` column, both in the store and in exports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Weights are stored as tenths to keep decimal rounding out of the store.
pub const WEIGHT_SCALE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightRecord {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub weight_fixed: i64,
}

impl WeightRecord {
    /// Display value of the stored fixed-point weight.
    #[allow(clippy::cast_precision_loss)]
    pub fn weight(&self) -> f64 {
        self.weight_fixed as f64 / WEIGHT_SCALE
    }

    pub fn timestamp_text(&self) -> String {
        format_timestamp(self.timestamp)
    }
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. The fractional seconds are optional.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("enter a number with exactly one decimal place.")]
pub struct InvalidInputError;

/// Encode a `<digits>.<digit>` string as an integer number of tenths.
///
/// `"180.5"` becomes `1805`. Anything else is rejected, including `".5"`,
/// `"180"`, `"180.25"` and strings with whitespace or signs.
pub fn encode_weight(raw: &str) -> Result<i64, InvalidInputError> {
    let (whole, frac) = raw.split_once('.').ok_or(InvalidInputError)?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) || frac.len() != 1 {
        return Err(InvalidInputError);
    }

    format!("{whole}{frac}")
        .parse::<i64>()
        .map_err(|_| InvalidInputError)
}
