//! Forecast output points

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

/// X-axis label of a forecast point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLabel {
    /// Offset from the last known row, rendered `"Day N"`
    Day(usize),
    /// Calendar date of a historical row
    Date(NaiveDate),
}

impl fmt::Display for PointLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointLabel::Day(offset) => write!(f, "Day {}", offset),
            PointLabel::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for PointLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One point of a forecast sequence.
///
/// Iterative forecasts set exactly one of `actual`/`predicted`; year
/// forecasts set `predicted` and, when the close is known, `actual`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    #[serde(rename = "name")]
    pub label: PointLabel,
    pub actual: Option<f64>,
    pub predicted: Option<f64>,
}

impl ForecastPoint {
    pub fn actual(label: PointLabel, value: f64) -> Self {
        Self {
            label,
            actual: Some(value),
            predicted: None,
        }
    }

    pub fn predicted(label: PointLabel, value: f64) -> Self {
        Self {
            label,
            actual: None,
            predicted: Some(value),
        }
    }

    /// Round both values to `decimals` places for presentation.
    ///
    /// Values are returned unchanged when `decimals` exceeds what `f64`
    /// can scale by.
    pub fn rounded(self, decimals: u32) -> Self {
        let factor = i32::try_from(decimals)
            .map(|exponent| 10f64.powi(exponent))
            .unwrap_or(f64::INFINITY);
        if !factor.is_finite() {
            return self;
        }
        let round = |value: f64| {
            let rounded = (value * factor).round() / factor;
            if rounded.is_finite() { rounded } else { value }
        };
        Self {
            label: self.label,
            actual: self.actual.map(round),
            predicted: self.predicted.map(round),
        }
    }
}
