//! Model feature columns and the inference-time feature vector

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Columns the model consumes, named as in the feature table header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureColumn {
    Open,
    FngValue,
    PriceDiff,
    Rsi,
    Ma14,
    Me,
    MeImpact,
}

/// Column order the model was trained with
pub const FEATURE_ORDER: [FeatureColumn; 7] = [
    FeatureColumn::Open,
    FeatureColumn::FngValue,
    FeatureColumn::PriceDiff,
    FeatureColumn::Rsi,
    FeatureColumn::Ma14,
    FeatureColumn::Me,
    FeatureColumn::MeImpact,
];

/// Columns normalized by the scaler. Changing this requires refitting the scaler.
pub const CONTINUOUS_FEATURES: [FeatureColumn; 5] = [
    FeatureColumn::Open,
    FeatureColumn::FngValue,
    FeatureColumn::PriceDiff,
    FeatureColumn::Rsi,
    FeatureColumn::Ma14,
];

/// Flag/ordinal columns passed to the model unscaled
pub const CATEGORICAL_FEATURES: [FeatureColumn; 2] = [FeatureColumn::Me, FeatureColumn::MeImpact];

impl FeatureColumn {
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Open => "Open",
            FeatureColumn::FngValue => "fng_value",
            FeatureColumn::PriceDiff => "Price_diff",
            FeatureColumn::Rsi => "RSI",
            FeatureColumn::Ma14 => "MA_14",
            FeatureColumn::Me => "ME",
            FeatureColumn::MeImpact => "ME_Impact",
        }
    }

    pub fn is_continuous(self) -> bool {
        CONTINUOUS_FEATURES.contains(&self)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        FEATURE_ORDER.into_iter().find(|column| column.name() == name)
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A row could not produce a feature vector because a column is still null
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feature {column} is missing on {date}")]
pub struct FeatureGap {
    pub date: NaiveDate,
    pub column: FeatureColumn,
}

/// One row of model input, in `f64`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub open: f64,
    pub fng_value: f64,
    pub price_diff: f64,
    pub rsi: f64,
    pub ma_14: f64,
    pub me: f64,
    pub me_impact: f64,
}

impl FeatureVector {
    pub fn get(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::Open => self.open,
            FeatureColumn::FngValue => self.fng_value,
            FeatureColumn::PriceDiff => self.price_diff,
            FeatureColumn::Rsi => self.rsi,
            FeatureColumn::Ma14 => self.ma_14,
            FeatureColumn::Me => self.me,
            FeatureColumn::MeImpact => self.me_impact,
        }
    }

    /// Values in [`FEATURE_ORDER`]
    pub fn values(&self) -> [f64; 7] {
        FEATURE_ORDER.map(|column| self.get(column))
    }

    pub fn select(&self, columns: &[FeatureColumn]) -> Vec<f64> {
        columns.iter().map(|&column| self.get(column)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureVector {
        FeatureVector {
            open: 100.0,
            fng_value: 50.0,
            price_diff: 2.0,
            rsi: 60.0,
            ma_14: 98.0,
            me: 1.0,
            me_impact: 3.0,
        }
    }

    #[test]
    fn test_partition_covers_order() {
        let mut partitioned: Vec<_> = CONTINUOUS_FEATURES.to_vec();
        partitioned.extend(CATEGORICAL_FEATURES);
        assert_eq!(partitioned, FEATURE_ORDER.to_vec());
        assert!(!FeatureColumn::Me.is_continuous());
        assert!(FeatureColumn::Ma14.is_continuous());
    }

    #[test]
    fn test_values_follow_feature_order() {
        assert_eq!(sample().values(), [100.0, 50.0, 2.0, 60.0, 98.0, 1.0, 3.0]);
        assert_eq!(sample().select(&CATEGORICAL_FEATURES), vec![1.0, 3.0]);
    }

    #[test]
    fn test_column_names() {
        assert_eq!(FeatureColumn::from_name("MA_14"), Some(FeatureColumn::Ma14));
        assert_eq!(FeatureColumn::from_name("Close"), None);
        assert_eq!(FeatureColumn::FngValue.to_string(), "fng_value");
    }
}
