//! Price points and feature-table rows

use crate::features::{FeatureColumn, FeatureGap, FeatureVector};
use crate::severity::Severity;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Daily open/close for one asset or for the composite basket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Decimal,
    pub close: Decimal,
}

/// One calendar date of the feature table.
///
/// Derived columns stay `None` until they are computed, and rolling
/// indicators stay `None` for their warm-up rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub open: Decimal,
    pub close: Decimal,
    pub price_diff: Option<Decimal>,
    pub fng_value: Option<Decimal>,
    pub rsi: Option<Decimal>,
    pub ma_14: Option<Decimal>,
    pub event: Option<Severity>,
}

impl FeatureRow {
    pub fn new(date: NaiveDate, open: Decimal, close: Decimal) -> Self {
        Self {
            date,
            open,
            close,
            price_diff: None,
            fng_value: None,
            rsi: None,
            ma_14: None,
            event: None,
        }
    }

    /// `ME` flag: 1 when a major event is recorded for this date
    pub fn me(&self) -> u8 {
        u8::from(self.event.is_some())
    }

    /// `ME_Impact` ordinal, 0 without an event
    pub fn me_impact(&self) -> u8 {
        self.event.map(Severity::ordinal).unwrap_or(0)
    }

    /// True once every model feature is available
    pub fn is_complete(&self) -> bool {
        self.feature_vector().is_ok()
    }

    /// Convert to model input. Fails on the first null feature.
    pub fn feature_vector(&self) -> Result<FeatureVector, FeatureGap> {
        Ok(FeatureVector {
            open: self.require(FeatureColumn::Open, Some(self.open))?,
            fng_value: self.require(FeatureColumn::FngValue, self.fng_value)?,
            price_diff: self.require(FeatureColumn::PriceDiff, self.price_diff)?,
            rsi: self.require(FeatureColumn::Rsi, self.rsi)?,
            ma_14: self.require(FeatureColumn::Ma14, self.ma_14)?,
            me: f64::from(self.me()),
            me_impact: f64::from(self.me_impact()),
        })
    }

    fn require(&self, column: FeatureColumn, value: Option<Decimal>) -> Result<f64, FeatureGap> {
        value
            .and_then(|v| v.to_f64())
            .ok_or(FeatureGap {
                date: self.date,
                column,
            })
    }
}

impl From<PricePoint> for FeatureRow {
    fn from(point: PricePoint) -> Self {
        FeatureRow::new(point.date, point.open, point.close)
    }
}
