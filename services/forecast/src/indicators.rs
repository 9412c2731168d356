//! Technical indicators for the feature table
//!
//! Streaming calculators fed in date order. Each returns `None` until its
//! window is full, which is how warm-up rows stay null in the table.

use crate::error::{ForecastError, Result};
use crate::log_metrics;
use crate::table::FeatureTable;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;

/// Simple Moving Average calculator
#[derive(Debug, Clone)]
pub struct MovingAverage {
    period: usize,
    values: VecDeque<Decimal>,
    sum: Decimal,
}

impl MovingAverage {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: dec!(0),
        }
    }

    /// Add a new value and return current MA
    pub fn update(&mut self, value: Decimal) -> Option<Decimal> {
        self.values.push_back(value);
        self.sum += value;

        // Remove old values if we exceed the period
        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        self.current()
    }

    /// Get current moving average without adding new value
    pub fn current(&self) -> Option<Decimal> {
        if self.is_ready() {
            Some(self.sum / Decimal::from(self.period))
        } else {
            None
        }
    }

    /// Check if indicator is ready (has enough data points)
    pub fn is_ready(&self) -> bool {
        self.period > 0 && self.values.len() == self.period
    }
}

/// Relative strength index over trailing simple averages of gains and losses
#[derive(Debug, Clone)]
pub struct RelativeStrength {
    gains: MovingAverage,
    losses: MovingAverage,
}

impl RelativeStrength {
    pub fn new(period: usize) -> Self {
        Self {
            gains: MovingAverage::new(period),
            losses: MovingAverage::new(period),
        }
    }

    /// Add one close-minus-open difference and return the RSI once warm
    pub fn update(&mut self, price_diff: Decimal) -> Option<Decimal> {
        let gain = price_diff.max(Decimal::ZERO);
        let loss = (-price_diff).max(Decimal::ZERO);

        match (self.gains.update(gain), self.losses.update(loss)) {
            (Some(avg_gain), Some(avg_loss)) => Some(rsi_from_averages(avg_gain, avg_loss)),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.gains.is_ready() && self.losses.is_ready()
    }
}

/// `100 - 100 / (1 + avg_gain / avg_loss)`. A window without losses is 100.
pub fn rsi_from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        return dec!(100);
    }

    let rs = avg_gain / avg_loss;
    dec!(100) - dec!(100) / (Decimal::ONE + rs)
}

/// Fill `Price_diff`, `RSI` and `MA_14` for every row of the table.
///
/// `window` applies to both rolling indicators; the first `window - 1` rows
/// keep `rsi`/`ma_14` as `None`.
pub fn apply_indicators(table: &mut FeatureTable, window: usize) -> Result<()> {
    if window == 0 {
        return Err(ForecastError::Configuration {
            message: "indicator window must be at least 1".to_string(),
        });
    }

    let mut moving_average = MovingAverage::new(window);
    let mut relative_strength = RelativeStrength::new(window);

    for row in table.rows_mut() {
        let price_diff = row.close - row.open;
        row.price_diff = Some(price_diff);
        row.rsi = relative_strength.update(price_diff);
        row.ma_14 = moving_average.update(row.close);
    }

    let warm_rows = table.rows().iter().filter(|row| row.ma_14.is_some()).count();
    log_metrics!(
        "Indicators computed over {} rows (window {}, {} warm)",
        table.len(),
        window,
        warm_rows
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use basket_types::{FeatureRow, NaiveDate};
    use chrono::Days;

    fn table_from(prices: &[(Decimal, Decimal)]) -> FeatureTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = prices
            .iter()
            .enumerate()
            .map(|(i, (open, close))| {
                FeatureRow::new(start + Days::new(i as u64), *open, *close)
            })
            .collect();
        FeatureTable::new(rows).unwrap()
    }

    #[test]
    fn test_moving_average() {
        let mut ma = MovingAverage::new(3);

        assert_eq!(ma.update(dec!(10)), None); // Not enough data
        assert_eq!(ma.update(dec!(20)), None); // Still not enough
        assert_eq!(ma.update(dec!(30)), Some(dec!(20))); // (10+20+30)/3 = 20
        assert_eq!(ma.update(dec!(40)), Some(dec!(30))); // (20+30+40)/3 = 30
        assert_eq!(ma.current(), Some(dec!(30)));
    }

    #[test]
    fn test_rsi_without_losses_is_100() {
        assert_eq!(rsi_from_averages(dec!(2), dec!(0)), dec!(100));
        assert_eq!(rsi_from_averages(dec!(0), dec!(0)), dec!(100));
    }

    #[test]
    fn test_rsi_balanced_is_50() {
        assert_eq!(rsi_from_averages(dec!(1.5), dec!(1.5)), dec!(50));
        // RS = 3 -> 100 - 100/4
        assert_eq!(rsi_from_averages(dec!(3), dec!(1)), dec!(75));
    }

    #[test]
    fn test_relative_strength_window() {
        let mut rsi = RelativeStrength::new(2);

        assert_eq!(rsi.update(dec!(2)), None);
        assert!(!rsi.is_ready());
        // gains [2, 0] losses [0, 2] -> RS 1
        assert_eq!(rsi.update(dec!(-2)), Some(dec!(50)));
        // gains [0, 4] losses [2, 0] -> RS 2
        let value = rsi.update(dec!(4)).unwrap();
        assert_eq!(value.round_dp(6), dec!(66.666667));
    }

    #[test]
    fn test_apply_indicators_marks_warm_up() {
        let prices: Vec<(Decimal, Decimal)> = (0..5)
            .map(|i| (Decimal::from(100 + i), Decimal::from(101 + i)))
            .collect();
        let mut table = table_from(&prices);

        apply_indicators(&mut table, 3).unwrap();

        let rows = table.rows();
        assert!(rows.iter().all(|row| row.price_diff == Some(dec!(1))));
        assert_eq!(rows[0].ma_14, None);
        assert_eq!(rows[1].rsi, None);
        assert_eq!(rows[2].ma_14, Some(dec!(102))); // (101+102+103)/3
        assert_eq!(rows[2].rsi, Some(dec!(100))); // only gains
        assert_eq!(rows[4].ma_14, Some(dec!(104)));
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut table = table_from(&[(dec!(1), dec!(2))]);
        assert!(apply_indicators(&mut table, 0).is_err());
    }
}
