//! Weighted basket composition
//!
//! Inner join of per-asset daily series on date; the composite open and
//! close are the weighted sums of the assets' values.

use crate::error::{ForecastError, Result};
use crate::log_metrics;
use basket_types::{Decimal, NaiveDate, PricePoint};
use std::collections::{BTreeMap, HashSet};

/// Daily series for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

#[derive(Debug, Default)]
struct Accumulator {
    open: Decimal,
    close: Decimal,
    assets: usize,
}

/// Compose the basket series, ascending by date.
///
/// Every weighted symbol must have a series; a date missing from any
/// series is dropped from the basket.
pub fn compose_basket(
    assets: &[AssetSeries],
    weights: &BTreeMap<String, Decimal>,
) -> Result<Vec<PricePoint>> {
    if weights.is_empty() {
        return Err(ForecastError::Configuration {
            message: "basket has no weighted assets".to_string(),
        });
    }

    let mut by_date: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();

    for (symbol, weight) in weights {
        if *weight <= Decimal::ZERO {
            return Err(ForecastError::Configuration {
                message: format!("weight for {} must be positive, got {}", symbol, weight),
            });
        }

        let series = assets
            .iter()
            .find(|series| &series.symbol == symbol)
            .ok_or_else(|| ForecastError::DataNotFound {
                message: format!("no price series for basket asset {}", symbol),
            })?;

        let mut seen = HashSet::with_capacity(series.points.len());
        for point in &series.points {
            if !seen.insert(point.date) {
                return Err(ForecastError::schema(format!(
                    "duplicate date {} in {} series",
                    point.date, symbol
                )));
            }

            let entry = by_date.entry(point.date).or_default();
            entry.open += point.open * *weight;
            entry.close += point.close * *weight;
            entry.assets += 1;
        }
    }

    let basket: Vec<PricePoint> = by_date
        .into_iter()
        .filter(|(_, acc)| acc.assets == weights.len())
        .map(|(date, acc)| PricePoint {
            date,
            open: acc.open,
            close: acc.close,
        })
        .collect();

    if basket.is_empty() {
        return Err(ForecastError::empty("basket assets share no common dates"));
    }

    log_metrics!(
        "Basket composed from {} assets: {} days ({} to {})",
        weights.len(),
        basket.len(),
        basket[0].date,
        basket[basket.len() - 1].date
    );

    Ok(basket)
}
