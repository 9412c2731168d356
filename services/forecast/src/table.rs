//! Date-ordered feature table

use crate::error::{ForecastError, Result};
use basket_types::{FeatureRow, PricePoint};
use chrono::Datelike;

/// Feature rows sorted ascending by date, one row per date.
///
/// Every rolling computation walks `rows` in order, so the constructor is
/// the only place ordering and uniqueness are established.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(mut rows: Vec<FeatureRow>) -> Result<Self> {
        rows.sort_by_key(|row| row.date);

        if let Some(pair) = rows.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ForecastError::schema(format!(
                "duplicate date {} in feature table",
                pair[0].date
            )));
        }

        Ok(Self { rows })
    }

    pub fn from_prices(points: Vec<PricePoint>) -> Result<Self> {
        Self::new(points.into_iter().map(FeatureRow::from).collect())
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Mutable access for column builders; dates must not be changed
    pub(crate) fn rows_mut(&mut self) -> &mut [FeatureRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row
    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    /// Rows of one calendar year, ascending
    pub fn rows_in_year(&self, year: i32) -> impl Iterator<Item = &FeatureRow> {
        self.rows.iter().filter(move |row| row.date.year() == year)
    }

    /// Rows with every model feature available
    pub fn complete_rows(&self) -> impl Iterator<Item = &FeatureRow> {
        self.rows.iter().filter(|row| row.is_complete())
    }
}
