//! Fear-and-greed merge

use crate::error::{ForecastError, Result};
use crate::table::FeatureTable;
use basket_types::{Decimal, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

/// One day of the fear-and-greed index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentRecord {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Left join `fng_value` onto the table. Unmatched rows keep `None`.
///
/// A date listed twice in the sentiment source is rejected rather than
/// duplicating table rows.
pub fn merge_sentiment(table: &mut FeatureTable, records: &[SentimentRecord]) -> Result<usize> {
    let mut by_date: HashMap<NaiveDate, Decimal> = HashMap::with_capacity(records.len());
    for record in records {
        if by_date.insert(record.date, record.value).is_some() {
            return Err(ForecastError::schema(format!(
                "duplicate fear-and-greed date {}",
                record.date
            )));
        }
    }

    let mut matched = 0;
    for row in table.rows_mut() {
        row.fng_value = by_date.get(&row.date).copied();
        if row.fng_value.is_some() {
            matched += 1;
        }
    }

    debug!("Fear-and-greed matched {} of {} rows", matched, table.len());
    Ok(matched)
}
