//! Major-event merge
//!
//! Left join of dated events onto the feature table. Dates without an event
//! resolve to `ME = 0, ME_Impact = 0`.

use crate::table::FeatureTable;
use basket_types::{NaiveDate, Severity};
use std::collections::HashMap;
use tracing::debug;

/// One row of the event source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub date: NaiveDate,
    pub severity: Severity,
}

/// Collapse events to one severity per date; the highest severity wins
pub fn severity_by_date(events: &[EventRecord]) -> HashMap<NaiveDate, Severity> {
    let mut by_date: HashMap<NaiveDate, Severity> = HashMap::with_capacity(events.len());
    for event in events {
        by_date
            .entry(event.date)
            .and_modify(|current| *current = (*current).max(event.severity))
            .or_insert(event.severity);
    }
    by_date
}

/// Set `event` on every row, returning how many rows matched
pub fn merge_events(table: &mut FeatureTable, events: &[EventRecord]) -> usize {
    let by_date = severity_by_date(events);

    let mut matched = 0;
    for row in table.rows_mut() {
        row.event = by_date.get(&row.date).copied();
        if row.event.is_some() {
            matched += 1;
        }
    }

    debug!(
        "Merged {} events ({} distinct dates) onto {} rows, {} matched",
        events.len(),
        by_date.len(),
        table.len(),
        matched
    );

    matched
}
