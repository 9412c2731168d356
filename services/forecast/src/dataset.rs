//! CSV sources and the built feature table
//!
//! Readers resolve columns by header name (with aliases for the names the
//! upstream files use), so column order and extra columns do not matter.

use crate::basket::AssetSeries;
use crate::error::{ForecastError, Result};
use crate::events::EventRecord;
use crate::log_load;
use crate::sentiment::SentimentRecord;
use crate::table::FeatureTable;
use basket_types::{Decimal, FeatureRow, ForecastPoint, NaiveDate, PricePoint, Severity};
use csv::{Reader, StringRecord, Writer};
use rust_decimal::prelude::ToPrimitive;
use std::fmt::Display;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// Header names of the feature table, in written order
pub const FEATURE_TABLE_HEADER: [&str; 9] = [
    "Date",
    "Open",
    "Close",
    "Price_diff",
    "fng_value",
    "RSI",
    "MA_14",
    "ME",
    "ME_Impact",
];

/// Header of a saved year forecast, in written order
pub const YEAR_FORECAST_HEADER: [&str; 3] = ["Date", "Close_Previsto", "Close_Real"];

const DATE: &[&str] = &["Date", "Data", "date"];

/// Column indices resolved from a header row
struct Columns<'a> {
    path: &'a Path,
    headers: StringRecord,
}

impl<'a> Columns<'a> {
    fn index(&self, aliases: &[&str]) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| aliases.contains(&header.trim()))
            .ok_or_else(|| {
                ForecastError::schema(format!(
                    "{}: missing column {}",
                    self.path.display(),
                    aliases[0]
                ))
            })
    }
}

struct Field<'a> {
    path: &'a Path,
    line: u64,
    column: &'static str,
    raw: &'a str,
}

impl<'a> Field<'a> {
    fn error(&self, what: &str) -> ForecastError {
        ForecastError::schema(format!(
            "{} line {}: {} {:?} in column {}",
            self.path.display(),
            self.line,
            what,
            self.raw,
            self.column
        ))
    }

    fn date(&self) -> Result<NaiveDate> {
        parse_date(self.raw).ok_or_else(|| self.error("invalid date"))
    }

    fn decimal(&self) -> Result<Decimal> {
        parse_decimal(self.raw).ok_or_else(|| self.error("invalid number"))
    }

    /// Empty cells are nulls
    fn optional_decimal(&self) -> Result<Option<Decimal>> {
        if self.raw.trim().is_empty() {
            return Ok(None);
        }
        self.decimal().map(Some)
    }

    fn code(&self) -> Result<u8> {
        let value = self.decimal()?;
        if !value.fract().is_zero() {
            return Err(self.error("non-integer code"));
        }
        value.to_u8().ok_or_else(|| self.error("out of range code"))
    }
}

/// `YYYY-MM-DD`, optionally followed by a time part
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn open_reader(path: &Path) -> Result<(Reader<File>, StringRecord)> {
    let file = File::open(path).map_err(|e| ForecastError::DataNotFound {
        message: format!("{}: {}", path.display(), e),
    })?;
    let mut reader = Reader::from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| ForecastError::schema(format!("{}: {}", path.display(), e)))?
        .clone();
    log_load!("Reading {}", path.display());
    Ok((reader, headers))
}

fn records(
    path: &Path,
    reader: Reader<File>,
) -> impl Iterator<Item = Result<(u64, StringRecord)>> + '_ {
    reader.into_records().map(move |record| {
        let record =
            record.map_err(|e| ForecastError::schema(format!("{}: {}", path.display(), e)))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        Ok((line, record))
    })
}

fn field<'a>(path: &'a Path, line: u64, record: &'a StringRecord, index: usize, column: &'static str) -> Field<'a> {
    Field {
        path,
        line,
        column,
        raw: record.get(index).unwrap_or(""),
    }
}

/// Daily `Date, Open, Close` for one asset.
///
/// Rows whose date or prices are not numeric (repeated header lines in
/// downloaded files) are skipped with a warning.
pub fn read_price_series(path: &Path) -> Result<Vec<PricePoint>> {
    let (reader, headers) = open_reader(path)?;
    let columns = Columns { path, headers };
    let date = columns.index(DATE)?;
    let open = columns.index(&["Open"])?;
    let close = columns.index(&["Close"])?;

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for item in records(path, reader) {
        let (_, record) = item?;
        let parsed = (
            record.get(date).and_then(parse_date),
            record.get(open).and_then(parse_decimal),
            record.get(close).and_then(parse_decimal),
        );
        match parsed {
            (Some(date), Some(open), Some(close)) => points.push(PricePoint { date, open, close }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("{}: skipped {} non-numeric rows", path.display(), skipped);
    }
    Ok(points)
}

/// Load each weighted asset's series from `asset_path(symbol)`
pub fn read_assets<'s>(
    symbols: impl IntoIterator<Item = &'s String>,
    asset_path: impl Fn(&str) -> PathBuf,
) -> Result<Vec<AssetSeries>> {
    symbols
        .into_iter()
        .map(|symbol| {
            let points = read_price_series(&asset_path(symbol.as_str()))?;
            Ok(AssetSeries {
                symbol: symbol.clone(),
                points,
            })
        })
        .collect()
}

/// Fear-and-greed table: `date, fng_value`
pub fn read_sentiment(path: &Path) -> Result<Vec<SentimentRecord>> {
    let (reader, headers) = open_reader(path)?;
    let columns = Columns { path, headers };
    let date = columns.index(DATE)?;
    let value = columns.index(&["fng_value", "value"])?;

    records(path, reader)
        .map(|item| {
            let (line, record) = item?;
            Ok(SentimentRecord {
                date: field(path, line, &record, date, "date").date()?,
                value: field(path, line, &record, value, "fng_value").decimal()?,
            })
        })
        .collect()
}

/// Major events: `Data, Impacto`
pub fn read_events(path: &Path) -> Result<Vec<EventRecord>> {
    let (reader, headers) = open_reader(path)?;
    let columns = Columns { path, headers };
    let date = columns.index(DATE)?;
    let impact = columns.index(&["Impacto", "Impact", "Severity"])?;

    records(path, reader)
        .map(|item| {
            let (line, record) = item?;
            let severity_field = field(path, line, &record, impact, "Impacto");
            Ok(EventRecord {
                date: field(path, line, &record, date, "Data").date()?,
                severity: Severity::from_str(severity_field.raw)
                    .map_err(|_| severity_field.error("unknown severity"))?,
            })
        })
        .collect()
}

/// Read a feature table written by [`write_feature_table`]
pub fn read_feature_table(path: &Path) -> Result<FeatureTable> {
    let (reader, headers) = open_reader(path)?;
    let columns = Columns { path, headers };
    let date = columns.index(DATE)?;
    let open = columns.index(&["Open"])?;
    let close = columns.index(&["Close"])?;
    let price_diff = columns.index(&["Price_diff"])?;
    let fng_value = columns.index(&["fng_value"])?;
    let rsi = columns.index(&["RSI"])?;
    let ma_14 = columns.index(&["MA_14"])?;
    let me = columns.index(&["ME"])?;
    let me_impact = columns.index(&["ME_Impact"])?;

    let mut rows = Vec::new();
    for item in records(path, reader) {
        let (line, record) = item?;
        let get = |index, column| field(path, line, &record, index, column);

        let flag = get(me, "ME").code()?;
        let impact_field = get(me_impact, "ME_Impact");
        let event = Severity::from_ordinal(impact_field.code()?)
            .map_err(|_| impact_field.error("unknown severity code"))?;
        if (flag == 1) != event.is_some() || flag > 1 {
            return Err(ForecastError::schema(format!(
                "{} line {}: ME={} disagrees with ME_Impact={}",
                path.display(),
                line,
                flag,
                impact_field.raw
            )));
        }

        rows.push(FeatureRow {
            date: get(date, "Date").date()?,
            open: get(open, "Open").decimal()?,
            close: get(close, "Close").decimal()?,
            price_diff: get(price_diff, "Price_diff").optional_decimal()?,
            fng_value: get(fng_value, "fng_value").optional_decimal()?,
            rsi: get(rsi, "RSI").optional_decimal()?,
            ma_14: get(ma_14, "MA_14").optional_decimal()?,
            event,
        });
    }

    let table = FeatureTable::new(rows)?;
    log_load!("Feature table {}: {} rows", path.display(), table.len());
    Ok(table)
}

fn io_error(path: &Path, e: impl Display) -> ForecastError {
    ForecastError::DataNotFound {
        message: format!("{}: {}", path.display(), e),
    }
}

/// Write the feature table with [`FEATURE_TABLE_HEADER`]; nulls are empty cells
pub fn write_feature_table(path: &Path, table: &FeatureTable) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
    }

    let mut writer = Writer::from_path(path).map_err(|e| io_error(path, e))?;
    writer
        .write_record(FEATURE_TABLE_HEADER)
        .map_err(|e| io_error(path, e))?;

    let cell = |value: Option<Decimal>| value.map(|v| v.normalize().to_string()).unwrap_or_default();
    for row in table.rows() {
        writer
            .write_record([
                row.date.format("%Y-%m-%d").to_string(),
                row.open.normalize().to_string(),
                row.close.normalize().to_string(),
                cell(row.price_diff),
                cell(row.fng_value),
                cell(row.rsi),
                cell(row.ma_14),
                row.me().to_string(),
                row.me_impact().to_string(),
            ])
            .map_err(|e| io_error(path, e))?;
    }

    writer.flush().map_err(|e| io_error(path, e))?;
    Ok(())
}

/// Save a year forecast as `Date, Close_Previsto, Close_Real`; a missing
/// value is an empty cell
pub fn write_year_forecast(path: &Path, points: &[ForecastPoint]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
    }

    let mut writer = Writer::from_path(path).map_err(|e| io_error(path, e))?;
    writer
        .write_record(YEAR_FORECAST_HEADER)
        .map_err(|e| io_error(path, e))?;

    let cell = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
    for point in points {
        writer
            .write_record([point.label.to_string(), cell(point.predicted), cell(point.actual)])
            .map_err(|e| io_error(path, e))?;
    }

    writer.flush().map_err(|e| io_error(path, e))?;
    log_load!("Year forecast written to {}: {} rows", path.display(), points.len());
    Ok(())
}
