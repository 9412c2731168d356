//! End-to-end build and forecast over files in a temporary directory

use basket_config::ForecastConfig;
use basket_forecast::dataset::read_feature_table;
use basket_forecast::{pipeline, ErrorKind, PointLabel};
use basket_types::{Decimal, NaiveDate};
use chrono::Days;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const DAYS: u64 = 30;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// BTC drifts up with a dip every third day; ETH is flat-ish
fn asset_prices(symbol: &str, day: u64) -> (Decimal, Decimal) {
    let day = Decimal::from(day);
    match symbol {
        "BTC" => {
            let open = dec!(40000) + day * dec!(100);
            let swing = if day % dec!(3) == Decimal::ZERO { dec!(-250) } else { dec!(180) };
            (open, open + swing)
        }
        _ => (dec!(2000) + day, dec!(2001.5) + day),
    }
}

fn write_asset(dir: &Path, symbol: &str, skip_day: Option<u64>) {
    let mut csv = String::from("Date,Close,High,Low,Open,Volume\n");
    for day in 0..DAYS {
        if Some(day) == skip_day {
            continue;
        }
        let (open, close) = asset_prices(symbol, day);
        let date = start() + Days::new(day);
        writeln!(csv, "{},{},0,0,{},1000", date, close, open).unwrap();
    }
    fs::write(dir.join(format!("{}_USD_2020_2025_Daily.csv", symbol)), csv).unwrap();
}

struct Fixture {
    _dir: TempDir,
    config: ForecastConfig,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let raw = root.join("raw");
    fs::create_dir_all(&raw).unwrap();

    write_asset(&raw, "BTC", None);
    // ETH has no row for 2024-01-05, so the basket skips that date
    write_asset(&raw, "ETH", Some(4));

    let mut fng = String::from("date,fng_value\n");
    for day in 0..DAYS {
        writeln!(fng, "{},{}", start() + Days::new(day), 40 + day % 20).unwrap();
    }
    fs::write(root.join("fng.csv"), fng).unwrap();

    fs::write(
        root.join("events.csv"),
        "Data,Evento,Impacto\n\
         2024-01-20,ETF inflows,Alto\n\
         2024-01-20,Exchange hack,Muito Alto\n\
         2024-01-05,Basket gap,Moderado\n\
         2023-06-01,Outside range,Alto\n",
    )
    .unwrap();

    let model_dir = root.join("model");
    fs::create_dir_all(&model_dir).unwrap();
    fs::write(
        model_dir.join("model.json"),
        r#"{"features": ["Open", "fng_value", "Price_diff", "RSI", "MA_14", "ME", "ME_Impact"],
            "coefficients": [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "intercept": 1.0}"#,
    )
    .unwrap();
    fs::write(
        model_dir.join("scaler.json"),
        r#"{"features": ["Open", "fng_value", "Price_diff", "RSI", "MA_14"],
            "mean": [0.0, 0.0, 0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0, 1.0, 1.0]}"#,
    )
    .unwrap();

    let mut config = ForecastConfig::default();
    config.data.assets_dir = raw;
    config.data.fng_path = root.join("fng.csv");
    config.data.events_path = root.join("events.csv");
    config.data.feature_table = root.join("build").join("features.csv");
    config.model.model_path = model_dir.join("model.json");
    config.model.scaler_path = model_dir.join("scaler.json");
    config.basket.weights = [("BTC", dec!(0.6)), ("ETH", dec!(0.4))]
        .into_iter()
        .map(|(symbol, weight)| (symbol.to_string(), weight))
        .collect();
    config.validate().unwrap();

    Fixture { _dir: dir, config }
}

#[test]
fn build_produces_aligned_feature_table() {
    let fixture = fixture();

    let table = pipeline::build_and_write(&fixture.config).unwrap();
    let rows = table.rows();

    assert_eq!(rows.len(), DAYS as usize - 1);
    assert!(rows.iter().all(|row| row.date != NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()));

    // Basket is the weighted sum of the two assets
    let (btc_open, btc_close) = asset_prices("BTC", 0);
    let (eth_open, eth_close) = asset_prices("ETH", 0);
    assert_eq!(rows[0].open, btc_open * dec!(0.6) + eth_open * dec!(0.4));
    assert_eq!(rows[0].close, btc_close * dec!(0.6) + eth_close * dec!(0.4));

    for row in rows {
        assert_eq!(row.price_diff, Some(row.close - row.open));
        if let Some(rsi) = row.rsi {
            assert!(rsi >= Decimal::ZERO && rsi <= dec!(100));
        }
    }

    // Warm-up rows stay null, then MA_14 is the trailing mean of Close
    assert!(rows[..13].iter().all(|row| row.ma_14.is_none() && row.rsi.is_none()));
    for i in 13..rows.len() {
        let sum: Decimal = rows[i - 13..=i].iter().map(|row| row.close).sum();
        assert_eq!(rows[i].ma_14, Some(sum / dec!(14)));
    }

    // Same-day events collapse to the highest severity; unmatched dates are 0
    let event_day = rows
        .iter()
        .find(|row| row.date == NaiveDate::from_ymd_opt(2024, 1, 20).unwrap())
        .unwrap();
    assert_eq!((event_day.me(), event_day.me_impact()), (1, 3));
    assert_eq!(rows.iter().filter(|row| row.me() == 1).count(), 1);

    // Written table reads back identically
    let loaded = read_feature_table(&fixture.config.data.feature_table).unwrap();
    assert_eq!(loaded, table);
}

#[test]
fn iterative_forecast_feeds_open_back() {
    let fixture = fixture();
    pipeline::build_and_write(&fixture.config).unwrap();
    let table = read_feature_table(&fixture.config.data.feature_table).unwrap();
    let last_open = table.last().unwrap().open.to_f64().unwrap();

    let points = pipeline::forecast_n_days(&fixture.config, 5).unwrap();

    assert_eq!(points.len(), 5);
    assert_eq!(points[0].label, PointLabel::Day(0));
    assert_eq!(points[0].actual, Some(last_open));
    assert_eq!(points[0].predicted, None);
    for (i, point) in points.iter().enumerate().skip(1) {
        assert_eq!(point.label, PointLabel::Day(i));
        assert_eq!(point.actual, None);
        // Open + 1 per step, each step starting from the previous prediction
        let predicted = point.predicted.unwrap();
        assert!((predicted - (last_open + i as f64)).abs() < 1e-6);
    }
}

#[test]
fn single_day_forecast_is_last_actual() {
    let fixture = fixture();
    pipeline::build_and_write(&fixture.config).unwrap();

    let points = pipeline::forecast_n_days(&fixture.config, 1).unwrap();

    assert_eq!(points.len(), 1);
    assert!(points[0].actual.is_some());
    assert_eq!(points[0].predicted, None);
}

#[test]
fn year_forecast_covers_complete_rows_in_order() {
    let fixture = fixture();
    pipeline::build_and_write(&fixture.config).unwrap();
    let table = read_feature_table(&fixture.config.data.feature_table).unwrap();

    let points = pipeline::forecast_year(&fixture.config, 2024).unwrap();

    let complete: Vec<_> = table.complete_rows().collect();
    assert_eq!(points.len(), complete.len());
    for (point, row) in points.iter().zip(&complete) {
        assert_eq!(point.label, PointLabel::Date(row.date));
        assert_eq!(point.actual, row.close.to_f64());
        assert!(point.predicted.is_some());
    }
    let dates: Vec<String> = points.iter().map(|p| p.label.to_string()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}

#[test]
fn year_without_data_fails_without_output() {
    let fixture = fixture();
    pipeline::build_and_write(&fixture.config).unwrap();

    let err = pipeline::forecast_year(&fixture.config, 2019).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResult);
}

#[test]
fn missing_artifact_fails_the_call() {
    let mut fixture = fixture();
    pipeline::build_and_write(&fixture.config).unwrap();
    fixture.config.model.model_path = fixture.config.model.model_path.with_file_name("gone.json");

    let err = pipeline::forecast_n_days(&fixture.config, 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArtifactLoad);
}

#[test]
fn missing_asset_file_is_data_not_found() {
    let mut fixture = fixture();
    fixture
        .config
        .basket
        .weights
        .insert("SOL".to_string(), dec!(0.1));

    let err = pipeline::build_feature_table(&fixture.config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataNotFound);
}
