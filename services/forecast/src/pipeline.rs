//! End-to-end operations over configured sources
//!
//! Each call loads its artifacts and data fresh; nothing is cached between
//! calls.

use crate::artifacts::{LinearModel, StandardScaler};
use crate::basket::compose_basket;
use crate::dataset;
use crate::engine::ForecastEngine;
use crate::error::Result;
use crate::events::merge_events;
use crate::indicators::apply_indicators;
use crate::sentiment::merge_sentiment;
use crate::table::FeatureTable;
use crate::{log_metrics, log_success};
use basket_config::ForecastConfig;
use basket_types::ForecastPoint;
use tracing::info;

/// Engine over the configured JSON artifacts
pub fn load_engine(config: &ForecastConfig) -> Result<ForecastEngine<LinearModel, StandardScaler>> {
    let model = LinearModel::load(&config.model.model_path)?;
    let scaler = StandardScaler::load(&config.model.scaler_path)?;
    Ok(ForecastEngine::new(model, scaler))
}

/// Raw assets -> basket -> indicators -> sentiment -> events
pub fn build_feature_table(config: &ForecastConfig) -> Result<FeatureTable> {
    info!(
        "Building feature table from {} assets in {}",
        config.basket.weights.len(),
        config.data.assets_dir.display()
    );

    let assets = dataset::read_assets(config.basket.weights.keys(), |symbol| {
        config.data.asset_path(symbol)
    })?;
    let basket = compose_basket(&assets, &config.basket.weights)?;

    let mut table = FeatureTable::from_prices(basket)?;
    apply_indicators(&mut table, config.indicators.window)?;

    let sentiment = dataset::read_sentiment(&config.data.fng_path)?;
    let with_sentiment = merge_sentiment(&mut table, &sentiment)?;

    let events = dataset::read_events(&config.data.events_path)?;
    let with_events = merge_events(&mut table, &events);

    log_metrics!(
        "Feature table: {} rows, {} with sentiment, {} with events, {} complete",
        table.len(),
        with_sentiment,
        with_events,
        table.complete_rows().count()
    );
    Ok(table)
}

/// Build the feature table and write it to `config.data.feature_table`
pub fn build_and_write(config: &ForecastConfig) -> Result<FeatureTable> {
    let table = build_feature_table(config)?;
    dataset::write_feature_table(&config.data.feature_table, &table)?;
    log_success!(
        "Feature table written to {}",
        config.data.feature_table.display()
    );
    Ok(table)
}

/// Iterative forecast from the last row of the configured feature table
pub fn forecast_n_days(config: &ForecastConfig, days: usize) -> Result<Vec<ForecastPoint>> {
    let engine = load_engine(config)?;
    let table = dataset::read_feature_table(&config.data.feature_table)?;
    engine.forecast_n_days(&table, days)
}

/// Batch forecast of one calendar year of the configured feature table
pub fn forecast_year(config: &ForecastConfig, year: i32) -> Result<Vec<ForecastPoint>> {
    let engine = load_engine(config)?;
    let table = dataset::read_feature_table(&config.data.feature_table)?;
    engine.forecast_year(&table, year)
}
