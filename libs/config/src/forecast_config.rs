//! Forecast Configuration Module
//!
//! Provides configuration loading for the basket forecast pipeline.
//! Supports an optional TOML file with `BASKET__` environment overrides,
//! e.g. `BASKET__FORECAST__DEFAULT_DAYS=10`.

use crate::defaults;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main pipeline configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ForecastConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub indicators: IndicatorConfig,
    pub forecast: ForecastSettings,
    pub basket: BasketConfig,
}

/// Dataset locations
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// Built feature table read by the forecast commands
    pub feature_table: PathBuf,
    pub assets_dir: PathBuf,
    pub asset_file_pattern: String,
    pub fng_path: PathBuf,
    pub events_path: PathBuf,
}

/// Trained artifact locations
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct IndicatorConfig {
    pub window: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ForecastSettings {
    pub default_days: usize,
    pub default_year: i32,
    pub decimals: u32,
}

/// Basket allocation, ticker -> weight
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BasketConfig {
    pub weights: BTreeMap<String, Decimal>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            feature_table: PathBuf::from(defaults::data::FEATURE_TABLE),
            assets_dir: PathBuf::from(defaults::data::ASSETS_DIR),
            asset_file_pattern: defaults::data::ASSET_FILE_PATTERN.to_string(),
            fng_path: PathBuf::from(defaults::data::FNG_PATH),
            events_path: PathBuf::from(defaults::data::EVENTS_PATH),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(defaults::model::MODEL_PATH),
            scaler_path: PathBuf::from(defaults::model::SCALER_PATH),
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            window: defaults::indicators::WINDOW,
        }
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            default_days: defaults::forecast::DAYS,
            default_year: defaults::forecast::YEAR,
            decimals: defaults::forecast::DECIMALS,
        }
    }
}

impl Default for BasketConfig {
    fn default() -> Self {
        Self {
            weights: defaults::basket::ALLOCATIONS
                .iter()
                .map(|(symbol, weight)| (symbol.to_string(), *weight))
                .collect(),
        }
    }
}

impl DataConfig {
    /// Path of the raw daily series for `symbol`
    pub fn asset_path(&self, symbol: &str) -> PathBuf {
        self.assets_dir
            .join(self.asset_file_pattern.replace("{symbol}", symbol))
    }
}

impl ForecastConfig {
    /// Load configuration from an optional file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                info!("Loading forecast config: {:?}", path);
                let file = Config::builder()
                    .add_source(File::from(path).required(true))
                    .build()
                    .with_context(|| format!("Failed to read config file {:?}", path))?;
                Some(file)
            }
            None => {
                debug!("No config file given, using defaults");
                None
            }
        };

        // A basket listed in the file is the complete allocation; otherwise
        // environment overrides layer onto the default allocation
        let mut base = ForecastConfig::default();
        if file
            .as_ref()
            .is_some_and(|file| file.get_table("basket.weights").is_ok())
        {
            base.basket.weights.clear();
        }

        let mut builder = Config::builder()
            .add_source(Config::try_from(&base).context("Failed to encode default configuration")?);
        if let Some(file) = file {
            builder = builder.add_source(file);
        }

        // Override with environment variables (BASKET__ prefix)
        builder = builder.add_source(
            Environment::with_prefix("BASKET")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut config: ForecastConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.normalize_symbols();
        Ok(config)
    }

    /// Expand `~` and environment variables in every path
    pub fn expand_env_vars(&mut self) -> Result<()> {
        let data = &mut self.data;
        for path in [
            &mut data.feature_table,
            &mut data.assets_dir,
            &mut data.fng_path,
            &mut data.events_path,
            &mut self.model.model_path,
            &mut self.model.scaler_path,
        ] {
            let raw = path.to_string_lossy().into_owned();
            let expanded = shellexpand::full(&raw)
                .with_context(|| format!("Failed to expand path {}", raw))?;
            *path = PathBuf::from(expanded.as_ref());
        }

        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.indicators.window == 0 {
            bail!("indicators.window must be at least 1");
        }
        if self.forecast.default_days == 0 {
            bail!("forecast.default_days must be at least 1");
        }
        if self.forecast.decimals > defaults::forecast::MAX_DECIMALS {
            bail!(
                "forecast.decimals must be at most {}, got {}",
                defaults::forecast::MAX_DECIMALS,
                self.forecast.decimals
            );
        }
        if !self.data.asset_file_pattern.contains("{symbol}") {
            bail!(
                "data.asset_file_pattern must contain {{symbol}}: {}",
                self.data.asset_file_pattern
            );
        }
        if self.basket.weights.is_empty() {
            bail!("basket.weights must list at least one asset");
        }
        if let Some((symbol, weight)) = self
            .basket
            .weights
            .iter()
            .find(|(_, weight)| **weight <= Decimal::ZERO)
        {
            bail!("basket weight for {} must be positive, got {}", symbol, weight);
        }

        Ok(())
    }

    /// Render the resolved configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Environment keys arrive lowercased; tickers are upper case.
    /// A lowercased key overrides the upper-case entry it collides with.
    fn normalize_symbols(&mut self) {
        let weights = std::mem::take(&mut self.basket.weights);
        for (symbol, weight) in weights {
            let ticker = symbol.to_uppercase();
            if ticker != symbol || !self.basket.weights.contains_key(&ticker) {
                self.basket.weights.insert(ticker, weight);
            }
        }
    }
}

/// Convenience function: load, expand and validate
pub fn load_config(path: Option<&Path>) -> Result<ForecastConfig> {
    let mut config = ForecastConfig::load(path)?;
    config.expand_env_vars()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::tempdir;

    /// Serializes tests that read or set `BASKET__` variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ForecastConfig::default();
        config.validate().unwrap();

        assert_eq!(config.indicators.window, 14);
        assert_eq!(config.basket.weights.len(), 10);
        let total: Decimal = config.basket.weights.values().sum();
        assert_eq!(total, dec!(1.00));
    }

    #[test]
    fn test_toml_rendering_reloads() {
        let _env = env_lock();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("rendered.toml");

        let mut config = ForecastConfig::default();
        config.forecast.default_days = 30;
        fs::write(&config_path, config.to_toml_string().unwrap()).unwrap();

        let reloaded = ForecastConfig::load(Some(&config_path)).unwrap();
        assert_eq!(reloaded.forecast.default_days, 30);
        assert_eq!(reloaded.basket.weights, config.basket.weights);
    }

    #[test]
    fn test_load_file_config() {
        let _env = env_lock();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("forecast.toml");

        let config_content = r#"
[data]
feature_table = "/tmp/basket/features.csv"

[model]
model_path = "/tmp/basket/model.json"

[indicators]
window = 7

[basket.weights]
BTC = 0.75
ETH = 0.25
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = load_config(Some(&config_path)).unwrap();

        assert_eq!(config.data.feature_table, PathBuf::from("/tmp/basket/features.csv"));
        assert_eq!(config.model.model_path, PathBuf::from("/tmp/basket/model.json"));
        // Untouched keys keep their defaults
        assert_eq!(config.model.scaler_path, PathBuf::from(defaults::model::SCALER_PATH));
        assert_eq!(config.indicators.window, 7);
        assert_eq!(config.basket.weights.len(), 2);
        assert_eq!(config.basket.weights.get("BTC"), Some(&dec!(0.75)));
    }

    #[test]
    fn test_environment_override() {
        let _env = env_lock();
        std::env::set_var("BASKET__FORECAST__DEFAULT_YEAR", "2023");
        let config = ForecastConfig::load(None).unwrap();
        std::env::remove_var("BASKET__FORECAST__DEFAULT_YEAR");

        assert_eq!(config.forecast.default_year, 2023);
        assert_eq!(config.forecast.default_days, defaults::forecast::DAYS);
    }

    #[test]
    fn test_weight_override_keeps_default_allocation() {
        let _env = env_lock();
        std::env::set_var("BASKET__BASKET__WEIGHTS__BTC", "0.9");
        let config = ForecastConfig::load(None);
        std::env::remove_var("BASKET__BASKET__WEIGHTS__BTC");
        let config = config.unwrap();

        assert_eq!(config.basket.weights.len(), defaults::basket::ALLOCATIONS.len());
        assert_eq!(config.basket.weights.get("BTC"), Some(&dec!(0.9)));
        assert_eq!(config.basket.weights.get("ETH"), Some(&dec!(0.16)));
        assert_eq!(config.basket.weights.get("LINK"), Some(&dec!(0.02)));
    }

    #[test]
    fn test_weight_override_on_file_allocation() {
        let _env = env_lock();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("forecast.toml");
        fs::write(&config_path, "[basket.weights]\nBTC = \"0.7\"\nETH = \"0.3\"\n").unwrap();

        std::env::set_var("BASKET__BASKET__WEIGHTS__ETH", "0.2");
        let config = ForecastConfig::load(Some(&config_path));
        std::env::remove_var("BASKET__BASKET__WEIGHTS__ETH");
        let config = config.unwrap();

        assert_eq!(config.basket.weights.len(), 2);
        assert_eq!(config.basket.weights.get("BTC"), Some(&dec!(0.7)));
        assert_eq!(config.basket.weights.get("ETH"), Some(&dec!(0.2)));
    }

    #[test]
    fn test_validation_rejects_excess_decimals() {
        let mut config = ForecastConfig::default();
        config.forecast.decimals = defaults::forecast::MAX_DECIMALS;
        config.validate().unwrap();

        config.forecast.decimals = 400;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_weights() {
        let mut config = ForecastConfig::default();
        config.basket.weights.insert("XRP".to_string(), dec!(0));
        assert!(config.validate().is_err());

        config.basket.weights.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_asset_path() {
        let data = DataConfig::default();
        assert_eq!(
            data.asset_path("ETH"),
            PathBuf::from("datasets/raw/ETH_USD_2020_2025_Daily.csv")
        );
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("BASKET_TEST_MODEL_DIR", "/opt/models");
        let mut config = ForecastConfig::default();
        config.model.model_path = PathBuf::from("$BASKET_TEST_MODEL_DIR/model.json");
        config.expand_env_vars().unwrap();

        assert_eq!(config.model.model_path, PathBuf::from("/opt/models/model.json"));
    }
}
