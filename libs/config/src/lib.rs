//! # Basket Forecast Configuration
//!
//! Centralized configuration and defaults for the basket forecast pipeline.
//!
//! ## Features
//!
//! - **Defaults**: basket allocation, indicator window, artifact locations
//! - **Layered Loading**: optional TOML file, then `BASKET__` environment overrides
//! - **Path Expansion**: `~` and `$VAR` in every configured path
//!
//! ## Usage
//!
//! ```rust,no_run
//! use basket_config::{defaults, load_config};
//!
//! let config = load_config(Some("configs/forecast.toml".as_ref()))?;
//! assert!(config.indicators.window >= 1);
//! let _window = defaults::indicators::WINDOW;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod forecast_config;

pub use forecast_config::{
    load_config, BasketConfig, DataConfig, ForecastConfig, ForecastSettings, IndicatorConfig,
    ModelConfig,
};
