//! # Basket Forecast - Feature Engineering and Autoregressive Inference
//!
//! ## Purpose
//!
//! Builds a daily feature table for a weighted crypto basket and forecasts
//! its price with a previously trained regression model. Two forecast modes
//! are exposed: an iterative N-day trajectory that feeds each prediction
//! back as the next day's `Open`, and a batch forecast over every row of a
//! calendar year.
//!
//! ## Architecture Role
//!
//! ```text
//! Asset CSVs → [Basket Composer] → [Indicator Builder] → [Sentiment Merge] → [Event Merge]
//!                                                                                 ↓
//! Forecast JSON ← [Forecast Engine] ← Model + Scaler artifacts ← Feature Table CSV
//! ```
//!
//! ## Feature Contract
//!
//! The model consumes `Open, fng_value, Price_diff, RSI, MA_14, ME, ME_Impact`
//! in that order. The first five are standardized by the scaler, the event
//! flag and severity are passed through unscaled. Rows whose rolling
//! indicators are still warming up never reach the model.
//!
//! ## Examples
//!
//! ### Iterative forecast
//! ```rust,no_run
//! use basket_config::load_config;
//! use basket_forecast::pipeline;
//!
//! let config = load_config(None)?;
//! for point in pipeline::forecast_n_days(&config, 7)? {
//!     println!("{}: {:?} {:?}", point.label, point.actual, point.predicted);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ### Custom model
//! ```rust
//! use basket_forecast::artifacts::{FeatureMatrix, Regressor, StandardScaler};
//! use basket_forecast::{ForecastEngine, Result};
//! use basket_types::FeatureVector;
//!
//! struct LastOpen;
//!
//! impl Regressor for LastOpen {
//!     fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
//!         Ok(features.rows().iter().map(|row| row[0]).collect())
//!     }
//! }
//!
//! let scaler = StandardScaler::new(vec![0.0; 5], vec![1.0; 5])?;
//! let engine = ForecastEngine::new(LastOpen, scaler);
//! let start = FeatureVector {
//!     open: 100.0, fng_value: 50.0, price_diff: 2.0, rsi: 60.0,
//!     ma_14: 98.0, me: 0.0, me_impact: 0.0,
//! };
//! let points = engine.iterate(start, 3)?;
//! assert_eq!(points.len(), 3);
//! # Ok::<(), basket_forecast::ForecastError>(())
//! ```

pub mod artifacts;
pub mod basket;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod events;
pub mod indicators;
pub mod logging;
pub mod pipeline;
pub mod sentiment;
pub mod table;

pub use artifacts::{FeatureMatrix, LinearModel, Regressor, Scaler, StandardScaler};
pub use engine::{FeedbackPolicy, ForecastEngine};
pub use error::{ErrorKind, ForecastError, Result};
pub use table::FeatureTable;

pub use basket_types::{ForecastPoint, PointLabel};
