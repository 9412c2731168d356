//! # Basket Types
//!
//! Data model shared by the basket forecast pipeline.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss in the Price Domain**: `Open`, `Close` and every
//!   indicator derived from them are `rust_decimal::Decimal`
//! - **Explicit Model Boundary**: conversion to `f64` happens once, when a
//!   [`FeatureRow`] becomes a [`FeatureVector`]
//! - **Warm-up Is Visible**: rolling indicators are `Option`, never zero-filled
//! - **Fixed Feature Order**: [`FEATURE_ORDER`] is the column order the model
//!   and scaler were fitted with
//!
//! ## Quick Start
//!
//! ```rust
//! use basket_types::{FeatureRow, Severity};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let mut row = FeatureRow::new(date, Decimal::from(100), Decimal::from(102));
//! row.event = Some(Severity::High);
//!
//! assert_eq!(row.me(), 1);
//! assert_eq!(row.me_impact(), 2);
//! ```

pub mod features;
pub mod forecast;
pub mod row;
pub mod severity;

pub use features::{
    FeatureColumn, FeatureGap, FeatureVector, CATEGORICAL_FEATURES, CONTINUOUS_FEATURES,
    FEATURE_ORDER,
};
pub use forecast::{ForecastPoint, PointLabel};
pub use row::{FeatureRow, PricePoint};
pub use severity::{Severity, UnknownSeverity};

pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
