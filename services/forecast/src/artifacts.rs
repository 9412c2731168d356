//! Trained model and scaler artifacts
//!
//! The pipeline only sees the [`Regressor`] and [`Scaler`] traits. The JSON
//! artifacts below are the formats the binary loads from disk:
//!
//! ```json
//! { "features": ["Open", "fng_value", "Price_diff", "RSI", "MA_14", "ME", "ME_Impact"],
//!   "coefficients": [0.98, 0.01, 0.4, 0.02, 0.01, -3.1, -1.2],
//!   "intercept": 12.5 }
//!
//! { "features": ["Open", "fng_value", "Price_diff", "RSI", "MA_14"],
//!   "mean": [...], "scale": [...] }
//! ```

use crate::error::{ForecastError, Result};
use crate::log_load;
use basket_types::{FeatureColumn, FeatureVector, CONTINUOUS_FEATURES, FEATURE_ORDER};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Row-major `f64` matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<FeatureColumn>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<FeatureColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Project feature vectors onto `columns`, preserving row order
    pub fn from_vectors(vectors: &[FeatureVector], columns: &[FeatureColumn]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: vectors.iter().map(|vector| vector.select(columns)).collect(),
        }
    }

    pub fn push_row(&mut self, row: Vec<f64>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ForecastError::schema(format!(
                "row has {} values, matrix has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append the columns of `other` row by row
    pub fn hstack(mut self, other: &FeatureMatrix) -> Result<Self> {
        if self.len() != other.len() {
            return Err(ForecastError::schema(format!(
                "cannot join matrices with {} and {} rows",
                self.len(),
                other.len()
            )));
        }

        self.columns.extend_from_slice(&other.columns);
        for (row, extra) in self.rows.iter_mut().zip(&other.rows) {
            row.extend_from_slice(extra);
        }
        Ok(self)
    }

    fn expect_columns(&self, expected: &[FeatureColumn]) -> Result<()> {
        if self.columns != expected {
            return Err(ForecastError::schema(format!(
                "expected columns {:?}, got {:?}",
                names(expected),
                names(&self.columns)
            )));
        }
        Ok(())
    }
}

fn names(columns: &[FeatureColumn]) -> Vec<&'static str> {
    columns.iter().map(|column| column.name()).collect()
}

/// Trained regression model: one prediction per input row
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>>;
}

/// Fitted scaler over the continuous feature subset
pub trait Scaler: Send + Sync {
    /// Must preserve row count, row order and columns
    fn transform(&self, features: &FeatureMatrix) -> Result<FeatureMatrix>;
}

/// Linear regression over [`FEATURE_ORDER`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    features: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        let model = Self {
            features: names(&FEATURE_ORDER).into_iter().map(String::from).collect(),
            coefficients,
            intercept,
        };
        model.check().map_err(ForecastError::schema)?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let model: LinearModel = read_artifact(path)?;
        model.check().map_err(|message| artifact_error(path, message))?;
        log_load!("Loaded linear model from {}", path.display());
        Ok(model)
    }

    fn check(&self) -> std::result::Result<(), String> {
        check_feature_names(&self.features, &FEATURE_ORDER)?;
        if self.coefficients.len() != FEATURE_ORDER.len() {
            return Err(format!(
                "expected {} coefficients, got {}",
                FEATURE_ORDER.len(),
                self.coefficients.len()
            ));
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        features.expect_columns(&FEATURE_ORDER)?;

        Ok(features
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.coefficients)
                    .map(|(value, weight)| value * weight)
                    .sum::<f64>()
                    + self.intercept
            })
            .collect())
    }
}

/// Standardization `(x - mean) / scale` over [`CONTINUOUS_FEATURES`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    features: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            features: names(&CONTINUOUS_FEATURES)
                .into_iter()
                .map(String::from)
                .collect(),
            mean,
            scale,
        };
        scaler.check().map_err(ForecastError::schema)?;
        Ok(scaler)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let scaler: StandardScaler = read_artifact(path)?;
        scaler.check().map_err(|message| artifact_error(path, message))?;
        log_load!("Loaded standard scaler from {}", path.display());
        Ok(scaler)
    }

    fn check(&self) -> std::result::Result<(), String> {
        check_feature_names(&self.features, &CONTINUOUS_FEATURES)?;
        let expected = CONTINUOUS_FEATURES.len();
        if self.mean.len() != expected || self.scale.len() != expected {
            return Err(format!(
                "expected {} mean/scale entries, got {}/{}",
                expected,
                self.mean.len(),
                self.scale.len()
            ));
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, features: &FeatureMatrix) -> Result<FeatureMatrix> {
        features.expect_columns(&CONTINUOUS_FEATURES)?;

        let mut scaled = FeatureMatrix::new(features.columns().to_vec());
        for row in features.rows() {
            let values = row
                .iter()
                .zip(self.mean.iter().zip(&self.scale))
                .map(|(value, (mean, scale))| {
                    // Constant features were fitted with zero variance
                    let scale = if *scale == 0.0 { 1.0 } else { *scale };
                    (value - mean) / scale
                })
                .collect();
            scaled.push_row(values)?;
        }
        Ok(scaled)
    }
}

fn check_feature_names(found: &[String], expected: &[FeatureColumn]) -> std::result::Result<(), String> {
    let expected = names(expected);
    if found.iter().map(String::as_str).ne(expected.iter().copied()) {
        return Err(format!(
            "artifact was fitted on {:?}, pipeline provides {:?}",
            found, expected
        ));
    }
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| artifact_error(path, e.to_string()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| artifact_error(path, e.to_string()))
}

fn artifact_error(path: &Path, message: impl Into<String>) -> ForecastError {
    ForecastError::ArtifactLoad {
        path: path.to_path_buf(),
        message: message.into(),
    }
}
