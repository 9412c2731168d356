//! Forecast engine
//!
//! Turns feature rows into model input (scaling the continuous block only)
//! and runs the two forecast modes:
//!
//! - **Iterative**: day 0 is the last known `Open`; each later day predicts
//!   from the previous step's vector and feeds the prediction back as `Open`
//! - **Year**: one vectorised prediction over every complete row of a
//!   calendar year, paired with the real `Close`

use crate::artifacts::{FeatureMatrix, Regressor, Scaler};
use crate::error::{ForecastError, Result};
use crate::table::FeatureTable;
use crate::{log_forecast, log_warning};
use basket_types::{
    FeatureRow, FeatureVector, ForecastPoint, PointLabel, CATEGORICAL_FEATURES,
    CONTINUOUS_FEATURES, FEATURE_ORDER,
};
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

/// How a prediction is fed back into the next iterative step.
///
/// Only `Open` is replaced. `fng_value`, `Price_diff`, `RSI`, `MA_14` and the
/// event columns keep their last known values for every step; recomputing
/// them from predicted prices would change what the model sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackPolicy {
    #[default]
    OpenOnly,
}

impl FeedbackPolicy {
    pub fn apply(self, features: &mut FeatureVector, prediction: f64) {
        match self {
            FeedbackPolicy::OpenOnly => features.open = prediction,
        }
    }
}

/// Model + scaler pair. Holds no per-request state; every call owns its
/// feature vectors.
pub struct ForecastEngine<M, S> {
    model: M,
    scaler: S,
    policy: FeedbackPolicy,
}

impl<M: Regressor, S: Scaler> ForecastEngine<M, S> {
    pub fn new(model: M, scaler: S) -> Self {
        Self {
            model,
            scaler,
            policy: FeedbackPolicy::default(),
        }
    }

    pub fn policy(&self) -> FeedbackPolicy {
        self.policy
    }

    /// Scale the continuous columns and rejoin the categorical ones in
    /// [`FEATURE_ORDER`], row order preserved
    pub fn prepare(&self, vectors: &[FeatureVector]) -> Result<FeatureMatrix> {
        let continuous = FeatureMatrix::from_vectors(vectors, &CONTINUOUS_FEATURES);
        let scaled = self.scaler.transform(&continuous)?;

        if scaled.len() != continuous.len() || scaled.columns() != continuous.columns() {
            return Err(ForecastError::schema(format!(
                "scaler returned {} rows of {} columns for {} rows of {} columns",
                scaled.len(),
                scaled.columns().len(),
                continuous.len(),
                continuous.columns().len()
            )));
        }

        let categorical = FeatureMatrix::from_vectors(vectors, &CATEGORICAL_FEATURES);
        let matrix = scaled.hstack(&categorical)?;
        debug_assert_eq!(matrix.columns(), &FEATURE_ORDER);
        Ok(matrix)
    }

    /// Prepare and predict, one finite output per vector
    pub fn predict(&self, vectors: &[FeatureVector]) -> Result<Vec<f64>> {
        let matrix = self.prepare(vectors)?;
        let predictions = self.model.predict(&matrix)?;

        if predictions.len() != vectors.len() {
            return Err(ForecastError::Inference {
                message: format!(
                    "model returned {} predictions for {} rows",
                    predictions.len(),
                    vectors.len()
                ),
            });
        }
        if let Some(bad) = predictions.iter().find(|value| !value.is_finite()) {
            return Err(ForecastError::Inference {
                message: format!("model returned non-finite prediction {}", bad),
            });
        }

        Ok(predictions)
    }

    /// Forecast `days` points from the most recent row of `table`
    pub fn forecast_n_days(&self, table: &FeatureTable, days: usize) -> Result<Vec<ForecastPoint>> {
        let last = table
            .last()
            .ok_or_else(|| ForecastError::empty("feature table has no rows"))?;
        self.forecast_from_row(last, days)
    }

    pub fn forecast_from_row(&self, row: &FeatureRow, days: usize) -> Result<Vec<ForecastPoint>> {
        let features = row.feature_vector()?;
        debug!("Iterating from {} (Open {})", row.date, features.open);
        self.iterate(features, days)
    }

    /// Iterative forecast from an explicit starting vector.
    ///
    /// Returns `days` points: day 0 actual, days `1..days` predicted. Each
    /// step runs the scaler and the model, so the per-step function is the
    /// composite `model(scale(vector))`, the same as in [`Self::forecast_year`].
    pub fn iterate(&self, mut features: FeatureVector, days: usize) -> Result<Vec<ForecastPoint>> {
        if days == 0 {
            return Err(ForecastError::InvalidRequest {
                message: "days must be at least 1".to_string(),
            });
        }

        let mut points = Vec::with_capacity(days);
        points.push(ForecastPoint::actual(PointLabel::Day(0), features.open));

        for day in 1..days {
            let prediction = self.predict(std::slice::from_ref(&features))?[0];
            points.push(ForecastPoint::predicted(PointLabel::Day(day), prediction));
            self.policy.apply(&mut features, prediction);
        }

        log_forecast!("Iterative forecast produced {} points", points.len());
        Ok(points)
    }

    /// Predict every row of `year` in one call, ascending by date.
    ///
    /// Rows still inside the indicator warm-up (or without sentiment) are
    /// dropped; a year with no usable rows fails with `EmptyResult`.
    pub fn forecast_year(&self, table: &FeatureTable, year: i32) -> Result<Vec<ForecastPoint>> {
        let rows: Vec<&FeatureRow> = table.rows_in_year(year).collect();
        if rows.is_empty() {
            return Err(ForecastError::empty(format!("no data found for year {}", year)));
        }

        let mut usable = Vec::with_capacity(rows.len());
        let mut vectors = Vec::with_capacity(rows.len());
        for row in &rows {
            match row.feature_vector() {
                Ok(vector) => {
                    usable.push(*row);
                    vectors.push(vector);
                }
                Err(gap) => debug!("Skipping row: {}", gap),
            }
        }

        let dropped = rows.len() - usable.len();
        if dropped > 0 {
            log_warning!(
                "{} of {} rows in {} have incomplete features and were dropped",
                dropped,
                rows.len(),
                year
            );
        }
        if usable.is_empty() {
            return Err(ForecastError::empty(format!(
                "no rows with complete features for year {}",
                year
            )));
        }

        let predictions = self.predict(&vectors)?;

        let points: Vec<ForecastPoint> = usable
            .iter()
            .zip(predictions)
            .map(|(row, predicted)| ForecastPoint {
                label: PointLabel::Date(row.date),
                actual: row.close.to_f64(),
                predicted: Some(predicted),
            })
            .collect();

        log_forecast!("Year {} forecast produced {} points", year, points.len());
        Ok(points)
    }
}
