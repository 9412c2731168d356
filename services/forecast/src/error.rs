//! Error types for the basket forecast pipeline

use basket_types::FeatureGap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Artifact load error ({path}): {message}")]
    ArtifactLoad { path: PathBuf, message: String },

    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Empty result: {message}")]
    EmptyResult { message: String },

    #[error("Inference error: {message}")]
    Inference { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Caller-facing classification of a [`ForecastError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ArtifactLoad,
    DataNotFound,
    Schema,
    EmptyResult,
    Inference,
    InvalidRequest,
    Configuration,
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::ArtifactLoad { .. } => ErrorKind::ArtifactLoad,
            ForecastError::DataNotFound { .. } => ErrorKind::DataNotFound,
            ForecastError::Schema { .. } => ErrorKind::Schema,
            ForecastError::EmptyResult { .. } => ErrorKind::EmptyResult,
            ForecastError::Inference { .. } => ErrorKind::Inference,
            ForecastError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            ForecastError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        ForecastError::Schema {
            message: message.into(),
        }
    }

    pub(crate) fn empty(message: impl Into<String>) -> Self {
        ForecastError::EmptyResult {
            message: message.into(),
        }
    }
}

impl From<FeatureGap> for ForecastError {
    fn from(gap: FeatureGap) -> Self {
        ForecastError::schema(gap.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
