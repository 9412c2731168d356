//! Logging setup and standardized emoji log macros
//!
//! Pipeline stages log through the macros below so build and forecast
//! output reads the same way across modules.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Standard emoji set for pipeline logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅"; // Stage completed
    pub const ERROR: &'static str = "❌"; // Stage failed
    pub const WARNING: &'static str = "⚠️"; // Rows dropped or data gaps

    // Module-specific
    pub const CHART: &'static str = "📊"; // Table/forecast statistics
    pub const LOAD: &'static str = "📂"; // Reading datasets or artifacts
    pub const FORECAST: &'static str = "🔮"; // Inference
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::WARNING, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_metrics {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::CHART, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_load {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::LOAD, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_forecast {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::FORECAST, format!($($arg)*))
    };
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries only forecast JSON
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}
