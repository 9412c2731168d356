//! Pipeline defaults
//!
//! Default values shared by the configuration loader and the CLI.

/// Dataset locations
pub mod data {
    pub const FEATURE_TABLE: &str = "datasets/build/basket_features.csv";
    pub const ASSETS_DIR: &str = "datasets/raw";
    pub const FNG_PATH: &str = "datasets/fng_cleaned.csv";
    pub const EVENTS_PATH: &str = "datasets/raw/crypto_major_events.csv";

    /// Per-asset file name; `{symbol}` is replaced by the ticker
    pub const ASSET_FILE_PATTERN: &str = "{symbol}_USD_2020_2025_Daily.csv";
}

/// Model artifact locations
pub mod model {
    pub const MODEL_PATH: &str = "model/model.json";
    pub const SCALER_PATH: &str = "model/scaler.json";
}

/// Indicator settings
pub mod indicators {
    /// Rolling window for RSI and the moving average
    pub const WINDOW: usize = 14;
}

/// Forecast request defaults
pub mod forecast {
    pub const DAYS: usize = 7;
    pub const YEAR: i32 = 2024;

    /// Decimal places in rendered output
    pub const DECIMALS: u32 = 2;

    /// Beyond this `f64` carries no further digits
    pub const MAX_DECIMALS: u32 = 15;
}

/// Basket allocation
pub mod basket {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Ticker weights as fractions of the basket
    pub const ALLOCATIONS: [(&str, Decimal); 10] = [
        ("BTC", dec!(0.50)),
        ("ETH", dec!(0.16)),
        ("XRP", dec!(0.08)),
        ("BNB", dec!(0.06)),
        ("SOL", dec!(0.05)),
        ("DOGE", dec!(0.04)),
        ("ADA", dec!(0.04)),
        ("TRX", dec!(0.03)),
        ("TON", dec!(0.02)),
        ("LINK", dec!(0.02)),
    ];
}
