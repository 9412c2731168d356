//! Major-event severity levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity of a dated major event. Ordinals are the `ME_Impact` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event severity: {0:?}")]
pub struct UnknownSeverity(pub String);

impl Severity {
    /// `ME_Impact` code (1..=3)
    pub fn ordinal(self) -> u8 {
        match self {
            Severity::Moderate => 1,
            Severity::High => 2,
            Severity::VeryHigh => 3,
        }
    }

    /// Inverse of [`Severity::ordinal`]; 0 means "no event"
    pub fn from_ordinal(code: u8) -> Result<Option<Self>, UnknownSeverity> {
        match code {
            0 => Ok(None),
            1 => Ok(Some(Severity::Moderate)),
            2 => Ok(Some(Severity::High)),
            3 => Ok(Some(Severity::VeryHigh)),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    /// Accepts the labels used by the event source (`Moderado`, `Alto`,
    /// `Muito Alto`) as well as their English names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "moderado" | "moderate" => Ok(Severity::Moderate),
            "alto" | "high" => Ok(Severity::High),
            "muito alto" | "very high" => Ok(Severity::VeryHigh),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Moderate => "Moderate",
            Severity::High => "High",
            Severity::VeryHigh => "Very High",
        };
        f.write_str(label)
    }
}
