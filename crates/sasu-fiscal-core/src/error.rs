use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SasuError {
    #[error("Invalid scenario field {field}: {reason}")]
    InvalidScenario { field: String, reason: String },

    #[error("Invalid preferences: {0}")]
    InvalidPreferences(String),

    #[error("Invalid salary range: minimum {min} exceeds maximum {max}")]
    InvalidRange { min: Decimal, max: Decimal },

    #[error("No rate table registered for fiscal year {0}")]
    UnknownFiscalYear(i32),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SasuError {
    fn from(e: serde_json::Error) -> Self {
        SasuError::Serialization(e.to_string())
    }
}
