use thiserror::Error;

#[derive(Debug, Error)]
pub enum SalesError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid input schema: missing columns {missing:?}")]
    InvalidSchema { missing: Vec<String> },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Month already complete: cutoff decade {cutoff_decade} leaves no days to forecast")]
    MonthComplete { cutoff_decade: u32 },

    #[error("No working days elapsed in {year}-{month:02} up to day {cutoff_day}")]
    NoWorkdaysElapsed { year: i32, month: u32, cutoff_day: u32 },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SalesError {
    fn from(e: serde_json::Error) -> Self {
        SalesError::SerializationError(e.to_string())
    }
}
