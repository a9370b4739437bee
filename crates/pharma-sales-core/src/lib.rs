pub mod calendar;
pub mod error;
pub mod frame;
pub mod pricing;
pub mod types;

#[cfg(feature = "reconciliation")]
pub mod reconciliation;

#[cfg(feature = "forecast")]
pub mod forecast;

#[cfg(feature = "analytics")]
pub mod analytics;

#[cfg(feature = "backtest")]
pub mod backtest;

#[cfg(feature = "report")]
pub mod report;

#[cfg(feature = "cache")]
pub mod cache;

pub use error::SalesError;
pub use types::*;

/// Standard result type for all pharma-sales operations
pub type SalesResult<T> = Result<T, SalesError>;
