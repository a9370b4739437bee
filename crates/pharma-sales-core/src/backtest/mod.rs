pub mod retrospective;

pub use retrospective::{backtest_month, BacktestPoint, BacktestReport, DEFAULT_CHECKPOINTS};
