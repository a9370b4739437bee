use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calendar::WorkingDayCalendar;
use crate::error::SalesError;
use crate::forecast::{forecast_with_bootstrap, BootstrapConfig};
use crate::pricing::{max_decade, PricedRecord};
use crate::types::SalesObservation;
use crate::SalesResult;

/// Decades at which a completed month is re-forecast by default.
pub const DEFAULT_CHECKPOINTS: [u32; 2] = [10, 20];

/// Forecast made at one checkpoint compared with the month's fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestPoint {
    pub cutoff_decade: u32,
    pub point_forecast: f64,
    pub low: f64,
    pub high: f64,
    /// point_forecast - fact
    pub error: f64,
    /// |error| / fact * 100, `None` when the fact is zero
    pub ape_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub year: i32,
    pub month: u32,
    /// Revenue at the month's latest decade
    pub fact_revenue: f64,
    pub points: Vec<BacktestPoint>,
    pub warnings: Vec<String>,
}

impl BacktestReport {
    /// Mean absolute percentage error across the scored checkpoints.
    pub fn mape(&self) -> Option<f64> {
        let apes: Vec<f64> = self.points.iter().filter_map(|p| p.ape_pct).collect();
        if apes.is_empty() {
            None
        } else {
            Some(apes.iter().sum::<f64>() / apes.len() as f64)
        }
    }
}

/// Replay the bootstrap forecaster on a finished month.
///
/// For each checkpoint the observations with `decade <= checkpoint` are
/// forecast and scored against the revenue at the month's last decade.
/// Checkpoints that cannot be forecast are reported in `warnings`.
pub fn backtest_month(
    month_records: &[PricedRecord],
    year: i32,
    month: u32,
    checkpoints: &[u32],
    calendar: &dyn WorkingDayCalendar,
    config: &BootstrapConfig,
) -> SalesResult<BacktestReport> {
    let last_decade = max_decade(month_records, year, month).ok_or_else(|| {
        SalesError::InsufficientData(format!("No records for {year}-{month:02} to back-test"))
    })?;

    let in_month = |r: &&PricedRecord| r.record.year == year && r.record.month == month;
    let fact_revenue = month_records
        .iter()
        .filter(in_month)
        .filter(|r| r.record.decade == last_decade)
        .map(|r| r.revenue.to_f64().unwrap_or(0.0))
        .sum::<f64>();

    let mut points = Vec::with_capacity(checkpoints.len());
    let mut warnings = Vec::new();

    for &cutoff in checkpoints {
        let observations: Vec<SalesObservation> = month_records
            .iter()
            .filter(in_month)
            .filter(|r| r.record.decade <= i64::from(cutoff))
            .map(SalesObservation::from)
            .collect();
        if observations.is_empty() {
            warnings.push(format!("Decade {cutoff}: no observations"));
            continue;
        }

        match forecast_with_bootstrap(&observations, cutoff, year, month, calendar, config) {
            Ok(f) => {
                let error = f.point_forecast_revenue - fact_revenue;
                let ape_pct = if fact_revenue != 0.0 {
                    Some(error.abs() / fact_revenue * 100.0)
                } else {
                    None
                };
                points.push(BacktestPoint {
                    cutoff_decade: cutoff,
                    point_forecast: f.point_forecast_revenue,
                    low: f.conf_interval_revenue.0,
                    high: f.conf_interval_revenue.1,
                    error,
                    ape_pct,
                });
            }
            Err(e) => {
                warn!(cutoff, error = %e, "back-test checkpoint skipped");
                warnings.push(format!("Decade {cutoff}: {e}"));
            }
        }
    }

    debug!(year, month, fact_revenue, scored = points.len(), "back-test");

    Ok(BacktestReport {
        year,
        month,
        fact_revenue,
        points,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekdayCalendar;
    use crate::types::SalesSnapshotRecord;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn priced(decade: i64, revenue: Decimal) -> PricedRecord {
        PricedRecord {
            record: SalesSnapshotRecord::new("D1", "P1", "Kyiv", "Main", "1", "C", 2024, 3, decade, dec!(1)),
            price: Some(revenue),
            revenue,
        }
    }

    fn config() -> BootstrapConfig {
        BootstrapConfig {
            iterations: 200,
            seed: Some(7),
            ..BootstrapConfig::default()
        }
    }

    #[test]
    fn test_fact_is_last_decade_revenue() {
        let records = vec![priced(10, dec!(60)), priced(20, dec!(150)), priced(30, dec!(210))];
        let report =
            backtest_month(&records, 2024, 3, &DEFAULT_CHECKPOINTS, &WeekdayCalendar, &config()).unwrap();
        assert_eq!(report.fact_revenue, 210.0);
        assert_eq!(report.points.len(), 2);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_error_and_ape() {
        // March 2024 weekdays: 6 passed by the 10th, 21 in total.
        let records = vec![priced(10, dec!(60)), priced(30, dec!(200))];
        let report = backtest_month(&records, 2024, 3, &[10], &WeekdayCalendar, &config()).unwrap();
        let p = &report.points[0];
        assert!((p.point_forecast - 210.0).abs() < 1e-9);
        assert!((p.error - 10.0).abs() < 1e-9);
        assert!((p.ape_pct.unwrap() - 5.0).abs() < 1e-9);
        assert!((report.mape().unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_fact_has_no_ape() {
        let records = vec![priced(10, dec!(60)), priced(30, dec!(0))];
        let report = backtest_month(&records, 2024, 3, &[10], &WeekdayCalendar, &config()).unwrap();
        assert_eq!(report.points[0].ape_pct, None);
        assert_eq!(report.mape(), None);
    }

    #[test]
    fn test_unforecastable_checkpoint_becomes_warning() {
        let records = vec![priced(20, dec!(100)), priced(30, dec!(150))];
        let report =
            backtest_month(&records, 2024, 3, &[10, 30], &WeekdayCalendar, &config()).unwrap();
        assert!(report.points.is_empty());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_empty_month_is_error() {
        let err = backtest_month(&[], 2024, 3, &DEFAULT_CHECKPOINTS, &WeekdayCalendar, &config());
        assert!(matches!(err, Err(SalesError::InsufficientData(_))));
    }
}
