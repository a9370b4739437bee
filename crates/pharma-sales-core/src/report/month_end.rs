use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::backtest::{backtest_month, BacktestReport, DEFAULT_CHECKPOINTS};
use crate::calendar::{workdays_split, WorkdaySplit, WorkingDayCalendar};
use crate::error::SalesError;
use crate::forecast::{
    forecast_by_product, forecast_with_bootstrap, BootstrapConfig, ForecastResult,
    ProductForecastRow,
};
use crate::pricing::{
    attach_revenue, latest_decade_slice, month_records, unpriced_products, PriceLookup,
};
use crate::types::{
    with_metadata, ComputationOutput, Money, Quantity, SalesObservation, SalesSnapshotRecord,
};
use crate::SalesResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the dashboard shows for the latest month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthEndReport {
    pub year: i32,
    pub month: u32,
    pub latest_decade: i64,
    pub month_complete: bool,
    pub quantity_so_far: Quantity,
    pub revenue_so_far: Money,
    pub workdays: Option<WorkdaySplit>,
    /// Present while the month is still open
    pub forecast: Option<ForecastResult>,
    pub product_forecast: Vec<ProductForecastRow>,
    /// Present once the month is complete
    pub backtest: Option<BacktestReport>,
    pub unpriced_products: Vec<String>,
}

#[derive(Serialize)]
struct ReportAssumptions<'a> {
    calendar: &'a str,
    #[serde(flatten)]
    bootstrap: &'a BootstrapConfig,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price the snapshot, take the latest month and either forecast its end
/// (open month) or back-test the forecaster against it (complete month).
///
/// Forecast failures on an open month degrade to warnings; the report is
/// still produced with the observed totals.
pub fn build_month_end_report(
    records: &[SalesSnapshotRecord],
    prices: &dyn PriceLookup,
    calendar: &dyn WorkingDayCalendar,
    config: &BootstrapConfig,
) -> SalesResult<ComputationOutput<MonthEndReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let priced = attach_revenue(records, prices);
    let slice = latest_decade_slice(&priced).ok_or_else(|| {
        SalesError::InsufficientData("No sales records to report on".into())
    })?;

    let unpriced = unpriced_products(&slice.records);
    if !unpriced.is_empty() {
        warnings.push(format!(
            "{} product(s) without a price for month {}: revenue counted as 0",
            unpriced.len(),
            slice.month
        ));
    }

    let quantity_so_far: Quantity = slice.records.iter().map(|r| r.record.quantity).sum();
    let revenue_so_far: Money = slice.records.iter().map(|r| r.revenue).sum();
    let month_complete = u32::try_from(slice.decade)
        .map(|d| config.decade_convention.is_month_complete(d))
        .unwrap_or(false);

    let mut report = MonthEndReport {
        year: slice.year,
        month: slice.month,
        latest_decade: slice.decade,
        month_complete,
        quantity_so_far,
        revenue_so_far,
        workdays: None,
        forecast: None,
        product_forecast: Vec::new(),
        backtest: None,
        unpriced_products: unpriced,
    };

    if month_complete {
        let month = month_records(&priced, slice.year, slice.month);
        let bt = backtest_month(
            &month,
            slice.year,
            slice.month,
            &DEFAULT_CHECKPOINTS,
            calendar,
            config,
        )?;
        warnings.extend(bt.warnings.iter().map(|w| format!("[Backtest] {w}")));
        report.backtest = Some(bt);
    } else if let Err(e) = project_open_month(
        &mut report,
        &slice.observations(),
        calendar,
        config,
        &mut warnings,
    ) {
        warn!(error = %e, "month-end projection unavailable");
        warnings.push(format!("[Forecast] {e}"));
    }

    if revenue_so_far == Decimal::ZERO {
        warnings.push("Observed revenue is zero".into());
    }

    info!(
        year = report.year,
        month = report.month,
        decade = report.latest_decade,
        complete = report.month_complete,
        "month-end report"
    );

    let assumptions = ReportAssumptions {
        calendar: calendar.name(),
        bootstrap: config,
    };
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Decade snapshot revenue with bootstrap month-end projection",
        &assumptions,
        warnings,
        elapsed,
        report,
    ))
}

/// Working-day split, bootstrap forecast and per-product projection for an
/// open month. A bootstrap failure is recorded as a warning so the product
/// projection still runs.
fn project_open_month(
    report: &mut MonthEndReport,
    observations: &[SalesObservation],
    calendar: &dyn WorkingDayCalendar,
    config: &BootstrapConfig,
    warnings: &mut Vec<String>,
) -> SalesResult<()> {
    let cutoff_decade =
        u32::try_from(report.latest_decade).map_err(|_| SalesError::InvalidInput {
            field: "decade".into(),
            reason: format!("Latest decade {} is out of range", report.latest_decade),
        })?;
    let cutoff = config
        .decade_convention
        .cutoff_date(cutoff_decade, report.year, report.month)?;
    let split = workdays_split(calendar, cutoff)?;
    report.workdays = Some(split);

    match forecast_with_bootstrap(
        observations,
        cutoff_decade,
        report.year,
        report.month,
        calendar,
        config,
    ) {
        Ok(f) => report.forecast = Some(f),
        Err(e) => {
            warn!(error = %e, "month-end forecast unavailable");
            warnings.push(format!("[Forecast] {e}"));
        }
    }

    if split.passed > 0 {
        report.product_forecast = forecast_by_product(observations, split.passed, split.left)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekdayCalendar;
    use crate::pricing::PriceTable;
    use rust_decimal_macros::dec;

    fn rec(product: &str, month: u32, decade: i64, qty: Decimal) -> SalesSnapshotRecord {
        SalesSnapshotRecord::new("D1", product, "Kyiv", "Main", "1", "C", 2024, month, decade, qty)
    }

    fn prices() -> PriceTable {
        let mut t = PriceTable::new();
        t.insert("P1", 3, dec!(10));
        t.insert("P2", 3, dec!(5));
        t
    }

    fn config() -> BootstrapConfig {
        BootstrapConfig {
            iterations: 100,
            seed: Some(1),
            ..BootstrapConfig::default()
        }
    }

    #[test]
    fn test_open_month_forecasts() {
        let records = vec![rec("P1", 3, 10, dec!(6)), rec("P2", 3, 10, dec!(12))];
        let out = build_month_end_report(&records, &prices(), &WeekdayCalendar, &config()).unwrap();
        let r = &out.result;
        assert!(!r.month_complete);
        assert_eq!(r.revenue_so_far, dec!(120));
        let f = r.forecast.as_ref().unwrap();
        // 6 weekdays passed, 15 left in March 2024
        assert!((f.point_forecast_revenue - 420.0).abs() < 1e-9);
        assert_eq!(r.product_forecast.len(), 2);
        assert!(r.backtest.is_none());
        assert_eq!(out.assumptions["calendar"], "weekdays");
        assert_eq!(out.assumptions["iterations"], 100);
    }

    #[test]
    fn test_complete_month_backtests() {
        let records = vec![
            rec("P1", 3, 10, dec!(6)),
            rec("P1", 3, 20, dec!(14)),
            rec("P1", 3, 30, dec!(21)),
        ];
        let out = build_month_end_report(&records, &prices(), &WeekdayCalendar, &config()).unwrap();
        let r = &out.result;
        assert!(r.month_complete);
        assert!(r.forecast.is_none());
        let bt = r.backtest.as_ref().unwrap();
        assert_eq!(bt.fact_revenue, 210.0);
        assert_eq!(bt.points.len(), 2);
    }

    #[test]
    fn test_unpriced_products_warn() {
        let records = vec![rec("P9", 3, 10, dec!(6))];
        let out = build_month_end_report(&records, &prices(), &WeekdayCalendar, &config()).unwrap();
        assert_eq!(out.result.unpriced_products, vec!["P9".to_string()]);
        assert!(out.warnings.iter().any(|w| w.contains("without a price")));
        assert!(out.warnings.iter().any(|w| w.contains("zero")));
    }

    #[test]
    fn test_unmappable_decade_keeps_observed_totals() {
        // Non-numeric decades coerce to 0, which names no day of the month
        let records = vec![rec("P1", 3, 0, dec!(6))];
        let out = build_month_end_report(&records, &prices(), &WeekdayCalendar, &config()).unwrap();
        let r = &out.result;
        assert!(!r.month_complete);
        assert_eq!(r.revenue_so_far, dec!(60));
        assert!(r.workdays.is_none());
        assert!(r.forecast.is_none());
        assert!(r.product_forecast.is_empty());
        assert!(out.warnings.iter().any(|w| w.starts_with("[Forecast]")));
    }

    #[test]
    fn test_day_past_short_february_warns() {
        let mut prices = PriceTable::new();
        prices.insert("P1", 2, dec!(10));
        let records = vec![SalesSnapshotRecord::new(
            "D1", "P1", "Kyiv", "Main", "1", "C", 2023, 2, 29, dec!(6),
        )];
        let out = build_month_end_report(&records, &prices, &WeekdayCalendar, &config()).unwrap();
        assert_eq!(out.result.month, 2);
        assert_eq!(out.result.revenue_so_far, dec!(60));
        assert!(out.result.forecast.is_none());
        assert!(out.warnings.iter().any(|w| w.starts_with("[Forecast]")));
    }

    #[test]
    fn test_negative_decade_warns() {
        let records = vec![rec("P1", 3, -10, dec!(6))];
        let out = build_month_end_report(&records, &prices(), &WeekdayCalendar, &config()).unwrap();
        assert!(!out.result.month_complete);
        assert_eq!(out.result.quantity_so_far, dec!(6));
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("[Forecast]") && w.contains("out of range")));
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = build_month_end_report(&[], &prices(), &WeekdayCalendar, &config());
        assert!(matches!(err, Err(SalesError::InsufficientData(_))));
    }
}
