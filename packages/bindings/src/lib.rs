use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;
use std::collections::BTreeMap;

use pharma_sales_core::analytics::{
    abc_analysis, bcg_matrix, calculate_kpis, growth_metrics, product_summary, top_pharmacies,
    AbcMetric,
};
use pharma_sales_core::backtest::{backtest_month, DEFAULT_CHECKPOINTS};
use pharma_sales_core::calendar::{build_calendar, workdays_split, CalendarKind, WorkingDayCalendar};
use pharma_sales_core::forecast::{forecast_by_product, forecast_with_bootstrap, BootstrapConfig};
use pharma_sales_core::frame::{Cell, SnapshotFrame};
use pharma_sales_core::pricing::{attach_revenue, latest_decade_slice, month_records, PriceTable};
use pharma_sales_core::reconciliation::compute_actual_sales;
use pharma_sales_core::report::build_month_end_report;
use pharma_sales_core::SalesObservation;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

type Rows = Vec<BTreeMap<String, Cell>>;

/// Calendar selection shared by every request that counts working days.
#[derive(Deserialize, Default)]
struct CalendarSpec {
    #[serde(default)]
    calendar: CalendarKind,
    #[serde(default)]
    suspend_holidays_from: Option<NaiveDate>,
}

impl CalendarSpec {
    fn build(&self) -> Box<dyn WorkingDayCalendar> {
        build_calendar(self.calendar, self.suspend_holidays_from)
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// `rows_json`: array of snapshot objects. Returns incremental sales rows.
#[napi]
pub fn reconcile_sales(rows_json: String) -> NapiResult<String> {
    let rows: Rows = serde_json::from_str(&rows_json).map_err(to_napi_error)?;
    let output = compute_actual_sales(&SnapshotFrame::from_objects(rows));
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Forecasting
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ForecastRequest {
    observations: Vec<SalesObservation>,
    cutoff_decade: u32,
    year: i32,
    month: u32,
    #[serde(flatten)]
    calendar: CalendarSpec,
    #[serde(default)]
    config: BootstrapConfig,
}

#[napi]
pub fn forecast_revenue(input_json: String) -> NapiResult<String> {
    let req: ForecastRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let calendar = req.calendar.build();
    let output = forecast_with_bootstrap(
        &req.observations,
        req.cutoff_decade,
        req.year,
        req.month,
        calendar.as_ref(),
        &req.config,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ProductForecastRequest {
    observations: Vec<SalesObservation>,
    workdays_passed: u32,
    workdays_left: u32,
}

#[napi]
pub fn forecast_products(input_json: String) -> NapiResult<String> {
    let req: ProductForecastRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = forecast_by_product(&req.observations, req.workdays_passed, req.workdays_left)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct WorkdaysRequest {
    cutoff: NaiveDate,
    #[serde(flatten)]
    calendar: CalendarSpec,
}

#[napi]
pub fn workdays(input_json: String) -> NapiResult<String> {
    let req: WorkdaysRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let calendar = req.calendar.build();
    let output = workdays_split(calendar.as_ref(), req.cutoff).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SnapshotRequest {
    rows: Rows,
    #[serde(default)]
    prices: PriceTable,
    #[serde(flatten)]
    calendar: CalendarSpec,
    #[serde(default)]
    config: BootstrapConfig,
}

#[napi]
pub fn month_end_report(input_json: String) -> NapiResult<String> {
    let req: SnapshotRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let records = SnapshotFrame::from_objects(req.rows).records();
    let calendar = req.calendar.build();
    let output = build_month_end_report(&records, &req.prices, calendar.as_ref(), &req.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct BacktestRequest {
    #[serde(flatten)]
    snapshot: SnapshotRequest,
    year: i32,
    month: u32,
    #[serde(default)]
    checkpoints: Option<Vec<u32>>,
}

#[napi]
pub fn backtest(input_json: String) -> NapiResult<String> {
    let req: BacktestRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let snapshot = req.snapshot;
    let priced = attach_revenue(&SnapshotFrame::from_objects(snapshot.rows).records(), &snapshot.prices);
    let checkpoints = req.checkpoints.unwrap_or_else(|| DEFAULT_CHECKPOINTS.to_vec());
    let calendar = snapshot.calendar.build();
    let output = backtest_month(
        &month_records(&priced, req.year, req.month),
        req.year,
        req.month,
        &checkpoints,
        calendar.as_ref(),
        &snapshot.config,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct AnalyticsRequest {
    rows: Rows,
    #[serde(default)]
    prices: PriceTable,
    #[serde(default)]
    abc_metric: AbcMetric,
    #[serde(default)]
    top_limit: Option<usize>,
}

/// KPIs, product summary, ABC, growth matrix and pharmacy ranking in one call.
#[napi]
pub fn sales_analytics(input_json: String) -> NapiResult<String> {
    let req: AnalyticsRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let priced = attach_revenue(&SnapshotFrame::from_objects(req.rows).records(), &req.prices);
    let latest = latest_decade_slice(&priced)
        .ok_or_else(|| to_napi_error("No usable snapshot rows"))?;

    let output = serde_json::json!({
        "kpis": calculate_kpis(&latest.records, &latest.records),
        "products": product_summary(&latest.records),
        "abc": abc_analysis(&latest.records, req.abc_metric),
        "bcg": bcg_matrix(&priced),
        "growth": growth_metrics(&priced),
        "top_pharmacies": top_pharmacies(&latest.records, req.top_limit),
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}
