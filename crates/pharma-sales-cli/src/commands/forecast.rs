use clap::Args;
use serde_json::{json, Value};

use pharma_sales_core::backtest::{backtest_month, DEFAULT_CHECKPOINTS};
use pharma_sales_core::calendar::workdays_split;
use pharma_sales_core::forecast::{forecast_by_product, forecast_with_bootstrap};
use pharma_sales_core::pricing::month_records;
use pharma_sales_core::report::build_month_end_report;
use pharma_sales_core::SalesError;

use super::{DataArgs, PeriodArgs};
use crate::settings::{ForecastOpts, ForecastSettings};

/// Arguments for the bootstrap month-end forecast
#[derive(Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub period: PeriodArgs,
    #[command(flatten)]
    pub opts: ForecastOpts,
    /// Include every bootstrap draw in the output
    #[arg(long)]
    pub with_distribution: bool,
}

/// Arguments for the per-product linear forecast
#[derive(Args)]
pub struct ProductForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub period: PeriodArgs,
    #[command(flatten)]
    pub opts: ForecastOpts,
}

/// Arguments for back-testing a completed month
#[derive(Args)]
pub struct BacktestArgs {
    #[command(flatten)]
    pub data: DataArgs,
    #[arg(long, requires = "month")]
    pub year: Option<i32>,
    #[arg(long, requires = "year")]
    pub month: Option<u32>,
    /// Decades to re-forecast from, comma separated
    #[arg(long, value_delimiter = ',')]
    pub checkpoints: Vec<u32>,
    #[command(flatten)]
    pub opts: ForecastOpts,
}

/// Arguments for the month-end report
#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub opts: ForecastOpts,
}

fn cutoff_decade(decade: i64) -> Result<u32, SalesError> {
    u32::try_from(decade).map_err(|_| SalesError::InvalidInput {
        field: "decade".into(),
        reason: format!("{decade} is not a valid decade marker"),
    })
}

pub fn run_forecast(
    args: ForecastArgs,
    settings: ForecastSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let settings = settings.with_overrides(&args.opts);
    let priced = args.data.priced_records()?;
    let slice = args.period.select(&priced)?;

    let calendar = settings.calendar();
    let mut result = forecast_with_bootstrap(
        &slice.observations(),
        cutoff_decade(slice.decade)?,
        slice.year,
        slice.month,
        calendar.as_ref(),
        &settings.bootstrap_config(),
    )?;
    if !args.with_distribution {
        result.bootstrap_distribution_revenue.clear();
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_product_forecast(
    args: ProductForecastArgs,
    settings: ForecastSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let settings = settings.with_overrides(&args.opts);
    let priced = args.data.priced_records()?;
    let slice = args.period.select(&priced)?;

    let cutoff = settings.decade_convention.cutoff_date(
        cutoff_decade(slice.decade)?,
        slice.year,
        slice.month,
    )?;
    let calendar = settings.calendar();
    let split = workdays_split(calendar.as_ref(), cutoff)?;
    let rows = forecast_by_product(&slice.observations(), split.passed, split.left)?;

    Ok(json!({
        "result": rows,
        "workdays": split,
        "calendar": calendar.name(),
    }))
}

pub fn run_backtest(
    args: BacktestArgs,
    settings: ForecastSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let settings = settings.with_overrides(&args.opts);
    let priced = args.data.priced_records()?;
    let period = PeriodArgs {
        year: args.year,
        month: args.month,
        decade: None,
    };
    let slice = period.select(&priced)?;
    let checkpoints: &[u32] = if args.checkpoints.is_empty() {
        &DEFAULT_CHECKPOINTS
    } else {
        &args.checkpoints
    };

    let calendar = settings.calendar();
    let report = backtest_month(
        &month_records(&priced, slice.year, slice.month),
        slice.year,
        slice.month,
        checkpoints,
        calendar.as_ref(),
        &settings.bootstrap_config(),
    )?;
    let mape = report.mape();
    let mut value = serde_json::to_value(report)?;
    value["mape_pct"] = json!(mape);
    Ok(value)
}

pub fn run_report(
    args: ReportArgs,
    settings: ForecastSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let settings = settings.with_overrides(&args.opts);
    let frame = crate::input::load_frame(args.data.input.as_deref())?;
    let prices = crate::input::load_prices(args.data.prices.as_deref())?;
    let calendar = settings.calendar();
    let mut output = build_month_end_report(
        &frame.records(),
        &prices,
        calendar.as_ref(),
        &settings.bootstrap_config(),
    )?;
    if let Some(f) = output.result.forecast.as_mut() {
        f.bootstrap_distribution_revenue.clear();
    }
    Ok(serde_json::to_value(output)?)
}
