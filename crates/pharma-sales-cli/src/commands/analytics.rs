use clap::{Args, ValueEnum};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use pharma_sales_core::analytics::{
    abc_analysis, bcg_matrix, calculate_kpis, growth_metrics, product_summary, top_pharmacies,
    AbcMetric,
};
use pharma_sales_core::pricing::{latest_decade_slice, PricedRecord};

use super::DataArgs;

/// Arguments for headline KPIs and the product summary
#[derive(Args)]
pub struct KpisArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum MetricArg {
    Revenue,
    Quantity,
}

/// Arguments for ABC classification
#[derive(Args)]
pub struct AbcArgs {
    #[command(flatten)]
    pub data: DataArgs,
    /// Rank products by revenue or by units
    #[arg(long, value_enum, default_value = "revenue")]
    pub metric: MetricArg,
}

/// Arguments for month-over-month growth views
#[derive(Args)]
pub struct GrowthArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

/// Arguments for the pharmacy ranking
#[derive(Args)]
pub struct TopPharmaciesArgs {
    #[command(flatten)]
    pub data: DataArgs,
    /// Maximum rows
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

/// Rows at each month's latest decade, i.e. the cumulative month totals.
fn month_end_rows(priced: &[PricedRecord]) -> Vec<PricedRecord> {
    let mut last: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for r in priced {
        let d = last.entry((r.record.year, r.record.month)).or_insert(r.record.decade);
        *d = (*d).max(r.record.decade);
    }
    priced
        .iter()
        .filter(|r| last.get(&(r.record.year, r.record.month)) == Some(&r.record.decade))
        .cloned()
        .collect()
}

pub fn run_kpis(args: KpisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let priced = args.data.priced_records()?;
    let latest = latest_decade_slice(&priced).ok_or("No usable snapshot rows")?;
    let period = month_end_rows(&priced);
    Ok(json!({
        "result": calculate_kpis(&latest.records, &period),
        "products": product_summary(&latest.records),
        "latest": { "year": latest.year, "month": latest.month, "decade": latest.decade },
    }))
}

pub fn run_abc(args: AbcArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let metric = match args.metric {
        MetricArg::Revenue => AbcMetric::Revenue,
        MetricArg::Quantity => AbcMetric::Quantity,
    };
    let priced = args.data.priced_records()?;
    Ok(serde_json::to_value(abc_analysis(&month_end_rows(&priced), metric))?)
}

pub fn run_bcg(args: GrowthArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let priced = args.data.priced_records()?;
    Ok(serde_json::to_value(bcg_matrix(&priced))?)
}

pub fn run_growth(args: GrowthArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let priced = args.data.priced_records()?;
    Ok(json!({ "result": growth_metrics(&priced) }))
}

pub fn run_top_pharmacies(args: TopPharmaciesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let priced = args.data.priced_records()?;
    Ok(serde_json::to_value(top_pharmacies(
        &month_end_rows(&priced),
        Some(args.limit),
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_sales_core::SalesSnapshotRecord;
    use rust_decimal_macros::dec;

    fn priced(month: u32, decade: i64) -> PricedRecord {
        PricedRecord {
            record: SalesSnapshotRecord::new("D1", "P1", "Kyiv", "Main", "1", "C", 2024, month, decade, dec!(1)),
            price: None,
            revenue: dec!(0),
        }
    }

    #[test]
    fn test_month_end_rows_keeps_latest_decade_per_month() {
        let rows = month_end_rows(&[priced(2, 20), priced(2, 30), priced(3, 10), priced(3, 20)]);
        let kept: Vec<(u32, i64)> = rows.iter().map(|r| (r.record.month, r.record.decade)).collect();
        assert_eq!(kept, vec![(2, 30), (3, 20)]);
    }
}
