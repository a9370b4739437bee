use pharma_sales_core::analytics::{
    abc_analysis, bcg_matrix, calculate_kpis, growth_metrics, product_summary, top_pharmacies,
    AbcClass, AbcMetric, GrowthCategory,
};
use pharma_sales_core::cache::ReportCache;
use pharma_sales_core::calendar::WeekdayCalendar;
use pharma_sales_core::forecast::BootstrapConfig;
use pharma_sales_core::frame::{Cell, SnapshotFrame};
use pharma_sales_core::pricing::{attach_revenue, latest_decade_slice, PriceEntry, PriceTable};
use pharma_sales_core::report::build_month_end_report;
use pharma_sales_core::SalesSnapshotRecord;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

// ===========================================================================
// Fixtures
// ===========================================================================

fn rec(product: &str, street: &str, month: u32, decade: i64, qty: Decimal) -> SalesSnapshotRecord {
    SalesSnapshotRecord::new("D1", product, "Kyiv", street, "1", "Apteka", 2024, month, decade, qty)
}

fn prices() -> PriceTable {
    let mut entries = Vec::new();
    for month in [2, 3] {
        entries.push(PriceEntry {
            product_name: "01. Aspirin".into(),
            month,
            price: dec!(10),
        });
        entries.push(PriceEntry {
            product_name: "Noshpa".into(),
            month,
            price: dec!(4),
        });
    }
    PriceTable::from(entries)
}

/// February is complete; March has reached its second decade.
fn two_months() -> Vec<SalesSnapshotRecord> {
    vec![
        rec("01. Aspirin", "Shevchenka", 2, 30, dec!(100)),
        rec("Noshpa", "Khreshchatyk", 2, 30, dec!(50)),
        rec("01. Aspirin", "Shevchenka", 3, 10, dec!(40)),
        rec("01. Aspirin", "Shevchenka", 3, 20, dec!(80)),
        rec("Noshpa", "Khreshchatyk", 3, 20, dec!(60)),
    ]
}

// ===========================================================================
// Analytics over a priced snapshot
// ===========================================================================

#[test]
fn test_kpis_and_summary_on_latest_slice() {
    let priced = attach_revenue(&two_months(), &prices());
    let slice = latest_decade_slice(&priced).unwrap();
    assert_eq!((slice.month, slice.decade), (3, 20));

    let kpis = calculate_kpis(&slice.records, &slice.records);
    assert_eq!(kpis.total_quantity, dec!(140));
    assert_eq!(kpis.total_revenue, dec!(1040));
    assert_eq!(kpis.unique_clients, 2);

    let summary = product_summary(&slice.records);
    assert_eq!(summary[0].product_name, "Aspirin");
    assert_eq!(summary[0].quantity, dec!(80));
}

#[test]
fn test_abc_on_latest_slice() {
    let priced = attach_revenue(&two_months(), &prices());
    let slice = latest_decade_slice(&priced).unwrap();
    let rows = abc_analysis(&slice.records, AbcMetric::Revenue);
    // 800 of 1040 is about 76.9%
    assert_eq!(rows[0].product_name, "Aspirin");
    assert_eq!(rows[0].class, AbcClass::A);
    assert_eq!(rows[1].class, AbcClass::C);
}

#[test]
fn test_growth_between_months() {
    let priced = attach_revenue(&two_months(), &prices());

    let bcg = bcg_matrix(&priced);
    let aspirin = bcg.iter().find(|r| r.product_name == "Aspirin").unwrap();
    assert_eq!((aspirin.qty_prev, aspirin.qty_last), (dec!(100), dec!(80)));
    assert_eq!(aspirin.category, GrowthCategory::Declining);
    let noshpa = bcg.iter().find(|r| r.product_name == "Noshpa").unwrap();
    assert_eq!(noshpa.growth_pct, dec!(20));
    assert_eq!(noshpa.category, GrowthCategory::Growing);

    let growth = growth_metrics(&priced);
    assert_eq!(growth.last_period, Some((2024, 3)));
    let rev = growth
        .revenue
        .iter()
        .find(|r| r.product_name == "Noshpa")
        .unwrap();
    assert_eq!(rev.delta, dec!(40));
}

#[test]
fn test_top_pharmacies() {
    let priced = attach_revenue(&two_months(), &prices());
    let slice = latest_decade_slice(&priced).unwrap();
    let top = top_pharmacies(&slice.records, Some(10));
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].address, "Shevchenka 1");
    assert_eq!(top[0].revenue, dec!(800));
    assert_eq!(top[0].pharmacy, "Apteka");
}

// ===========================================================================
// Report through the cache
// ===========================================================================

#[test]
fn test_cached_frame_feeds_month_end_report() {
    let mut cache = ReportCache::new();
    let key = ReportCache::sales_key(None, None, None, &["2024-03".to_string()]);

    let objects: Vec<BTreeMap<String, Cell>> = two_months()
        .iter()
        .map(|r| {
            BTreeMap::from([
                ("distributor".to_string(), Cell::from(r.distributor.as_str())),
                ("product_name".to_string(), Cell::from(r.product_name.as_str())),
                ("city".to_string(), Cell::from(r.city.as_str())),
                ("street".to_string(), Cell::from(r.street.as_str())),
                ("house_number".to_string(), Cell::from(r.house_number.as_str())),
                ("new_client".to_string(), Cell::from(r.new_client.as_str())),
                ("year".to_string(), Cell::Int(i64::from(r.year))),
                ("month".to_string(), Cell::Int(i64::from(r.month))),
                ("decade".to_string(), Cell::Int(r.decade)),
                ("quantity".to_string(), Cell::Text(r.quantity.to_string())),
            ])
        })
        .collect();
    cache.insert_sales(key.clone(), SnapshotFrame::from_objects(objects));

    let frame = cache.get_sales(&key).unwrap();
    let config = BootstrapConfig {
        iterations: 200,
        seed: Some(3),
        ..BootstrapConfig::default()
    };
    let out = build_month_end_report(&frame.records(), &prices(), &WeekdayCalendar, &config).unwrap();

    let report = &out.result;
    assert_eq!((report.year, report.month, report.latest_decade), (2024, 3, 20));
    assert!(!report.month_complete);
    assert_eq!(report.revenue_so_far, dec!(1040));
    let split = report.workdays.unwrap();
    assert_eq!((split.passed, split.left), (14, 7));
    let f = report.forecast.as_ref().unwrap();
    assert!((f.point_forecast_revenue - 1560.0).abs() < 1e-9);
    assert!(out.warnings.is_empty());
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
}
