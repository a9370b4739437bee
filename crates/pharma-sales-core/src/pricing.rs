use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::types::{Money, SalesObservation, SalesSnapshotRecord};

// ---------------------------------------------------------------------------
// Price lookup
// ---------------------------------------------------------------------------

/// Per-product, per-month unit prices supplied by the price collaborator.
pub trait PriceLookup {
    fn unit_price(&self, product_name: &str, month: u32) -> Option<Money>;
}

/// One price-list row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub product_name: String,
    pub month: u32,
    pub price: Money,
}

/// In-memory price list keyed by (product, month). Later entries win.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<PriceEntry>", into = "Vec<PriceEntry>")]
pub struct PriceTable {
    prices: HashMap<(String, u32), Money>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, product_name: impl Into<String>, month: u32, price: Money) {
        self.prices
            .insert((product_name.into().trim().to_string(), month), price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl From<Vec<PriceEntry>> for PriceTable {
    fn from(entries: Vec<PriceEntry>) -> Self {
        let mut table = PriceTable::new();
        for e in entries {
            table.insert(e.product_name, e.month, e.price);
        }
        table
    }
}

impl From<PriceTable> for Vec<PriceEntry> {
    fn from(table: PriceTable) -> Self {
        let mut entries: Vec<PriceEntry> = table
            .prices
            .into_iter()
            .map(|((product_name, month), price)| PriceEntry {
                product_name,
                month,
                price,
            })
            .collect();
        entries.sort_by(|a, b| (a.month, &a.product_name).cmp(&(b.month, &b.product_name)));
        entries
    }
}

impl PriceLookup for PriceTable {
    fn unit_price(&self, product_name: &str, month: u32) -> Option<Money> {
        self.prices
            .get(&(product_name.trim().to_string(), month))
            .copied()
    }
}

// ---------------------------------------------------------------------------
// Revenue join
// ---------------------------------------------------------------------------

/// A snapshot record with its unit price and derived revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedRecord {
    #[serde(flatten)]
    pub record: SalesSnapshotRecord,
    /// `None` when the price list has no entry for the product/month
    pub price: Option<Money>,
    /// quantity * price, or zero without a price
    pub revenue: Money,
}

/// Attach prices and compute `revenue = quantity * price`.
pub fn attach_revenue(records: &[SalesSnapshotRecord], prices: &dyn PriceLookup) -> Vec<PricedRecord> {
    let mut unpriced = 0usize;
    let out: Vec<PricedRecord> = records
        .iter()
        .map(|r| {
            let price = prices.unit_price(&r.product_name, r.month);
            if price.is_none() {
                unpriced += 1;
            }
            PricedRecord {
                record: r.clone(),
                price,
                revenue: price.map_or(Decimal::ZERO, |p| r.quantity * p),
            }
        })
        .collect();
    if unpriced > 0 {
        debug!(unpriced, "records without a unit price carry zero revenue");
    }
    out
}

/// Products that appear in `records` but have no price, sorted and deduplicated.
pub fn unpriced_products(records: &[PricedRecord]) -> Vec<String> {
    let mut names: Vec<String> = records
        .iter()
        .filter(|r| r.price.is_none())
        .map(|r| r.record.product_name.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

impl From<&PricedRecord> for SalesObservation {
    fn from(r: &PricedRecord) -> Self {
        SalesObservation {
            product_name: r.record.product_name.clone(),
            decade: r.record.decade,
            quantity: r.record.quantity,
            revenue: r.revenue,
        }
    }
}

// ---------------------------------------------------------------------------
// Period slicing
// ---------------------------------------------------------------------------

/// Records of the most recent (year, month) at that month's latest decade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestSlice {
    pub year: i32,
    pub month: u32,
    pub decade: i64,
    pub records: Vec<PricedRecord>,
}

impl LatestSlice {
    pub fn observations(&self) -> Vec<SalesObservation> {
        self.records.iter().map(SalesObservation::from).collect()
    }
}

/// Select the latest (year, month) and, within it, the maximum decade.
/// `None` for an empty input.
pub fn latest_decade_slice(records: &[PricedRecord]) -> Option<LatestSlice> {
    let (year, month) = records
        .iter()
        .map(|r| (r.record.year, r.record.month))
        .max()?;
    let decade = max_decade(records, year, month)?;
    Some(LatestSlice {
        year,
        month,
        decade,
        records: records
            .iter()
            .filter(|r| r.record.year == year && r.record.month == month && r.record.decade == decade)
            .cloned()
            .collect(),
    })
}

/// All records of one (year, month).
pub fn month_records(records: &[PricedRecord], year: i32, month: u32) -> Vec<PricedRecord> {
    records
        .iter()
        .filter(|r| r.record.year == year && r.record.month == month)
        .cloned()
        .collect()
}

/// Highest decade present for (year, month).
pub fn max_decade(records: &[PricedRecord], year: i32, month: u32) -> Option<i64> {
    records
        .iter()
        .filter(|r| r.record.year == year && r.record.month == month)
        .map(|r| r.record.decade)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rec(product: &str, year: i32, month: u32, decade: i64, qty: Decimal) -> SalesSnapshotRecord {
        SalesSnapshotRecord::new("D1", product, "Kyiv", "Main", "1", "C", year, month, decade, qty)
    }

    fn prices() -> PriceTable {
        PriceTable::from(vec![
            PriceEntry {
                product_name: "P1".into(),
                month: 3,
                price: dec!(12.5),
            },
            PriceEntry {
                product_name: "P2".into(),
                month: 3,
                price: dec!(4),
            },
        ])
    }

    #[test]
    fn test_attach_revenue_multiplies() {
        let priced = attach_revenue(&[rec("P1", 2024, 3, 10, dec!(8))], &prices());
        assert_eq!(priced[0].price, Some(dec!(12.5)));
        assert_eq!(priced[0].revenue, dec!(100));
    }

    #[test]
    fn test_missing_price_gives_zero_revenue() {
        let priced = attach_revenue(&[rec("P9", 2024, 3, 10, dec!(8))], &prices());
        assert_eq!(priced[0].price, None);
        assert_eq!(priced[0].revenue, Decimal::ZERO);
        assert_eq!(unpriced_products(&priced), vec!["P9".to_string()]);
    }

    #[test]
    fn test_price_is_month_specific() {
        let priced = attach_revenue(&[rec("P1", 2024, 4, 10, dec!(8))], &prices());
        assert_eq!(priced[0].price, None);
    }

    #[test]
    fn test_later_price_entry_wins() {
        let mut table = prices();
        table.insert("P1", 3, dec!(13));
        assert_eq!(table.unit_price("P1", 3), Some(dec!(13)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_latest_slice_picks_latest_month_and_decade() {
        let records = attach_revenue(
            &[
                rec("P1", 2024, 2, 30, dec!(10)),
                rec("P1", 2024, 3, 10, dec!(3)),
                rec("P1", 2024, 3, 20, dec!(7)),
                rec("P2", 2024, 3, 20, dec!(2)),
            ],
            &prices(),
        );
        let slice = latest_decade_slice(&records).unwrap();
        assert_eq!((slice.year, slice.month, slice.decade), (2024, 3, 20));
        assert_eq!(slice.records.len(), 2);
        let obs = slice.observations();
        assert_eq!(obs[0].revenue, dec!(87.5));
    }

    #[test]
    fn test_latest_slice_prefers_later_year() {
        let records = attach_revenue(
            &[rec("P1", 2023, 12, 30, dec!(1)), rec("P1", 2024, 1, 10, dec!(1))],
            &prices(),
        );
        let slice = latest_decade_slice(&records).unwrap();
        assert_eq!((slice.year, slice.month), (2024, 1));
    }

    #[test]
    fn test_latest_slice_empty() {
        assert!(latest_decade_slice(&[]).is_none());
    }

    #[test]
    fn test_price_table_serde_roundtrip_shape() {
        let json = serde_json::to_value(prices()).unwrap();
        assert!(json.is_array());
        let back: PriceTable = serde_json::from_value(json).unwrap();
        assert_eq!(back.unit_price("P2", 3), Some(dec!(4)));
    }
}
