use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::analytics::clean_product_name;
use crate::pricing::PricedRecord;
use crate::types::{Money, Quantity};

/// Headline figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesKpis {
    /// Cumulative units at the latest decade
    pub total_quantity: Quantity,
    /// Revenue at the latest decade
    pub total_revenue: Money,
    pub period_quantity: Quantity,
    pub period_revenue: Money,
    /// Period revenue per unit
    pub avg_check: Money,
    /// Period units per distinct pharmacy address
    pub avg_qty_per_client: Decimal,
    pub unique_clients: usize,
}

/// KPIs over the latest-decade slice and the selected period.
pub fn calculate_kpis(latest: &[PricedRecord], period: &[PricedRecord]) -> SalesKpis {
    let total_quantity: Quantity = latest.iter().map(|r| r.record.quantity).sum();
    let total_revenue: Money = latest.iter().map(|r| r.revenue).sum();
    let period_quantity: Quantity = period.iter().map(|r| r.record.quantity).sum();
    let period_revenue: Money = period.iter().map(|r| r.revenue).sum();

    let unique_clients = period
        .iter()
        .map(|r| r.record.address_key())
        .collect::<HashSet<_>>()
        .len();

    let avg_check = if period_quantity > Decimal::ZERO {
        period_revenue / period_quantity
    } else {
        Decimal::ZERO
    };
    let avg_qty_per_client = if unique_clients > 0 {
        period_quantity / Decimal::from(unique_clients as u64)
    } else {
        Decimal::ZERO
    };

    SalesKpis {
        total_quantity,
        total_revenue,
        period_quantity,
        period_revenue,
        avg_check,
        avg_qty_per_client,
        unique_clients,
    }
}

/// Units and revenue per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummaryRow {
    pub product_name: String,
    pub quantity: Quantity,
    pub revenue: Money,
}

/// Per-product totals over `records`, largest quantity first.
pub fn product_summary(records: &[PricedRecord]) -> Vec<ProductSummaryRow> {
    let mut totals: BTreeMap<String, (Quantity, Money)> = BTreeMap::new();
    for r in records {
        let entry = totals
            .entry(clean_product_name(&r.record.product_name))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += r.record.quantity;
        entry.1 += r.revenue;
    }

    let mut rows: Vec<ProductSummaryRow> = totals
        .into_iter()
        .map(|(product_name, (quantity, revenue))| ProductSummaryRow {
            product_name,
            quantity,
            revenue,
        })
        .collect();
    rows.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    rows
}
