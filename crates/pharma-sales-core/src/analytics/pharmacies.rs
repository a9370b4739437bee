use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::pricing::PricedRecord;
use crate::types::{Money, Quantity};

/// Sales aggregated for one pharmacy address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyRow {
    pub city: String,
    /// "street house"
    pub address: String,
    pub pharmacy: String,
    pub revenue: Money,
    pub quantity: Quantity,
}

/// Pharmacies ranked by revenue, highest first. Rows are grouped by the
/// case-insensitive address key; display fields take the first non-empty
/// value seen. At most `limit` rows when given.
pub fn top_pharmacies(records: &[PricedRecord], limit: Option<usize>) -> Vec<PharmacyRow> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, PharmacyRow> = HashMap::new();

    for r in records {
        let key = r.record.address_key();
        if key == "||" {
            continue;
        }
        let address = format!("{} {}", r.record.street, r.record.house_number)
            .trim()
            .to_string();
        let row = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            PharmacyRow {
                city: String::new(),
                address: String::new(),
                pharmacy: String::new(),
                revenue: Decimal::ZERO,
                quantity: Decimal::ZERO,
            }
        });
        if row.city.is_empty() {
            row.city = r.record.city.clone();
        }
        if row.address.is_empty() {
            row.address = address;
        }
        if row.pharmacy.is_empty() {
            row.pharmacy = r.record.new_client.clone();
        }
        row.revenue += r.revenue;
        row.quantity += r.record.quantity;
    }

    let mut rows: Vec<PharmacyRow> = order
        .into_iter()
        .filter_map(|k| groups.remove(&k))
        .collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    if let Some(n) = limit {
        rows.truncate(n);
    }
    rows
}
