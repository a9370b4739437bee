use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::clean_product_name;
use crate::pricing::PricedRecord;
use crate::types::Percent;

/// Which figure ranks the products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbcMetric {
    #[default]
    Revenue,
    Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    /// A up to 80% cumulative share, B up to 95%, C beyond.
    pub fn from_cumulative_share(cumulative_pct: Percent) -> Self {
        if cumulative_pct <= dec!(80) {
            AbcClass::A
        } else if cumulative_pct <= dec!(95) {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcRow {
    pub product_name: String,
    pub value: Decimal,
    pub share_pct: Percent,
    pub cumulative_share_pct: Percent,
    pub class: AbcClass,
}

/// Pareto classification of products by revenue or quantity.
pub fn abc_analysis(records: &[PricedRecord], metric: AbcMetric) -> Vec<AbcRow> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for r in records {
        let value = match metric {
            AbcMetric::Revenue => r.revenue,
            AbcMetric::Quantity => r.record.quantity,
        };
        *totals
            .entry(clean_product_name(&r.record.product_name))
            .or_insert(Decimal::ZERO) += value;
    }

    let mut ranked: Vec<(String, Decimal)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let grand_total: Decimal = ranked.iter().map(|(_, v)| *v).sum();
    let denominator = if grand_total.is_zero() {
        Decimal::ONE
    } else {
        grand_total
    };

    let mut cumulative = Decimal::ZERO;
    ranked
        .into_iter()
        .map(|(product_name, value)| {
            let share_pct = value / denominator * dec!(100);
            cumulative += share_pct;
            AbcRow {
                product_name,
                value,
                share_pct,
                cumulative_share_pct: cumulative,
                class: AbcClass::from_cumulative_share(cumulative),
            }
        })
        .collect()
}
