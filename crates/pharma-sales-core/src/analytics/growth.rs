use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::analytics::{clean_product_name, pct_change};
use crate::pricing::PricedRecord;
use crate::types::{Money, Percent, Quantity};

// ---------------------------------------------------------------------------
// Month-over-month aggregation
// ---------------------------------------------------------------------------

type Period = (i32, u32);

/// Per-product (quantity, revenue) at each period's last decade.
struct PeriodTotals {
    last: Period,
    prev: Period,
    by_product: BTreeMap<String, BTreeMap<Period, (Quantity, Money)>>,
}

impl PeriodTotals {
    /// `None` when fewer than two periods are present.
    fn build(records: &[PricedRecord]) -> Option<Self> {
        let mut last_decade: BTreeMap<Period, i64> = BTreeMap::new();
        for r in records {
            let key = (r.record.year, r.record.month);
            let d = last_decade.entry(key).or_insert(r.record.decade);
            if r.record.decade > *d {
                *d = r.record.decade;
            }
        }

        let periods: BTreeSet<Period> = last_decade.keys().copied().collect();
        if periods.len() < 2 {
            debug!(periods = periods.len(), "growth needs two periods");
            return None;
        }
        let mut it = periods.iter().rev();
        let last = *it.next()?;
        let prev = *it.next()?;

        let mut by_product: BTreeMap<String, BTreeMap<Period, (Quantity, Money)>> = BTreeMap::new();
        for r in records {
            let key = (r.record.year, r.record.month);
            if key != last && key != prev {
                continue;
            }
            if last_decade.get(&key) != Some(&r.record.decade) {
                continue;
            }
            let entry = by_product
                .entry(clean_product_name(&r.record.product_name))
                .or_default()
                .entry(key)
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 += r.record.quantity;
            entry.1 += r.revenue;
        }

        Some(Self {
            last,
            prev,
            by_product,
        })
    }

    fn pair(&self, periods: &BTreeMap<Period, (Quantity, Money)>) -> ((Quantity, Money), (Quantity, Money)) {
        let zero = (Decimal::ZERO, Decimal::ZERO);
        (
            periods.get(&self.last).copied().unwrap_or(zero),
            periods.get(&self.prev).copied().unwrap_or(zero),
        )
    }
}

// ---------------------------------------------------------------------------
// BCG-style growth matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthCategory {
    /// Below 0%
    Declining,
    /// 0% up to 3%
    Stable,
    /// 3% and above
    Growing,
}

impl GrowthCategory {
    pub fn from_growth(growth_pct: Percent) -> Self {
        if growth_pct < Decimal::ZERO {
            GrowthCategory::Declining
        } else if growth_pct < dec!(3) {
            GrowthCategory::Stable
        } else {
            GrowthCategory::Growing
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BcgRow {
    pub product_name: String,
    pub qty_last: Quantity,
    pub qty_prev: Quantity,
    pub growth_pct: Percent,
    pub category: GrowthCategory,
}

/// Quantity growth per product between the two latest periods.
pub fn bcg_matrix(records: &[PricedRecord]) -> Vec<BcgRow> {
    let Some(totals) = PeriodTotals::build(records) else {
        return Vec::new();
    };
    totals
        .by_product
        .iter()
        .map(|(name, periods)| {
            let ((qty_last, _), (qty_prev, _)) = totals.pair(periods);
            let growth_pct = pct_change(qty_last, qty_prev);
            BcgRow {
                product_name: name.clone(),
                qty_last,
                qty_prev,
                growth_pct,
                category: GrowthCategory::from_growth(growth_pct),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Growth metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueGrowthRow {
    pub product_name: String,
    pub revenue_last: Money,
    pub revenue_prev: Money,
    pub delta: Money,
    pub delta_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityGrowthRow {
    pub product_name: String,
    pub qty_last: Quantity,
    pub qty_prev: Quantity,
    pub delta: Quantity,
    pub delta_pct: Percent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthReport {
    /// (year, month) compared against `previous_period`
    pub last_period: Option<(i32, u32)>,
    pub previous_period: Option<(i32, u32)>,
    pub revenue: Vec<RevenueGrowthRow>,
    pub quantity: Vec<QuantityGrowthRow>,
}

/// Revenue and quantity deltas per product between the two latest periods.
pub fn growth_metrics(records: &[PricedRecord]) -> GrowthReport {
    let Some(totals) = PeriodTotals::build(records) else {
        return GrowthReport::default();
    };

    let mut report = GrowthReport {
        last_period: Some(totals.last),
        previous_period: Some(totals.prev),
        ..GrowthReport::default()
    };
    for (name, periods) in &totals.by_product {
        let ((qty_last, revenue_last), (qty_prev, revenue_prev)) = totals.pair(periods);
        report.revenue.push(RevenueGrowthRow {
            product_name: name.clone(),
            revenue_last,
            revenue_prev,
            delta: revenue_last - revenue_prev,
            delta_pct: pct_change(revenue_last, revenue_prev),
        });
        report.quantity.push(QuantityGrowthRow {
            product_name: name.clone(),
            qty_last,
            qty_prev,
            delta: qty_last - qty_prev,
            delta_pct: pct_change(qty_last, qty_prev),
        });
    }
    report
}
