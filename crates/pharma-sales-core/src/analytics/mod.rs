pub mod abc;
pub mod growth;
pub mod kpi;
pub mod pharmacies;

pub use abc::{abc_analysis, AbcClass, AbcMetric, AbcRow};
pub use growth::{
    bcg_matrix, growth_metrics, BcgRow, GrowthCategory, GrowthReport, QuantityGrowthRow,
    RevenueGrowthRow,
};
pub use kpi::{calculate_kpis, product_summary, ProductSummaryRow, SalesKpis};
pub use pharmacies::{top_pharmacies, PharmacyRow};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Strip leading digits, punctuation and whitespace from a product name
/// ("01. Aspirin" → "Aspirin").
pub fn clean_product_name(name: &str) -> String {
    name.trim_start_matches(|c: char| !c.is_alphabetic())
        .trim()
        .to_string()
}

/// Percentage change from `previous` to `current`; zero when there is no base.
pub(crate) fn pct_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        Decimal::ZERO
    } else {
        (current - previous) / previous * dec!(100)
    }
}
