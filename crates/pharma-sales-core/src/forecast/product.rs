use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SalesError;
use crate::types::{Money, Quantity, SalesObservation};
use crate::SalesResult;

/// Linear month-end projection for one product.
///
/// Observed totals stay exact; rates and projections are `f64` so that
/// scaling the input scales the projection exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductForecastRow {
    pub product_name: String,
    pub quantity_so_far: Quantity,
    pub revenue_so_far: Money,
    /// quantity_so_far / workdays_passed
    pub daily_quantity_rate: f64,
    /// revenue_so_far / workdays_passed
    pub daily_revenue_rate: f64,
    pub forecast_quantity: f64,
    pub forecast_revenue: f64,
}

/// Project each product's month-end quantity and revenue at its observed
/// daily rate. Sorted by forecast revenue, highest first.
pub fn forecast_by_product(
    observations: &[SalesObservation],
    workdays_passed: u32,
    workdays_left: u32,
) -> SalesResult<Vec<ProductForecastRow>> {
    if observations.is_empty() {
        return Err(SalesError::InsufficientData(
            "No observations for product forecast".into(),
        ));
    }
    if workdays_passed == 0 {
        return Err(SalesError::InvalidInput {
            field: "workdays_passed".into(),
            reason: "Must be greater than zero".into(),
        });
    }

    let mut totals: BTreeMap<&str, (Quantity, Money)> = BTreeMap::new();
    for o in observations {
        let entry = totals
            .entry(o.product_name.as_str())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += o.quantity;
        entry.1 += o.revenue;
    }

    let passed = f64::from(workdays_passed);
    let left = f64::from(workdays_left);

    let mut rows: Vec<ProductForecastRow> = totals
        .into_iter()
        .map(|(name, (quantity_so_far, revenue_so_far))| {
            let quantity = quantity_so_far.to_f64().unwrap_or(0.0);
            let revenue = revenue_so_far.to_f64().unwrap_or(0.0);
            let daily_quantity_rate = quantity / passed;
            let daily_revenue_rate = revenue / passed;
            ProductForecastRow {
                product_name: name.to_string(),
                quantity_so_far,
                revenue_so_far,
                daily_quantity_rate,
                daily_revenue_rate,
                forecast_quantity: quantity + daily_quantity_rate * left,
                forecast_revenue: revenue + daily_revenue_rate * left,
            }
        })
        .collect();

    // Stable sort keeps product-name order among equal forecasts.
    rows.sort_by(|a, b| b.forecast_revenue.total_cmp(&a.forecast_revenue));
    Ok(rows)
}
