use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::SalesError;
use crate::frame::SnapshotFrame;
use crate::types::{Quantity, SalesSnapshotRecord};
use crate::SalesResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Columns a snapshot export must carry to be reconciled.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "decade",
    "distributor",
    "product_name",
    "quantity",
    "year",
    "month",
    "city",
    "street",
    "house_number",
    "new_client",
];

/// Incremental sales for one key within one decade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualSalesRecord {
    pub distributor: String,
    pub product_name: String,
    pub full_address: String,
    pub year: i32,
    pub month: u32,
    /// Decade label as consumers expect it ("10", "20", ...)
    pub decade: String,
    /// Cumulative quantity minus the previous observed decade's cumulative
    /// quantity. May be negative.
    pub actual_quantity: Quantity,
    pub new_client: String,
}

/// Grouping key. Field order is the sort order: everything identifying the
/// series first, then the decade.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SnapshotKey {
    distributor: String,
    product_name: String,
    full_address: String,
    year: i32,
    month: u32,
    new_client: String,
    decade: i64,
}

impl SnapshotKey {
    fn from_record(r: &SalesSnapshotRecord) -> Self {
        SnapshotKey {
            distributor: r.distributor.clone(),
            product_name: r.product_name.clone(),
            full_address: r.full_address.clone(),
            year: r.year,
            month: r.month,
            new_client: r.new_client.clone(),
            decade: r.decade,
        }
    }

    /// Same distributor/product/address/period/client, any decade.
    fn same_series(&self, other: &SnapshotKey) -> bool {
        self.distributor == other.distributor
            && self.product_name == other.product_name
            && self.full_address == other.full_address
            && self.year == other.year
            && self.month == other.month
            && self.new_client == other.new_client
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Convert cumulative decade snapshots into incremental ("actual") sales.
///
/// Degenerate inputs (missing required columns, no usable distributor
/// values) yield an empty result rather than an error.
pub fn compute_actual_sales(frame: &SnapshotFrame) -> Vec<ActualSalesRecord> {
    match try_compute_actual_sales(frame) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "decade reconciliation produced no rows");
            Vec::new()
        }
    }
}

/// Like [`compute_actual_sales`] but reports why nothing could be reconciled.
pub fn try_compute_actual_sales(frame: &SnapshotFrame) -> SalesResult<Vec<ActualSalesRecord>> {
    let missing = frame.missing_columns(&REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(SalesError::InvalidSchema { missing });
    }
    if frame.is_empty() {
        return Ok(Vec::new());
    }

    let total = frame.len();
    let records: Vec<SalesSnapshotRecord> = frame
        .records()
        .into_iter()
        .filter(|r| !r.full_address.is_empty())
        .collect();
    if records.len() < total {
        debug!(
            dropped = total - records.len(),
            "snapshot rows without an address or period dropped"
        );
    }

    if records.iter().all(|r| r.distributor.is_empty()) {
        return Err(SalesError::InsufficientData(
            "No distributor values present in snapshot rows".into(),
        ));
    }

    Ok(reconcile_records(&records))
}

/// Aggregate, sort and difference already-normalized snapshot records.
///
/// Rows sharing a key and decade are summed before differencing. Each
/// series' first observed decade is differenced against zero, later ones
/// against the previous observed decade (gaps are not filled). Zero deltas
/// are dropped; negative deltas are kept.
pub fn reconcile_records(records: &[SalesSnapshotRecord]) -> Vec<ActualSalesRecord> {
    let mut cumulative: BTreeMap<SnapshotKey, Quantity> = BTreeMap::new();
    for r in records {
        *cumulative
            .entry(SnapshotKey::from_record(r))
            .or_insert(Decimal::ZERO) += r.quantity;
    }

    let mut out = Vec::with_capacity(cumulative.len());
    let mut previous: Option<(&SnapshotKey, Quantity)> = None;

    for (key, quantity) in &cumulative {
        let prev_quantity = match previous {
            Some((prev_key, q)) if prev_key.same_series(key) => q,
            _ => Decimal::ZERO,
        };
        previous = Some((key, *quantity));

        let actual_quantity = *quantity - prev_quantity;
        if actual_quantity.is_zero() {
            continue;
        }
        out.push(ActualSalesRecord {
            distributor: key.distributor.clone(),
            product_name: key.product_name.clone(),
            full_address: key.full_address.clone(),
            year: key.year,
            month: key.month,
            decade: key.decade.to_string(),
            actual_quantity,
            new_client: key.new_client.clone(),
        });
    }

    debug!(
        input_rows = records.len(),
        decade_rows = cumulative.len(),
        output_rows = out.len(),
        "reconciled decade snapshots"
    );
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
