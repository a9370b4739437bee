use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::frame::SnapshotFrame;
use crate::pricing::PriceTable;

/// Label used when no region filter is applied.
pub const ALL_REGIONS: &str = "(all)";
/// Label used when no territory or product-line filter is applied.
pub const ALL: &str = "All";

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Filter selection a sales snapshot was loaded for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesKey {
    pub region: String,
    pub territory: String,
    pub line: String,
    /// Sorted; `None` means every month
    pub months: Option<Vec<String>>,
}

/// Region and months a price table was loaded for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceKey {
    pub region_id: i64,
    pub months: Vec<u32>,
}

fn or_default(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Number of entries held per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub sales_entries: usize,
    pub price_entries: usize,
    pub total_entries: usize,
}

/// Memoizes loaded sales snapshots and price tables by filter selection.
/// Owned by the caller; nothing is shared between instances.
#[derive(Debug, Default)]
pub struct ReportCache {
    sales: HashMap<SalesKey, Arc<SnapshotFrame>>,
    prices: HashMap<PriceKey, Arc<PriceTable>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a sales filter selection. Empty filters fall back to the
    /// "all" labels and months are sorted so selection order does not matter.
    pub fn sales_key(
        region: Option<&str>,
        territory: Option<&str>,
        line: Option<&str>,
        months: &[String],
    ) -> SalesKey {
        let months = if months.is_empty() {
            None
        } else {
            let mut sorted = months.to_vec();
            sorted.sort();
            Some(sorted)
        };
        SalesKey {
            region: or_default(region, ALL_REGIONS),
            territory: or_default(territory, ALL),
            line: or_default(line, ALL),
            months,
        }
    }

    pub fn price_key(region_id: i64, months: &[u32]) -> PriceKey {
        let mut months = months.to_vec();
        months.sort_unstable();
        PriceKey { region_id, months }
    }

    pub fn get_sales(&self, key: &SalesKey) -> Option<Arc<SnapshotFrame>> {
        let hit = self.sales.get(key).cloned();
        debug!(hit = hit.is_some(), ?key, "sales cache lookup");
        hit
    }

    pub fn insert_sales(&mut self, key: SalesKey, frame: SnapshotFrame) -> Arc<SnapshotFrame> {
        let frame = Arc::new(frame);
        self.sales.insert(key, Arc::clone(&frame));
        frame
    }

    pub fn get_prices(&self, key: &PriceKey) -> Option<Arc<PriceTable>> {
        let hit = self.prices.get(key).cloned();
        debug!(hit = hit.is_some(), ?key, "price cache lookup");
        hit
    }

    pub fn insert_prices(&mut self, key: PriceKey, table: PriceTable) -> Arc<PriceTable> {
        let table = Arc::new(table);
        self.prices.insert(key, Arc::clone(&table));
        table
    }

    pub fn invalidate(&mut self) {
        self.invalidate_sales();
        self.invalidate_prices();
    }

    pub fn invalidate_sales(&mut self) {
        self.sales.clear();
    }

    pub fn invalidate_prices(&mut self) {
        self.prices.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            sales_entries: self.sales.len(),
            price_entries: self.prices.len(),
            total_entries: self.sales.len() + self.prices.len(),
        }
    }
}
