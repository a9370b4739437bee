pub mod analytics;
pub mod calendar;
pub mod forecast;
pub mod reconcile;

use clap::Args;

use pharma_sales_core::pricing::{
    attach_revenue, latest_decade_slice, max_decade, month_records, LatestSlice, PricedRecord,
};

use crate::input;

/// Snapshot rows plus an optional price list.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Snapshot rows (JSON, CSV or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,
    /// Price list with product_name, month and price columns
    #[arg(long)]
    pub prices: Option<String>,
}

impl DataArgs {
    /// Load, normalize and price the snapshot.
    pub fn priced_records(&self) -> Result<Vec<PricedRecord>, Box<dyn std::error::Error>> {
        let frame = input::load_frame(self.input.as_deref())?;
        let prices = input::load_prices(self.prices.as_deref())?;
        Ok(attach_revenue(&frame.records(), &prices))
    }
}

/// Which month and decade to work on; latest when omitted.
#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    #[arg(long, requires = "month")]
    pub year: Option<i32>,
    #[arg(long, requires = "year")]
    pub month: Option<u32>,
    /// Decade marker; the month's latest when omitted
    #[arg(long)]
    pub decade: Option<i64>,
}

impl PeriodArgs {
    /// Records of the chosen (year, month) at the chosen decade.
    pub fn select(&self, priced: &[PricedRecord]) -> Result<LatestSlice, Box<dyn std::error::Error>> {
        let (year, month) = match (self.year, self.month) {
            (Some(y), Some(m)) => (y, m),
            _ => {
                let latest = latest_decade_slice(priced).ok_or("No usable snapshot rows")?;
                (latest.year, latest.month)
            }
        };
        let records = month_records(priced, year, month);
        let decade = match self.decade {
            Some(d) => d,
            None => max_decade(&records, year, month)
                .ok_or_else(|| format!("No rows for {year}-{month:02}"))?,
        };
        let records: Vec<PricedRecord> = records
            .into_iter()
            .filter(|r| r.record.decade == decade)
            .collect();
        if records.is_empty() {
            return Err(format!("No rows for {year}-{month:02} decade {decade}").into());
        }
        Ok(LatestSlice {
            year,
            month,
            decade,
            records,
        })
    }
}
