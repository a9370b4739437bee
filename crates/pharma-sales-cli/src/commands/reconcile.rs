use clap::Args;
use serde_json::Value;
use tracing::info;

use pharma_sales_core::reconciliation::{compute_actual_sales, try_compute_actual_sales};

use crate::input;

/// Arguments for decade reconciliation
#[derive(Args)]
pub struct ReconcileArgs {
    /// Snapshot rows (JSON, CSV or YAML); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,
    /// Fail on a bad schema instead of printing an empty result
    #[arg(long)]
    pub strict: bool,
}

pub fn run_reconcile(args: ReconcileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let frame = input::load_frame(args.input.as_deref())?;
    let rows = if args.strict {
        try_compute_actual_sales(&frame)?
    } else {
        compute_actual_sales(&frame)
    };
    info!(input_rows = frame.len(), output_rows = rows.len(), "reconciled");
    Ok(serde_json::to_value(rows)?)
}
