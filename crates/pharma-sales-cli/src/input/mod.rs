pub mod file;
pub mod stdin;

use pharma_sales_core::frame::SnapshotFrame;
use pharma_sales_core::pricing::PriceTable;

/// Snapshot rows from `--input` or, failing that, piped stdin.
pub fn load_frame(path: Option<&str>) -> Result<SnapshotFrame, Box<dyn std::error::Error>> {
    if let Some(p) = path {
        file::read_frame(p)
    } else if let Some(raw) = stdin::read_stdin()? {
        file::parse_frame(&raw, file::InputFormat::sniff(&raw))
    } else {
        Err("--input <file> or stdin required for snapshot rows".into())
    }
}

/// Price list from `--prices`; an absent list prices everything at zero.
pub fn load_prices(path: Option<&str>) -> Result<PriceTable, Box<dyn std::error::Error>> {
    match path {
        Some(p) => file::read_prices(p),
        None => {
            tracing::warn!("no --prices given, revenue will be zero");
            Ok(PriceTable::new())
        }
    }
}
