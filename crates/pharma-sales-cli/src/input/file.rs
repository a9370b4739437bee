use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pharma_sales_core::frame::{Cell, SnapshotFrame};
use pharma_sales_core::pricing::{PriceEntry, PriceTable};

type Row = BTreeMap<String, Cell>;

/// Serialized layouts accepted for row data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Array of objects
    Json,
    /// Header line plus records
    Csv,
    /// Sequence of mappings
    Yaml,
}

impl InputFormat {
    /// By file extension; anything unknown is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => InputFormat::Csv,
            Some("yaml") | Some("yml") => InputFormat::Yaml,
            _ => InputFormat::Json,
        }
    }

    /// Guess from content, for stdin.
    pub fn sniff(raw: &str) -> Self {
        let head = raw.trim_start();
        if head.starts_with('[') || head.starts_with('{') {
            InputFormat::Json
        } else if head.starts_with("- ") || head.starts_with("---") {
            InputFormat::Yaml
        } else {
            InputFormat::Csv
        }
    }
}

/// Read a snapshot export from disk.
pub fn read_frame(path: &str) -> Result<SnapshotFrame, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_text(&canonical)?;
    parse_frame(&contents, InputFormat::from_path(&canonical))
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

/// Parse snapshot rows. A CSV header fixes the schema even with no records.
pub fn parse_frame(raw: &str, format: InputFormat) -> Result<SnapshotFrame, Box<dyn std::error::Error>> {
    match format {
        InputFormat::Csv => {
            let mut rdr = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(raw.as_bytes());
            let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
            let mut frame = SnapshotFrame::new(headers.iter().cloned());
            for record in rdr.records() {
                let record = record?;
                frame.push_row(
                    headers
                        .iter()
                        .zip(record.iter())
                        .map(|(column, raw)| Cell::parse_column(column, raw))
                        .collect(),
                )?;
            }
            Ok(frame)
        }
        _ => Ok(SnapshotFrame::from_objects(parse_rows(raw, format)?)),
    }
}

/// Parse keyed rows in any supported layout.
pub fn parse_rows(raw: &str, format: InputFormat) -> Result<Vec<Row>, Box<dyn std::error::Error>> {
    let rows = match format {
        InputFormat::Json => serde_json::from_str(raw)?,
        InputFormat::Yaml => serde_yaml::from_str(raw)?,
        InputFormat::Csv => {
            let mut rdr = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(raw.as_bytes());
            let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
            let mut rows = Vec::new();
            for record in rdr.records() {
                let record = record?;
                rows.push(
                    headers
                        .iter()
                        .zip(record.iter())
                        .map(|(column, raw)| (column.clone(), Cell::parse_column(column, raw)))
                        .collect(),
                );
            }
            rows
        }
    };
    Ok(rows)
}

/// Read a price list with `product_name`, `month` and `price` columns.
pub fn read_prices(path: &str) -> Result<PriceTable, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_text(&canonical)?;
    let rows = parse_rows(&contents, InputFormat::from_path(&canonical))
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(PriceTable::from(price_entries(&rows)?))
}

fn price_entries(rows: &[Row]) -> Result<Vec<PriceEntry>, Box<dyn std::error::Error>> {
    let null = Cell::Null;
    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<PriceEntry, Box<dyn std::error::Error>> {
            let get = |k: &str| row.get(k).unwrap_or(&null);
            let product_name = get("product_name").as_text();
            if product_name.is_empty() {
                return Err(format!("Price row {}: missing product_name", i + 1).into());
            }
            let month = get("month")
                .as_integer()
                .and_then(|m| u32::try_from(m).ok())
                .filter(|m| (1..=12).contains(m))
                .ok_or_else(|| format!("Price row {}: month must be 1-12", i + 1))?;
            Ok(PriceEntry {
                product_name,
                month,
                price: get("price").as_decimal(),
            })
        })
        .collect()
}

fn read_text(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e).into())
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
