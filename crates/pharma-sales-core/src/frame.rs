use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::SalesError;
use crate::types::{Quantity, SalesSnapshotRecord};
use crate::SalesResult;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Columns kept as text even when the value looks numeric ("007", "1.10").
pub const TEXT_COLUMNS: [&str; 6] = [
    "distributor",
    "product_name",
    "city",
    "street",
    "house_number",
    "new_client",
];

/// A loosely typed value as delivered by the ingestion layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Int(i64),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Infer a cell from raw text (CSV fields, spreadsheet exports).
    /// Blank text becomes `Null`.
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Cell::Number(f);
            }
        }
        Cell::Text(raw.to_string())
    }

    /// [`Cell::parse`] for a named column. Text columns skip numeric inference.
    pub fn parse_column(column: &str, raw: &str) -> Cell {
        if !TEXT_COLUMNS.contains(&column) {
            return Cell::parse(raw);
        }
        if raw.trim().is_empty() {
            Cell::Null
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text form, trimmed. Null becomes "".
    pub fn as_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Number(f) => f.to_string(),
            Cell::Text(s) => s.trim().to_string(),
        }
    }

    /// Numeric form for quantities. Null and non-numeric text coerce to zero.
    pub fn as_decimal(&self) -> Decimal {
        match self {
            Cell::Null => Decimal::ZERO,
            Cell::Int(i) => Decimal::from(*i),
            Cell::Number(f) => Decimal::from_f64(*f).unwrap_or(Decimal::ZERO),
            Cell::Text(s) => {
                let s = s.trim();
                Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .unwrap_or(Decimal::ZERO)
            }
        }
    }

    /// Integer form, truncating fractional numbers. `None` when the cell is
    /// null or not numeric.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Null => None,
            Cell::Int(i) => Some(*i),
            Cell::Number(f) => finite_trunc(*f),
            Cell::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(finite_trunc))
            }
        }
    }
}

fn finite_trunc(f: f64) -> Option<i64> {
    if f.is_finite() && f.abs() < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Number(f)
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Column-oriented snapshot export: a fixed column list plus positional rows.
///
/// The column list is the structural schema of the dataset. A column that is
/// absent here is different from a column whose value is null in some rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl SnapshotFrame {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SnapshotFrame {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a frame from keyed rows (JSON objects). The schema is the union
    /// of keys; keys missing from a given row read as null.
    pub fn from_objects(objects: Vec<BTreeMap<String, Cell>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for obj in &objects {
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = objects
            .into_iter()
            .map(|mut obj| {
                columns
                    .iter()
                    .map(|c| obj.remove(c).unwrap_or_default())
                    .collect()
            })
            .collect();
        SnapshotFrame { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> SalesResult<()> {
        if row.len() != self.columns.len() {
            return Err(SalesError::InvalidInput {
                field: "row".into(),
                reason: format!(
                    "Expected {} cells, got {}",
                    self.columns.len(),
                    row.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Required columns not present in the schema, in the order given.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Normalize every row into a typed record.
    ///
    /// Absent columns read as null. Rows whose `year` or `month` is null or
    /// non-numeric cannot be placed in a period and are skipped.
    pub fn records(&self) -> Vec<SalesSnapshotRecord> {
        let idx = |name: &str| self.column_index(name);
        let (distributor, product, city, street, house, client) = (
            idx("distributor"),
            idx("product_name"),
            idx("city"),
            idx("street"),
            idx("house_number"),
            idx("new_client"),
        );
        let (year, month, decade, quantity) =
            (idx("year"), idx("month"), idx("decade"), idx("quantity"));

        let null = Cell::Null;
        let mut skipped = 0usize;
        let mut out = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            let get = |i: Option<usize>| i.and_then(|i| row.get(i)).unwrap_or(&null);

            let period = get(year)
                .as_integer()
                .and_then(|y| i32::try_from(y).ok())
                .zip(get(month).as_integer().and_then(|m| u32::try_from(m).ok()));
            let Some((y, m)) = period else {
                skipped += 1;
                continue;
            };

            let qty: Quantity = get(quantity).as_decimal();
            out.push(SalesSnapshotRecord::new(
                get(distributor).as_text(),
                get(product).as_text(),
                get(city).as_text(),
                get(street).as_text(),
                get(house).as_text(),
                get(client).as_text(),
                y,
                m,
                get(decade).as_integer().unwrap_or(0),
                qty,
            ));
        }

        if skipped > 0 {
            debug!(skipped, "snapshot rows without a usable year/month skipped");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const COLUMNS: [&str; 10] = [
        "distributor",
        "product_name",
        "city",
        "street",
        "house_number",
        "new_client",
        "year",
        "month",
        "decade",
        "quantity",
    ];

    #[test]
    fn test_cell_parse_infers_types() {
        assert_eq!(Cell::parse("  "), Cell::Null);
        assert_eq!(Cell::parse("20"), Cell::Int(20));
        assert_eq!(Cell::parse("2.5"), Cell::Number(2.5));
        assert_eq!(Cell::parse("Kyiv"), Cell::Text("Kyiv".into()));
    }

    #[test]
    fn test_text_columns_keep_leading_zeros() {
        assert_eq!(Cell::parse_column("house_number", "007").as_text(), "007");
        assert_eq!(Cell::parse_column("house_number", "1.10").as_text(), "1.10");
        assert_eq!(Cell::parse_column("street", " "), Cell::Null);
        assert_eq!(Cell::parse_column("decade", "20"), Cell::Int(20));
    }

    #[test]
    fn test_cell_numeric_coercion_to_zero() {
        assert_eq!(Cell::Text("n/a".into()).as_decimal(), Decimal::ZERO);
        assert_eq!(Cell::Null.as_decimal(), Decimal::ZERO);
        assert_eq!(Cell::Text(" 12.5 ".into()).as_decimal(), dec!(12.5));
        assert_eq!(Cell::Number(3.0).as_decimal(), dec!(3));
    }

    #[test]
    fn test_cell_integer_truncates() {
        assert_eq!(Cell::Number(20.9).as_integer(), Some(20));
        assert_eq!(Cell::Text("30".into()).as_integer(), Some(30));
        assert_eq!(Cell::Text("10.0".into()).as_integer(), Some(10));
        assert_eq!(Cell::Text("first".into()).as_integer(), None);
        assert_eq!(Cell::Number(f64::NAN).as_integer(), None);
    }

    #[test]
    fn test_cell_text_of_numbers() {
        assert_eq!(Cell::Int(12).as_text(), "12");
        assert_eq!(Cell::Text("  a ".into()).as_text(), "a");
        assert_eq!(Cell::Null.as_text(), "");
    }

    #[test]
    fn test_cell_deserializes_untagged() {
        let cells: Vec<Cell> = serde_json::from_str(r#"[null, 5, 2.5, "x"]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                Cell::Null,
                Cell::Int(5),
                Cell::Number(2.5),
                Cell::Text("x".into())
            ]
        );
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut frame = SnapshotFrame::new(["a", "b"]);
        assert!(frame.push_row(vec![Cell::Int(1)]).is_err());
        assert!(frame.push_row(vec![Cell::Int(1), Cell::Null]).is_ok());
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_missing_columns_reported_in_order() {
        let frame = SnapshotFrame::new(["decade", "city"]);
        assert_eq!(
            frame.missing_columns(&["decade", "year", "city", "month"]),
            vec!["year".to_string(), "month".to_string()]
        );
    }

    #[test]
    fn test_from_objects_unions_keys() {
        let mut a = BTreeMap::new();
        a.insert("x".to_string(), Cell::Int(1));
        let mut b = BTreeMap::new();
        b.insert("y".to_string(), Cell::Int(2));
        let frame = SnapshotFrame::from_objects(vec![a, b]);
        assert!(frame.has_column("x"));
        assert!(frame.has_column("y"));
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn test_records_normalize_rows() {
        let mut frame = SnapshotFrame::new(COLUMNS);
        frame
            .push_row(vec![
                " D1 ".into(),
                "P1".into(),
                "Kyiv".into(),
                "Shevchenka".into(),
                Cell::Int(1),
                Cell::Null,
                Cell::Int(2024),
                Cell::Int(3),
                "10".into(),
                Cell::Number(50.0),
            ])
            .unwrap();
        let records = frame.records();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.distributor, "D1");
        assert_eq!(r.full_address, "Kyiv, Shevchenka, 1");
        assert_eq!(r.new_client, "");
        assert_eq!(r.decade, 10);
        assert_eq!(r.quantity, dec!(50));
    }

    #[test]
    fn test_records_skip_rows_without_period() {
        let mut frame = SnapshotFrame::new(COLUMNS);
        frame
            .push_row(vec![
                "D1".into(),
                "P1".into(),
                "Kyiv".into(),
                "Main".into(),
                "1".into(),
                "C".into(),
                Cell::Null,
                Cell::Int(3),
                Cell::Int(10),
                Cell::Int(5),
            ])
            .unwrap();
        assert!(frame.records().is_empty());
    }

    #[test]
    fn test_records_non_numeric_decade_becomes_zero() {
        let mut frame = SnapshotFrame::new(COLUMNS);
        frame
            .push_row(vec![
                "D1".into(),
                "P1".into(),
                "Kyiv".into(),
                "Main".into(),
                "1".into(),
                "C".into(),
                Cell::Int(2024),
                Cell::Int(3),
                "late".into(),
                Cell::Int(5),
            ])
            .unwrap();
        assert_eq!(frame.records()[0].decade, 0);
    }
}
