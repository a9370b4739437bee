use pharma_sales_core::frame::{Cell, SnapshotFrame};
use pharma_sales_core::reconciliation::{
    compute_actual_sales, try_compute_actual_sales, ActualSalesRecord, REQUIRED_COLUMNS,
};
use pharma_sales_core::SalesError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Helpers
// ===========================================================================

struct Row<'a> {
    distributor: &'a str,
    product: &'a str,
    street: &'a str,
    decade: i64,
    quantity: f64,
}

fn row<'a>(distributor: &'a str, product: &'a str, decade: i64, quantity: f64) -> Row<'a> {
    Row {
        distributor,
        product,
        street: "Shevchenka",
        decade,
        quantity,
    }
}

fn frame(rows: &[Row]) -> SnapshotFrame {
    let mut f = SnapshotFrame::new(REQUIRED_COLUMNS);
    for r in rows {
        // Column order follows REQUIRED_COLUMNS.
        f.push_row(vec![
            Cell::Int(r.decade),
            Cell::from(r.distributor),
            Cell::from(r.product),
            Cell::Number(r.quantity),
            Cell::Int(2024),
            Cell::Int(3),
            Cell::from("Kyiv"),
            Cell::from(r.street),
            Cell::from("1"),
            Cell::from("C1"),
        ])
        .unwrap();
    }
    f
}

fn deltas(out: &[ActualSalesRecord]) -> Vec<(String, Decimal)> {
    out.iter()
        .map(|r| (r.decade.clone(), r.actual_quantity))
        .collect()
}

// ===========================================================================
// Reconciliation
// ===========================================================================

#[test]
fn test_concrete_two_decade_scenario() {
    let out = compute_actual_sales(&frame(&[row("D1", "P1", 10, 50.0), row("D1", "P1", 20, 120.0)]));
    assert_eq!(
        deltas(&out),
        vec![("10".to_string(), dec!(50)), ("20".to_string(), dec!(70))]
    );
    assert_eq!(out[0].distributor, "D1");
    assert_eq!(out[0].product_name, "P1");
    assert_eq!(out[0].full_address, "Kyiv, Shevchenka, 1");
    assert_eq!(out[0].new_client, "C1");
    assert_eq!((out[1].year, out[1].month), (2024, 3));
}

#[test]
fn test_differences_of_cumulative_series() {
    let out = compute_actual_sales(&frame(&[
        row("D1", "P1", 30, 100.0),
        row("D1", "P1", 10, 40.0),
        row("D1", "P1", 20, 40.0),
    ]));
    // 40, 0 (dropped), 60
    assert_eq!(
        deltas(&out),
        vec![("10".to_string(), dec!(40)), ("30".to_string(), dec!(60))]
    );
}

#[test]
fn test_single_observation_is_identity() {
    let out = compute_actual_sales(&frame(&[row("D1", "P1", 20, 33.0)]));
    assert_eq!(deltas(&out), vec![("20".to_string(), dec!(33))]);

    let zero = compute_actual_sales(&frame(&[row("D1", "P1", 20, 0.0)]));
    assert!(zero.is_empty());
}

#[test]
fn test_split_rows_within_decade_sum_first() {
    let whole = compute_actual_sales(&frame(&[row("D1", "P1", 10, 50.0), row("D1", "P1", 20, 120.0)]));
    let split = compute_actual_sales(&frame(&[
        row("D1", "P1", 10, 20.0),
        row("D1", "P1", 10, 30.0),
        row("D1", "P1", 20, 120.0),
    ]));
    assert_eq!(whole, split);
}

#[test]
fn test_negative_delta_preserved() {
    let out = compute_actual_sales(&frame(&[row("D1", "P1", 10, 100.0), row("D1", "P1", 20, 80.0)]));
    assert_eq!(
        deltas(&out),
        vec![("10".to_string(), dec!(100)), ("20".to_string(), dec!(-20))]
    );
}

#[test]
fn test_series_are_independent() {
    let out = compute_actual_sales(&frame(&[
        row("D1", "P1", 10, 10.0),
        row("D2", "P1", 20, 25.0),
        row("D1", "P2", 20, 7.0),
    ]));
    assert_eq!(out.len(), 3);
    let d2 = out.iter().find(|r| r.distributor == "D2").unwrap();
    assert_eq!(d2.actual_quantity, dec!(25));
}

#[test]
fn test_missing_column_yields_empty() {
    let mut f = SnapshotFrame::new(REQUIRED_COLUMNS.iter().filter(|c| **c != "new_client").copied());
    f.push_row(vec![
        Cell::Int(10),
        Cell::from("D1"),
        Cell::from("P1"),
        Cell::Int(5),
        Cell::Int(2024),
        Cell::Int(3),
        Cell::from("Kyiv"),
        Cell::from("Main"),
        Cell::from("1"),
    ])
    .unwrap();
    assert!(compute_actual_sales(&f).is_empty());
    match try_compute_actual_sales(&f) {
        Err(SalesError::InvalidSchema { missing }) => assert_eq!(missing, vec!["new_client"]),
        other => panic!("expected InvalidSchema, got {other:?}"),
    }
}

#[test]
fn test_empty_frame_yields_empty() {
    assert!(compute_actual_sales(&SnapshotFrame::new(REQUIRED_COLUMNS)).is_empty());
}

#[test]
fn test_malformed_quantity_counts_as_zero() {
    let mut f = frame(&[row("D1", "P1", 10, 10.0)]);
    f.push_row(vec![
        Cell::Int(20),
        Cell::from("D1"),
        Cell::from("P1"),
        Cell::from("n/a"),
        Cell::Int(2024),
        Cell::Int(3),
        Cell::from("Kyiv"),
        Cell::from("Shevchenka"),
        Cell::from("1"),
        Cell::from("C1"),
    ])
    .unwrap();
    let out = compute_actual_sales(&f);
    assert_eq!(
        deltas(&out),
        vec![("10".to_string(), dec!(10)), ("20".to_string(), dec!(-10))]
    );
}

#[test]
fn test_rows_without_address_are_dropped() {
    let mut rows = vec![row("D1", "P1", 10, 10.0)];
    let mut no_addr = row("D1", "P2", 10, 99.0);
    no_addr.street = "";
    rows.push(no_addr);
    let mut f = frame(&rows);
    f.push_row(vec![
        Cell::Int(10),
        Cell::from("D1"),
        Cell::from("P3"),
        Cell::Int(5),
        Cell::Int(2024),
        Cell::Int(3),
        Cell::Null,
        Cell::Null,
        Cell::Null,
        Cell::from("C1"),
    ])
    .unwrap();
    let out = compute_actual_sales(&f);
    let products: Vec<&str> = out.iter().map(|r| r.product_name.as_str()).collect();
    // A partial address still composes a non-empty full address.
    assert_eq!(products, vec!["P1", "P2"]);
}
