pub mod actual_sales;

pub use actual_sales::{
    compute_actual_sales, reconcile_records, try_compute_actual_sales, ActualSalesRecord,
    REQUIRED_COLUMNS,
};
