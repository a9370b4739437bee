pub mod month_end;

pub use month_end::{build_month_end_report, MonthEndReport};
