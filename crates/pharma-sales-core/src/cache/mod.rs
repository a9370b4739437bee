pub mod report_cache;

pub use report_cache::{CacheStats, PriceKey, ReportCache, SalesKey};
