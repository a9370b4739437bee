pub mod bootstrap;
pub mod product;

pub use bootstrap::{forecast_with_bootstrap, BootstrapConfig, ForecastResult};
pub use product::{forecast_by_product, ProductForecastRow};
