use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Unit counts. Cumulative snapshots and decade deltas alike.
pub type Quantity = Decimal;

/// Percentages expressed on a 0–100 scale (42.5 = 42.5%).
pub type Percent = Decimal;

/// One normalized sales snapshot row.
///
/// `quantity` is the cumulative total since the start of the month as of the
/// end of `decade`. Text fields are trimmed, with nulls mapped to "".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSnapshotRecord {
    pub distributor: String,
    pub product_name: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    /// "city, street, house_number" with stray edge commas/spaces removed
    pub full_address: String,
    /// Client tag (pharmacy name as entered by the distributor)
    pub new_client: String,
    pub year: i32,
    pub month: u32,
    pub decade: i64,
    pub quantity: Quantity,
}

impl SalesSnapshotRecord {
    /// Build a record, deriving `full_address` from the address parts.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        distributor: impl Into<String>,
        product_name: impl Into<String>,
        city: impl Into<String>,
        street: impl Into<String>,
        house_number: impl Into<String>,
        new_client: impl Into<String>,
        year: i32,
        month: u32,
        decade: i64,
        quantity: Quantity,
    ) -> Self {
        let city = city.into().trim().to_string();
        let street = street.into().trim().to_string();
        let house_number = house_number.into().trim().to_string();
        let full_address = compose_full_address(&city, &street, &house_number);
        SalesSnapshotRecord {
            distributor: distributor.into().trim().to_string(),
            product_name: product_name.into().trim().to_string(),
            city,
            street,
            house_number,
            full_address,
            new_client: new_client.into().trim().to_string(),
            year,
            month,
            decade,
            quantity,
        }
    }

    /// Case-insensitive `city|street|house_number` key identifying a pharmacy.
    pub fn address_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.city.to_lowercase(),
            self.street.to_lowercase(),
            self.house_number.to_lowercase()
        )
    }
}

/// Join address parts as "city, street, house" and strip leading/trailing
/// commas and spaces left behind by empty parts.
pub fn compose_full_address(city: &str, street: &str, house_number: &str) -> String {
    format!("{city}, {street}, {house_number}")
        .trim_matches(|c| c == ' ' || c == ',')
        .to_string()
}

/// A revenue observation for one product within a single (year, month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesObservation {
    pub product_name: String,
    pub decade: i64,
    pub quantity: Quantity,
    pub revenue: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
