use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::calendar::{workdays_split, DecadeConvention, WorkingDayCalendar};
use crate::error::SalesError;
use crate::types::SalesObservation;
use crate::SalesResult;

/// Upper bound on resampling rounds accepted in one call.
pub const MAX_BOOTSTRAP_ITERATIONS: u32 = 1_000_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Settings for the bootstrap forecaster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of resampling rounds.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Optional seed for reproducibility.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Two-sided interval coverage, e.g. 0.95 for the 2.5th–97.5th percentiles.
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// How the cutoff decade maps to a calendar date.
    #[serde(default)]
    pub decade_convention: DecadeConvention,
}

fn default_iterations() -> u32 {
    1_000
}

fn default_confidence_level() -> f64 {
    0.95
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        BootstrapConfig {
            iterations: default_iterations(),
            seed: None,
            confidence_level: default_confidence_level(),
            decade_convention: DecadeConvention::default(),
        }
    }
}

/// Month-end revenue projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Flat daily-rate extrapolation of the observed revenue total.
    pub point_forecast_revenue: f64,
    /// (low, high) percentiles of the bootstrap distribution.
    pub conf_interval_revenue: (f64, f64),
    /// One extrapolated total per resampling round, in draw order.
    pub bootstrap_distribution_revenue: Vec<f64>,
    pub workdays_passed: u32,
    pub workdays_left: u32,
    /// Revenue observed up to the cutoff.
    pub revenue_so_far: f64,
    pub bootstrap_mean: f64,
    pub bootstrap_std_dev: f64,
    pub cutoff_date: NaiveDate,
    pub iterations: u32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `total + left * (total / passed)`. Callers guarantee `passed > 0`.
fn extrapolate(total: f64, passed: f64, left: f64) -> f64 {
    total + left * (total / passed)
}

/// Compute the percentile value from a **sorted** slice using linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

fn validate(config: &BootstrapConfig) -> SalesResult<()> {
    if config.iterations == 0 || config.iterations > MAX_BOOTSTRAP_ITERATIONS {
        return Err(SalesError::InvalidInput {
            field: "iterations".into(),
            reason: format!("Must be between 1 and {MAX_BOOTSTRAP_ITERATIONS}"),
        });
    }
    if !(config.confidence_level > 0.0 && config.confidence_level < 1.0) {
        return Err(SalesError::InvalidInput {
            field: "confidence_level".into(),
            reason: "Must be strictly between 0 and 1".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project month-end revenue from partial-month observations.
///
/// The point forecast extrapolates the observed revenue total at a flat
/// daily rate over the remaining working days. The bootstrap resamples the
/// observations (with replacement, N draws per round) and extrapolates each
/// resampled total with the same fixed working-day divisor, so it captures
/// sampling uncertainty of the total only. The point forecast is therefore
/// not the mean of the bootstrap distribution.
pub fn forecast_with_bootstrap(
    observations: &[SalesObservation],
    cutoff_decade: u32,
    year: i32,
    month: u32,
    calendar: &dyn WorkingDayCalendar,
    config: &BootstrapConfig,
) -> SalesResult<ForecastResult> {
    validate(config)?;

    if observations.is_empty() {
        return Err(SalesError::InsufficientData(
            "No revenue observations to forecast from".into(),
        ));
    }
    if config.decade_convention.is_month_complete(cutoff_decade) {
        return Err(SalesError::MonthComplete { cutoff_decade });
    }

    let cutoff = config
        .decade_convention
        .cutoff_date(cutoff_decade, year, month)?;
    let split = workdays_split(calendar, cutoff)?;
    if split.passed == 0 {
        return Err(SalesError::NoWorkdaysElapsed {
            year,
            month,
            cutoff_day: cutoff.day(),
        });
    }

    let revenues: Vec<f64> = observations
        .iter()
        .map(|o| o.revenue.to_f64().unwrap_or(0.0))
        .collect();
    let passed = split.passed as f64;
    let left = split.left as f64;

    let revenue_so_far: f64 = revenues.iter().sum();
    let point_forecast_revenue = extrapolate(revenue_so_far, passed, left);

    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let n = revenues.len();
    let mut distribution = Vec::with_capacity(config.iterations as usize);
    for _ in 0..config.iterations {
        let sample_sum: f64 = (0..n).map(|_| revenues[rng.gen_range(0..n)]).sum();
        distribution.push(extrapolate(sample_sum, passed, left));
    }

    let mut sorted = distribution.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let tail_pct = (1.0 - config.confidence_level) / 2.0 * 100.0;
    let conf_interval_revenue = (
        percentile_sorted(&sorted, tail_pct),
        percentile_sorted(&sorted, 100.0 - tail_pct),
    );

    let bootstrap_mean = distribution.iter().mean();
    let bootstrap_std_dev = if distribution.len() > 1 {
        distribution.iter().std_dev()
    } else {
        0.0
    };

    debug!(
        observations = n,
        iterations = config.iterations,
        point_forecast_revenue,
        low = conf_interval_revenue.0,
        high = conf_interval_revenue.1,
        "bootstrap forecast"
    );

    Ok(ForecastResult {
        point_forecast_revenue,
        conf_interval_revenue,
        bootstrap_distribution_revenue: distribution,
        workdays_passed: split.passed,
        workdays_left: split.left,
        revenue_so_far,
        bootstrap_mean,
        bootstrap_std_dev,
        cutoff_date: cutoff,
        iterations: config.iterations,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
