use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use pharma_sales_core::calendar::{build_calendar, CalendarKind, DecadeConvention, WorkingDayCalendar};
use pharma_sales_core::forecast::BootstrapConfig;

/// Forecast defaults layered from an optional config file and `PSA_*`
/// environment variables. Command-line flags override both.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSettings {
    pub iterations: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    pub confidence_level: f64,
    pub calendar: CalendarKind,
    pub decade_convention: DecadeConvention,
    /// Public holidays on/after this date are worked (martial law).
    #[serde(default)]
    pub suspend_holidays_from: Option<NaiveDate>,
}

impl ForecastSettings {
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            iterations: self.iterations,
            seed: self.seed,
            confidence_level: self.confidence_level,
            decade_convention: self.decade_convention,
        }
    }

    pub fn calendar(&self) -> Box<dyn WorkingDayCalendar> {
        build_calendar(self.calendar, self.suspend_holidays_from)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, opts: &ForecastOpts) -> Self {
        if let Some(n) = opts.iterations {
            self.iterations = n;
        }
        if opts.seed.is_some() {
            self.seed = opts.seed;
        }
        if let Some(c) = opts.confidence {
            self.confidence_level = c;
        }
        if let Some(ref c) = opts.calendar {
            self.calendar = c.into();
        }
        if let Some(ref c) = opts.decade_convention {
            self.decade_convention = c.into();
        }
        if opts.suspend_holidays_from.is_some() {
            self.suspend_holidays_from = opts.suspend_holidays_from;
        }
        self
    }
}

/// Load settings: built-in defaults, then `path` (any format the config
/// crate understands), then `PSA_*` environment variables.
pub fn load_settings(path: Option<&str>) -> Result<ForecastSettings, ConfigError> {
    let mut builder = Config::builder()
        .set_default("iterations", 1000_i64)?
        .set_default("confidence_level", 0.95)?
        .set_default("calendar", "ukraine")?
        .set_default("decade_convention", "day_of_month")?;

    if let Some(p) = path {
        builder = builder.add_source(File::with_name(p).required(true));
    }

    builder
        .add_source(Environment::with_prefix("PSA").try_parsing(true))
        .build()?
        .try_deserialize()
}

/// Install the stderr `fmt` subscriber. `RUST_LOG` wins over the default
/// level.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if verbose { "debug" } else { "warn" };
    let filter_directive = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("pharma_sales_core={level},psa={level}"));

    let _ = fmt()
        .with_env_filter(EnvFilter::new(filter_directive))
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Shared forecast flags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, ValueEnum)]
pub enum CalendarArg {
    Ukraine,
    Weekdays,
}

impl From<&CalendarArg> for CalendarKind {
    fn from(c: &CalendarArg) -> Self {
        match c {
            CalendarArg::Ukraine => CalendarKind::Ukraine,
            CalendarArg::Weekdays => CalendarKind::Weekdays,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ConventionArg {
    DayOfMonth,
    Index,
}

impl From<&ConventionArg> for DecadeConvention {
    fn from(c: &ConventionArg) -> Self {
        match c {
            ConventionArg::DayOfMonth => DecadeConvention::DayOfMonth,
            ConventionArg::Index => DecadeConvention::Index,
        }
    }
}

/// Flags shared by every command that forecasts.
#[derive(Args, Debug, Clone, Default)]
pub struct ForecastOpts {
    /// Bootstrap resampling rounds
    #[arg(long)]
    pub iterations: Option<u32>,
    /// RNG seed for reproducible intervals
    #[arg(long)]
    pub seed: Option<u64>,
    /// Two-sided interval coverage, e.g. 0.95
    #[arg(long)]
    pub confidence: Option<f64>,
    /// Working-day calendar
    #[arg(long, value_enum)]
    pub calendar: Option<CalendarArg>,
    /// How decade markers map to dates
    #[arg(long, value_enum)]
    pub decade_convention: Option<ConventionArg>,
    /// Treat public holidays from this date (YYYY-MM-DD) as working days
    #[arg(long)]
    pub suspend_holidays_from: Option<NaiveDate>,
}
