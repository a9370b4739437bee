mod commands;
mod input;
mod output;
mod settings;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;

use commands::analytics::{AbcArgs, GrowthArgs, KpisArgs, TopPharmaciesArgs};
use commands::calendar::WorkdaysArgs;
use commands::forecast::{BacktestArgs, ForecastArgs, ProductForecastArgs, ReportArgs};
use commands::reconcile::ReconcileArgs;
use output::OutputFormat;

/// Pharma sales reconciliation, forecasting and analytics
#[derive(Parser)]
#[command(
    name = "psa",
    version,
    about = "Pharma sales reconciliation, forecasting and analytics",
    long_about = "Turns cumulative decade sales snapshots into incremental sales, \
                  projects month-end revenue on a working-day calendar with bootstrap \
                  confidence intervals, and produces ABC, growth and pharmacy rankings."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Forecast settings file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert cumulative decade snapshots into incremental sales
    Reconcile(ReconcileArgs),
    /// Bootstrap month-end revenue forecast
    Forecast(ForecastArgs),
    /// Linear month-end forecast per product
    ProductForecast(ProductForecastArgs),
    /// Re-forecast a completed month from earlier decades
    Backtest(BacktestArgs),
    /// Month-end report for the latest month
    Report(ReportArgs),
    /// Headline KPIs and product summary
    Kpis(KpisArgs),
    /// ABC classification of products
    Abc(AbcArgs),
    /// Growth matrix between the two latest months
    Bcg(GrowthArgs),
    /// Revenue and quantity deltas between the two latest months
    Growth(GrowthArgs),
    /// Pharmacies ranked by revenue
    TopPharmacies(TopPharmaciesArgs),
    /// Working days passed and left at a date
    Workdays(WorkdaysArgs),
    /// Print version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    settings::init_tracing(cli.verbose);

    let settings = match settings::load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: invalid configuration: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    tracing::debug!(?settings, "forecast settings");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Reconcile(args) => commands::reconcile::run_reconcile(args),
        Commands::Forecast(args) => commands::forecast::run_forecast(args, settings),
        Commands::ProductForecast(args) => commands::forecast::run_product_forecast(args, settings),
        Commands::Backtest(args) => commands::forecast::run_backtest(args, settings),
        Commands::Report(args) => commands::forecast::run_report(args, settings),
        Commands::Kpis(args) => commands::analytics::run_kpis(args),
        Commands::Abc(args) => commands::analytics::run_abc(args),
        Commands::Bcg(args) => commands::analytics::run_bcg(args),
        Commands::Growth(args) => commands::analytics::run_growth(args),
        Commands::TopPharmacies(args) => commands::analytics::run_top_pharmacies(args),
        Commands::Workdays(args) => commands::calendar::run_workdays(args, settings),
        Commands::Version => {
            println!("psa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
