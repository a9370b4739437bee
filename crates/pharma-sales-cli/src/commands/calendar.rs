use chrono::{Datelike, NaiveDate};
use clap::Args;
use serde_json::{json, Value};

use pharma_sales_core::calendar::{workdays_split, CalendarKind, UkraineCalendar};

use crate::settings::{ForecastOpts, ForecastSettings};

/// Arguments for the working-day split
#[derive(Args)]
pub struct WorkdaysArgs {
    /// Cutoff date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
    #[command(flatten)]
    pub opts: ForecastOpts,
}

pub fn run_workdays(
    args: WorkdaysArgs,
    settings: ForecastSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let settings = settings.with_overrides(&args.opts);
    let calendar = settings.calendar();
    let split = workdays_split(calendar.as_ref(), args.date)?;

    let holidays: Vec<Value> = match settings.calendar {
        CalendarKind::Ukraine => UkraineCalendar::new()
            .holidays(args.date.year())
            .into_iter()
            .filter(|(d, _)| d.month() == args.date.month())
            .map(|(d, name)| json!({ "date": d, "name": name }))
            .collect(),
        CalendarKind::Weekdays => Vec::new(),
    };

    Ok(json!({
        "result": {
            "calendar": calendar.name(),
            "cutoff": split.cutoff,
            "workdays_passed": split.passed,
            "workdays_left": split.left,
            "workdays_total": split.passed + split.left,
        },
        "holidays": holidays,
    }))
}
