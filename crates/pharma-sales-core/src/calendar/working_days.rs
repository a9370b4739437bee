use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::ukraine::UkraineCalendar;
use crate::error::SalesError;
use crate::SalesResult;

// ---------------------------------------------------------------------------
// Calendar trait
// ---------------------------------------------------------------------------

/// Classifies calendar dates as working or non-working days.
///
/// Forecasting only depends on this boolean contract, so a holiday-aware
/// calendar and the plain weekday fallback are interchangeable.
pub trait WorkingDayCalendar: Send + Sync {
    fn is_working_day(&self, date: NaiveDate) -> bool;

    /// Short identifier reported alongside results.
    fn name(&self) -> &str;
}

/// Monday–Friday are working days. Holidays are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekdayCalendar;

impl WorkingDayCalendar for WeekdayCalendar {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date)
    }

    fn name(&self) -> &str {
        "weekdays"
    }
}

pub(crate) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Calendar implementations selectable at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    /// Ukrainian public holidays plus weekends
    #[default]
    Ukraine,
    /// Monday–Friday only
    Weekdays,
}

/// Construct the calendar for `kind`. `suspend_holidays_from` only applies to
/// the holiday-aware calendar.
pub fn build_calendar(
    kind: CalendarKind,
    suspend_holidays_from: Option<NaiveDate>,
) -> Box<dyn WorkingDayCalendar> {
    match kind {
        CalendarKind::Ukraine => {
            let cal = UkraineCalendar::new();
            Box::new(match suspend_holidays_from {
                Some(date) => cal.suspend_holidays_from(date),
                None => cal,
            })
        }
        CalendarKind::Weekdays => Box::new(WeekdayCalendar),
    }
}

// ---------------------------------------------------------------------------
// Counting helpers
// ---------------------------------------------------------------------------

/// Last calendar day of the month.
pub fn last_day_of_month(year: i32, month: u32) -> SalesResult<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| SalesError::DateError(format!("Invalid year/month {year}-{month}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map(|d| d - Duration::days(1))
        .ok_or_else(|| SalesError::DateError(format!("No month follows {first}")))
}

/// Number of working days in `[from, to]`, both ends inclusive.
/// Zero when `from > to`.
pub fn count_working_days(calendar: &dyn WorkingDayCalendar, from: NaiveDate, to: NaiveDate) -> u32 {
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| calendar.is_working_day(*d))
        .count() as u32
}

/// Working days elapsed and remaining in a month around a cutoff date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkdaySplit {
    pub cutoff: NaiveDate,
    /// Working days from the 1st through `cutoff` inclusive
    pub passed: u32,
    /// Working days after `cutoff` through the month's last day
    pub left: u32,
}

/// Split the month containing `cutoff` into elapsed and remaining working days.
pub fn workdays_split(calendar: &dyn WorkingDayCalendar, cutoff: NaiveDate) -> SalesResult<WorkdaySplit> {
    let first = cutoff.with_day(1).ok_or_else(|| {
        SalesError::DateError(format!("Cannot derive first day of month for {cutoff}"))
    })?;
    let last = last_day_of_month(cutoff.year(), cutoff.month())?;

    let passed = count_working_days(calendar, first, cutoff);
    let left = match cutoff.succ_opt() {
        Some(next) => count_working_days(calendar, next, last),
        None => 0,
    };

    debug!(
        calendar = calendar.name(),
        %cutoff,
        passed,
        left,
        "working day split"
    );
    Ok(WorkdaySplit {
        cutoff,
        passed,
        left,
    })
}
