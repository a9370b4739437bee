use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::working_days::last_day_of_month;
use crate::error::SalesError;
use crate::SalesResult;

/// How an integer decade marker maps onto a calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecadeConvention {
    /// The marker is the day of month itself: 10 → 10th, 20 → 20th.
    /// Markers of 30 and above mean the month is complete.
    #[default]
    DayOfMonth,
    /// The marker is the decade index: 1 → 10th, 2 → 20th, 3 → last day.
    Index,
}

impl DecadeConvention {
    /// True when the marker denotes an already finished month.
    pub fn is_month_complete(&self, decade: u32) -> bool {
        match self {
            DecadeConvention::DayOfMonth => decade >= 30,
            DecadeConvention::Index => decade >= 3,
        }
    }

    /// Calendar date closing the given decade.
    pub fn cutoff_date(&self, decade: u32, year: i32, month: u32) -> SalesResult<NaiveDate> {
        let last = last_day_of_month(year, month)?;
        let day = match self {
            DecadeConvention::DayOfMonth => decade,
            DecadeConvention::Index => match decade {
                1 => 10,
                2 => 20,
                3 => last.day(),
                _ => 0,
            },
        };
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| SalesError::InvalidInput {
            field: "cutoff_decade".into(),
            reason: format!("Decade {decade} does not map to a day of {year}-{month:02} ({self:?})"),
        })
    }
}
