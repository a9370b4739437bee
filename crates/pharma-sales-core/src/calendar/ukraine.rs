use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;

use crate::calendar::working_days::{is_weekend, WorkingDayCalendar};

/// Ukrainian working-day calendar: weekends plus public holidays.
///
/// A holiday that falls on a Saturday or Sunday moves the day off to the
/// next weekday that is not itself a day off. Holidays dated on or after the
/// suspension date (martial law) are treated as ordinary days.
#[derive(Debug, Clone, Default)]
pub struct UkraineCalendar {
    suspended_from: Option<NaiveDate>,
}

impl UkraineCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suspend_holidays_from(mut self, date: NaiveDate) -> Self {
        self.suspended_from = Some(date);
        self
    }

    /// Public holidays for `year` with their names, in date order.
    pub fn holidays(&self, year: i32) -> Vec<(NaiveDate, &'static str)> {
        let mut days: Vec<(NaiveDate, &'static str)> = Vec::new();
        let mut fixed = |month: u32, day: u32, name: &'static str| {
            if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
                days.push((d, name));
            }
        };

        fixed(1, 1, "New Year");
        if year <= 2023 {
            fixed(1, 7, "Orthodox Christmas");
        }
        fixed(3, 8, "International Women's Day");
        fixed(5, 1, "Labour Day");
        if year <= 2017 {
            fixed(5, 2, "Labour Day");
        }
        if year <= 2023 {
            fixed(5, 9, "Victory Day");
        } else {
            fixed(5, 8, "Day of Remembrance and Victory");
        }
        fixed(6, 28, "Constitution Day");
        match year {
            2022 | 2023 => fixed(7, 28, "Statehood Day"),
            y if y >= 2024 => fixed(7, 15, "Statehood Day"),
            _ => {}
        }
        fixed(8, 24, "Independence Day");
        match year {
            2015..=2022 => fixed(10, 14, "Defenders Day"),
            y if y >= 2023 => fixed(10, 1, "Defenders Day"),
            _ => {}
        }
        if year >= 2017 {
            fixed(12, 25, "Christmas");
        }

        if let Some(easter) = orthodox_easter(year) {
            days.push((easter, "Orthodox Easter"));
            days.push((easter + Duration::days(49), "Trinity"));
        }

        days.sort_by_key(|(d, _)| *d);
        days.retain(|(d, _)| self.suspended_from.map_or(true, |s| *d < s));
        days
    }

    /// Non-working days caused by holidays in `year`, after weekend transfers.
    fn days_off(&self, year: i32) -> BTreeSet<NaiveDate> {
        let holidays = self.holidays(year);
        let holiday_dates: BTreeSet<NaiveDate> = holidays.iter().map(|(d, _)| *d).collect();
        let mut off = BTreeSet::new();

        for (date, _) in &holidays {
            if !is_weekend(*date) {
                off.insert(*date);
                continue;
            }
            let mut moved = *date + Duration::days(1);
            while is_weekend(moved) || off.contains(&moved) || holiday_dates.contains(&moved) {
                moved += Duration::days(1);
            }
            off.insert(moved);
        }
        off
    }
}

impl WorkingDayCalendar for UkraineCalendar {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        if is_weekend(date) {
            return false;
        }
        // A late-December holiday can push its day off into January.
        let mut off = self.days_off(date.year());
        if date.month() == 1 {
            off.extend(self.days_off(date.year() - 1));
        }
        !off.contains(&date)
    }

    fn name(&self) -> &str {
        "ukraine"
    }
}

/// Orthodox Easter Sunday (Gregorian date) via the Meeus Julian algorithm.
/// Valid for 1900–2099, where the Julian calendar lags by 13 days.
pub fn orthodox_easter(year: i32) -> Option<NaiveDate> {
    if !(1900..=2099).contains(&year) {
        return None;
    }
    let a = year % 4;
    let b = year % 7;
    let c = year % 19;
    let d = (19 * c + 15) % 30;
    let e = (2 * a + 4 * b - d + 34) % 7;
    let month = (d + e + 114) / 31;
    let day = (d + e + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).map(|julian| julian + Duration::days(13))
}
