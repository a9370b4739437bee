pub mod decade;
pub mod ukraine;
pub mod working_days;

pub use decade::DecadeConvention;
pub use ukraine::{orthodox_easter, UkraineCalendar};
pub use working_days::{
    build_calendar, count_working_days, last_day_of_month, workdays_split, CalendarKind,
    WeekdayCalendar, WorkdaySplit, WorkingDayCalendar,
};
