use chrono::{Datelike, Local, NaiveDate};

/// Supplies the reference week number a run is seeded with.
pub trait WeekSource {
    fn current_week(&self) -> u32;
}

/// A week given explicitly (configuration or command line).
pub struct FixedWeek(pub u32);

impl WeekSource for FixedWeek {
    fn current_week(&self) -> u32 {
        self.0
    }
}

/// Today's Sunday-start week of the year, in local time.
pub struct CalendarWeek;

impl WeekSource for CalendarWeek {
    fn current_week(&self) -> u32 {
        sunday_week_number(Local::now().date_naive())
    }
}

/// Week of the year with weeks starting on Sunday. Days before the first
/// Sunday fall in week 0.
pub fn sunday_week_number(date: NaiveDate) -> u32 {
    (date.ordinal0() + 7 - date.weekday().num_days_from_sunday()) / 7
}
