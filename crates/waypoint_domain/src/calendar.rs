use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Weekday code used throughout the task model: 1 = Sunday … 7 = Saturday.
pub fn weekday_code(day: Weekday) -> u8 {
    day.number_from_sunday() as u8
}

/// The weekday a calendar date falls on.
pub fn weekday_of(date: NaiveDate) -> Weekday {
    date.weekday()
}

/// True when both values name the same calendar day. Dates are date-only in
/// this crate; hosts resolve instants to days in their own timezone first.
pub fn same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// The seven days of the Sunday-started week containing `date`.
pub fn week_window(date: NaiveDate) -> [NaiveDate; 7] {
    let start = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
    std::array::from_fn(|offset| start + Duration::days(offset as i64))
}

/// The window exactly one week after `window`. Feeds the host's week pager;
/// carries no scheduling rule.
pub fn next_week_window(window: &[NaiveDate; 7]) -> [NaiveDate; 7] {
    week_window(window[6] + Duration::days(1))
}

/// The window exactly one week before `window`.
pub fn previous_week_window(window: &[NaiveDate; 7]) -> [NaiveDate; 7] {
    week_window(window[0] - Duration::days(1))
}
