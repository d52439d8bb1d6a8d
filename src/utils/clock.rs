//! Calendar helpers shared by the attendance and request engines.
//!
//! Every calendar computation here works on UTC. A "day" is the UTC date of an instant and a
//! range of days is always half-open: `from` is included, `to` is not.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc, Weekday};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// UTC calendar date of `now`, the key attendance records are stored under.
pub fn today(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Monday through Friday. No holiday calendar is modelled.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of working days in `[from, to)`. Zero when `from >= to`.
pub fn working_days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    from.iter_days()
        .take_while(|day| *day < to)
        .filter(|day| is_working_day(*day))
        .count() as u32
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.day0() as u64)
}

/// `[first day of month, first day of next month)` for the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = first_of_month(date);
    let next = first.checked_add_months(Months::new(1))?;
    Some((first, next))
}

/// Parses a `YYYY-MM` month selector into its first day.
pub fn parse_month(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    if token.len() != 7 {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{token}-01"), DATE_FORMAT).ok()
}

/// Expands a `YYYY-MM` selector to a half-open UTC instant window.
pub fn month_window(token: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (from, to) = month_bounds(parse_month(token)?)?;
    Some((start_of_day(from), start_of_day(to)))
}

/// Formats the month containing `now` as a `YYYY-MM` selector.
pub fn current_month(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// Parses a bare `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Parses an RFC 3339 timestamp (`2024-03-01T09:00:00Z`) into UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
