//! True calendar period arithmetic.
//!
//! Forecast buckets use real month, quarter, and year boundaries (inclusive
//! start, exclusive end) rather than fixed 30/90/365-day offsets, so a
//! twelve-period horizon never drifts.

use chrono::{Datelike, NaiveDate};

/// Quarter (1-4) containing the given month.
pub fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// Shift a (year, month) pair by a number of months.
pub fn shift_month(year: i32, month: u32, offset: i32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 + offset;
    (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1)
}

/// `[start, end)` bounds of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let start = first_of(year, month);
    let (next_year, next_month) = shift_month(year, month, 1);
    (start, first_of(next_year, next_month))
}

/// `[start, end)` bounds of a calendar quarter (1-4).
pub fn quarter_bounds(year: i32, quarter: u32) -> (NaiveDate, NaiveDate) {
    let start_month = (quarter - 1) * 3 + 1;
    let start = first_of(year, start_month);
    let (next_year, next_month) = shift_month(year, start_month, 3);
    (start, first_of(next_year, next_month))
}

/// `[start, end)` bounds of a calendar year.
pub fn year_bounds(year: i32) -> (NaiveDate, NaiveDate) {
    (first_of(year, 1), first_of(year + 1, 1))
}

fn first_of(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("month in 1..=12, day 1 always valid")
}

/// The quarter containing a date, as (year, quarter).
pub fn quarter_containing(date: NaiveDate) -> (i32, u32) {
    (date.year(), quarter_of(date.month()))
}
