//! # Special-Day Calendar
//!
//! A closed calendar of special-day predicates for pricing rules.
//!
//! Rules store the day as a raw tag (`"weekend"`, `"christmas"`, ...).
//! The tag is parsed into the [`SpecialDay`] enum at evaluation time;
//! a tag this calendar does not know never matches (the rule is simply
//! not applicable, which is not an error).
//!
//! Three kinds of predicate:
//! - fixed dates (Feb 14, Mar 8, Dec 25, Jan 1)
//! - day-of-week (weekend = Saturday or Sunday)
//! - Nth weekday of a month (Mother's Day = 2nd Sunday of May)

use chrono::{Datelike, NaiveDate, Weekday};

/// The closed set of special days the pricing engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialDay {
    /// February 14.
    ValentinesDay,
    /// March 8.
    WomensDay,
    /// Second Sunday of May.
    MothersDay,
    /// December 25.
    Christmas,
    /// January 1.
    NewYear,
    /// Saturday or Sunday.
    Weekend,
}

impl SpecialDay {
    /// Parses a stored tag into a special day.
    ///
    /// Returns `None` for tags outside the closed calendar; callers treat
    /// that as "never matches".
    pub fn parse(tag: &str) -> Option<SpecialDay> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "valentines_day" | "valentines" => Some(SpecialDay::ValentinesDay),
            "womens_day" => Some(SpecialDay::WomensDay),
            "mothers_day" => Some(SpecialDay::MothersDay),
            "christmas" => Some(SpecialDay::Christmas),
            "new_year" => Some(SpecialDay::NewYear),
            "weekend" => Some(SpecialDay::Weekend),
            _ => None,
        }
    }

    /// Whether `date` (UTC, date-only) falls on this special day.
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            SpecialDay::ValentinesDay => date.month() == 2 && date.day() == 14,
            SpecialDay::WomensDay => date.month() == 3 && date.day() == 8,
            SpecialDay::Christmas => date.month() == 12 && date.day() == 25,
            SpecialDay::NewYear => date.month() == 1 && date.day() == 1,
            SpecialDay::Weekend => {
                matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
            }
            SpecialDay::MothersDay => {
                nth_weekday_of_month(date.year(), 5, Weekday::Sun, 2) == Some(date)
            }
        }
    }
}

/// Computes the Nth occurrence of a weekday within a month.
///
/// `n` is 1-based (2 = second occurrence). Returns `None` when the month
/// has no such occurrence.
fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

// =============================================================================
// Unit Tests
// =============================================================================
