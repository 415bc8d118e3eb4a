use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::error::RuleError;

/// Earliest year a match can be scheduled in.
pub const MIN_MATCH_YEAR: i32 = 2000;
/// Latest year a match can be scheduled in.
pub const MAX_MATCH_YEAR: i32 = 9999;

/// Reject match dates outside `MIN_MATCH_YEAR..=MAX_MATCH_YEAR`.
pub fn check_match_date(date: NaiveDate) -> Result<(), RuleError> {
    if (MIN_MATCH_YEAR..=MAX_MATCH_YEAR).contains(&date.year()) {
        Ok(())
    } else {
        Err(RuleError::DateOutOfRange(date))
    }
}

/// Return the `[start, end)` bounds of the week containing `date`.
///
/// Weeks start on Sunday 00:00, so `start` is the Sunday on or before
/// `date` and `end` is the following Sunday. Fails instead of overflowing
/// at the edges of the calendar.
pub fn week_bounds(date: NaiveDate) -> Result<(NaiveDate, NaiveDate), RuleError> {
    let offset = i64::from(date.weekday().num_days_from_sunday());
    let start = date
        .checked_sub_signed(Duration::days(offset))
        .ok_or(RuleError::DateOutOfRange(date))?;
    let end = start
        .checked_add_signed(Duration::days(7))
        .ok_or(RuleError::DateOutOfRange(date))?;
    Ok((start, end))
}

/// Parse a kickoff time in 24-hour `HH:MM` form.
pub fn parse_kickoff(time: &str) -> Result<NaiveTime, RuleError> {
    let trimmed = time.trim();
    if trimmed.len() != 5 {
        return Err(RuleError::InvalidTime(trimmed.to_string()));
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| RuleError::InvalidTime(trimmed.to_string()))
}
