//! Narrows a set of expenses to a `FilterWindow`.
//!
//! Everything here is a pure function of the records, the window and the `today` that is passed
//! in. Nothing reads the clock.

use crate::model::{ExpenseRecord, FilterWindow, UnhandledFilterWindow};
use chrono::{Datelike, Duration, NaiveDate};
use std::str::FromStr;

/// Returns the records that fall inside `window`, keeping their order.
pub fn apply_filter(
    records: &[ExpenseRecord],
    window: FilterWindow,
    today: NaiveDate,
) -> Vec<ExpenseRecord> {
    match window {
        FilterWindow::All => records.to_vec(),
        FilterWindow::ThisWeek => {
            let start = week_start(today);
            records
                .iter()
                .filter(|r| r.date() >= start)
                .cloned()
                .collect()
        }
        FilterWindow::ThisMonth => records
            .iter()
            .filter(|r| r.date().year() == today.year() && r.date().month() == today.month())
            .cloned()
            .collect(),
    }
}

/// Like `apply_filter` but takes the window by name.
///
/// An unknown name selects nothing: the `Err` stands in for the empty result and carries the
/// logic error for the caller to report. `unwrap_or_default()` yields the empty `Vec`.
pub fn apply_named(
    records: &[ExpenseRecord],
    window: &str,
    today: NaiveDate,
) -> Result<Vec<ExpenseRecord>, UnhandledFilterWindow> {
    let window = FilterWindow::from_str(window)?;
    Ok(apply_filter(records, window, today))
}

/// The Sunday on or before `today`. Weeks run Sunday through Saturday.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    let days_since_sunday = i64::from(today.weekday().num_days_from_sunday());
    today - Duration::days(days_since_sunday)
}
