//! Due-date status for recurring transactions.
//!
//! The backend owns `next_date`; this only classifies the date it reports.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::RecurringTransaction;

/// Window after today that still counts as due soon.
pub const DUE_SOON_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceStatus {
    Overdue,
    DueSoon,
    Scheduled,
}

impl RecurrenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceStatus::Overdue => "overdue",
            RecurrenceStatus::DueSoon => "due_soon",
            RecurrenceStatus::Scheduled => "scheduled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecurrenceStatus::Overdue => "Overdue",
            RecurrenceStatus::DueSoon => "Due soon",
            RecurrenceStatus::Scheduled => "Scheduled",
        }
    }
}

/// Classify a next-due date relative to `today`.
///
/// - on or before today: overdue
/// - within the next `DUE_SOON_DAYS` days (inclusive): due soon
/// - later: scheduled
pub fn classify(next_date: NaiveDate, today: NaiveDate) -> RecurrenceStatus {
    if next_date <= today {
        return RecurrenceStatus::Overdue;
    }
    match today.checked_add_days(Days::new(DUE_SOON_DAYS)) {
        Some(horizon) if next_date > horizon => RecurrenceStatus::Scheduled,
        _ => RecurrenceStatus::DueSoon,
    }
}

/// Same as [`classify`], with the time of day dropped from `now`.
pub fn classify_at(next_date: NaiveDate, now: NaiveDateTime) -> RecurrenceStatus {
    classify(next_date, now.date())
}

/// One row of the recurring-transactions table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRow<'a> {
    pub item: &'a RecurringTransaction,
    pub status: RecurrenceStatus,
    pub ended: bool,
}

/// Classify every template, soonest `next_date` first (stable for ties).
pub fn schedule(items: &[RecurringTransaction], today: NaiveDate) -> Vec<ScheduleRow<'_>> {
    let mut rows: Vec<ScheduleRow<'_>> = items
        .iter()
        .map(|item| ScheduleRow {
            item,
            status: classify(item.next_date, today),
            ended: item.is_ended(today),
        })
        .collect();
    rows.sort_by_key(|row| row.item.next_date);
    rows
}
