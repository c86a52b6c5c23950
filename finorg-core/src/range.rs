//! Named look-back windows for the spending views.

use chrono::{Months, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TimeRange {
    #[default]
    Month,
    Quarter,
    Year,
}

impl TimeRange {
    pub fn months_back(&self) -> u32 {
        match self {
            TimeRange::Month => 1,
            TimeRange::Quarter => 3,
            TimeRange::Year => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Month => "month",
            TimeRange::Quarter => "quarter",
            TimeRange::Year => "year",
        }
    }
}

/// Unrecognized names fall back to `Month` instead of failing.
impl From<&str> for TimeRange {
    fn from(name: &str) -> Self {
        match name.trim() {
            "quarter" => TimeRange::Quarter,
            "year" => TimeRange::Year,
            _ => TimeRange::Month,
        }
    }
}

impl From<String> for TimeRange {
    fn from(name: String) -> Self {
        TimeRange::from(name.as_str())
    }
}

/// Earliest timestamp still inside `range`, counting back from `now`.
///
/// Calendar months are subtracted with the day clamped to the end of the
/// target month (Mar 31 -> Feb 29/28, Feb 29 -> Feb 28 a year earlier).
/// The window opens at midnight of that day, so everything dated on the
/// cutoff day is inside it.
pub fn cutoff(now: NaiveDateTime, range: TimeRange) -> NaiveDateTime {
    now.date()
        .checked_sub_months(Months::new(range.months_back()))
        .map(|day| day.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MIN)
}
