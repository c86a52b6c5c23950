//! finorg-core: record types and the derived views the finance client renders.
//!
//! Everything here is pure: callers pass in already-fetched records and an
//! explicit `now`/`today`.

pub mod aggregate;
pub mod dashboard;
pub mod models;
pub mod range;
pub mod recurrence;
pub mod resource;
pub mod time;
pub mod validate;

pub use aggregate::{
    CategorySlice, MonthBar, SpendingView, filter_by_range, group_by_category, group_by_month,
    spending_view, total_spending,
};
pub use dashboard::{DashboardSummary, RECENT_LIMIT, summarize};
pub use models::{
    Card, CardType, Category, Frequency, Ledger, RecurringTransaction, Transaction,
    TransactionType,
};
pub use range::{TimeRange, cutoff};
pub use recurrence::{RecurrenceStatus, ScheduleRow, classify, classify_at, schedule};
pub use resource::{Resource, find_by_id};
pub use time::Timestamp;
pub use validate::{CardDraft, RecurringDraft, TransactionDraft, Validate};
