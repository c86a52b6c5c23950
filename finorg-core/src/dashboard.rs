//! Dashboard totals and recent activity.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Card, Transaction};

/// How many transactions the recent-activity list shows.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub transaction_count: usize,
    pub card_count: usize,
    /// Sum of purchases
    pub total_spent: Decimal,
    /// Sum of payments and refunds
    pub total_income: Decimal,
    /// Newest first
    pub recent: Vec<Transaction>,
}

pub fn summarize(transactions: &[Transaction], cards: &[Card]) -> DashboardSummary {
    let total_spent = transactions
        .iter()
        .filter(|t| t.is_purchase())
        .map(|t| t.amount)
        .sum();
    let total_income = transactions
        .iter()
        .filter(|t| t.is_income())
        .map(|t| t.amount)
        .sum();

    // sort_by is stable: equal dates keep their input order
    let mut by_date: Vec<&Transaction> = transactions.iter().collect();
    by_date.sort_by(|a, b| b.date.wall().cmp(&a.date.wall()));
    let recent = by_date.into_iter().take(RECENT_LIMIT).cloned().collect();

    DashboardSummary {
        transaction_count: transactions.len(),
        card_count: cards.len(),
        total_spent,
        total_income,
        recent,
    }
}
