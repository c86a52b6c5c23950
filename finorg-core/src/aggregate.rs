//! Spending aggregation for the category pie and the monthly bar chart.
//!
//! Only purchases inside the selected window feed these views; payments and
//! refunds never show up as spending.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Category, Transaction};
use crate::range::{TimeRange, cutoff};

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub name: String,
    pub value: Decimal,
}

/// One bar of the monthly chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBar {
    /// Three-letter month abbreviation
    pub name: String,
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub amount: Decimal,
}

/// Everything the spending screen renders for one range selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingView {
    pub range: TimeRange,
    pub cutoff: NaiveDateTime,
    pub by_category: Vec<CategorySlice>,
    pub by_month: Vec<MonthBar>,
    pub total: Decimal,
}

/// Keep purchases dated on or after the range cutoff, in input order.
pub fn filter_by_range(
    transactions: &[Transaction],
    now: NaiveDateTime,
    range: TimeRange,
) -> Vec<Transaction> {
    let cutoff = cutoff(now, range);
    transactions
        .iter()
        .filter(|t| t.date.wall() >= cutoff && t.is_purchase())
        .cloned()
        .collect()
}

/// Sum amounts per category, in order of first appearance.
pub fn group_by_category(transactions: &[Transaction]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();
    let mut index: HashMap<Option<Category>, usize> = HashMap::new();

    for t in transactions {
        let slot = *index.entry(t.category).or_insert_with(|| {
            slices.push(CategorySlice {
                name: category_label(t.category),
                value: Decimal::ZERO,
            });
            slices.len() - 1
        });
        slices[slot].value += t.amount;
    }

    slices
}

/// Sum amounts per calendar month, oldest first.
///
/// Ordered by (year, month) so that December of one year precedes January of
/// the next.
pub fn group_by_month(transactions: &[Transaction]) -> Vec<MonthBar> {
    let mut totals: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for t in transactions {
        let when = t.date.wall();
        *totals
            .entry((when.year(), when.month()))
            .or_insert(Decimal::ZERO) += t.amount;
    }

    totals
        .into_iter()
        .map(|((year, month), amount)| MonthBar {
            name: MONTH_ABBREVIATIONS[month as usize - 1].to_string(),
            year,
            month,
            amount,
        })
        .collect()
}

pub fn total_spending(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(|t| t.amount).sum()
}

/// Filter once and build both chart series plus the total.
pub fn spending_view(
    transactions: &[Transaction],
    now: NaiveDateTime,
    range: TimeRange,
) -> SpendingView {
    let purchases = filter_by_range(transactions, now, range);
    SpendingView {
        range,
        cutoff: cutoff(now, range),
        by_category: group_by_category(&purchases),
        by_month: group_by_month(&purchases),
        total: total_spending(&purchases),
    }
}

fn category_label(category: Option<Category>) -> String {
    match category {
        Some(c) => capitalize(c.as_str()),
        None => UNCATEGORIZED_LABEL.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
