use chrono::{NaiveDate, TimeZone, Utc};
use finorg_core::{
    Ledger, RecurrenceStatus, TimeRange, group_by_month, schedule, spending_view, summarize,
    time::{now_in_zone, zone},
};
use rust_decimal::Decimal;
use serde_json::json;

/// A backend dump mixing the legacy uppercase enum spelling with the canonical one.
fn ledger() -> Ledger {
    serde_json::from_value(json!({
        "transactions": [
            {"id": 1, "amount": 82.40, "description": "Weekly shop", "merchant_name": "Fresh Foods",
             "transaction_type": "purchase", "category": "groceries", "date": "2024-05-28T18:02:11", "card_id": 1},
            {"id": 2, "amount": 1200, "description": "Card payment", "merchant_name": "Bank",
             "transaction_type": "PAYMENT", "category": "other", "date": "2024-06-01T09:00:00", "card_id": 1},
            {"id": 3, "amount": 45.10, "description": "Dinner", "merchant_name": "Luigi's",
             "transaction_type": "PURCHASE", "category": "dining", "date": "2024-06-03T20:15:00", "card_id": 2,
             "receipt_path": "receipts/3.jpg", "ocr_data": {"total": "45.10"}},
            {"id": 4, "amount": 19.99, "description": "Returned lamp", "merchant_name": "Home Co",
             "transaction_type": "refund", "category": "shopping", "date": "2024-06-05T11:00:00", "card_id": 2},
            {"id": 5, "amount": 12.00, "description": "Parking", "merchant_name": "City",
             "transaction_type": "purchase", "category": "", "date": "2024-06-09", "card_id": 1},
            {"id": 6, "amount": 300, "description": "Old laptop bag", "merchant_name": "Bags",
             "transaction_type": "purchase", "category": "shopping", "date": "2023-12-01T10:00:00", "card_id": 1},
            {"id": 7, "amount": 17.60, "description": "Lunch", "merchant_name": "Deli",
             "transaction_type": "purchase", "category": "groceries", "date": "2024-06-10T12:30:00Z", "card_id": 2}
        ],
        "cards": [
            {"id": 1, "card_type": "VISA", "last_four": "1234", "expiry_date": "12/25"},
            {"id": 2, "card_type": "checking", "last_four": "9876", "expiry_date": "", "plaid_item_id": "item-abc"}
        ],
        "recurring": [
            {"id": 10, "amount": 1500, "transaction_type": "payment", "category": "housing",
             "description": "Rent", "frequency": "monthly", "start_date": "2024-01-01", "next_date": "2024-07-01"},
            {"id": 11, "amount": 9.99, "transaction_type": "purchase", "category": "entertainment",
             "frequency": "monthly", "start_date": "2024-02-14", "next_date": "2024-06-14"},
            {"id": 12, "amount": 60, "transaction_type": "purchase", "category": "healthcare",
             "frequency": "quarterly", "start_date": "2024-01-20", "end_date": "2025-01-20", "next_date": "2024-07-20"}
        ]
    }))
    .expect("ledger fixture should decode")
}

#[test]
fn test_dashboard_from_ledger() {
    let ledger = ledger();
    let summary = summarize(&ledger.transactions, &ledger.cards);

    assert_eq!(summary.transaction_count, 7);
    assert_eq!(summary.card_count, 2);
    // 82.40 + 45.10 + 12.00 + 300 + 17.60
    assert_eq!(summary.total_spent, Decimal::new(45710, 2));
    // 1200 + 19.99
    assert_eq!(summary.total_income, Decimal::new(121999, 2));

    let recent: Vec<i64> = summary.recent.iter().map(|t| t.id).collect();
    assert_eq!(recent, vec![7, 5, 4, 3, 2]);
}

#[test]
fn test_month_spending_from_ledger() {
    let ledger = ledger();
    let now = NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let view = spending_view(&ledger.transactions, now, TimeRange::Month);

    let slices: Vec<(&str, Decimal)> = view
        .by_category
        .iter()
        .map(|s| (s.name.as_str(), s.value))
        .collect();
    assert_eq!(
        slices,
        vec![
            ("Groceries", Decimal::new(10000, 2)),
            ("Dining", Decimal::new(4510, 2)),
            ("Uncategorized", Decimal::new(1200, 2)),
        ]
    );

    let months: Vec<&str> = view.by_month.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(months, vec!["May", "Jun"]);
    assert_eq!(view.total, Decimal::new(15710, 2));
}

#[test]
fn test_year_spending_spans_new_year() {
    let ledger = ledger();
    let now = NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let view = spending_view(&ledger.transactions, now, TimeRange::from("year"));

    let months: Vec<(i32, &str)> = view
        .by_month
        .iter()
        .map(|b| (b.year, b.name.as_str()))
        .collect();
    assert_eq!(months, vec![(2023, "Dec"), (2024, "May"), (2024, "Jun")]);
    assert_eq!(view.total, Decimal::new(45710, 2));
}

#[test]
fn test_recurring_board_from_ledger() {
    let ledger = ledger();
    let today = NaiveDate::from_ymd_opt(2024, 6, 24).unwrap();
    let rows = schedule(&ledger.recurring, today);

    let statuses: Vec<(i64, RecurrenceStatus)> =
        rows.iter().map(|r| (r.item.id, r.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (11, RecurrenceStatus::Overdue),
            (10, RecurrenceStatus::DueSoon),
            (12, RecurrenceStatus::Scheduled),
        ]
    );
}

#[test]
fn test_month_end_instant_lands_in_display_zone() {
    let raw = json!({
        "transactions": [
            {"id": 1, "amount": 40, "description": "Late dinner", "merchant_name": "Bistro",
             "transaction_type": "purchase", "category": "dining", "date": "2024-07-01T02:00:00Z", "card_id": 1},
            {"id": 2, "amount": 15, "description": "Lunch", "merchant_name": "Deli",
             "transaction_type": "purchase", "category": "dining", "date": "2024-07-01T12:00:00", "card_id": 1}
        ]
    });

    // unlocalized, the instant reads at its own offset
    let utc: Ledger = serde_json::from_value(raw.clone()).unwrap();
    let bars = group_by_month(&utc.transactions);
    let months: Vec<(&str, Decimal)> = bars.iter().map(|b| (b.name.as_str(), b.amount)).collect();
    assert_eq!(months, vec![("Jul", Decimal::from(55))]);

    let chicago = zone("America/Chicago").unwrap();
    let mut local: Ledger = serde_json::from_value(raw).unwrap();
    local.localize(&chicago);
    let bars = group_by_month(&local.transactions);
    let months: Vec<(&str, Decimal)> = bars.iter().map(|b| (b.name.as_str(), b.amount)).collect();
    assert_eq!(months, vec![("Jun", Decimal::from(40)), ("Jul", Decimal::from(15))]);

    // one month back from Jul 31 03:00 UTC (Jul 30 evening in Chicago) opens on Jun 30
    let now = now_in_zone(Utc.with_ymd_and_hms(2024, 7, 31, 3, 0, 0).unwrap(), "America/Chicago").unwrap();
    let view = spending_view(&local.transactions, now, TimeRange::Month);
    assert_eq!(view.cutoff.date(), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    assert_eq!(view.total, Decimal::from(55));
}
