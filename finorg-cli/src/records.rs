//! Create, edit and delete commands for cards, transactions and recurring
//! templates. Every mutation goes through the generic `Resource` calls on
//! `ApiClient`, so drafts are validated before anything is sent.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Subcommand};
use finorg_client::ApiClient;
use finorg_core::{
    Card, CardDraft, CardType, Category, Frequency, RecurringDraft, RecurringTransaction,
    Resource, Transaction, TransactionDraft, TransactionType, time::parse_timestamp,
};
use rust_decimal::Decimal;

#[derive(Subcommand, Debug)]
pub enum CardsCommand {
    /// List cards and linked accounts
    List,
    /// Register a card; only the last four digits are kept locally
    Add(NewCard),
    /// Delete a card
    Rm { id: i64 },
}

#[derive(Args, Debug)]
pub struct NewCard {
    /// Full card or account number (spaces and dashes allowed)
    #[arg(long)]
    pub number: String,
    #[arg(long = "type")]
    pub card_type: CardType,
    /// MM/YY; may be left out for bank-linked accounts
    #[arg(long, default_value = "")]
    pub expiry: String,
    /// External link id for a bank-linked account
    #[arg(long)]
    pub plaid_item: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TransactionsCommand {
    /// Newest first
    List {
        #[arg(long)]
        card: Option<i64>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Full record, including receipt and OCR fields
    Show { id: i64 },
    Add(NewTransaction),
    Rm { id: i64 },
}

#[derive(Args, Debug)]
pub struct NewTransaction {
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long)]
    pub merchant: String,
    #[arg(long)]
    pub description: String,
    #[arg(long = "type", default_value = "purchase")]
    pub transaction_type: TransactionType,
    #[arg(long, default_value = "other")]
    pub category: Category,
    #[arg(long)]
    pub card: i64,
    /// Timestamp or date; defaults to now in the configured zone
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args, Debug)]
pub struct NewRecurring {
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long = "type", default_value = "purchase")]
    pub transaction_type: TransactionType,
    #[arg(long)]
    pub category: Category,
    #[arg(long)]
    pub frequency: Frequency,
    #[arg(long)]
    pub start: NaiveDate,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub description: Option<String>,
}

/// Only the given fields change.
#[derive(Args, Debug, Default)]
pub struct RecurringChanges {
    #[arg(long)]
    pub amount: Option<Decimal>,
    #[arg(long = "type")]
    pub transaction_type: Option<TransactionType>,
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long)]
    pub frequency: Option<Frequency>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long, conflicts_with = "no_end")]
    pub end: Option<NaiveDate>,
    /// Clear the end date
    #[arg(long)]
    pub no_end: bool,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "resume")]
    pub pause: bool,
    #[arg(long)]
    pub resume: bool,
}

impl NewCard {
    pub fn into_draft(self) -> Result<CardDraft> {
        let mut draft = CardDraft::new(self.number, self.card_type, self.expiry)?;
        draft.plaid_item_id = self.plaid_item;
        Ok(draft)
    }
}

impl NewTransaction {
    pub fn into_draft(self, now: NaiveDateTime) -> Result<TransactionDraft> {
        let date = match self.date.as_deref() {
            Some(raw) => parse_timestamp(raw)?.wall(),
            None => now,
        };
        Ok(TransactionDraft {
            amount: self.amount,
            description: self.description,
            merchant_name: self.merchant,
            transaction_type: self.transaction_type,
            category: self.category,
            date,
            card_id: self.card,
        })
    }
}

impl From<NewRecurring> for RecurringDraft {
    fn from(n: NewRecurring) -> Self {
        Self {
            amount: n.amount,
            transaction_type: n.transaction_type,
            category: n.category,
            description: n.description,
            frequency: n.frequency,
            start_date: n.start,
            end_date: n.end,
            is_active: None,
        }
    }
}

impl RecurringChanges {
    pub fn apply(self, draft: &mut RecurringDraft) {
        if let Some(amount) = self.amount {
            draft.amount = amount;
        }
        if let Some(kind) = self.transaction_type {
            draft.transaction_type = kind;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(frequency) = self.frequency {
            draft.frequency = frequency;
        }
        if let Some(start) = self.start {
            draft.start_date = start;
        }
        if self.no_end {
            draft.end_date = None;
        } else if let Some(end) = self.end {
            draft.end_date = Some(end);
        }
        if let Some(description) = self.description {
            draft.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if self.pause {
            draft.is_active = Some(false);
        } else if self.resume {
            draft.is_active = Some(true);
        }
    }
}

/// Newest first, optionally for one card, capped at `limit`.
pub fn latest(transactions: &[Transaction], card: Option<i64>, limit: usize) -> Vec<Transaction> {
    let mut picked: Vec<Transaction> = transactions
        .iter()
        .filter(|t| card.is_none_or(|id| t.card_id == id))
        .cloned()
        .collect();
    picked.sort_by(|a, b| b.date.wall().cmp(&a.date.wall()));
    picked.truncate(limit);
    picked
}

pub async fn add_card(client: &ApiClient, new: NewCard) -> Result<()> {
    let card = client.create::<Card>(&new.into_draft()?).await?;
    println!("Added {} (#{})", card.masked(), card.id);
    Ok(())
}

pub async fn add_transaction(client: &ApiClient, new: NewTransaction, now: NaiveDateTime) -> Result<()> {
    let t = client.create::<Transaction>(&new.into_draft(now)?).await?;
    println!("Added transaction #{} ({} at {})", t.id, t.transaction_type, t.merchant_name);
    Ok(())
}

pub async fn add_recurring(client: &ApiClient, new: NewRecurring) -> Result<()> {
    let r = client
        .create::<RecurringTransaction>(&RecurringDraft::from(new))
        .await?;
    println!("Added recurring #{}; first occurrence {}", r.id, r.next_date);
    Ok(())
}

pub async fn edit_recurring(client: &ApiClient, id: i64, changes: RecurringChanges) -> Result<()> {
    let current: RecurringTransaction = client.get(id).await?;
    let mut draft = RecurringDraft::from(&current);
    changes.apply(&mut draft);
    let updated = client
        .update::<RecurringTransaction>(id, &draft)
        .await
        .with_context(|| format!("edit recurring #{id}"))?;
    println!(
        "Updated recurring #{}; next occurrence {}{}",
        updated.id,
        updated.next_date,
        if updated.is_active { "" } else { " (paused)" }
    );
    Ok(())
}

pub async fn remove<R: Resource>(client: &ApiClient, id: i64) -> Result<()> {
    client.delete::<R>(id).await?;
    println!("Deleted {} #{id}", R::LABEL);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(subcommand)]
        cards: CardsCommand,
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template() -> RecurringDraft {
        RecurringDraft {
            amount: Decimal::new(1500, 2),
            transaction_type: TransactionType::Purchase,
            category: Category::Utilities,
            description: Some("Phone".to_string()),
            frequency: Frequency::Monthly,
            start_date: day(2024, 1, 5),
            end_date: Some(day(2025, 1, 5)),
            is_active: Some(true),
        }
    }

    #[test]
    fn test_card_args_become_draft() {
        let Harness { cards } = Harness::try_parse_from([
            "finorg", "add", "--number", "4111-1111-1111-1234", "--type", "VISA", "--expiry", "09/28",
        ])
        .unwrap();
        let CardsCommand::Add(new) = cards else {
            panic!("expected the add subcommand");
        };
        let draft = new.into_draft().unwrap();
        assert_eq!(draft.card_type, CardType::Visa);
        assert_eq!(draft.last_four, "1234");
        assert_eq!(draft.expiry_date, "09/28");
    }

    #[test]
    fn test_mixed_case_card_type_is_rejected() {
        let err = Harness::try_parse_from([
            "finorg", "add", "--number", "4111111111111234", "--type", "Visa",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("invalid card type"), "{err}");
    }

    #[test]
    fn test_transaction_date_defaults_to_now() {
        let now = day(2024, 6, 20).and_hms_opt(9, 30, 0).unwrap();
        let new = NewTransaction {
            amount: Decimal::new(1250, 2),
            merchant: "Deli".to_string(),
            description: "Lunch".to_string(),
            transaction_type: TransactionType::Purchase,
            category: Category::Dining,
            card: 2,
            date: None,
        };
        assert_eq!(new.into_draft(now).unwrap().date, now);

        let dated = NewTransaction {
            amount: Decimal::ONE,
            merchant: "Deli".to_string(),
            description: "Coffee".to_string(),
            transaction_type: TransactionType::Purchase,
            category: Category::Dining,
            card: 2,
            date: Some("2024-06-01".to_string()),
        };
        assert_eq!(dated.into_draft(now).unwrap().date, day(2024, 6, 1).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_changes_touch_only_given_fields() {
        let mut draft = template();
        RecurringChanges {
            amount: Some(Decimal::new(1800, 2)),
            no_end: true,
            pause: true,
            ..Default::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.amount, Decimal::new(1800, 2));
        assert_eq!(draft.end_date, None);
        assert_eq!(draft.is_active, Some(false));
        assert_eq!(draft.description.as_deref(), Some("Phone"));
        assert_eq!(draft.frequency, Frequency::Monthly);
    }

    #[test]
    fn test_blank_description_clears_it() {
        let mut draft = template();
        RecurringChanges {
            description: Some(" ".to_string()),
            resume: true,
            ..Default::default()
        }
        .apply(&mut draft);
        assert_eq!(draft.description, None);
        assert_eq!(draft.is_active, Some(true));
    }

    #[test]
    fn test_latest_filters_by_card_and_caps() {
        let raw = serde_json::json!([
            {"id": 1, "amount": 1, "transaction_type": "purchase", "date": "2024-06-01T10:00:00", "card_id": 1},
            {"id": 2, "amount": 2, "transaction_type": "purchase", "date": "2024-06-03T10:00:00", "card_id": 2},
            {"id": 3, "amount": 3, "transaction_type": "refund", "date": "2024-06-05T10:00:00", "card_id": 1},
            {"id": 4, "amount": 4, "transaction_type": "purchase", "date": "2024-06-02T10:00:00", "card_id": 1}
        ]);
        let txns: Vec<Transaction> = serde_json::from_value(raw).unwrap();

        let ids: Vec<i64> = latest(&txns, Some(1), 2).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 4]);
        let ids: Vec<i64> = latest(&txns, None, 10).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }
}
