//! Record types fetched from the finance backend.
//!
//! Enum fields are normalized at the decode boundary: the canonical lowercase
//! spelling and the legacy all-uppercase spelling are accepted, anything else
//! is a malformed record. Serialization always emits lowercase.

use std::fmt;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Match a wire value against a table of canonical spellings.
fn parse_wire<T: Copy>(raw: &str, kind: &str, table: &[(&str, T)]) -> Result<T> {
    let raw = raw.trim();
    for (name, value) in table {
        if raw == *name || raw == name.to_ascii_uppercase() {
            return Ok(*value);
        }
    }
    bail!("invalid {kind} '{raw}' (expected one of: {})", names(table))
}

fn names<T>(table: &[(&str, T)]) -> String {
    table
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decode an optional string field, treating `null`, absence and blank text as `None`.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<String>,
    T::Error: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => T::try_from(s).map(Some).map_err(de::Error::custom),
    }
}

macro_rules! wire_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            const TABLE: &'static [(&'static str, $ty)] = &[$(($name, $ty::$variant)),+];

            /// All variants in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Canonical wire spelling.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl TryFrom<String> for $ty {
            type Error = anyhow::Error;

            fn try_from(raw: String) -> Result<Self> {
                parse_wire(&raw, $kind, Self::TABLE)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(raw: &str) -> Result<Self> {
                parse_wire(raw, $kind, Self::TABLE)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TransactionType {
    Purchase,
    Payment,
    Refund,
}

wire_enum!(TransactionType, "transaction type", {
    Purchase => "purchase",
    Payment => "payment",
    Refund => "refund",
});

impl TransactionType {
    /// Payments and refunds count as money coming back in.
    pub fn is_income(&self) -> bool {
        matches!(self, TransactionType::Payment | TransactionType::Refund)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Category {
    Groceries,
    Utilities,
    Entertainment,
    Dining,
    Transportation,
    Shopping,
    Housing,
    Healthcare,
    Education,
    Income,
    Other,
}

wire_enum!(Category, "category", {
    Groceries => "groceries",
    Utilities => "utilities",
    Entertainment => "entertainment",
    Dining => "dining",
    Transportation => "transportation",
    Shopping => "shopping",
    Housing => "housing",
    Healthcare => "healthcare",
    Education => "education",
    Income => "income",
    Other => "other",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CardType {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Checking,
    Savings,
    Other,
}

wire_enum!(CardType, "card type", {
    Visa => "visa",
    Mastercard => "mastercard",
    Amex => "amex",
    Discover => "discover",
    Checking => "checking",
    Savings => "savings",
    Other => "other",
});

impl CardType {
    /// Bank accounts rather than payment cards.
    pub fn is_bank_account(&self) -> bool {
        matches!(self, CardType::Checking | CardType::Savings)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

wire_enum!(Frequency, "frequency", {
    Daily => "daily",
    Weekly => "weekly",
    Biweekly => "biweekly",
    Monthly => "monthly",
    Quarterly => "quarterly",
    Yearly => "yearly",
});

impl Frequency {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Bi-weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Yearly => "Yearly",
        }
    }
}

/// A card purchase, payment or refund as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    /// Non-negative, in currency units
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub merchant_name: String,
    pub transaction_type: TransactionType,
    /// Absent or blank on the wire means uncategorized
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<Category>,
    pub date: Timestamp,
    pub card_id: i64,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub receipt_path: Option<String>,
    /// Opaque OCR output attached to a receipt
    #[serde(default)]
    pub ocr_data: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Transaction {
    pub fn is_purchase(&self) -> bool {
        self.transaction_type == TransactionType::Purchase
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type.is_income()
    }

    pub fn has_receipt(&self) -> bool {
        self.receipt_path.is_some()
    }
}

/// A payment card or linked bank account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: i64,
    pub card_type: CardType,
    /// Exactly four ASCII digits
    #[serde(deserialize_with = "deserialize_last_four")]
    pub last_four: String,
    /// `MM/YY`; empty for bank-linked accounts
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub plaid_item_id: Option<String>,
}

impl Card {
    /// Masked label, e.g. `VISA •••• 1234`.
    pub fn masked(&self) -> String {
        format!("{} •••• {}", self.card_type.as_str().to_uppercase(), self.last_four)
    }
}

fn deserialize_last_four<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    crate::validate::validate_last_four(&raw).map_err(de::Error::custom)?;
    Ok(raw)
}

fn default_active() -> bool {
    true
}

/// A schedule template; the backend advances `next_date` after processing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringTransaction {
    pub id: i64,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: Category,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub next_date: NaiveDate,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl RecurringTransaction {
    /// True once `end_date` lies strictly before `today`.
    pub fn is_ended(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < today)
    }
}

/// Everything the views need, fetched in one go or read from a snapshot file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub recurring: Vec<RecurringTransaction>,
}

impl Ledger {
    /// Move offset-bearing transaction timestamps into `tz` wall-clock time,
    /// the zone "now" and "today" are taken in.
    pub fn localize(&mut self, tz: &Tz) {
        for t in &mut self.transactions {
            t.date = t.date.localized(tz);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx_json(kind: &str) -> serde_json::Value {
        json!({
            "id": 1,
            "amount": 12.5,
            "description": "Weekly shop",
            "merchant_name": "Corner Market",
            "transaction_type": kind,
            "category": "groceries",
            "date": "2024-03-10T14:30:00",
            "card_id": 7,
            "user_id": 3
        })
    }

    #[test]
    fn test_decode_lowercase_and_uppercase_types() {
        let lower: Transaction = serde_json::from_value(tx_json("purchase")).unwrap();
        let upper: Transaction = serde_json::from_value(tx_json("PURCHASE")).unwrap();
        assert_eq!(lower.transaction_type, TransactionType::Purchase);
        assert_eq!(upper.transaction_type, TransactionType::Purchase);
        assert_eq!(lower.amount, Decimal::new(125, 1));
        assert!(lower.is_purchase());
    }

    #[test]
    fn test_mixed_case_is_rejected() {
        let err = serde_json::from_value::<Transaction>(tx_json("Purchase")).unwrap_err();
        assert!(err.to_string().contains("invalid transaction type"), "{err}");
    }

    #[test]
    fn test_serializes_canonical_lowercase() {
        let tx: Transaction = serde_json::from_value(tx_json("REFUND")).unwrap();
        let out = serde_json::to_value(&tx).unwrap();
        assert_eq!(out["transaction_type"], "refund");
        assert_eq!(out["category"], "groceries");
    }

    #[test]
    fn test_blank_category_and_receipt_are_absent() {
        let mut raw = tx_json("purchase");
        raw["category"] = json!("");
        raw["receipt_path"] = json!(null);
        let tx: Transaction = serde_json::from_value(raw).unwrap();
        assert_eq!(tx.category, None);
        assert!(!tx.has_receipt());

        let mut raw = tx_json("purchase");
        raw.as_object_mut().unwrap().remove("category");
        let tx: Transaction = serde_json::from_value(raw).unwrap();
        assert_eq!(tx.category, None);
    }

    #[test]
    fn test_card_last_four_checked_on_decode() {
        let ok: Card = serde_json::from_value(json!({
            "id": 1, "card_type": "VISA", "last_four": "1234", "expiry_date": "12/25"
        }))
        .unwrap();
        assert_eq!(ok.card_type, CardType::Visa);
        assert_eq!(ok.masked(), "VISA •••• 1234");

        let bad = serde_json::from_value::<Card>(json!({
            "id": 2, "card_type": "checking", "last_four": "12a4"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_recurring_defaults() {
        let r: RecurringTransaction = serde_json::from_value(json!({
            "id": 4,
            "amount": 1200,
            "transaction_type": "payment",
            "category": "housing",
            "frequency": "monthly",
            "start_date": "2024-01-01",
            "next_date": "2024-04-01"
        }))
        .unwrap();
        assert!(r.is_active);
        assert_eq!(r.end_date, None);
        assert_eq!(r.description, None);
        assert_eq!(r.frequency.label(), "Monthly");
        assert!(!r.is_ended(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }

    #[test]
    fn test_frequency_labels() {
        assert_eq!(Frequency::Biweekly.label(), "Bi-weekly");
        assert_eq!("QUARTERLY".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert!("Quarterly".parse::<Frequency>().is_err());
    }
}
