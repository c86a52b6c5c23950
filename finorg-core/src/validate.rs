//! Create/update payloads and the checks they must pass before being sent.

use std::fmt;
use std::sync::OnceLock;

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{CardType, Category, Frequency, RecurringTransaction, TransactionType};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Last four digits of a card number, ignoring spaces and dashes.
pub fn last_four_from_number(card_number: &str) -> Result<String> {
    let mut digits = String::with_capacity(card_number.len());
    for c in card_number.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' => {}
            other => bail!("card number contains invalid character '{other}'"),
        }
    }
    if digits.len() < 4 {
        bail!("card number needs at least 4 digits");
    }
    Ok(digits[digits.len() - 4..].to_string())
}

pub fn validate_last_four(last_four: &str) -> Result<()> {
    if last_four.len() != 4 || !last_four.bytes().all(|b| b.is_ascii_digit()) {
        bail!("last_four must be exactly 4 digits, got '{last_four}'");
    }
    Ok(())
}

fn expiry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("invalid expiry regex"))
}

/// `MM/YY` with a month between 01 and 12.
pub fn validate_expiry(expiry: &str) -> Result<()> {
    if !expiry_re().is_match(expiry) {
        bail!("expiry_date must be MM/YY, got '{expiry}'");
    }
    Ok(())
}

fn non_negative(field: &str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        bail!("{field} must not be negative, got {amount}");
    }
    Ok(())
}

fn non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} is required");
    }
    Ok(())
}

/// New or edited card. The backend still wants the full number on create;
/// `Debug` never prints it.
#[derive(Clone, Serialize, PartialEq)]
pub struct CardDraft {
    pub card_number: String,
    pub card_type: CardType,
    pub last_four: String,
    pub expiry_date: String,
    pub plaid_item_id: Option<String>,
}

impl CardDraft {
    pub fn new(card_number: impl Into<String>, card_type: CardType, expiry_date: impl Into<String>) -> Result<Self> {
        let card_number = card_number.into();
        let last_four = last_four_from_number(&card_number)?;
        Ok(Self {
            card_number,
            card_type,
            last_four,
            expiry_date: expiry_date.into(),
            plaid_item_id: None,
        })
    }
}

impl fmt::Debug for CardDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDraft")
            .field("card_type", &self.card_type)
            .field("last_four", &self.last_four)
            .field("expiry_date", &self.expiry_date)
            .field("plaid_item_id", &self.plaid_item_id)
            .finish_non_exhaustive()
    }
}

impl Validate for CardDraft {
    fn validate(&self) -> Result<()> {
        validate_last_four(&self.last_four)?;
        if last_four_from_number(&self.card_number)? != self.last_four {
            bail!("last_four does not match the card number");
        }
        if self.plaid_item_id.is_none() || !self.expiry_date.is_empty() {
            validate_expiry(&self.expiry_date)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub description: String,
    pub merchant_name: String,
    pub transaction_type: TransactionType,
    pub category: Category,
    pub date: NaiveDateTime,
    pub card_id: i64,
}

impl Validate for TransactionDraft {
    fn validate(&self) -> Result<()> {
        non_negative("amount", self.amount)?;
        non_blank("description", &self.description)?;
        non_blank("merchant_name", &self.merchant_name)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecurringDraft {
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: Category,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Pause or resume on update; left out of the payload when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Starting point for an edit: the template as it stands.
impl From<&RecurringTransaction> for RecurringDraft {
    fn from(r: &RecurringTransaction) -> Self {
        Self {
            amount: r.amount,
            transaction_type: r.transaction_type,
            category: r.category,
            description: r.description.clone(),
            frequency: r.frequency,
            start_date: r.start_date,
            end_date: r.end_date,
            is_active: Some(r.is_active),
        }
    }
}

impl Validate for RecurringDraft {
    fn validate(&self) -> Result<()> {
        non_negative("amount", self.amount)?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                bail!("end_date {end} is before start_date {}", self.start_date);
            }
        }
        Ok(())
    }
}
