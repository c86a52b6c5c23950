//! Entity descriptions shared by every CRUD screen and API call.
//!
//! One `Resource` impl per backend collection: where it lives, what a
//! create/update payload looks like, and how that payload is checked.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::{Card, RecurringTransaction, Transaction};
use crate::validate::{CardDraft, RecurringDraft, TransactionDraft, Validate};

pub trait Resource: DeserializeOwned + Send + 'static {
    /// Create/update payload
    type Draft: Serialize + Validate + Send + Sync;

    /// Collection path segment under the API root
    const COLLECTION: &'static str;

    /// Human-readable singular name
    const LABEL: &'static str;

    fn id(&self) -> i64;
}

impl Resource for Transaction {
    type Draft = TransactionDraft;
    const COLLECTION: &'static str = "transactions";
    const LABEL: &'static str = "transaction";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for Card {
    type Draft = CardDraft;
    const COLLECTION: &'static str = "cards";
    const LABEL: &'static str = "card";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for RecurringTransaction {
    type Draft = RecurringDraft;
    const COLLECTION: &'static str = "recurring-transactions";
    const LABEL: &'static str = "recurring transaction";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Find a record by id in an already-fetched list.
pub fn find_by_id<R: Resource>(items: &[R], id: i64) -> Option<&R> {
    items.iter().find(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardType;

    #[test]
    fn test_collections() {
        assert_eq!(Transaction::COLLECTION, "transactions");
        assert_eq!(Card::COLLECTION, "cards");
        assert_eq!(RecurringTransaction::COLLECTION, "recurring-transactions");
    }

    #[test]
    fn test_find_by_id() {
        let cards = vec![
            Card {
                id: 3,
                card_type: CardType::Visa,
                last_four: "1111".to_string(),
                expiry_date: "01/30".to_string(),
                plaid_item_id: None,
            },
            Card {
                id: 9,
                card_type: CardType::Savings,
                last_four: "2222".to_string(),
                expiry_date: String::new(),
                plaid_item_id: Some("item-9".to_string()),
            },
        ];
        assert_eq!(find_by_id(&cards, 9).map(|c| c.last_four.as_str()), Some("2222"));
        assert!(find_by_id(&cards, 4).is_none());
    }
}
