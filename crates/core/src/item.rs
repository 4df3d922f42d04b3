use serde::{Deserialize, Serialize};

use crate::error::SplitError;
use crate::money::Money;

/// One priced line of a receipt. Identified by its position in the item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord")]
pub struct Item {
    description: String,
    price: Money,
}

#[derive(Deserialize)]
struct ItemRecord {
    description: String,
    price: Money,
}

impl TryFrom<ItemRecord> for Item {
    type Error = SplitError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        Item::new(record.description, record.price)
    }
}

impl Item {
    pub fn new(description: impl Into<String>, price: Money) -> Result<Self, SplitError> {
        if price.is_negative() {
            return Err(SplitError::NegativePrice(price));
        }
        Ok(Item {
            description: description.into(),
            price,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Money {
        self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_price() {
        assert_eq!(
            Item::new("Refund", Money::from_cents(-500)),
            Err(SplitError::NegativePrice(Money::from_cents(-500)))
        );
    }

    #[test]
    fn deserializing_negative_price_fails() {
        let json = r#"{"description":"Refund","price":"-5"}"#;
        assert!(serde_json::from_str::<Item>(json).is_err());
    }

    #[test]
    fn zero_price_is_allowed() {
        let item = Item::new("Water", Money::zero()).unwrap();
        assert_eq!(item.description(), "Water");
        assert!(item.price().is_zero());
    }
}
