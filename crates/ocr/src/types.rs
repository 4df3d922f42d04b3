use serde::Serialize;
use tabsplit_core::{Item, Money};

/// Items recovered from one block of recognized text, plus a tally of what
/// was left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedReceipt {
    /// Priced lines in source order.
    pub items: Vec<Item>,
    /// Non-blank lines that did not look like `description price`.
    pub unmatched_lines: usize,
    /// Total/tax/tender lines dropped because summary skipping was enabled.
    pub skipped_summary_lines: usize,
    /// Amount printed on the last line labelled as a total, if any.
    pub stated_total: Option<Money>,
}

impl ExtractedReceipt {
    /// Sum of the item prices, or `None` if it leaves the decimal range.
    pub fn item_sum(&self) -> Option<Money> {
        Money::checked_sum(self.items.iter().map(Item::price))
    }

    /// Whether the receipt printed a total that the extracted items do not
    /// add up to. An item sum too large to represent never matches.
    pub fn total_mismatch(&self) -> bool {
        let Some(stated) = self.stated_total else {
            return false;
        };
        match self.item_sum() {
            Some(sum) => stated.to_cents() != sum.to_cents(),
            None => true,
        }
    }
}
