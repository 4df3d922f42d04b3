use serde::{Deserialize, Serialize};

use crate::assignment::{AssignmentStore, Bounds};
use crate::error::SplitError;
use crate::item::Item;
use crate::money::Money;
use crate::participant::ParticipantRegistry;

/// How an item's price is divided among the people sharing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Full-precision equal shares. Shares may not re-sum to the price.
    #[default]
    Even,
    /// Whole-cent shares; leftover cents go to the lowest-indexed sharers.
    ExactCents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsOptions {
    pub mode: SplitMode,
    /// Prefix used to label participants with blank names.
    pub placeholder_label: String,
}

impl Default for TotalsOptions {
    fn default() -> Self {
        Self {
            mode: SplitMode::Even,
            placeholder_label: "Participant".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantTotal {
    pub index: usize,
    pub label: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// One entry per current participant, in registry order.
    pub entries: Vec<ParticipantTotal>,
    /// Sum of prices of items nobody is sharing.
    pub unassigned: Money,
}

impl Totals {
    pub fn amount(&self, index: usize) -> Option<Money> {
        self.entries.get(index).map(|e| e.amount)
    }

    /// Label/amount pairs. Labels are not guaranteed unique.
    pub fn named(&self) -> impl Iterator<Item = (&str, Money)> + '_ {
        self.entries.iter().map(|e| (e.label.as_str(), e.amount))
    }

    /// Sum of every participant's amount; `None` if it overflows.
    pub fn assigned_sum(&self) -> Option<Money> {
        Money::checked_sum(self.entries.iter().map(|e| e.amount))
    }
}

/// Replays every assignment against the item prices. Items shared by nobody
/// are skipped before any division and reported in `unassigned`.
///
/// Fails with `OutOfRange` if an assignment names an item or participant
/// that does not exist, and with `Overflow` if a running amount leaves the
/// decimal range.
pub fn compute_totals(
    items: &[Item],
    assignments: &AssignmentStore,
    participants: &ParticipantRegistry,
    options: &TotalsOptions,
) -> Result<Totals, SplitError> {
    assignments.check(Bounds::new(items.len(), participants.len()))?;

    let mut amounts = vec![Money::zero(); participants.len()];
    let mut unassigned = Money::zero();

    for (index, item) in items.iter().enumerate() {
        let overflow = SplitError::Overflow { item: index };
        let sharers: Vec<usize> = assignments.get(index).collect();
        if sharers.is_empty() {
            unassigned = unassigned
                .checked_add(item.price())
                .ok_or(overflow)?;
            continue;
        }

        let price = item.price();
        let even = || price.share(sharers.len()).map(|s| vec![s; sharers.len()]);
        let shares = match options.mode {
            SplitMode::Even => even(),
            // Prices beyond i64 cents cannot be allocated in whole cents.
            SplitMode::ExactCents => price.allocate(sharers.len()).or_else(even),
        }
        .ok_or_else(|| overflow.clone())?;

        for (participant, share) in sharers.iter().zip(shares) {
            amounts[*participant] = amounts[*participant]
                .checked_add(share)
                .ok_or_else(|| overflow.clone())?;
        }
    }

    let entries = amounts
        .into_iter()
        .enumerate()
        .map(|(index, amount)| ParticipantTotal {
            index,
            label: participants
                .display_name(index, &options.placeholder_label)
                .map(|n| n.into_owned())
                .unwrap_or_default(),
            amount,
        })
        .collect();

    Ok(Totals { entries, unassigned })
}
