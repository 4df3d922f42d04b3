use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::money::Money;

/// Which index space an out-of-range index was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    Item,
    Participant,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Item => write!(f, "item"),
            IndexKind::Participant => write!(f, "participant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("{kind} index {index} out of range (have {len})")]
    OutOfRange {
        kind: IndexKind,
        index: usize,
        len: usize,
    },
    #[error("Item price must not be negative: {0}")]
    NegativePrice(Money),
    #[error("Cannot remove the last participant")]
    LastParticipant,
    #[error("At least one participant is required")]
    EmptyRegistry,
    #[error("Amount for item {item} exceeds the representable range")]
    Overflow { item: usize },
    #[error("A receipt is already being recognized")]
    RecognitionInFlight,
    #[error("Recognition result for ticket {ticket} is stale")]
    StaleRecognition { ticket: u64 },
    #[error("No recognition is pending")]
    NoRecognitionPending,
}

impl SplitError {
    pub(crate) fn check(kind: IndexKind, index: usize, len: usize) -> Result<(), SplitError> {
        if index < len {
            Ok(())
        } else {
            Err(SplitError::OutOfRange { kind, index, len })
        }
    }
}
