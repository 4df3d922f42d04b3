use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::{IndexKind, SplitError};

/// Ordered list of participant names. Names may be blank while the user has
/// not filled them in; blank names are labelled positionally when shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistryRecord")]
pub struct ParticipantRegistry {
    names: Vec<String>,
}

#[derive(Deserialize)]
struct RegistryRecord {
    names: Vec<String>,
}

impl TryFrom<RegistryRecord> for ParticipantRegistry {
    type Error = SplitError;

    fn try_from(record: RegistryRecord) -> Result<Self, Self::Error> {
        if record.names.is_empty() {
            return Err(SplitError::EmptyRegistry);
        }
        Ok(Self {
            names: record.names,
        })
    }
}

impl Default for ParticipantRegistry {
    /// Starts with a single blank slot so there is always a row to fill in.
    fn default() -> Self {
        Self {
            names: vec![String::new()],
        }
    }
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding exactly `names`, or the default single blank slot when
    /// `names` is empty.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::default()
        } else {
            Self { names }
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn add(&mut self) {
        self.names.push(String::new());
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), SplitError> {
        SplitError::check(IndexKind::Participant, index, self.names.len())?;
        self.names[index] = name.into();
        Ok(())
    }

    /// Removes the slot at `index`. Later participants move down one position.
    pub fn remove(&mut self, index: usize) -> Result<String, SplitError> {
        SplitError::check(IndexKind::Participant, index, self.names.len())?;
        if self.names.len() == 1 {
            return Err(SplitError::LastParticipant);
        }
        Ok(self.names.remove(index))
    }

    /// The stored name, blank or not.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// The stored name, or `"{placeholder} N"` (1-based) when it is blank.
    pub fn display_name(&self, index: usize, placeholder: &str) -> Option<Cow<'_, str>> {
        let name = self.names.get(index)?;
        if name.trim().is_empty() {
            Some(Cow::Owned(format!("{placeholder} {}", index + 1)))
        } else {
            Some(Cow::Borrowed(name.as_str()))
        }
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        0..self.names.len()
    }

    /// Indices of participants whose names are not blank.
    pub fn named_indices(&self) -> Vec<usize> {
        self.names
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.trim().is_empty())
            .map(|(i, _)| i)
            .collect()
    }
}
