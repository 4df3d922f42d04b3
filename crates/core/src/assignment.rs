use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{IndexKind, SplitError};

/// Sizes of the item list and participant registry that indices are
/// validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub items: usize,
    pub participants: usize,
}

impl Bounds {
    pub fn new(items: usize, participants: usize) -> Self {
        Self { items, participants }
    }

    fn check_item(self, index: usize) -> Result<(), SplitError> {
        SplitError::check(IndexKind::Item, index, self.items)
    }

    fn check_participant(self, index: usize) -> Result<(), SplitError> {
        SplitError::check(IndexKind::Participant, index, self.participants)
    }
}

/// Which participants share each item. An item with no entry is shared by
/// nobody; an entry emptied by toggling reads the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentStore {
    splits: BTreeMap<usize, BTreeSet<usize>>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Participants sharing `item`, in ascending index order.
    pub fn get(&self, item: usize) -> impl Iterator<Item = usize> + '_ {
        self.splits.get(&item).into_iter().flatten().copied()
    }

    pub fn count(&self, item: usize) -> usize {
        self.splits.get(&item).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, item: usize, participant: usize) -> bool {
        self.splits
            .get(&item)
            .is_some_and(|set| set.contains(&participant))
    }

    /// Adds `participant` to `item`'s set if absent, removes it otherwise.
    /// Returns whether the participant is a member afterwards.
    pub fn toggle(
        &mut self,
        item: usize,
        participant: usize,
        bounds: Bounds,
    ) -> Result<bool, SplitError> {
        bounds.check_item(item)?;
        bounds.check_participant(participant)?;

        let set = self.splits.entry(item).or_default();
        if set.remove(&participant) {
            if set.is_empty() {
                self.splits.remove(&item);
            }
            Ok(false)
        } else {
            set.insert(participant);
            Ok(true)
        }
    }

    /// Replaces the set of every listed item with exactly `participants`.
    /// Nothing is written unless every index is in bounds.
    pub fn assign_all_to_all(
        &mut self,
        items: &[usize],
        participants: &[usize],
        bounds: Bounds,
    ) -> Result<(), SplitError> {
        for &item in items {
            bounds.check_item(item)?;
        }
        for &participant in participants {
            bounds.check_participant(participant)?;
        }

        let set: BTreeSet<usize> = participants.iter().copied().collect();
        for &item in items {
            if set.is_empty() {
                self.splits.remove(&item);
            } else {
                self.splits.insert(item, set.clone());
            }
        }
        Ok(())
    }

    /// Drops `participant` from every set and renumbers higher participants
    /// down by one, matching a removal from the registry.
    pub fn remove_participant(&mut self, participant: usize) {
        for set in self.splits.values_mut() {
            *set = set
                .iter()
                .filter(|&&p| p != participant)
                .map(|&p| if p > participant { p - 1 } else { p })
                .collect();
        }
        self.splits.retain(|_, set| !set.is_empty());
    }

    /// Fails on the first item or participant index outside `bounds`.
    pub fn check(&self, bounds: Bounds) -> Result<(), SplitError> {
        for (&item, set) in &self.splits {
            bounds.check_item(item)?;
            for &participant in set {
                bounds.check_participant(participant)?;
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.splits.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(store: &AssignmentStore, item: usize) -> Vec<usize> {
        store.get(item).collect()
    }

    #[test]
    fn untouched_item_reads_empty() {
        let store = AssignmentStore::new();
        assert!(members(&store, 0).is_empty());
        assert_eq!(store.count(7), 0);
    }

    #[test]
    fn toggle_in_then_out_restores_original() {
        let bounds = Bounds::new(2, 3);
        let mut store = AssignmentStore::new();
        store.toggle(0, 2, bounds).unwrap();
        let before = store.clone();

        assert!(store.toggle(0, 1, bounds).unwrap());
        assert_eq!(members(&store, 0), vec![1, 2]);
        assert!(!store.toggle(0, 1, bounds).unwrap());
        assert_eq!(store, before);
    }

    #[test]
    fn toggle_last_member_out_leaves_no_entry() {
        let bounds = Bounds::new(1, 1);
        let mut store = AssignmentStore::new();
        store.toggle(0, 0, bounds).unwrap();
        store.toggle(0, 0, bounds).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn toggle_unknown_item_is_rejected_without_mutation() {
        let bounds = Bounds::new(3, 2);
        let mut store = AssignmentStore::new();
        store.toggle(1, 1, bounds).unwrap();
        let before = store.clone();

        let err = store.toggle(5, 0, bounds).unwrap_err();
        assert_eq!(err, SplitError::OutOfRange { kind: IndexKind::Item, index: 5, len: 3 });
        assert_eq!(store, before);
    }

    #[test]
    fn toggle_unknown_participant_is_rejected() {
        let mut store = AssignmentStore::new();
        let err = store.toggle(0, 2, Bounds::new(1, 2)).unwrap_err();
        assert!(matches!(
            err,
            SplitError::OutOfRange { kind: IndexKind::Participant, index: 2, .. }
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn assign_all_overwrites_partial_assignment() {
        let bounds = Bounds::new(3, 2);
        let mut store = AssignmentStore::new();
        store.toggle(1, 0, bounds).unwrap();

        store.assign_all_to_all(&[0, 1, 2], &[0, 1], bounds).unwrap();
        for item in 0..3 {
            assert_eq!(members(&store, item), vec![0, 1]);
        }
    }

    #[test]
    fn assign_all_validates_before_writing() {
        let bounds = Bounds::new(2, 2);
        let mut store = AssignmentStore::new();
        let err = store.assign_all_to_all(&[0, 1], &[0, 4], bounds).unwrap_err();
        assert!(matches!(err, SplitError::OutOfRange { kind: IndexKind::Participant, .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn assign_all_with_nobody_clears_items() {
        let bounds = Bounds::new(2, 2);
        let mut store = AssignmentStore::new();
        store.assign_all_to_all(&[0, 1], &[0], bounds).unwrap();
        store.assign_all_to_all(&[0], &[], bounds).unwrap();
        assert_eq!(store.count(0), 0);
        assert_eq!(members(&store, 1), vec![0]);
    }

    #[test]
    fn remove_participant_compacts_indices() {
        let bounds = Bounds::new(2, 3);
        let mut store = AssignmentStore::new();
        store.assign_all_to_all(&[0], &[0, 1, 2], bounds).unwrap();
        store.toggle(1, 1, bounds).unwrap();

        store.remove_participant(1);
        assert_eq!(members(&store, 0), vec![0, 1]);
        assert_eq!(store.count(1), 0);
        assert!(!store.contains(1, 1));
    }

    #[test]
    fn check_reports_indices_outside_bounds() {
        let mut store = AssignmentStore::new();
        store.assign_all_to_all(&[1], &[0, 2], Bounds::new(2, 3)).unwrap();

        assert_eq!(store.check(Bounds::new(2, 3)), Ok(()));
        assert_eq!(
            store.check(Bounds::new(2, 2)),
            Err(SplitError::OutOfRange { kind: IndexKind::Participant, index: 2, len: 2 })
        );
        assert_eq!(
            store.check(Bounds::new(1, 3)),
            Err(SplitError::OutOfRange { kind: IndexKind::Item, index: 1, len: 1 })
        );
    }
}
