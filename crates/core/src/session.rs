use serde::{Deserialize, Serialize};

use crate::assignment::{AssignmentStore, Bounds};
use crate::error::SplitError;
use crate::item::Item;
use crate::participant::ParticipantRegistry;
use crate::totals::{compute_totals, Totals, TotalsOptions};

/// Where the session stands with respect to image recognition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecognitionStatus {
    #[default]
    Idle,
    Pending {
        ticket: u64,
    },
    Failed {
        message: String,
    },
}

/// A user intent or a recognition outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AddParticipant,
    RenameParticipant { index: usize, name: String },
    RemoveParticipant { index: usize },
    Toggle { item: usize, participant: usize },
    AutoSplitAll,
    BeginRecognition,
    RecognitionSucceeded { ticket: u64, items: Vec<Item> },
    RecognitionFailed { ticket: u64, message: String },
    CancelRecognition,
}

/// Everything a bill-splitting session holds. Totals are always derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct Session {
    items: Vec<Item>,
    participants: ParticipantRegistry,
    assignments: AssignmentStore,
    recognition: RecognitionStatus,
    last_ticket: u64,
    /// Whether "split among everyone" also picks participants with blank names.
    #[serde(default)]
    auto_split_includes_blank: bool,
}

#[derive(Deserialize)]
struct SessionRecord {
    items: Vec<Item>,
    participants: ParticipantRegistry,
    assignments: AssignmentStore,
    recognition: RecognitionStatus,
    last_ticket: u64,
    #[serde(default)]
    auto_split_includes_blank: bool,
}

/// Snapshots are only accepted if every assignment refers to an existing
/// item and participant.
impl TryFrom<SessionRecord> for Session {
    type Error = SplitError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let session = Session {
            items: record.items,
            participants: record.participants,
            assignments: record.assignments,
            recognition: record.recognition,
            last_ticket: record.last_ticket,
            auto_split_includes_blank: record.auto_split_includes_blank,
        };
        if session.participants.is_empty() {
            return Err(SplitError::EmptyRegistry);
        }
        session.assignments.check(session.bounds())?;
        Ok(session)
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_split_includes_blank(mut self, include: bool) -> Self {
        self.auto_split_includes_blank = include;
        self
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn participants(&self) -> &ParticipantRegistry {
        &self.participants
    }

    pub fn assignments(&self) -> &AssignmentStore {
        &self.assignments
    }

    pub fn recognition(&self) -> &RecognitionStatus {
        &self.recognition
    }

    pub fn is_recognizing(&self) -> bool {
        matches!(self.recognition, RecognitionStatus::Pending { .. })
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.items.len(), self.participants.len())
    }

    pub fn totals(&self, options: &TotalsOptions) -> Result<Totals, SplitError> {
        compute_totals(&self.items, &self.assignments, &self.participants, options)
    }

    /// The state after `action`, leaving `self` untouched. Errors never yield
    /// a partially updated state.
    pub fn reduce(&self, action: Action) -> Result<Session, SplitError> {
        let mut next = self.clone();
        next.apply(action)?;
        Ok(next)
    }

    /// Applies `action` in place. Every check runs before the first write, so
    /// on error the session is unchanged.
    pub fn apply(&mut self, action: Action) -> Result<(), SplitError> {
        match action {
            Action::AddParticipant => {
                self.participants.add();
            }
            Action::RenameParticipant { index, name } => {
                self.participants.rename(index, name)?;
            }
            Action::RemoveParticipant { index } => {
                self.participants.remove(index)?;
                self.assignments.remove_participant(index);
            }
            Action::Toggle { item, participant } => {
                let bounds = self.bounds();
                self.assignments.toggle(item, participant, bounds)?;
            }
            Action::AutoSplitAll => {
                let items: Vec<usize> = (0..self.items.len()).collect();
                let mut people = if self.auto_split_includes_blank {
                    Vec::new()
                } else {
                    self.participants.named_indices()
                };
                if people.is_empty() {
                    people = self.participants.indices().collect();
                }
                let bounds = self.bounds();
                self.assignments.assign_all_to_all(&items, &people, bounds)?;
            }
            Action::BeginRecognition => {
                self.begin_recognition()?;
            }
            Action::RecognitionSucceeded { ticket, items } => {
                self.check_ticket(ticket)?;
                self.items = items;
                self.assignments.clear();
                self.recognition = RecognitionStatus::Idle;
            }
            Action::RecognitionFailed { ticket, message } => {
                self.check_ticket(ticket)?;
                self.recognition = RecognitionStatus::Failed { message };
            }
            Action::CancelRecognition => {
                if !self.is_recognizing() {
                    return Err(SplitError::NoRecognitionPending);
                }
                self.recognition = RecognitionStatus::Idle;
            }
        }
        Ok(())
    }

    /// Marks a recognition as pending and returns its ticket.
    pub fn begin_recognition(&mut self) -> Result<u64, SplitError> {
        if self.is_recognizing() {
            return Err(SplitError::RecognitionInFlight);
        }
        self.last_ticket += 1;
        self.recognition = RecognitionStatus::Pending {
            ticket: self.last_ticket,
        };
        Ok(self.last_ticket)
    }

    fn check_ticket(&self, ticket: u64) -> Result<(), SplitError> {
        match self.recognition {
            RecognitionStatus::Pending { ticket: pending } if pending == ticket => Ok(()),
            _ => Err(SplitError::StaleRecognition { ticket }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexKind;
    use crate::money::Money;

    fn item(description: &str, cents: i64) -> Item {
        Item::new(description, Money::from_cents(cents)).unwrap()
    }

    fn loaded(names: &[&str], items: Vec<Item>) -> Session {
        let mut s = Session::new();
        for _ in 1..names.len() {
            s.apply(Action::AddParticipant).unwrap();
        }
        for (index, name) in names.iter().enumerate() {
            s.apply(Action::RenameParticipant { index, name: name.to_string() })
                .unwrap();
        }
        let ticket = s.begin_recognition().unwrap();
        s.apply(Action::RecognitionSucceeded { ticket, items }).unwrap();
        s
    }

    #[test]
    fn reduce_leaves_original_untouched() {
        let s = Session::new();
        let next = s.reduce(Action::AddParticipant).unwrap();
        assert_eq!(s.participants().len(), 1);
        assert_eq!(next.participants().len(), 2);
    }

    #[test]
    fn toggle_out_of_range_item_keeps_state() {
        let s = loaded(&["Alice"], vec![item("A", 100), item("B", 200), item("C", 300)]);
        let s = s.reduce(Action::Toggle { item: 1, participant: 0 }).unwrap();

        let err = s.reduce(Action::Toggle { item: 5, participant: 0 }).unwrap_err();
        assert_eq!(err, SplitError::OutOfRange { kind: IndexKind::Item, index: 5, len: 3 });

        let mut same = s.clone();
        assert!(same.apply(Action::Toggle { item: 5, participant: 0 }).is_err());
        assert_eq!(same, s);
    }

    #[test]
    fn pizza_and_coke_through_actions() {
        let mut s = loaded(&["Alice", "Bob"], vec![item("Pizza", 25000), item("Coke", 5000)]);
        s.apply(Action::Toggle { item: 0, participant: 0 }).unwrap();
        s.apply(Action::Toggle { item: 0, participant: 1 }).unwrap();
        s.apply(Action::Toggle { item: 1, participant: 0 }).unwrap();

        let totals = s.totals(&TotalsOptions::default()).unwrap();
        assert_eq!(totals.amount(0), Some(Money::from_cents(17500)));
        assert_eq!(totals.amount(1), Some(Money::from_cents(12500)));
    }

    #[test]
    fn auto_split_skips_blank_names_by_default() {
        let mut s = loaded(&["Alice", "", "Cara"], vec![item("A", 300), item("B", 600)]);
        s.apply(Action::Toggle { item: 0, participant: 1 }).unwrap();
        s.apply(Action::AutoSplitAll).unwrap();
        for i in 0..2 {
            assert_eq!(s.assignments().get(i).collect::<Vec<_>>(), vec![0, 2]);
        }
    }

    #[test]
    fn auto_split_can_include_blank_names() {
        let mut s = loaded(&["Alice", ""], vec![item("A", 300)])
            .with_auto_split_includes_blank(true);
        s.apply(Action::AutoSplitAll).unwrap();
        assert_eq!(s.assignments().get(0).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn auto_split_with_all_blank_names_uses_everyone() {
        let mut s = loaded(&["", ""], vec![item("A", 300)]);
        s.apply(Action::AutoSplitAll).unwrap();
        assert_eq!(s.assignments().get(0).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn removing_participant_compacts_assignments() {
        let mut s = loaded(&["Alice", "Bob", "Cara"], vec![item("A", 900)]);
        s.apply(Action::AutoSplitAll).unwrap();
        s.apply(Action::RemoveParticipant { index: 0 }).unwrap();

        assert_eq!(s.assignments().get(0).collect::<Vec<_>>(), vec![0, 1]);
        let totals = s.totals(&TotalsOptions::default()).unwrap();
        assert_eq!(totals.entries[0].label, "Bob");
        assert_eq!(totals.amount(0), Some(Money::from_cents(450)));
    }

    #[test]
    fn second_submission_is_rejected_while_pending() {
        let mut s = Session::new();
        s.apply(Action::BeginRecognition).unwrap();
        assert_eq!(s.apply(Action::BeginRecognition), Err(SplitError::RecognitionInFlight));
    }

    #[test]
    fn failure_keeps_items_and_assignments() {
        let mut s = loaded(&["Alice"], vec![item("A", 100)]);
        s.apply(Action::Toggle { item: 0, participant: 0 }).unwrap();
        let ticket = s.begin_recognition().unwrap();
        s.apply(Action::RecognitionFailed { ticket, message: "blurry".into() })
            .unwrap();

        assert_eq!(s.items(), &[item("A", 100)]);
        assert!(s.assignments().contains(0, 0));
        assert_eq!(
            s.recognition(),
            &RecognitionStatus::Failed { message: "blurry".into() }
        );
    }

    #[test]
    fn success_replaces_items_and_clears_assignments() {
        let mut s = loaded(&["Alice"], vec![item("A", 100)]);
        s.apply(Action::Toggle { item: 0, participant: 0 }).unwrap();
        let ticket = s.begin_recognition().unwrap();
        s.apply(Action::RecognitionSucceeded { ticket, items: vec![item("B", 5), item("C", 7)] })
            .unwrap();

        assert_eq!(s.items().len(), 2);
        assert!(s.assignments().is_empty());
        assert_eq!(s.recognition(), &RecognitionStatus::Idle);
    }

    #[test]
    fn completion_after_cancel_is_stale() {
        let mut s = loaded(&["Alice"], vec![item("A", 100)]);
        let ticket = s.begin_recognition().unwrap();
        s.apply(Action::CancelRecognition).unwrap();

        let before = s.clone();
        let err = s
            .apply(Action::RecognitionSucceeded { ticket, items: vec![] })
            .unwrap_err();
        assert_eq!(err, SplitError::StaleRecognition { ticket });
        assert_eq!(s, before);
    }

    #[test]
    fn tickets_increase_per_submission() {
        let mut s = Session::new();
        let first = s.begin_recognition().unwrap();
        s.apply(Action::CancelRecognition).unwrap();
        let second = s.begin_recognition().unwrap();
        assert!(second > first);
        assert!(matches!(
            s.apply(Action::RecognitionFailed { ticket: first, message: String::new() }),
            Err(SplitError::StaleRecognition { .. })
        ));
    }

    #[test]
    fn cancel_without_pending_is_an_error() {
        let mut s = Session::new();
        assert_eq!(s.apply(Action::CancelRecognition), Err(SplitError::NoRecognitionPending));
    }

    #[test]
    fn session_survives_json_snapshot() {
        let mut s = loaded(&["Alice", "Bob"], vec![item("Pizza", 25000)]);
        s.apply(Action::AutoSplitAll).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    fn snapshot_with(assignments: &str, names: &str) -> String {
        format!(
            r#"{{"items":[{{"description":"Pizza","price":"250"}}],
                "participants":{{"names":{names}}},
                "assignments":{{"splits":{assignments}}},
                "recognition":{{"state":"idle"}},
                "last_ticket":1}}"#
        )
    }

    #[test]
    fn snapshot_with_unknown_participant_is_rejected() {
        let json = snapshot_with(r#"{"0":[0,5]}"#, r#"["Alice","Bob"]"#);
        let err = serde_json::from_str::<Session>(&json).unwrap_err();
        assert!(err.to_string().contains("participant index 5 out of range"));
    }

    #[test]
    fn snapshot_with_unknown_item_is_rejected() {
        let json = snapshot_with(r#"{"3":[0]}"#, r#"["Alice"]"#);
        let err = serde_json::from_str::<Session>(&json).unwrap_err();
        assert!(err.to_string().contains("item index 3 out of range"));
    }

    #[test]
    fn snapshot_without_participants_is_rejected() {
        let json = snapshot_with("{}", "[]");
        assert!(serde_json::from_str::<Session>(&json).is_err());
    }

    #[test]
    fn valid_snapshot_computes_totals() {
        let json = snapshot_with(r#"{"0":[0,1]}"#, r#"["Alice","Bob"]"#);
        let s: Session = serde_json::from_str(&json).unwrap();
        let totals = s.totals(&TotalsOptions::default()).unwrap();
        assert_eq!(totals.amount(1), Some(Money::from_cents(12500)));
    }
}
