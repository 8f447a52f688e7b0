//! Record of captured artifacts, one per label.

use crate::pose::Direction;
use log::info;

/// Result of [`CaptureLedger::record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Artifact stored; the set is still incomplete
    Recorded,
    /// Artifact stored and it was the last missing label. Reported once.
    Completed,
    /// Label already had an artifact; nothing changed
    AlreadyPresent,
}

impl RecordOutcome {
    /// Whether the artifact was stored
    #[must_use]
    pub fn is_recorded(self) -> bool {
        !matches!(self, Self::AlreadyPresent)
    }
}

/// At-most-once store of one artifact per label.
///
/// The set of recorded labels only grows during a session.
#[derive(Debug, Clone)]
pub struct CaptureLedger<A> {
    slots: [Option<A>; Direction::ALL.len()],
}

impl<A> Default for CaptureLedger<A> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<A> CaptureLedger<A> {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `artifact` under `label` unless the label is already present
    pub fn record(&mut self, label: Direction, artifact: A) -> RecordOutcome {
        let slot = &mut self.slots[label.index()];
        if slot.is_some() {
            return RecordOutcome::AlreadyPresent;
        }
        *slot = Some(artifact);
        info!("Captured {label} ({}/{})", self.len(), Direction::ALL.len());

        if self.is_complete() {
            RecordOutcome::Completed
        } else {
            RecordOutcome::Recorded
        }
    }

    /// Whether `label` has an artifact
    #[must_use]
    pub fn contains(&self, label: Direction) -> bool {
        self.slots[label.index()].is_some()
    }

    /// Artifact stored under `label`
    #[must_use]
    pub fn get(&self, label: Direction) -> Option<&A> {
        self.slots[label.index()].as_ref()
    }

    /// Number of labels recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True iff all five labels are present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Recorded labels in canonical order
    #[must_use]
    pub fn captured_labels(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|label| self.contains(*label))
            .collect()
    }

    /// First label in display order without an artifact
    #[must_use]
    pub fn next_missing(&self) -> Option<Direction> {
        Direction::DISPLAY_ORDER
            .into_iter()
            .find(|label| !self.contains(*label))
    }

    /// Drop every artifact; used when a new session starts
    pub fn clear(&mut self) {
        self.slots = std::array::from_fn(|_| None);
    }
}

impl<A: Clone> CaptureLedger<A> {
    /// The finished set in canonical order, if complete
    #[must_use]
    pub fn to_capture_set(&self) -> Option<CaptureSet<A>> {
        let mut artifacts = Vec::with_capacity(Direction::ALL.len());
        for slot in &self.slots {
            artifacts.push(slot.clone()?);
        }
        Some(CaptureSet { artifacts })
    }
}

/// The five artifacts of a finished session, in the order
/// straight, right, left, up, down regardless of capture order.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSet<A> {
    artifacts: Vec<A>,
}

impl<A> CaptureSet<A> {
    /// Artifact for `label`
    #[must_use]
    pub fn get(&self, label: Direction) -> &A {
        &self.artifacts[label.index()]
    }

    /// `(label, artifact)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &A)> {
        Direction::ALL.into_iter().zip(self.artifacts.iter())
    }

    /// Artifacts in canonical order
    #[must_use]
    pub fn into_vec(self) -> Vec<A> {
        self.artifacts
    }

    /// Number of artifacts (always five)
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Always false; present for API symmetry
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}
