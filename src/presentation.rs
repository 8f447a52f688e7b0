//! Read-only view of a session for the presentation layer.
//!
//! The redraw path never touches the state machine; it renders the latest
//! [`SessionSnapshot`] published by the sampler.

use crate::collaborators::ImageEncoder;
use crate::pose::Direction;
use crate::session::{GuidedCapture, Instruction, PhaseKind};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Everything the presentation layer needs for one redraw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current phase
    pub phase: PhaseKind,
    /// Next instruction, `None` once done
    pub instruction: Option<Instruction>,
    /// Display text for the instruction
    pub prompt: Option<String>,
    /// Labels captured so far, canonical order
    pub captured: Vec<Direction>,
    /// Direction the last sample resolved to
    pub active_direction: Option<Direction>,
    /// User-visible error, when the session halted
    pub error: Option<String>,
}

impl SessionSnapshot {
    /// Capture the current state of `session`
    #[must_use]
    pub fn of<E: ImageEncoder>(session: &GuidedCapture<E>) -> Self {
        let mirrored = session.config().prompts.mirrored;
        let instruction = session.next_instruction();
        Self {
            phase: session.phase_kind(),
            instruction,
            prompt: instruction.map(|i| i.prompt(mirrored).to_string()),
            captured: session.ledger().captured_labels(),
            active_direction: session.active_direction(),
            error: session.failure().map(str::to_string),
        }
    }

    /// Whether `label` has been captured
    #[must_use]
    pub fn is_captured(&self, label: Direction) -> bool {
        self.captured.contains(&label)
    }

    /// Fraction of the five labels captured
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.captured.len() as f64 / Direction::ALL.len() as f64
    }

    /// Progress ring segments; empty until the baseline exists
    #[must_use]
    pub fn ring(&self) -> Vec<RingSegment> {
        match self.phase {
            PhaseKind::Directing | PhaseKind::Done => RING_LAYOUT
                .iter()
                .map(|&(direction, start, end)| RingSegment {
                    direction,
                    start_angle: start * PI,
                    end_angle: end * PI,
                    state: if self.is_captured(direction) {
                        SegmentState::Done
                    } else if self.active_direction == Some(direction) {
                        SegmentState::Active
                    } else {
                        SegmentState::Idle
                    },
                })
                .collect(),
            PhaseKind::Gate | PhaseKind::Calibrating => Vec::new(),
        }
    }
}

/// Arc span of each direction, in multiples of PI, clockwise from +x
const RING_LAYOUT: [(Direction, f64, f64); 4] = [
    (Direction::Up, -0.78, -0.22),
    (Direction::Right, -0.22, 0.22),
    (Direction::Down, 0.22, 0.78),
    (Direction::Left, 0.78, 1.22),
];

/// Visual state of a ring segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentState {
    Idle,
    Active,
    Done,
}

/// One quarter of the progress ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingSegment {
    /// Direction this arc represents
    pub direction: Direction,
    /// Start angle in radians
    pub start_angle: f64,
    /// End angle in radians
    pub end_angle: f64,
    /// Fill state
    pub state: SegmentState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directing(captured: Vec<Direction>, active: Option<Direction>) -> SessionSnapshot {
        SessionSnapshot {
            phase: PhaseKind::Directing,
            instruction: None,
            prompt: None,
            captured,
            active_direction: active,
            error: None,
        }
    }

    #[test]
    fn test_ring_hidden_before_baseline() {
        let snap = SessionSnapshot {
            phase: PhaseKind::Calibrating,
            ..directing(vec![Direction::Straight], None)
        };
        assert!(snap.ring().is_empty());
    }

    #[test]
    fn test_ring_states() {
        let snap = directing(
            vec![Direction::Straight, Direction::Right],
            Some(Direction::Up),
        );
        let ring = snap.ring();
        assert_eq!(ring.len(), 4);
        let state = |d: Direction| ring.iter().find(|s| s.direction == d).unwrap().state;
        assert_eq!(state(Direction::Right), SegmentState::Done);
        assert_eq!(state(Direction::Up), SegmentState::Active);
        assert_eq!(state(Direction::Left), SegmentState::Idle);
        assert_eq!(state(Direction::Down), SegmentState::Idle);
    }

    #[test]
    fn test_ring_covers_full_circle() {
        let ring = directing(Vec::new(), None).ring();
        let span: f64 = ring.iter().map(|s| s.end_angle - s.start_angle).sum();
        assert!((span - 2.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_progress_fraction() {
        let snap = directing(vec![Direction::Straight, Direction::Left], None);
        assert!((snap.progress() - 0.4).abs() < 1e-12);
    }
}
