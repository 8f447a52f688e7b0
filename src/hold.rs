//! Hold-to-capture debouncing for the four turn directions.

use crate::pose::Direction;
use log::debug;
use std::time::Duration;

/// Per-label hold timers.
///
/// A label's hold accumulates only while every tick resolves to that label.
/// A tick resolving to another label, or to no label, restarts it. Labels
/// already captured never enter the hold again.
#[derive(Debug, Clone)]
pub struct HoldToCapture {
    hold: Duration,
    started: [Option<Duration>; Direction::ALL.len()],
}

impl HoldToCapture {
    /// Create a gate that fires after `hold` of continuous classification
    #[must_use]
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            started: [None; Direction::ALL.len()],
        }
    }

    /// Feed one tick's classification.
    ///
    /// Returns the label once its hold is satisfied. The timer is left running
    /// until [`HoldToCapture::confirm`] is called, so a capture that could not
    /// be completed is retried on the next qualifying tick.
    pub fn tick(
        &mut self,
        direction: Option<Direction>,
        now: Duration,
        is_captured: impl Fn(Direction) -> bool,
    ) -> Option<Direction> {
        for label in Direction::ALL {
            if Some(label) != direction {
                self.started[label.index()] = None;
            }
        }

        let label = direction?;
        let slot = &mut self.started[label.index()];

        if is_captured(label) {
            *slot = None;
            return None;
        }

        match *slot {
            None => {
                *slot = Some(now);
                debug!("Hold started for {label}");
                None
            }
            Some(start) if now.saturating_sub(start) >= self.hold => Some(label),
            Some(_) => None,
        }
    }

    /// The capture for `label` succeeded; clear its timer
    pub fn confirm(&mut self, label: Direction) {
        self.started[label.index()] = None;
    }

    /// How long `label` has been held, if it is being held
    #[must_use]
    pub fn held_for(&self, label: Direction, now: Duration) -> Option<Duration> {
        self.started[label.index()].map(|start| now.saturating_sub(start))
    }

    /// Clear every timer
    pub fn reset(&mut self) {
        self.started = [None; Direction::ALL.len()];
    }
}
