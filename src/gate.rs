//! Presence gate that admits the user into calibration.
//!
//! A face must be continuously present for the dwell period. Any tick without
//! a face restarts the dwell from scratch rather than pausing it.

use crate::pose::PoseSample;
use log::debug;
use std::time::Duration;

/// Event emitted by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// Dwell satisfied; calibration may begin
    Advance,
}

/// Continuous-presence dwell detector
#[derive(Debug, Clone)]
pub struct GateController {
    dwell: Duration,
    dwell_start: Option<Duration>,
}

impl GateController {
    /// Create a gate requiring `dwell` of continuous presence
    #[must_use]
    pub fn new(dwell: Duration) -> Self {
        Self {
            dwell,
            dwell_start: None,
        }
    }

    /// Feed one tick's observation
    pub fn observe(&mut self, sample: Option<&PoseSample>, now: Duration) -> Option<GateEvent> {
        if sample.is_none() {
            if self.dwell_start.take().is_some() {
                debug!("Gate: face lost, dwell restarted");
            }
            return None;
        }

        match self.dwell_start {
            None => {
                self.dwell_start = Some(now);
                None
            }
            Some(start) if now.saturating_sub(start) >= self.dwell => {
                self.dwell_start = None;
                Some(GateEvent::Advance)
            }
            Some(_) => None,
        }
    }

    /// Time accumulated in the current dwell, if one is running
    #[must_use]
    pub fn dwell_elapsed(&self, now: Duration) -> Option<Duration> {
        self.dwell_start.map(|start| now.saturating_sub(start))
    }

    /// Clear the dwell timer
    pub fn reset(&mut self) {
        self.dwell_start = None;
    }
}
