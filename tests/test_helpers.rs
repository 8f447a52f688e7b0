//! Helper functions and utilities for tests
#![allow(dead_code)]

use guided_pose_capture::{
    collaborators::ImageEncoder,
    config::Config,
    frame::Frame,
    pose::PoseSample,
    session::{GuidedCapture, SessionEvent},
    Error, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Neutral pose used as the calibrated baseline in scenarios
pub const NEUTRAL: PoseSample = PoseSample::new(0.0, 0.0);

/// Sampler period used by the driver
pub const TICK_MS: u64 = 110;

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Small frame with pixel data
pub fn test_frame() -> Frame {
    Frame::solid(4, 4, [90, 90, 90])
}

/// Encoder whose artifact is the 1-based number of the successful call.
///
/// The failure budget is shared so a test can make the next encodes fail
/// after handing the encoder to a session.
#[derive(Debug, Default)]
pub struct CountingEncoder {
    calls: usize,
    failures: Arc<AtomicUsize>,
}

impl CountingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of upcoming encodes that fail
    pub fn failure_budget(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.failures)
    }
}

impl ImageEncoder for CountingEncoder {
    type Artifact = usize;

    fn encode(&mut self, _frame: &Frame) -> Result<usize> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Encoder("simulated encoder failure".to_string()));
        }
        self.calls += 1;
        Ok(self.calls)
    }
}

/// Default config without the post-capture cooldown, so scenario timings
/// match the hold durations exactly
pub fn config_without_cooldown() -> Config {
    let mut config = Config::default();
    config.timing.capture_cooldown_ms = 0;
    config
}

/// Steps a session on a virtual clock
pub struct Driver {
    pub session: GuidedCapture<CountingEncoder>,
    pub now: u64,
    frame: Frame,
}

impl Driver {
    pub fn new(config: Config) -> (Self, Arc<AtomicUsize>) {
        let encoder = CountingEncoder::new();
        let failures = encoder.failure_budget();
        let driver = Self {
            session: GuidedCapture::new(config, encoder),
            now: 0,
            frame: test_frame(),
        };
        (driver, failures)
    }

    /// One tick at the current time
    pub fn tick(&mut self, sample: Option<PoseSample>) -> Vec<SessionEvent<usize>> {
        self.session.step(ms(self.now), sample, &self.frame)
    }

    /// Tick every [`TICK_MS`] over the next `duration` ms, the last tick
    /// landing exactly at the end
    pub fn advance(&mut self, duration: u64, sample: Option<PoseSample>) -> Vec<SessionEvent<usize>> {
        let end = self.now + duration;
        let mut events = Vec::new();
        while self.now < end {
            self.now = (self.now + TICK_MS).min(end);
            events.extend(self.tick(sample));
        }
        events
    }

    /// Hold `sample` starting one tick from now, for `duration` ms after
    /// that first tick
    pub fn hold(&mut self, duration: u64, sample: PoseSample) -> Vec<SessionEvent<usize>> {
        let mut events = self.advance(TICK_MS, Some(sample));
        events.extend(self.advance(duration, Some(sample)));
        events
    }

    /// Gate at t=0 and 2000 ms of presence, then a 150 ms straight hold
    pub fn calibrate(&mut self) -> Vec<SessionEvent<usize>> {
        let mut events = self.tick(Some(NEUTRAL));
        events.extend(self.advance(2000, Some(NEUTRAL)));
        events.extend(self.advance(TICK_MS, Some(NEUTRAL)));
        events.extend(self.advance(150, Some(NEUTRAL)));
        events
    }
}

pub fn captured(events: &[SessionEvent<usize>]) -> Vec<guided_pose_capture::pose::Direction> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Captured(d) => Some(*d),
            _ => None,
        })
        .collect()
}
