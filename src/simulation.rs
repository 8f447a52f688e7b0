//! Scripted collaborators for running a session without a camera.
//!
//! A [`PoseScript`] is a timeline of pose segments. [`ScriptedExtractor`] looks
//! up the pose for each inference timestamp, and [`SimulatedCamera`] serves
//! solid-colour frames. Both can be told to fail so error paths can be driven
//! end-to-end.

use crate::collaborators::{FrameSource, PoseExtractor};
use crate::frame::Frame;
use crate::pose::{Direction, PoseSample};
use crate::{Error, Result};
use log::debug;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Timeline of poses; after the last segment its pose persists
#[derive(Debug, Clone, Default)]
pub struct PoseScript {
    segments: Vec<(Duration, Option<PoseSample>)>,
}

impl PoseScript {
    /// Empty script; every lookup yields no face
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment showing `sample` for `ms` milliseconds
    #[must_use]
    pub fn hold(mut self, ms: u64, sample: PoseSample) -> Self {
        self.segments.push((Duration::from_millis(ms), Some(sample)));
        self
    }

    /// Append a segment with no face for `ms` milliseconds
    #[must_use]
    pub fn absent(mut self, ms: u64) -> Self {
        self.segments.push((Duration::from_millis(ms), None));
        self
    }

    /// A user who follows every prompt in display order
    #[must_use]
    pub fn guided() -> Self {
        let neutral = PoseSample::new(0.0, 0.01);
        let mut script = Self::new().absent(300).hold(2600, neutral);
        for direction in Direction::DISPLAY_ORDER {
            script = script.hold(500, neutral).hold(800, Self::turn(neutral, direction));
        }
        script.hold(1000, neutral)
    }

    /// Pose clearly turned towards `direction` from `neutral`
    #[must_use]
    pub fn turn(neutral: PoseSample, direction: Direction) -> PoseSample {
        let (dy, dp) = match direction {
            Direction::Straight => (0.0, 0.0),
            Direction::Right => (0.03, 0.0),
            Direction::Left => (-0.03, 0.0),
            Direction::Up => (0.0, -0.03),
            Direction::Down => (0.0, 0.03),
        };
        PoseSample::new(neutral.yaw + dy, neutral.pitch + dp)
    }

    /// Pose at time `at` since the script started
    #[must_use]
    pub fn sample_at(&self, at: Duration) -> Option<PoseSample> {
        let mut start = Duration::ZERO;
        for &(len, sample) in &self.segments {
            start += len;
            if at < start {
                return sample;
            }
        }
        self.segments.last().and_then(|&(_, sample)| sample)
    }

    /// Length of the scripted timeline
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.segments.iter().map(|&(len, _)| len).sum()
    }
}

/// Pose extractor replaying a [`PoseScript`] by inference timestamp
#[derive(Debug)]
pub struct ScriptedExtractor {
    script: PoseScript,
    failures: Option<Range<Duration>>,
    timestamps: Arc<Mutex<Vec<Duration>>>,
    closed: Arc<AtomicBool>,
}

impl ScriptedExtractor {
    /// Extractor answering from `script`
    #[must_use]
    pub fn new(script: PoseScript) -> Self {
        Self {
            script,
            failures: None,
            timestamps: Arc::default(),
            closed: Arc::default(),
        }
    }

    /// Fail every inference whose timestamp falls in `start_ms..end_ms`
    #[must_use]
    pub fn failing_between(mut self, start_ms: u64, end_ms: u64) -> Self {
        self.failures = Some(Duration::from_millis(start_ms)..Duration::from_millis(end_ms));
        self
    }

    /// Shared log of every timestamp passed to [`PoseExtractor::infer`]
    #[must_use]
    pub fn timestamp_log(&self) -> Arc<Mutex<Vec<Duration>>> {
        Arc::clone(&self.timestamps)
    }

    /// Flag set once [`PoseExtractor::close`] was called
    #[must_use]
    pub fn close_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

impl PoseExtractor for ScriptedExtractor {
    fn infer(&mut self, _frame: &Frame, timestamp: Duration) -> Result<Option<PoseSample>> {
        if let Ok(mut log) = self.timestamps.lock() {
            log.push(timestamp);
        }
        if self.failures.as_ref().is_some_and(|r| r.contains(&timestamp)) {
            return Err(Error::Extractor(format!(
                "inference failed at {} ms",
                timestamp.as_millis()
            )));
        }
        Ok(self.script.sample_at(timestamp))
    }

    fn close(&mut self) {
        debug!("Scripted extractor closed");
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Frame source serving solid frames
#[derive(Debug)]
pub struct SimulatedCamera {
    width: u32,
    height: u32,
    served: u64,
    fail_after: Option<u64>,
    closed: Arc<AtomicBool>,
}

impl SimulatedCamera {
    /// Camera serving `width` x `height` frames; zero-sized means no usable frame
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            served: 0,
            fail_after: None,
            closed: Arc::default(),
        }
    }

    /// Report the feed as lost after `frames` frames were served
    #[must_use]
    pub fn fail_after(mut self, frames: u64) -> Self {
        self.fail_after = Some(frames);
        self
    }

    /// Number of frames served so far
    #[must_use]
    pub fn frames_served(&self) -> u64 {
        self.served
    }

    /// Flag set once [`FrameSource::close`] was called
    #[must_use]
    pub fn close_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

impl FrameSource for SimulatedCamera {
    fn current_frame(&mut self) -> Result<Option<Frame>> {
        if self.fail_after.is_some_and(|limit| self.served >= limit) {
            return Err(Error::FrameSource("camera disconnected".to_string()));
        }
        if self.width == 0 || self.height == 0 {
            return Ok(None);
        }
        self.served += 1;
        // Shade changes per frame so captured artifacts differ
        let shade = (self.served % 256) as u8;
        Ok(Some(Frame::solid(self.width, self.height, [shade, 128, 255 - shade])))
    }

    fn close(&mut self) {
        debug!("Simulated camera closed after {} frames", self.served);
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::DirectionClassifier;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_script_lookup() {
        let straight = PoseSample::new(0.0, 0.0);
        let script = PoseScript::new().absent(100).hold(200, straight);
        assert_eq!(script.sample_at(ms(0)), None);
        assert_eq!(script.sample_at(ms(99)), None);
        assert_eq!(script.sample_at(ms(100)), Some(straight));
        // Last pose persists
        assert_eq!(script.sample_at(ms(10_000)), Some(straight));
        assert_eq!(script.duration(), ms(300));
    }

    #[test]
    fn test_turns_classify_as_their_direction() {
        let neutral = PoseSample::new(0.0, 0.01);
        let classifier = DirectionClassifier::default();
        for direction in Direction::DISPLAY_ORDER {
            let pose = PoseScript::turn(neutral, direction);
            assert_eq!(classifier.classify(&pose, &neutral), Some(direction));
        }
    }

    #[test]
    fn test_extractor_failure_window() {
        let mut extractor =
            ScriptedExtractor::new(PoseScript::guided()).failing_between(1000, 1200);
        let frame = Frame::solid(2, 2, [0, 0, 0]);
        assert!(extractor.infer(&frame, ms(500)).is_ok());
        assert!(matches!(
            extractor.infer(&frame, ms(1100)),
            Err(Error::Extractor(_))
        ));
        assert_eq!(extractor.timestamp_log().lock().unwrap().len(), 2);
    }

    #[test]
    fn test_camera_fails_after_limit() {
        let mut camera = SimulatedCamera::new(4, 4).fail_after(2);
        assert!(camera.current_frame().unwrap().is_some());
        assert!(camera.current_frame().unwrap().is_some());
        assert!(matches!(camera.current_frame(), Err(Error::FrameSource(_))));

        let flag = camera.close_flag();
        camera.close();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_zero_sized_camera_yields_no_frame() {
        let mut camera = SimulatedCamera::new(0, 0);
        assert!(camera.current_frame().unwrap().is_none());
        assert_eq!(camera.frames_served(), 0);
    }
}
