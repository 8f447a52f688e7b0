//! Classification of a pose, relative to the baseline, into a turn direction.

use crate::config::DirectionConfig;
use crate::pose::{Direction, PoseSample};

/// Maps samples to at most one of right, left, up or down.
///
/// Rules are checked in fixed order and the first match wins:
/// right, left, up, down. Horizontal turns require the pitch deviation to stay
/// within the horizontal tolerance; vertical turns have no yaw guard. A sample
/// that satisfies both a horizontal and a vertical rule is therefore always
/// classified horizontally.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionClassifier {
    config: DirectionConfig,
}

impl DirectionClassifier {
    /// Create a classifier with the given thresholds
    #[must_use]
    pub fn new(config: DirectionConfig) -> Self {
        Self { config }
    }

    /// Classify `sample` relative to `baseline`; `None` means neutral or ambiguous
    #[must_use]
    pub fn classify(&self, sample: &PoseSample, baseline: &PoseSample) -> Option<Direction> {
        let (rel_yaw, rel_pitch) = sample.relative_to(baseline);
        let c = &self.config;
        let level = rel_pitch.abs() < c.horizontal_tolerance;

        if rel_yaw > c.yaw_need && level {
            Some(Direction::Right)
        } else if rel_yaw < -c.yaw_need && level {
            Some(Direction::Left)
        } else if rel_pitch < -c.pitch_up {
            Some(Direction::Up)
        } else if rel_pitch > c.pitch_down {
            Some(Direction::Down)
        } else {
            None
        }
    }

    /// Thresholds in use
    #[must_use]
    pub fn config(&self) -> &DirectionConfig {
        &self.config
    }
}
