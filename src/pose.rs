//! Pose samples and the closed set of capture labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One orientation reading produced by the pose extractor.
///
/// `yaw` and `pitch` are unitless, signed deviations from a forward-facing
/// reference, roughly bounded to [-0.2, 0.2] for real faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Horizontal rotation proxy (positive: towards the subject's right)
    pub yaw: f64,
    /// Vertical rotation proxy (positive: down)
    pub pitch: f64,
}

impl PoseSample {
    /// Create a new sample
    #[must_use]
    pub const fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }

    /// Deviation of this sample from a baseline, as `(rel_yaw, rel_pitch)`
    #[must_use]
    pub fn relative_to(&self, baseline: &PoseSample) -> (f64, f64) {
        (self.yaw - baseline.yaw, self.pitch - baseline.pitch)
    }

    /// Whether both components are finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite()
    }
}

/// Capture label. `Straight` is captured during calibration, the other four
/// while directing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Straight,
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    /// Canonical order of a finished capture set
    pub const ALL: [Direction; 5] = [
        Direction::Straight,
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    /// Order in which the user is asked to turn once calibrated
    pub const DISPLAY_ORDER: [Direction; 4] =
        [Direction::Right, Direction::Left, Direction::Up, Direction::Down];

    /// Position in [`Direction::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::Straight => 0,
            Direction::Right => 1,
            Direction::Left => 2,
            Direction::Up => 3,
            Direction::Down => 4,
        }
    }

    /// Lowercase label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Straight => "straight",
            Direction::Right => "right",
            Direction::Left => "left",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Text shown to the user when this label is the next one to capture.
    ///
    /// With a mirrored preview the subject's right appears on the screen's
    /// left, so horizontal prompts are swapped.
    #[must_use]
    pub const fn prompt(self, mirrored: bool) -> &'static str {
        match (self, mirrored) {
            (Direction::Straight, _) => "LOOK FORWARD",
            (Direction::Right, true) | (Direction::Left, false) => "LOOK LEFT",
            (Direction::Left, true) | (Direction::Right, false) => "LOOK RIGHT",
            (Direction::Up, _) => "LOOK UP",
            (Direction::Down, _) => "LOOK DOWN",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
