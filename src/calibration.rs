//! Straight (neutral pose) calibration.
//!
//! The baseline is confirmed either by holding a straight-enough pose for the
//! hold period, or, once the give-up time has passed, by taking the
//! highest-scoring sample seen during the whole phase. The second path keeps
//! users moving forward when their neutral pose sits outside the predicate's
//! band.

use crate::config::StraightConfig;
use crate::pose::PoseSample;
use log::debug;
use std::time::Duration;

/// How the baseline was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPath {
    /// Straight-enough pose held for the hold period
    Hold,
    /// Give-up time passed; best sample so far used
    Timeout,
}

/// A confirmed baseline together with the frame it was observed on
#[derive(Debug, Clone)]
pub struct Calibrated<F> {
    /// The user's neutral orientation
    pub baseline: PoseSample,
    /// Frame associated with the baseline sample
    pub frame: F,
    /// Which success path fired
    pub path: CalibrationPath,
}

/// Straightness score in [0, 1]; higher is more straight.
#[must_use]
pub fn straight_score(sample: &PoseSample, config: &StraightConfig) -> f64 {
    let yaw_score = (1.0 - sample.yaw.abs() / config.score_yaw_scale).clamp(0.0, 1.0);
    let pitch_score = (1.0 - sample.pitch.abs() / config.score_pitch_scale).clamp(0.0, 1.0);
    (yaw_score + pitch_score) / 2.0
}

/// Whether a sample lies inside the straight-enough band.
///
/// The pitch band is asymmetric because a neutral face does not produce zero
/// pitch with this geometry.
#[must_use]
pub fn is_straight_enough(sample: &PoseSample, config: &StraightConfig) -> bool {
    sample.yaw.abs() < config.yaw_limit
        && sample.pitch > config.pitch_min
        && sample.pitch < config.pitch_max
}

struct BestSample<F> {
    sample: PoseSample,
    score: f64,
    frame: F,
}

/// Baseline calibrator, generic over the frame payload kept with the best sample
pub struct StraightCalibrator<F> {
    config: StraightConfig,
    hold: Duration,
    give_up: Duration,
    phase_start: Option<Duration>,
    hold_start: Option<Duration>,
    best: Option<BestSample<F>>,
}

impl<F: Clone> StraightCalibrator<F> {
    /// Create a calibrator
    #[must_use]
    pub fn new(config: StraightConfig, hold: Duration, give_up: Duration) -> Self {
        Self {
            config,
            hold,
            give_up,
            phase_start: None,
            hold_start: None,
            best: None,
        }
    }

    /// Feed a sample with its frame. Returns the baseline once either success
    /// path fires.
    ///
    /// Emitting does not clear internal state: if the caller cannot complete
    /// the straight capture, the next call can fire again immediately.
    pub fn observe(&mut self, sample: PoseSample, frame: F, now: Duration) -> Option<Calibrated<F>> {
        let phase_start = *self.phase_start.get_or_insert(now);

        if sample.is_finite() {
            let score = straight_score(&sample, &self.config);
            if self.best.as_ref().map_or(true, |best| score > best.score) {
                self.best = Some(BestSample {
                    sample,
                    score,
                    frame: frame.clone(),
                });
            }
        }

        if now.saturating_sub(phase_start) > self.give_up {
            if let Some(best) = &self.best {
                debug!(
                    "Calibration give-up reached, using best sample yaw={:.4} pitch={:.4} score={:.3}",
                    best.sample.yaw, best.sample.pitch, best.score
                );
                return Some(Calibrated {
                    baseline: best.sample,
                    frame: best.frame.clone(),
                    path: CalibrationPath::Timeout,
                });
            }
        }

        if !is_straight_enough(&sample, &self.config) {
            self.hold_start = None;
            return None;
        }

        match self.hold_start {
            None => {
                self.hold_start = Some(now);
                None
            }
            Some(start) if now.saturating_sub(start) >= self.hold => Some(Calibrated {
                baseline: sample,
                frame,
                path: CalibrationPath::Hold,
            }),
            Some(_) => None,
        }
    }

    /// Signal lost this tick: the hold restarts, the best sample is kept
    pub fn lose_signal(&mut self) {
        self.hold_start = None;
    }

    /// Best sample observed so far
    #[must_use]
    pub fn best_sample(&self) -> Option<PoseSample> {
        self.best.as_ref().map(|best| best.sample)
    }

    /// Clear all timers and the best sample
    pub fn reset(&mut self) {
        self.phase_start = None;
        self.hold_start = None;
        self.best = None;
    }
}

impl<F> std::fmt::Debug for StraightCalibrator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StraightCalibrator")
            .field("phase_start", &self.phase_start)
            .field("hold_start", &self.hold_start)
            .field("best", &self.best.as_ref().map(|b| (b.sample, b.score)))
            .finish()
    }
}
