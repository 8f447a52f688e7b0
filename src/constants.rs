//! Constants used throughout the library

/// Continuous face presence required before calibration starts (ms)
pub const GATE_HOLD_MS: u64 = 2000;

/// Continuous straight-enough hold that confirms the baseline (ms)
pub const STRAIGHT_HOLD_MS: u64 = 150;

/// Calibration time after which the best sample so far becomes the baseline (ms)
pub const STRAIGHT_GIVEUP_MS: u64 = 1000;

/// Continuous classification required before a direction is captured (ms)
pub const DIRECTION_HOLD_MS: u64 = 420;

/// Delay between completion and delivery of the finished set (ms)
pub const COMPLETION_DELAY_MS: u64 = 2000;

/// Lock on the capture path after each capture (ms)
pub const CAPTURE_COOLDOWN_MS: u64 = 200;

/// Calibration gives up when no face was seen for this long (ms)
pub const CALIBRATION_TIMEOUT_MS: u64 = 15_000;

/// Sampler period (ms)
pub const SAMPLE_INTERVAL_MS: u64 = 110;

/// Straight-enough predicate bounds
pub const STRAIGHT_YAW_LIMIT: f64 = 0.02;
pub const STRAIGHT_PITCH_MIN: f64 = -0.015;
pub const STRAIGHT_PITCH_MAX: f64 = 0.055;

/// Deviations at which the straightness score reaches zero
pub const SCORE_YAW_SCALE: f64 = 0.04;
pub const SCORE_PITCH_SCALE: f64 = 0.08;

/// Direction classifier thresholds, relative to the baseline
pub const YAW_NEED: f64 = 0.012;
pub const PITCH_UP: f64 = 0.015;
pub const PITCH_DOWN: f64 = 0.007;
pub const HORIZONTAL_TOLERANCE: f64 = 0.03;

/// Default JPEG quality for captured artifacts
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Minimum increment used to keep extractor timestamps strictly increasing (ms)
pub const MIN_TIMESTAMP_STEP_MS: u64 = 1;
