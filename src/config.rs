//! Configuration management for guided pose capture

use crate::constants::{
    CALIBRATION_TIMEOUT_MS, CAPTURE_COOLDOWN_MS, COMPLETION_DELAY_MS, DEFAULT_JPEG_QUALITY,
    DIRECTION_HOLD_MS, GATE_HOLD_MS, HORIZONTAL_TOLERANCE, PITCH_DOWN, PITCH_UP,
    SAMPLE_INTERVAL_MS, SCORE_PITCH_SCALE, SCORE_YAW_SCALE, STRAIGHT_GIVEUP_MS,
    STRAIGHT_HOLD_MS, STRAIGHT_PITCH_MAX, STRAIGHT_PITCH_MIN, STRAIGHT_YAW_LIMIT, YAW_NEED,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Capture session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hold durations, delays and the sampler period
    pub timing: TimingConfig,

    /// Straight (baseline) calibration parameters
    pub straight: StraightConfig,

    /// Direction classifier thresholds
    pub direction: DirectionConfig,

    /// Artifact encoding
    pub encoder: EncoderConfig,

    /// User-facing prompts
    pub prompts: PromptConfig,
}

/// Timing parameters, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Continuous face presence before calibration starts
    pub gate_hold_ms: u64,

    /// Straight-enough hold that confirms the baseline
    pub straight_hold_ms: u64,

    /// Calibration time after which the best sample is taken
    pub straight_giveup_ms: u64,

    /// Hold required to capture a direction
    pub direction_hold_ms: u64,

    /// Delay between completion and delivery of the finished set
    pub completion_delay_ms: u64,

    /// Lock on the capture path after each capture
    pub capture_cooldown_ms: u64,

    /// Calibration fails if no face is seen for this long
    pub calibration_timeout_ms: u64,

    /// Sampler period
    pub sample_interval_ms: u64,
}

/// Straight-enough predicate and scoring scales
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StraightConfig {
    /// Maximum absolute yaw of a straight-enough sample (exclusive)
    pub yaw_limit: f64,

    /// Lower pitch bound (exclusive)
    pub pitch_min: f64,

    /// Upper pitch bound (exclusive)
    pub pitch_max: f64,

    /// Absolute yaw at which the yaw score reaches zero
    pub score_yaw_scale: f64,

    /// Absolute pitch at which the pitch score reaches zero
    pub score_pitch_scale: f64,
}

/// Direction classifier thresholds, relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionConfig {
    /// Minimum yaw deviation for left/right
    pub yaw_need: f64,

    /// Minimum upward (negative) pitch deviation
    pub pitch_up: f64,

    /// Minimum downward (positive) pitch deviation
    pub pitch_down: f64,

    /// Maximum pitch deviation tolerated for left/right
    pub horizontal_tolerance: f64,
}

/// Encoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

/// Prompt configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// The preview is shown mirrored, so left/right prompts are swapped
    pub mirrored: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            gate_hold_ms: GATE_HOLD_MS,
            straight_hold_ms: STRAIGHT_HOLD_MS,
            straight_giveup_ms: STRAIGHT_GIVEUP_MS,
            direction_hold_ms: DIRECTION_HOLD_MS,
            completion_delay_ms: COMPLETION_DELAY_MS,
            capture_cooldown_ms: CAPTURE_COOLDOWN_MS,
            calibration_timeout_ms: CALIBRATION_TIMEOUT_MS,
            sample_interval_ms: SAMPLE_INTERVAL_MS,
        }
    }
}

impl Default for StraightConfig {
    fn default() -> Self {
        Self {
            yaw_limit: STRAIGHT_YAW_LIMIT,
            pitch_min: STRAIGHT_PITCH_MIN,
            pitch_max: STRAIGHT_PITCH_MAX,
            score_yaw_scale: SCORE_YAW_SCALE,
            score_pitch_scale: SCORE_PITCH_SCALE,
        }
    }
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            yaw_need: YAW_NEED,
            pitch_up: PITCH_UP,
            pitch_down: PITCH_DOWN,
            horizontal_tolerance: HORIZONTAL_TOLERANCE,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { mirrored: true }
    }
}

impl TimingConfig {
    /// Sampler period as a [`Duration`]
    #[must_use]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let t = &self.timing;
        if t.sample_interval_ms == 0 {
            return Err(Error::ConfigError(
                "Sample interval must be greater than 0".to_string(),
            ));
        }
        if t.direction_hold_ms == 0 || t.straight_hold_ms == 0 {
            return Err(Error::ConfigError(
                "Hold durations must be greater than 0".to_string(),
            ));
        }
        if t.calibration_timeout_ms <= t.straight_giveup_ms {
            return Err(Error::ConfigError(
                "Calibration timeout must exceed the straight give-up time".to_string(),
            ));
        }

        let s = &self.straight;
        if s.yaw_limit <= 0.0 {
            return Err(Error::ConfigError("Straight yaw limit must be positive".to_string()));
        }
        if s.pitch_min >= s.pitch_max {
            return Err(Error::ConfigError(
                "Straight pitch_min must be below pitch_max".to_string(),
            ));
        }
        if s.score_yaw_scale <= 0.0 || s.score_pitch_scale <= 0.0 {
            return Err(Error::ConfigError("Score scales must be positive".to_string()));
        }

        let d = &self.direction;
        if d.yaw_need <= 0.0 || d.pitch_up <= 0.0 || d.pitch_down <= 0.0 {
            return Err(Error::ConfigError(
                "Direction thresholds must be positive".to_string(),
            ));
        }
        if d.horizontal_tolerance <= 0.0 {
            return Err(Error::ConfigError(
                "Horizontal tolerance must be positive".to_string(),
            ));
        }

        if !(1..=100).contains(&self.encoder.jpeg_quality) {
            return Err(Error::ConfigError(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Guided Pose Capture Configuration

# Timing (milliseconds)
timing:
  gate_hold_ms: 2000
  straight_hold_ms: 150
  straight_giveup_ms: 1000
  direction_hold_ms: 420
  completion_delay_ms: 2000
  capture_cooldown_ms: 200
  calibration_timeout_ms: 15000
  sample_interval_ms: 110

# Straight calibration
straight:
  yaw_limit: 0.02
  pitch_min: -0.015
  pitch_max: 0.055
  score_yaw_scale: 0.04
  score_pitch_scale: 0.08

# Direction thresholds (relative to baseline)
direction:
  yaw_need: 0.012
  pitch_up: 0.015
  pitch_down: 0.007
  horizontal_tolerance: 0.03

# Artifact encoding
encoder:
  jpeg_quality: 90

# Prompts
prompts:
  mirrored: true
"#;
