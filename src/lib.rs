//! Guided multi-pose face capture library.
//!
//! This library walks a user through capturing five head poses (straight,
//! right, left, up, down) from a live video feed:
//! - A presence gate waits for a face to stay in frame
//! - Calibration records a neutral baseline and captures the straight pose
//! - Each remaining direction is captured after a short continuous hold
//! - The finished set is delivered once, in canonical order
//!
//! The face-landmark model, the camera and the image encoder sit behind the
//! traits in [`collaborators`]; the state machine in [`session`] only sees
//! `(yaw, pitch)` samples and frames.
//!
//! # Examples
//!
//! ## Driving the state machine directly
//!
//! ```no_run
//! use guided_pose_capture::{
//!     config::Config, encoder::JpegEncoder, frame::Frame, pose::PoseSample,
//!     session::{GuidedCapture, SessionEvent},
//! };
//! use std::time::Duration;
//!
//! let mut session = GuidedCapture::new(Config::default(), JpegEncoder::default());
//! let frame = Frame::solid(640, 480, [128, 128, 128]);
//!
//! for tick in 0..200u64 {
//!     let now = Duration::from_millis(tick * 110);
//!     let sample = Some(PoseSample::new(0.0, 0.01));
//!     for event in session.step(now, sample, &frame) {
//!         if let SessionEvent::Finished(set) = event {
//!             println!("Captured {} images", set.len());
//!         }
//!     }
//! }
//! ```
//!
//! ## Running the sampler
//!
//! ```no_run
//! use guided_pose_capture::{
//!     clock::SystemClock, config::Config, encoder::JpegEncoder, runner::CaptureRunner,
//!     simulation::{PoseScript, ScriptedExtractor, SimulatedCamera},
//! };
//!
//! # async fn demo() -> guided_pose_capture::Result<()> {
//! let runner = CaptureRunner::new(
//!     Config::default(),
//!     SimulatedCamera::new(320, 240),
//!     ScriptedExtractor::new(PoseScript::guided()),
//!     JpegEncoder::default(),
//!     SystemClock::new(),
//! )?;
//!
//! let handle = runner.spawn(|set: guided_pose_capture::ledger::CaptureSet<_>| {
//!     println!("Delivered {} images", set.len());
//! });
//! let outcome = handle.join().await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

/// Pose samples and capture labels
pub mod pose;

/// Time sources and timestamp repair
pub mod clock;

/// Presence gate before calibration
pub mod gate;

/// Straight baseline calibration
pub mod calibration;

/// Direction classification relative to the baseline
pub mod direction;

/// Hold-to-capture timers
pub mod hold;

/// At-most-once capture bookkeeping
pub mod ledger;

/// Capture session state machine
pub mod session;

/// Video frames
pub mod frame;

/// Traits for the camera, pose model, encoder and result consumer
pub mod collaborators;

/// JPEG artifact encoder
pub mod encoder;

/// Snapshots for the presentation layer
pub mod presentation;

/// Periodic sampler task
pub mod runner;

/// Scripted collaborators for demos and tests
pub mod simulation;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
