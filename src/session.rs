//! Guided capture orchestrator.
//!
//! [`GuidedCapture`] composes the presence gate, straight calibrator,
//! direction classifier, hold-to-capture gate and capture ledger into the
//! phase sequence gate → calibrating → directing → done. It is a synchronous
//! state machine: every call to [`GuidedCapture::step`] carries the current
//! time, so tests drive it without real clocks.
//!
//! Phase substates live inside the [`Phase`] tagged union and are dropped on
//! transition; nothing from an earlier phase leaks into a later one except the
//! ledger and the baseline.

use crate::calibration::{CalibrationPath, StraightCalibrator};
use crate::collaborators::ImageEncoder;
use crate::config::Config;
use crate::direction::DirectionClassifier;
use crate::frame::Frame;
use crate::gate::{GateController, GateEvent};
use crate::hold::HoldToCapture;
use crate::ledger::{CaptureLedger, CaptureSet, RecordOutcome};
use crate::pose::{Direction, PoseSample};
use crate::{Error, Result};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Phase of a capture session, without its substate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Gate,
    Calibrating,
    Directing,
    Done,
}

/// Phase with its substate
#[derive(Debug)]
pub(crate) enum Phase {
    /// Waiting for a stable face
    Gate(GateController),
    /// Looking for the neutral pose
    Calibrating {
        /// Baseline calibrator, keeping the frame of its best sample
        calibrator: StraightCalibrator<Frame>,
        /// When calibration began
        entered_at: Duration,
    },
    /// Asking the user to turn in each direction
    Directing {
        /// Calibrated neutral pose
        baseline: PoseSample,
        /// Per-direction hold timers
        holds: HoldToCapture,
    },
    /// All five labels captured
    Done {
        /// Baseline of the session
        baseline: PoseSample,
        /// When the last label was captured
        completed_at: Duration,
    },
}

impl Phase {
    /// Tag of this phase
    #[must_use]
    pub(crate) fn kind(&self) -> PhaseKind {
        match self {
            Phase::Gate(_) => PhaseKind::Gate,
            Phase::Calibrating { .. } => PhaseKind::Calibrating,
            Phase::Directing { .. } => PhaseKind::Directing,
            Phase::Done { .. } => PhaseKind::Done,
        }
    }
}

/// What the user should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "direction")]
pub enum Instruction {
    /// Bring the face into the frame
    CenterFace,
    /// Look straight at the camera
    HoldStraight,
    /// Turn towards the given direction
    Turn(Direction),
}

impl Instruction {
    /// Display text
    #[must_use]
    pub fn prompt(self, mirrored: bool) -> &'static str {
        match self {
            Instruction::CenterFace => "Position your face within the frame.",
            Instruction::HoldStraight => Direction::Straight.prompt(mirrored),
            Instruction::Turn(direction) => direction.prompt(mirrored),
        }
    }
}

/// Public events produced by [`GuidedCapture::step`]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent<A> {
    /// The session moved to a new phase
    PhaseChanged {
        /// Previous phase
        from: PhaseKind,
        /// New phase
        to: PhaseKind,
    },
    /// Baseline established
    Calibrated {
        /// Neutral pose
        baseline: PoseSample,
        /// Success path that fired
        path: CalibrationPath,
    },
    /// An artifact was recorded for a label
    Captured(Direction),
    /// The fifth label was recorded
    Completed,
    /// Display delay elapsed; the finished set, emitted once
    Finished(CaptureSet<A>),
    /// The session halted; a reset is required
    Failed(String),
}

/// Guided multi-pose capture state machine
pub struct GuidedCapture<E: ImageEncoder> {
    config: Config,
    encoder: E,
    classifier: DirectionClassifier,
    phase: Phase,
    ledger: CaptureLedger<E::Artifact>,
    active_direction: Option<Direction>,
    cooldown_until: Option<Duration>,
    delivered: bool,
    active: bool,
    failure: Option<String>,
}

impl<E: ImageEncoder> GuidedCapture<E> {
    /// Create a session in the gate phase
    #[must_use]
    pub fn new(config: Config, encoder: E) -> Self {
        let classifier = DirectionClassifier::new(config.direction);
        let phase = Phase::Gate(GateController::new(ms(config.timing.gate_hold_ms)));
        Self {
            config,
            encoder,
            classifier,
            phase,
            ledger: CaptureLedger::new(),
            active_direction: None,
            cooldown_until: None,
            delivered: false,
            active: true,
            failure: None,
        }
    }

    /// Advance the session by one sampler tick.
    ///
    /// `sample` is `None` when no face was found (or the extractor failed);
    /// `frame` is the frame the sample was computed from and is what gets
    /// encoded on capture.
    pub fn step(
        &mut self,
        now: Duration,
        sample: Option<PoseSample>,
        frame: &Frame,
    ) -> Vec<SessionEvent<E::Artifact>> {
        let mut events = Vec::new();
        if !self.active || self.failure.is_some() {
            return events;
        }

        let cooling = match self.cooldown_until {
            Some(until) if now < until => true,
            Some(_) => {
                self.cooldown_until = None;
                false
            }
            None => false,
        };

        let timing = self.config.timing;
        let mut fatal = None;
        let next = match &mut self.phase {
            Phase::Gate(gate) => match gate.observe(sample.as_ref(), now) {
                Some(GateEvent::Advance) => {
                    info!("Face stable, starting calibration");
                    Some(Phase::Calibrating {
                        calibrator: StraightCalibrator::new(
                            self.config.straight,
                            ms(timing.straight_hold_ms),
                            ms(timing.straight_giveup_ms),
                        ),
                        entered_at: now,
                    })
                }
                None => None,
            },

            Phase::Calibrating {
                calibrator,
                entered_at,
            } => {
                let calibrated = match sample {
                    Some(sample) => calibrator.observe(sample, frame.clone(), now),
                    None => {
                        calibrator.lose_signal();
                        None
                    }
                };

                match calibrated {
                    Some(cal) => {
                        match capture(&mut self.encoder, &mut self.ledger, Direction::Straight, &cal.frame) {
                            Ok(_) => {
                                info!(
                                    "Baseline set via {:?}: yaw={:.4} pitch={:.4}",
                                    cal.path, cal.baseline.yaw, cal.baseline.pitch
                                );
                                events.push(SessionEvent::Calibrated {
                                    baseline: cal.baseline,
                                    path: cal.path,
                                });
                                events.push(SessionEvent::Captured(Direction::Straight));
                                self.cooldown_until = Some(now + ms(timing.capture_cooldown_ms));
                                Some(Phase::Directing {
                                    baseline: cal.baseline,
                                    holds: HoldToCapture::new(ms(timing.direction_hold_ms)),
                                })
                            }
                            Err(e) => {
                                warn!("Straight capture failed, retrying next tick: {e}");
                                None
                            }
                        }
                    }
                    None => {
                        let timeout = timing.calibration_timeout_ms;
                        if calibration_expired(calibrator, *entered_at, now, timeout) {
                            fatal = Some(Error::CalibrationTimeout(timing.calibration_timeout_ms));
                        }
                        None
                    }
                }
            }

            Phase::Directing { .. } if cooling => None,
            Phase::Directing { baseline, holds } => {
                let baseline = *baseline;
                let direction = sample.and_then(|s| self.classifier.classify(&s, &baseline));
                if direction != self.active_direction {
                    debug!("Active direction: {direction:?}");
                }
                self.active_direction = direction;

                let ledger = &self.ledger;
                match holds.tick(direction, now, |label| ledger.contains(label)) {
                    Some(label) => {
                        match capture(&mut self.encoder, &mut self.ledger, label, frame) {
                            Ok(outcome) => {
                                holds.confirm(label);
                                events.push(SessionEvent::Captured(label));
                                self.cooldown_until = Some(now + ms(timing.capture_cooldown_ms));
                                if outcome == RecordOutcome::Completed {
                                    info!("All poses captured");
                                    events.push(SessionEvent::Completed);
                                    self.active_direction = None;
                                    Some(Phase::Done {
                                        baseline,
                                        completed_at: now,
                                    })
                                } else {
                                    None
                                }
                            }
                            Err(e) => {
                                warn!("Capture of {label} failed, hold kept for retry: {e}");
                                None
                            }
                        }
                    }
                    None => None,
                }
            }

            Phase::Done { completed_at, .. } => {
                events.extend(finish_if_due(
                    &self.ledger,
                    &mut self.delivered,
                    *completed_at,
                    now,
                    ms(timing.completion_delay_ms),
                ));
                None
            }
        };

        if let Some(err) = fatal {
            events.push(self.halt(&err));
        }

        if let Some(next) = next {
            let from = self.phase.kind();
            let to = next.kind();
            self.phase = next;
            events.push(SessionEvent::PhaseChanged { from, to });
        }

        events
    }

    /// Advance only the time-driven work, for ticks without a usable frame:
    /// the outer calibration timeout and the delayed finished set
    pub fn poll(&mut self, now: Duration) -> Vec<SessionEvent<E::Artifact>> {
        let mut events = Vec::new();
        if !self.is_active() {
            return events;
        }

        let timing = self.config.timing;
        let expired = match &self.phase {
            Phase::Calibrating {
                calibrator,
                entered_at,
            } => calibration_expired(calibrator, *entered_at, now, timing.calibration_timeout_ms),
            _ => false,
        };
        if expired {
            events.push(self.halt(&Error::CalibrationTimeout(timing.calibration_timeout_ms)));
        } else if let Phase::Done { completed_at, .. } = &self.phase {
            events.extend(finish_if_due(
                &self.ledger,
                &mut self.delivered,
                *completed_at,
                now,
                ms(timing.completion_delay_ms),
            ));
        }
        events
    }

    /// Halt the session after a fatal error; all progress stops until
    /// [`GuidedCapture::reset`]
    pub fn fail(&mut self, err: &Error) -> SessionEvent<E::Artifact> {
        self.halt(err)
    }

    fn halt(&mut self, err: &Error) -> SessionEvent<E::Artifact> {
        error!("Capture session halted: {err}");
        let reason = err.to_string();
        self.failure = Some(reason.clone());
        self.active_direction = None;
        SessionEvent::Failed(reason)
    }

    /// Stop the session; no event is emitted afterwards
    pub fn cancel(&mut self) {
        if self.active {
            info!("Capture session cancelled");
        }
        self.active = false;
    }

    /// Start a new session: timers, baseline, ledger and failure are cleared
    pub fn reset(&mut self) {
        info!("Capture session reset");
        self.phase = Phase::Gate(GateController::new(ms(self.config.timing.gate_hold_ms)));
        self.ledger.clear();
        self.active_direction = None;
        self.cooldown_until = None;
        self.delivered = false;
        self.active = true;
        self.failure = None;
    }

    /// Next instruction, derived from the phase and the ledger only
    #[must_use]
    pub fn next_instruction(&self) -> Option<Instruction> {
        match &self.phase {
            Phase::Gate(_) => Some(Instruction::CenterFace),
            Phase::Calibrating { .. } => Some(Instruction::HoldStraight),
            Phase::Directing { .. } => self.ledger.next_missing().map(Instruction::Turn),
            Phase::Done { .. } => None,
        }
    }

    /// Current phase tag
    #[must_use]
    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Calibrated baseline, once set
    #[must_use]
    pub fn baseline(&self) -> Option<PoseSample> {
        match &self.phase {
            Phase::Directing { baseline, .. } | Phase::Done { baseline, .. } => Some(*baseline),
            _ => None,
        }
    }

    /// Direction the last sample resolved to while directing
    #[must_use]
    pub fn active_direction(&self) -> Option<Direction> {
        self.active_direction
    }

    /// Captured artifacts
    #[must_use]
    pub fn ledger(&self) -> &CaptureLedger<E::Artifact> {
        &self.ledger
    }

    /// Reason the session halted, if it did
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Whether the session still accepts ticks
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active && self.failure.is_none()
    }

    /// Whether the finished set has been emitted
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    /// Whether the capture path is locked after a recent capture
    #[must_use]
    pub fn is_cooling_down(&self, now: Duration) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn capture<E: ImageEncoder>(
    encoder: &mut E,
    ledger: &mut CaptureLedger<E::Artifact>,
    label: Direction,
    frame: &Frame,
) -> Result<RecordOutcome> {
    let artifact = encoder.encode(frame)?;
    Ok(ledger.record(label, artifact))
}

/// No face was ever seen and the outer timeout ran out
fn calibration_expired<F: Clone>(
    calibrator: &StraightCalibrator<F>,
    entered_at: Duration,
    now: Duration,
    timeout_ms: u64,
) -> bool {
    calibrator.best_sample().is_none() && now.saturating_sub(entered_at) >= ms(timeout_ms)
}

fn finish_if_due<A: Clone>(
    ledger: &CaptureLedger<A>,
    delivered: &mut bool,
    completed_at: Duration,
    now: Duration,
    delay: Duration,
) -> Option<SessionEvent<A>> {
    if *delivered || now.saturating_sub(completed_at) < delay {
        return None;
    }
    let set = ledger.to_capture_set()?;
    *delivered = true;
    info!("Delivering {} captures", set.len());
    Some(SessionEvent::Finished(set))
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}
