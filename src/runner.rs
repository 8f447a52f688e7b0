//! Sampler loop driving a capture session from live collaborators.
//!
//! One sampler tick reads a frame, runs the pose extractor with a strictly
//! increasing timestamp, advances the state machine and publishes a snapshot.
//! The periodic task drops late ticks instead of queueing them; every timer
//! in the state machine is wall-clock based, so missed samples only slow
//! progress down.

use crate::clock::{Clock, MonotonicStamper};
use crate::collaborators::{FrameSource, ImageEncoder, PoseExtractor, ResultConsumer};
use crate::config::Config;
use crate::presentation::SessionSnapshot;
use crate::session::{GuidedCapture, SessionEvent};
use crate::{Error, Result};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The finished set was handed to the result consumer
    Delivered,
    /// The run was cancelled before delivery
    Cancelled,
    /// The session halted with a user-visible error
    Failed(String),
}

/// Owns the collaborators and the session of one capture run
pub struct CaptureRunner<S, X, E, C>
where
    E: ImageEncoder,
{
    source: S,
    extractor: X,
    session: GuidedCapture<E>,
    clock: C,
    stamper: MonotonicStamper,
    interval: Duration,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<S, X, E, C> CaptureRunner<S, X, E, C>
where
    S: FrameSource,
    X: PoseExtractor,
    E: ImageEncoder,
    C: Clock,
{
    /// Create a runner after validating `config`
    pub fn new(config: Config, source: S, extractor: X, encoder: E, clock: C) -> Result<Self> {
        config.validate()?;
        let interval = config.timing.sample_interval();
        let session = GuidedCapture::new(config, encoder);
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::of(&session));

        Ok(Self {
            source,
            extractor,
            session,
            clock,
            stamper: MonotonicStamper::new(),
            interval,
            snapshot_tx,
        })
    }

    /// Receiver of the latest committed snapshot, for the redraw path
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// The session being driven
    #[must_use]
    pub fn session(&self) -> &GuidedCapture<E> {
        &self.session
    }

    /// Start a new session with the same collaborators
    pub fn reset(&mut self) {
        self.session.reset();
        self.publish();
    }

    /// Perform one sampler tick
    pub fn tick(&mut self) -> Vec<SessionEvent<E::Artifact>> {
        if !self.session.is_active() {
            return Vec::new();
        }

        let now = self.clock.now();
        let frame = match self.source.current_frame() {
            Ok(Some(frame)) if frame.has_pixels() => frame,
            Ok(_) => {
                debug!("No usable frame this tick");
                return self.poll(now);
            }
            Err(e) if e.is_fatal() => {
                let event = self.session.fail(&e);
                self.publish();
                return vec![event];
            }
            Err(e) => {
                warn!("Frame source hiccup, skipping tick: {e}");
                return self.poll(now);
            }
        };

        let timestamp = self.stamper.stamp(now);
        let sample = match self.extractor.infer(&frame, timestamp) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Pose extraction failed, treating tick as no face: {e}");
                None
            }
        };

        let events = self.session.step(now, sample, &frame);
        self.publish();
        events
    }

    /// Timers keep running on ticks without a frame
    fn poll(&mut self, now: Duration) -> Vec<SessionEvent<E::Artifact>> {
        let events = self.session.poll(now);
        if !events.is_empty() {
            self.publish();
        }
        events
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(SessionSnapshot::of(&self.session));
    }

    /// Drive ticks at the configured interval until the set is delivered,
    /// the session halts, or `cancel` fires. Collaborators are closed on exit.
    pub async fn run<R>(mut self, mut consumer: R, cancel: CancellationToken) -> RunOutcome
    where
        R: ResultConsumer<E::Artifact>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Capture sampler started ({} ms interval)", self.interval.as_millis());

        let outcome = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Capture sampler shutting down");
                    break RunOutcome::Cancelled;
                }
                _ = ticker.tick() => {
                    let mut finished = None;
                    let mut failed = None;
                    for event in self.tick() {
                        match event {
                            SessionEvent::Finished(set) => finished = Some(set),
                            SessionEvent::Failed(reason) => failed = Some(reason),
                            _ => {}
                        }
                    }
                    if let Some(reason) = failed {
                        break RunOutcome::Failed(reason);
                    }
                    if let Some(set) = finished {
                        // The session may have been cancelled while this tick ran
                        if cancel.is_cancelled() {
                            break RunOutcome::Cancelled;
                        }
                        consumer.deliver(set);
                        break RunOutcome::Delivered;
                    }
                }
            }
        };

        self.shutdown(outcome)
    }

    fn shutdown(&mut self, outcome: RunOutcome) -> RunOutcome {
        self.session.cancel();
        self.source.close();
        self.extractor.close();
        self.publish();
        outcome
    }
}

impl<S, X, E, C> CaptureRunner<S, X, E, C>
where
    S: FrameSource + 'static,
    X: PoseExtractor + 'static,
    E: ImageEncoder + 'static,
    C: Clock + 'static,
{
    /// Run on the tokio runtime in the background
    pub fn spawn<R>(self, consumer: R) -> CaptureHandle
    where
        R: ResultConsumer<E::Artifact> + 'static,
    {
        let cancel = CancellationToken::new();
        let snapshots = self.subscribe();
        let handle = tokio::spawn(self.run(consumer, cancel.clone()));
        CaptureHandle {
            cancel,
            snapshots,
            handle,
        }
    }
}

/// Handle to a background capture run
pub struct CaptureHandle {
    cancel: CancellationToken,
    snapshots: watch::Receiver<SessionSnapshot>,
    handle: JoinHandle<RunOutcome>,
}

impl CaptureHandle {
    /// Receiver of the latest snapshot
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Token that cancels this run, for signal handlers
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation without waiting
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the run to end
    pub async fn join(self) -> Result<RunOutcome> {
        self.handle
            .await
            .map_err(|e| Error::Runtime(format!("capture task failed to join: {e}")))
    }

    /// Cancel and wait for the run to end
    pub async fn stop(self) -> Result<RunOutcome> {
        self.cancel();
        self.join().await
    }
}
