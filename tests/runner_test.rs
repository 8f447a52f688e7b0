//! Sampler loop tests: timestamps, periodic run, cancellation and shutdown

mod test_helpers;

use guided_pose_capture::{
    clock::{Clock, ManualClock},
    collaborators::FrameSource,
    config::Config,
    encoder::{EncodedImage, JpegEncoder},
    frame::Frame,
    ledger::CaptureSet,
    pose::Direction,
    runner::{CaptureRunner, RunOutcome},
    session::{PhaseKind, SessionEvent},
    simulation::{PoseScript, ScriptedExtractor, SimulatedCamera},
    Error, Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_helpers::{ms, CountingEncoder, NEUTRAL, TICK_MS};

/// Clock following tokio's (pausable) time
struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Camera that can stop producing frames or report a transient glitch
struct FlakyCamera {
    inner: SimulatedCamera,
    frozen: Arc<AtomicBool>,
    glitching: Arc<AtomicBool>,
}

impl FlakyCamera {
    fn new() -> Self {
        Self {
            inner: SimulatedCamera::new(8, 8),
            frozen: Arc::default(),
            glitching: Arc::default(),
        }
    }
}

impl FrameSource for FlakyCamera {
    fn current_frame(&mut self) -> Result<Option<Frame>> {
        if self.glitching.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("usb reset")));
        }
        if self.frozen.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.current_frame()
    }
}

fn finished_count(events: &[SessionEvent<usize>]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Finished(_)))
        .count()
}

type Delivered = Arc<Mutex<Vec<CaptureSet<EncodedImage>>>>;

fn collector() -> (Delivered, impl FnMut(CaptureSet<EncodedImage>) + Send + 'static) {
    let delivered: Delivered = Arc::default();
    let sink = Arc::clone(&delivered);
    let consumer = move |set: CaptureSet<EncodedImage>| {
        sink.lock().unwrap().push(set);
    };
    (delivered, consumer)
}

#[test]
fn test_timestamps_strictly_increase() {
    let clock = ManualClock::new();
    let extractor = ScriptedExtractor::new(PoseScript::new().hold(60_000, NEUTRAL));
    let log = extractor.timestamp_log();
    let mut runner = CaptureRunner::new(
        Config::default(),
        SimulatedCamera::new(4, 4),
        extractor,
        CountingEncoder::new(),
        clock.clone(),
    )
    .unwrap();

    // Stalled clock
    runner.tick();
    runner.tick();
    runner.tick();
    clock.set(100);
    runner.tick();
    // Clock jumps backwards
    clock.set(50);
    runner.tick();
    clock.set(300);
    runner.tick();

    let stamps = log.lock().unwrap().clone();
    assert_eq!(stamps, vec![ms(0), ms(1), ms(2), ms(100), ms(101), ms(300)]);
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_finished_set_delivered_after_frames_stop() {
    let clock = ManualClock::new();
    let camera = FlakyCamera::new();
    let frozen = Arc::clone(&camera.frozen);
    let extractor = ScriptedExtractor::new(PoseScript::guided());
    let log = extractor.timestamp_log();
    let mut runner = CaptureRunner::new(
        Config::default(),
        camera,
        extractor,
        CountingEncoder::new(),
        clock.clone(),
    )
    .unwrap();

    for _ in 0..200 {
        runner.tick();
        clock.advance(TICK_MS);
        if runner.session().phase_kind() == PhaseKind::Done {
            break;
        }
    }
    assert_eq!(runner.session().phase_kind(), PhaseKind::Done);

    // Paused feed: only the display delay remains
    frozen.store(true, Ordering::SeqCst);
    let inferred = log.lock().unwrap().len();
    let mut finished = 0;
    for _ in 0..200 {
        finished += finished_count(&runner.tick());
        clock.advance(TICK_MS);
    }
    assert_eq!(finished, 1);
    assert!(runner.session().is_delivered());
    assert_eq!(log.lock().unwrap().len(), inferred);
}

#[test]
fn test_transient_source_error_skips_tick() {
    let clock = ManualClock::new();
    let camera = FlakyCamera::new();
    let glitching = Arc::clone(&camera.glitching);
    let mut runner = CaptureRunner::new(
        Config::default(),
        camera,
        ScriptedExtractor::new(PoseScript::new().hold(60_000, NEUTRAL)),
        CountingEncoder::new(),
        clock.clone(),
    )
    .unwrap();

    glitching.store(true, Ordering::SeqCst);
    for _ in 0..5 {
        assert!(runner.tick().is_empty());
        clock.advance(TICK_MS);
    }
    assert!(runner.session().is_active());
    assert!(runner.session().failure().is_none());

    // Presence starts at 550; the gate opens on the tick at 2640
    glitching.store(false, Ordering::SeqCst);
    for _ in 0..20 {
        runner.tick();
        clock.advance(TICK_MS);
    }
    assert_eq!(runner.session().phase_kind(), PhaseKind::Calibrating);
}

#[tokio::test(start_paused = true)]
async fn test_run_delivers_scripted_session() {
    let camera = SimulatedCamera::new(32, 24);
    let extractor = ScriptedExtractor::new(PoseScript::guided());
    let camera_closed = camera.close_flag();
    let extractor_closed = extractor.close_flag();

    let runner = CaptureRunner::new(
        Config::default(),
        camera,
        extractor,
        JpegEncoder::default(),
        TokioClock::new(),
    )
    .unwrap();

    let (delivered, consumer) = collector();
    let outcome = runner.run(consumer, Default::default()).await;
    assert_eq!(outcome, RunOutcome::Delivered);

    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    let set = &delivered[0];
    assert_eq!(set.len(), 5);
    for (_, image) in set.iter() {
        assert_eq!(image.mime, "image/jpeg");
        assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!((image.width, image.height), (32, 24));
    }
    // Frames differ per tick, so the straight and right captures differ
    assert_ne!(set.get(Direction::Straight), set.get(Direction::Right));

    assert!(camera_closed.load(Ordering::SeqCst));
    assert!(extractor_closed.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_spawned_run_publishes_snapshots() {
    let runner = CaptureRunner::new(
        Config::default(),
        SimulatedCamera::new(16, 16),
        ScriptedExtractor::new(PoseScript::guided()),
        JpegEncoder::default(),
        TokioClock::new(),
    )
    .unwrap();

    let (delivered, consumer) = collector();
    let handle = runner.spawn(consumer);
    let snapshots = handle.snapshots();
    assert_eq!(snapshots.borrow().phase, PhaseKind::Gate);

    tokio::time::sleep(Duration::from_millis(3000)).await;
    {
        let snap = snapshots.borrow();
        assert_eq!(snap.phase, PhaseKind::Directing);
        assert!(snap.is_captured(Direction::Straight));
    }

    assert_eq!(handle.join().await.unwrap(), RunOutcome::Delivered);
    assert_eq!(delivered.lock().unwrap().len(), 1);
    assert_eq!(snapshots.borrow().phase, PhaseKind::Done);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_before_delivery() {
    let camera = SimulatedCamera::new(16, 16);
    let camera_closed = camera.close_flag();
    let runner = CaptureRunner::new(
        Config::default(),
        camera,
        ScriptedExtractor::new(PoseScript::guided()),
        JpegEncoder::default(),
        TokioClock::new(),
    )
    .unwrap();

    let (delivered, consumer) = collector();
    let handle = runner.spawn(consumer);
    tokio::time::sleep(Duration::from_millis(5000)).await;

    assert_eq!(handle.stop().await.unwrap(), RunOutcome::Cancelled);
    assert!(delivered.lock().unwrap().is_empty());
    assert!(camera_closed.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_completion_suppresses_delivery() {
    let runner = CaptureRunner::new(
        Config::default(),
        SimulatedCamera::new(16, 16),
        ScriptedExtractor::new(PoseScript::guided()),
        JpegEncoder::default(),
        TokioClock::new(),
    )
    .unwrap();

    let (delivered, consumer) = collector();
    let handle = runner.spawn(consumer);
    let mut snapshots = handle.snapshots();

    // Cancel during the display delay
    snapshots
        .wait_for(|snap| snap.phase == PhaseKind::Done)
        .await
        .unwrap();
    handle.cancel();

    assert_eq!(handle.join().await.unwrap(), RunOutcome::Cancelled);
    assert!(delivered.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_source_failure_ends_run() {
    let runner = CaptureRunner::new(
        Config::default(),
        SimulatedCamera::new(16, 16).fail_after(5),
        ScriptedExtractor::new(PoseScript::guided()),
        JpegEncoder::default(),
        TokioClock::new(),
    )
    .unwrap();

    let (delivered, consumer) = collector();
    let handle = runner.spawn(consumer);
    let snapshots = handle.snapshots();

    match handle.join().await.unwrap() {
        RunOutcome::Failed(reason) => assert!(reason.contains("camera disconnected")),
        other => panic!("Expected Failed, got {other:?}"),
    }
    assert!(delivered.lock().unwrap().is_empty());
    assert!(snapshots.borrow().error.is_some());
}
