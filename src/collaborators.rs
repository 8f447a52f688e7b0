//! Contracts of the components that surround the capture state machine.

use crate::frame::Frame;
use crate::ledger::CaptureSet;
use crate::pose::PoseSample;
use crate::Result;
use std::time::Duration;

/// Live video feed
pub trait FrameSource: Send {
    /// Current frame.
    ///
    /// `Ok(None)` means no usable pixel data this tick and the tick is
    /// skipped. An `Err` that [`Error::is_fatal`](crate::Error::is_fatal)
    /// reports means the feed itself failed, which ends the session; any
    /// other error skips the tick.
    fn current_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying device
    fn close(&mut self) {}
}

/// Face-landmark model reduced to two orientation scalars
pub trait PoseExtractor: Send {
    /// Run inference on `frame`. `Ok(None)` means no face.
    ///
    /// Callers guarantee `timestamp` strictly increases between calls.
    fn infer(&mut self, frame: &Frame, timestamp: Duration) -> Result<Option<PoseSample>>;

    /// Release the model
    fn close(&mut self) {}
}

/// Turns a frame into a storable artifact
pub trait ImageEncoder: Send {
    /// Opaque artifact handle
    type Artifact: Clone + Send + 'static;

    /// Encode `frame`; called once per successful capture
    fn encode(&mut self, frame: &Frame) -> Result<Self::Artifact>;
}

/// Receives the finished set once per session
pub trait ResultConsumer<A>: Send {
    /// Called with the five artifacts in canonical order
    fn deliver(&mut self, set: CaptureSet<A>);
}

impl<A, F> ResultConsumer<A> for F
where
    F: FnMut(CaptureSet<A>) + Send,
{
    fn deliver(&mut self, set: CaptureSet<A>) {
        self(set);
    }
}
