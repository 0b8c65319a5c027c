//! Frame hand-off between acquisition and processing.
//!
//! Acquisition runs on its own thread and keeps overwriting a single-slot
//! buffer; the processing loop always reads the most recent frame and never
//! waits for a specific one, so frames may be dropped under load (freshness
//! over completeness). Cancellation is cooperative: the stop flag
//! is checked once per iteration and in-flight processing always completes.

use crate::pipeline::{annotate, Annotator, CardDetector};
use crate::image::RgbFrame;
use crate::trace::trace_event;
use crate::util::CardMatchResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Source of camera frames.
///
/// `read` is non-blocking and returns the most recent buffered frame;
/// returning `None` means the source is drained (or was never started) and
/// ends the processing loop.
pub trait FrameSource {
    /// Starts frame acquisition.
    fn start(&mut self) -> CardMatchResult<()>;
    /// Returns the latest available frame without blocking.
    fn read(&mut self) -> Option<Arc<RgbFrame>>;
    /// Stops frame acquisition.
    fn stop(&mut self);
}

/// Single-slot latest-frame buffer with overwrite semantics.
///
/// One producer publishes, one consumer reads; a publish replaces whatever
/// frame was in the slot, read or not.
#[derive(Default)]
pub struct FrameSlot {
    inner: Mutex<Option<Arc<RgbFrame>>>,
}

impl FrameSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a frame, overwriting any unread one.
    pub fn publish(&self, frame: RgbFrame) {
        let mut slot = self.inner.lock().expect("frame slot lock");
        *slot = Some(Arc::new(frame));
    }

    /// Returns the most recent published frame, if any.
    pub fn latest(&self) -> Option<Arc<RgbFrame>> {
        self.inner.lock().expect("frame slot lock").clone()
    }
}

/// Cooperative stop signal shared between the control surface and the loop.
#[derive(Clone, Default)]
pub struct StopFlag {
    flag: Arc<AtomicBool>,
}

impl StopFlag {
    /// Creates a flag in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to stop after the current iteration.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Drives the detection loop until the source drains or a stop is requested.
///
/// Returns the number of frames processed. Each iteration reads the latest
/// frame, processes it, and hands the annotated frame to the rendering sink.
pub fn run_loop<S: FrameSource, A: Annotator>(
    source: &mut S,
    detector: &CardDetector,
    annotator: &mut A,
    stop: &StopFlag,
) -> CardMatchResult<u64> {
    source.start()?;
    let mut frames = 0u64;
    while !stop.is_stopped() {
        let Some(frame) = source.read() else {
            break;
        };
        let report = detector.process_frame(&frame)?;
        let mut annotated = (*frame).clone();
        annotate(&mut annotated, &report, annotator);
        frames += 1;
    }
    source.stop();
    trace_event!("loop_finished", frames = frames);
    Ok(frames)
}
