//! Progress reporting.
//!
//! A sampling run goes through three stages: the decode pass, the video
//! write and the image writes. A [`ProgressCallback`] attached through
//! [`SampleOptions::with_progress`](crate::SampleOptions::with_progress)
//! receives a [`ProgressInfo`] snapshot after each unit of work.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use clipsampler::{FrameSampler, ProgressCallback, ProgressInfo, SampleError, SampleOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.stage);
//!         }
//!     }
//! }
//!
//! let options = SampleOptions::new().with_progress(Arc::new(PrintProgress));
//! FrameSampler::with_options(options).sample("input.mp4", "out")?;
//! # Ok::<(), SampleError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The stage a sampling run is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SampleStage {
    /// Decoding the source up to the last selected frame.
    Decoding,
    /// Encoding the selected frames into the output video.
    WritingVideo,
    /// Writing one image per selected frame.
    WritingImages,
}

/// A snapshot of sampling progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Current stage.
    pub stage: SampleStage,
    /// Items (frames) processed so far in this stage.
    pub current: u64,
    /// Items expected in this stage, if known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 to 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since the stage started.
    pub elapsed: Duration,
}

/// Receives progress updates during sampling.
///
/// Callbacks are infallible; they observe the run and cannot stop it.
pub trait ProgressCallback: Send + Sync {
    /// Called after each processed item.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications. Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing for one stage and forwards snapshots to the callback.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    stage: SampleStage,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        stage: SampleStage,
        total: Option<u64>,
    ) -> Self {
        Self {
            callback,
            stage,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed item and notify the callback.
    pub(crate) fn advance(&mut self) {
        self.current += 1;
        self.report();
    }

    fn report(&self) {
        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        let info = ProgressInfo {
            stage: self.stage,
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{ProgressCallback, ProgressInfo, ProgressTracker, SampleStage};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(u64, Option<f32>)>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push((info.current, info.percentage));
        }
    }

    #[test]
    fn tracker_reports_each_step() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), SampleStage::Decoding, Some(4));
        tracker.advance();
        tracker.advance();

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (1, Some(25.0)));
        assert_eq!(seen[1], (2, Some(50.0)));
    }

    #[test]
    fn unknown_total_has_no_percentage() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), SampleStage::WritingImages, None);
        tracker.advance();
        assert_eq!(recorder.0.lock().unwrap()[0], (1, None));
    }
}
