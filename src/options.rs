//! Sampling configuration.
//!
//! [`SampleOptions`] is a builder that carries the target frame count,
//! output codec, image format and progress callback through a sampling run.
//!
//! # Example
//!
//! ```no_run
//! use clipsampler::{FrameImageFormat, SampleOptions, VideoCodec};
//!
//! let options = SampleOptions::new()
//!     .with_frame_count(16)
//!     .with_codec(VideoCodec::H264)
//!     .with_image_format(FrameImageFormat::Bmp);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use image::ImageFormat;

use crate::encode::VideoCodec;
use crate::progress::{NoOpProgress, ProgressCallback};
use crate::selection::DEFAULT_FRAME_COUNT;

/// Lossless image format for the per-frame files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameImageFormat {
    /// PNG. This is the default.
    #[default]
    Png,
    /// Uncompressed BMP.
    Bmp,
    /// TIFF.
    Tiff,
}

impl FrameImageFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            FrameImageFormat::Png => "png",
            FrameImageFormat::Bmp => "bmp",
            FrameImageFormat::Tiff => "tiff",
        }
    }

    pub(crate) fn to_image_format(self) -> ImageFormat {
        match self {
            FrameImageFormat::Png => ImageFormat::Png,
            FrameImageFormat::Bmp => ImageFormat::Bmp,
            FrameImageFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Configuration for [`FrameSampler`](crate::FrameSampler).
///
/// A default-constructed value samples 14 frames, re-encodes with MPEG-4
/// Part 2 and writes PNG frames.
#[derive(Clone)]
pub struct SampleOptions {
    pub(crate) frame_count: usize,
    pub(crate) codec: VideoCodec,
    pub(crate) bitrate: Option<usize>,
    pub(crate) image_format: FrameImageFormat,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for SampleOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SampleOptions")
            .field("frame_count", &self.frame_count)
            .field("codec", &self.codec)
            .field("bitrate", &self.bitrate)
            .field("image_format", &self.image_format)
            .finish_non_exhaustive()
    }
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            codec: VideoCodec::default(),
            bitrate: None,
            image_format: FrameImageFormat::default(),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set how many frames to keep.
    ///
    /// Zero is accepted here and rejected by the sampler with
    /// [`SampleError::InvalidFrameCount`](crate::SampleError::InvalidFrameCount).
    #[must_use]
    pub fn with_frame_count(mut self, count: usize) -> Self {
        self.frame_count = count;
        self
    }

    /// Set the codec for the re-encoded video.
    #[must_use]
    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set a target bitrate in bits per second for the re-encoded video.
    #[must_use]
    pub fn with_bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Set the image format for the per-frame files.
    #[must_use]
    pub fn with_image_format(mut self, format: FrameImageFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }
}
