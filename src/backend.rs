//! Codec capability interface.
//!
//! The sampler only needs three capabilities from a media library: open a
//! forward-only [`VideoSource`], write a sequence of frames as a video, and
//! write a single frame as an image. [`MediaBackend`] groups them so the
//! selection and capture logic can run against an in-memory backend in
//! tests. [`FfmpegBackend`] is the production implementation.
//!
//! Releasing a source is dropping it.

use std::path::Path;

use image::DynamicImage;

use crate::{
    decode::FfmpegSource,
    encode::{VideoCodec, VideoEncoder, VideoEncoderOptions},
    error::SampleError,
    metadata::{FrameRate, VideoMetadata},
    options::FrameImageFormat,
};

/// A decoded frame kept by the sampler.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// Position in the output sequence, starting at 0.
    pub ordinal: usize,
    /// Index of the source frame it was decoded from.
    pub source_index: u64,
    /// Pixel data at the source's native size.
    pub image: DynamicImage,
}

/// Encoding parameters for [`MediaBackend::write_video`].
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSettings {
    /// Output frame rate.
    pub frame_rate: FrameRate,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Codec for the output stream.
    pub codec: VideoCodec,
    /// Target bitrate in bits per second, if any.
    pub bitrate: Option<usize>,
}

/// A sequentially readable, forward-only video.
pub trait VideoSource {
    /// Metadata read when the source was opened.
    fn metadata(&self) -> &VideoMetadata;

    /// Decode the next frame in stream order.
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, SampleError>;
}

/// The media operations a [`FrameSampler`](crate::FrameSampler) relies on.
pub trait MediaBackend {
    /// Source type produced by [`open`](MediaBackend::open).
    type Source: VideoSource;

    /// Open `path` for sequential decoding.
    fn open(&self, path: &Path) -> Result<Self::Source, SampleError>;

    /// Encode `frames`, in order, into a video at `path`.
    fn write_video(
        &self,
        path: &Path,
        frames: &[SampledFrame],
        settings: &VideoSettings,
    ) -> Result<(), SampleError>;

    /// Write one frame as a standalone image.
    fn write_image(
        &self,
        frame: &DynamicImage,
        path: &Path,
        format: FrameImageFormat,
    ) -> Result<(), SampleError> {
        frame
            .save_with_format(path, format.to_image_format())
            .map_err(|source| SampleError::ImageWrite {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// FFmpeg decoding and encoding with `image` for frame files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend;

impl MediaBackend for FfmpegBackend {
    type Source = FfmpegSource;

    fn open(&self, path: &Path) -> Result<Self::Source, SampleError> {
        FfmpegSource::open(path)
    }

    fn write_video(
        &self,
        path: &Path,
        frames: &[SampledFrame],
        settings: &VideoSettings,
    ) -> Result<(), SampleError> {
        let mut options = VideoEncoderOptions::default()
            .frame_rate(settings.frame_rate)
            .resolution(settings.width, settings.height)
            .codec(settings.codec);
        if let Some(bitrate) = settings.bitrate {
            options = options.bitrate(bitrate);
        }

        VideoEncoder::new(options).write(path, frames.iter().map(|frame| &frame.image))
    }
}
