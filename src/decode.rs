//! FFmpeg-backed forward-only video source.
//!
//! [`FfmpegSource`] opens a container, reads the best video stream's
//! metadata and then hands out decoded RGB frames one at a time, in
//! decode order, without ever seeking. Dropping the source closes the
//! demuxer and frees the decoder.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input, stream::Stream},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::error::EAGAIN,
};
use image::{DynamicImage, RgbImage};

use crate::{
    backend::VideoSource,
    error::SampleError,
    metadata::{FrameRate, VideoMetadata},
};

/// Consecutive non-EOF demuxer errors tolerated before giving up.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// `AV_TIME_BASE`: container durations are in microseconds.
const AV_TIME_BASE: i32 = 1_000_000;

/// A sequentially readable video backed by an FFmpeg demuxer and decoder.
pub struct FfmpegSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    metadata: VideoMetadata,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    frames_read: u64,
    eof_sent: bool,
    finished: bool,
    path: PathBuf,
}

impl Debug for FfmpegSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegSource")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("frames_read", &self.frames_read)
            .finish_non_exhaustive()
    }
}

impl FfmpegSource {
    /// Open `path` and prepare a decoder for its best video stream.
    ///
    /// # Errors
    ///
    /// - [`SampleError::VideoOpen`] if FFmpeg cannot open or probe the file.
    /// - [`SampleError::NoVideoStream`] if it has no video stream.
    /// - [`SampleError::InvalidVideo`] if it reports zero frames or an
    ///   empty frame size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SampleError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |reason: String| SampleError::VideoOpen {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening video source: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let (video_stream_index, decoder, metadata) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or_else(|| SampleError::NoVideoStream { path: path.clone() })?;

            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| open_error(format!("cannot read codec parameters: {error}")))?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| open_error(format!("cannot create video decoder: {error}")))?;

            let frame_rate = stream_frame_rate(&stream);
            let frame_count = stream_frame_count(&stream, input_context.duration(), frame_rate);
            let codec = decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            let metadata = VideoMetadata {
                width: decoder.width(),
                height: decoder.height(),
                frame_rate,
                frame_count,
                codec,
            };
            (stream.index(), decoder, metadata)
        };

        if metadata.frame_count == 0 {
            return Err(SampleError::InvalidVideo {
                path,
                reason: "video reports no frames".to_string(),
            });
        }
        if metadata.width == 0 || metadata.height == 0 {
            return Err(SampleError::InvalidVideo {
                path,
                reason: format!("frame size is {}x{}", metadata.width, metadata.height),
            });
        }

        log::info!(
            "Opened video source: {} ({}x{}, {} fps, codec={}, {} frames)",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frame_rate,
            metadata.codec,
            metadata.frame_count,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            metadata,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            frames_read: 0,
            eof_sent: false,
            finished: false,
            path,
        })
    }

    /// Scale the current decoded frame to packed RGB at its native size.
    fn convert_current_frame(&mut self) -> Result<DynamicImage, SampleError> {
        let format = self.decoded_frame.format();
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            let input = scaler.input();
            input.format != format || input.width != width || input.height != height
        });
        if stale {
            let scaler = ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?;
            self.scaler = Some(scaler);
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        }

        let buffer = crate::utilities::frame_to_buffer(&self.rgb_frame, width, height, 3);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            SampleError::VideoDecode(
                "decoded frame data does not match its dimensions".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

impl VideoSource for FfmpegSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn read_frame(&mut self) -> Result<Option<DynamicImage>, SampleError> {
        if self.finished {
            return Ok(None);
        }

        let mut read_errors = 0;
        loop {
            // Drain frames the decoder has already produced.
            let received = classify_receive(self.decoder.receive_frame(&mut self.decoded_frame))
                .map_err(|error| {
                    SampleError::VideoDecode(format!(
                        "frame {} of {}: {error}",
                        self.frames_read,
                        self.path.display()
                    ))
                })?;
            match received {
                Received::Frame => {
                    let image = self.convert_current_frame()?;
                    self.frames_read += 1;
                    return Ok(Some(image));
                }
                Received::Drained => return Ok(self.finish()),
                Received::NeedsInput if self.eof_sent => return Ok(self.finish()),
                Received::NeedsInput => {}
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    read_errors = 0;
                    if packet.stream() == self.video_stream_index {
                        self.decoder.send_packet(&packet).map_err(|error| {
                            SampleError::VideoDecode(format!(
                                "frame {} of {}: {error}",
                                self.frames_read,
                                self.path.display()
                            ))
                        })?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    read_errors += 1;
                    if read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        return Err(SampleError::VideoDecode(format!(
                            "cannot read packets from {}: {error}",
                            self.path.display()
                        )));
                    }
                    log::debug!("Skipping unreadable packet: {error}");
                }
            }
        }
    }
}

impl FfmpegSource {
    fn finish(&mut self) -> Option<DynamicImage> {
        self.finished = true;
        log::debug!(
            "Reached end of {} after {} frames",
            self.path.display(),
            self.frames_read,
        );
        None
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        log::debug!(
            "Released video source {} ({} frames read)",
            self.path.display(),
            self.frames_read,
        );
    }
}

/// Outcome of one `receive_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Received {
    Frame,
    NeedsInput,
    Drained,
}

/// Map a `receive_frame` result onto the decode loop's states.
///
/// `EAGAIN` asks for another packet and `Eof` means the decoder is fully
/// flushed. Anything else is a real decode failure.
fn classify_receive(result: Result<(), FfmpegError>) -> Result<Received, FfmpegError> {
    match result {
        Ok(()) => Ok(Received::Frame),
        Err(FfmpegError::Other { errno }) if errno == EAGAIN => Ok(Received::NeedsInput),
        Err(FfmpegError::Eof) => Ok(Received::Drained),
        Err(error) => Err(error),
    }
}

fn stream_frame_rate(stream: &Stream) -> FrameRate {
    select_frame_rate(stream.avg_frame_rate(), stream.rate())
}

/// Average frame rate, falling back to the real base rate and then to
/// [`FrameRate::FALLBACK`].
fn select_frame_rate(average: Rational, base: Rational) -> FrameRate {
    let average = FrameRate::new(average.numerator(), average.denominator());
    if average.is_valid() {
        return average;
    }

    let base = FrameRate::new(base.numerator(), base.denominator());
    if base.is_valid() {
        return base;
    }

    log::warn!("Stream reports no frame rate, assuming {}", FrameRate::FALLBACK);
    FrameRate::FALLBACK
}

fn stream_frame_count(stream: &Stream, container_duration: i64, frame_rate: FrameRate) -> u64 {
    estimate_frame_count(
        stream.frames(),
        duration_seconds(stream.duration(), stream.time_base()),
        duration_seconds(container_duration, Rational::new(1, AV_TIME_BASE)),
        frame_rate,
    )
}

/// `duration` ticks of `time_base` in seconds, if both are usable.
///
/// Unset durations arrive as `AV_NOPTS_VALUE` (negative) and are ignored.
fn duration_seconds(duration: i64, time_base: Rational) -> Option<f64> {
    if duration <= 0 || time_base.numerator() <= 0 || time_base.denominator() <= 0 {
        return None;
    }
    Some(duration as f64 * time_base.numerator() as f64 / time_base.denominator() as f64)
}

/// Frame count recorded by the container, or an estimate from duration.
///
/// The video stream's own duration is preferred. The container duration
/// covers the longest stream in the file, audio included, so an estimate
/// taken from it can exceed the real frame count; the sampler then hits
/// the end of the stream before its last targets and writes fewer frames.
fn estimate_frame_count(
    recorded: i64,
    stream_seconds: Option<f64>,
    container_seconds: Option<f64>,
    frame_rate: FrameRate,
) -> u64 {
    if recorded > 0 {
        return recorded as u64;
    }

    let seconds = match (stream_seconds, container_seconds) {
        (Some(seconds), _) => seconds,
        (None, Some(seconds)) => {
            log::warn!(
                "No frame count or stream duration recorded; estimating from container duration ({seconds:.3}s)"
            );
            seconds
        }
        (None, None) => return 0,
    };

    (seconds * frame_rate.as_f64()).round() as u64
}
