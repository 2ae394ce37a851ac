//! Video encoder: write a sequence of frames into a video file.
//!
//! [`VideoEncoder`] turns `DynamicImage` frames into a video container using
//! FFmpeg. The container is inferred from the output extension; the codec
//! defaults to MPEG-4 Part 2, which every common player accepts inside MP4.
//!
//! # Example
//!
//! ```no_run
//! use clipsampler::{FrameRate, SampleError, VideoEncoder, VideoEncoderOptions};
//! use image::{DynamicImage, RgbImage};
//!
//! let frames = vec![DynamicImage::ImageRgb8(RgbImage::new(64, 48)); 14];
//! VideoEncoder::new(VideoEncoderOptions::default().frame_rate(FrameRate::from_integer(30)))
//!     .write("clip.mp4", &frames)?;
//! # Ok::<(), SampleError>(())
//! ```

use std::path::Path;

use ffmpeg_next::codec::Flags as CodecFlags;
use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Packet, Rational};
use image::DynamicImage;
use image::imageops::FilterType;

use crate::error::SampleError;
use crate::metadata::FrameRate;

/// Largest time base term MPEG-4 Part 2 accepts.
const MAX_TIME_BASE_TERM: i32 = 65535;

/// Supported output video codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoCodec {
    /// MPEG-4 Part 2. This is the default.
    #[default]
    Mpeg4,
    /// H.264 / AVC.
    H264,
    /// H.265 / HEVC.
    H265,
}

impl VideoCodec {
    /// Short lowercase name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            VideoCodec::Mpeg4 => "mpeg4",
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
        }
    }

    fn to_codec_id(self) -> Id {
        match self {
            VideoCodec::Mpeg4 => Id::MPEG4,
            VideoCodec::H264 => Id::H264,
            VideoCodec::H265 => Id::HEVC,
        }
    }
}

/// Options for [`VideoEncoder`].
#[derive(Debug, Clone)]
pub struct VideoEncoderOptions {
    /// Output frame rate.
    pub frame_rate: FrameRate,
    /// Output width. If `None`, taken from the first frame.
    pub width: Option<u32>,
    /// Output height. If `None`, taken from the first frame.
    pub height: Option<u32>,
    /// Codec to use.
    pub codec: VideoCodec,
    /// Bitrate in bits per second. `None` keeps the encoder default.
    pub bitrate: Option<usize>,
}

impl Default for VideoEncoderOptions {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::FALLBACK,
            width: None,
            height: None,
            codec: VideoCodec::default(),
            bitrate: None,
        }
    }
}

impl VideoEncoderOptions {
    /// Set the frame rate.
    pub fn frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Set the output resolution.
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the codec.
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the target bitrate in bits per second.
    pub fn bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }
}

/// Encodes a sequence of frames into a video file.
pub struct VideoEncoder {
    options: VideoEncoderOptions,
}

impl VideoEncoder {
    /// Create an encoder with the given options.
    pub fn new(options: VideoEncoderOptions) -> Self {
        Self { options }
    }

    /// Write `frames` to `path`, one frame per time-base tick.
    ///
    /// Frames whose size differs from the output resolution are resized.
    ///
    /// # Errors
    ///
    /// - [`SampleError::EmptySequence`] if `frames` is empty.
    /// - [`SampleError::VideoEncode`] if the codec is unavailable or rejects
    ///   the configuration.
    /// - [`SampleError::VideoWrite`] on muxing or I/O failure.
    pub fn write<'a, P, I>(&self, path: P, frames: I) -> Result<(), SampleError>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = &'a DynamicImage>,
    {
        let path = path.as_ref();
        let write_error = |reason: String| SampleError::VideoWrite {
            path: path.to_path_buf(),
            reason,
        };

        let mut frames = frames.into_iter().peekable();
        let first = frames.peek().ok_or_else(|| SampleError::EmptySequence {
            path: path.to_path_buf(),
        })?;

        let width = self.options.width.unwrap_or(first.width());
        let height = self.options.height.unwrap_or(first.height());
        let requested_rate = self.options.frame_rate;
        if !requested_rate.is_valid() {
            return Err(SampleError::VideoEncode(format!(
                "invalid frame rate {requested_rate}"
            )));
        }
        let frame_rate = requested_rate.limited(MAX_TIME_BASE_TERM);
        if frame_rate != requested_rate {
            log::debug!("Approximating frame rate {requested_rate} as {frame_rate}");
        }
        let encoder_time_base = Rational::new(frame_rate.denominator, frame_rate.numerator);
        let codec_id = self.options.codec.to_codec_id();
        let target_pixel = Pixel::YUV420P;

        log::info!(
            "Encoding {} ({}x{}, {} fps, codec={})",
            path.display(),
            width,
            height,
            frame_rate,
            self.options.codec.name(),
        );

        ffmpeg_next::init().map_err(|error| {
            SampleError::VideoEncode(format!("FFmpeg initialisation failed: {error}"))
        })?;

        let mut output = ffmpeg_next::format::output(&path)
            .map_err(|error| write_error(format!("cannot open output: {error}")))?;

        // Read before add_stream borrows the context mutably.
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let encoder_codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            SampleError::VideoEncode(format!("codec {codec_id:?} not available"))
        })?;

        let mut stream = output
            .add_stream(encoder_codec)
            .map_err(|error| write_error(format!("cannot add stream: {error}")))?;
        let stream_index = stream.index();

        let mut encoder = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| {
                SampleError::VideoEncode(format!("cannot create codec context: {error}"))
            })?
            .encoder()
            .video()
            .map_err(|error| {
                SampleError::VideoEncode(format!("cannot create video encoder: {error}"))
            })?;

        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(target_pixel);
        encoder.set_time_base(encoder_time_base);
        encoder.set_frame_rate(Some(Rational::new(
            frame_rate.numerator,
            frame_rate.denominator,
        )));
        if let Some(bitrate) = self.options.bitrate {
            encoder.set_bit_rate(bitrate);
        }
        if needs_global_header {
            encoder.set_flags(CodecFlags::GLOBAL_HEADER);
        }

        let mut opened_encoder = encoder
            .open_as(encoder_codec)
            .map_err(|error| SampleError::VideoEncode(format!("cannot open encoder: {error}")))?;
        stream.set_parameters(&opened_encoder);

        output
            .write_header()
            .map_err(|error| write_error(format!("cannot write header: {error}")))?;

        // The muxer may replace the stream time base while writing the header.
        let stream_time_base = output
            .stream(stream_index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| write_error("output stream disappeared".to_string()))?;

        let mut scaler = ScalingContext::get(
            Pixel::RGB24,
            width,
            height,
            target_pixel,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| write_error(format!("cannot create scaler: {error}")))?;

        let mut packet = Packet::empty();
        let mut frame_index: i64 = 0;

        for image in frames {
            let rgb = if image.width() != width || image.height() != height {
                image.resize_exact(width, height, FilterType::Lanczos3).to_rgb8()
            } else {
                image.to_rgb8()
            };

            let mut source_frame = VideoFrame::new(Pixel::RGB24, width, height);
            crate::utilities::rgb_image_to_frame(&rgb, &mut source_frame);

            let mut encoded_frame = VideoFrame::empty();
            scaler
                .run(&source_frame, &mut encoded_frame)
                .map_err(|error| write_error(format!("scaling failed: {error}")))?;
            encoded_frame.set_pts(Some(frame_index));
            frame_index += 1;

            opened_encoder.send_frame(&encoded_frame).map_err(|error| {
                SampleError::VideoEncode(format!("send_frame failed: {error}"))
            })?;

            while opened_encoder.receive_packet(&mut packet).is_ok() {
                packet.set_stream(stream_index);
                packet.rescale_ts(encoder_time_base, stream_time_base);
                packet
                    .write_interleaved(&mut output)
                    .map_err(|error| write_error(format!("write packet failed: {error}")))?;
            }
        }

        opened_encoder
            .send_eof()
            .map_err(|error| SampleError::VideoEncode(format!("send_eof failed: {error}")))?;
        while opened_encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(stream_index);
            packet.rescale_ts(encoder_time_base, stream_time_base);
            packet
                .write_interleaved(&mut output)
                .map_err(|error| write_error(format!("write flush packet failed: {error}")))?;
        }

        output
            .write_trailer()
            .map_err(|error| write_error(format!("cannot write trailer: {error}")))?;

        log::debug!("Wrote {frame_index} frames to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{VideoCodec, VideoEncoderOptions};
    use crate::metadata::FrameRate;

    #[test]
    fn default_options_use_mpeg4() {
        let options = VideoEncoderOptions::default();
        assert_eq!(options.codec, VideoCodec::Mpeg4);
        assert_eq!(options.frame_rate, FrameRate::FALLBACK);
        assert!(options.width.is_none());
        assert!(options.bitrate.is_none());
    }

    #[test]
    fn builder_sets_every_field() {
        let options = VideoEncoderOptions::default()
            .frame_rate(FrameRate::new(30000, 1001))
            .resolution(1920, 1080)
            .codec(VideoCodec::H265)
            .bitrate(4_000_000);

        assert_eq!(options.frame_rate, FrameRate::new(30000, 1001));
        assert_eq!(options.width, Some(1920));
        assert_eq!(options.height, Some(1080));
        assert_eq!(options.codec, VideoCodec::H265);
        assert_eq!(options.bitrate, Some(4_000_000));
        assert_eq!(VideoCodec::H265.name(), "h265");
    }
}
