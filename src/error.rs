//! Error types for the `clipsampler` crate.
//!
//! [`SampleError`] is the single error type returned by every fallible
//! operation. Variants carry the paths and counts involved so that callers
//! can report a failure without extra logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `clipsampler` operations.
///
/// Every error is terminal for the current invocation. Nothing is retried,
/// and the output directory may hold partial results afterwards.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SampleError {
    /// The source video could not be opened or is not a decodable container.
    #[error("Failed to open video at {path}: {reason}")]
    VideoOpen {
        /// Path that was passed to the backend.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened but has no video stream.
    #[error("No video stream found in {path}")]
    NoVideoStream {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// The video reports a frame count or geometry that cannot be sampled.
    #[error("Invalid video at {path}: {reason}")]
    InvalidVideo {
        /// Path of the offending file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// The requested number of output frames was zero.
    #[error("Frame count must be at least 1 (got {0})")]
    InvalidFrameCount(usize),

    /// The decode pass produced no frames at all.
    #[error("No frames could be decoded from {path}")]
    EmptySequence {
        /// Path of the source video.
        path: PathBuf,
    },

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecode(String),

    /// The encoder could not be found, configured or driven.
    #[error("Video encoding error: {0}")]
    VideoEncode(String),

    /// The output video could not be written.
    #[error("Failed to write video {path}: {reason}")]
    VideoWrite {
        /// Destination video path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A frame image could not be written.
    #[error("Failed to write frame image {path}: {source}")]
    ImageWrite {
        /// Destination image path.
        path: PathBuf,
        /// Error from the `image` crate.
        source: ImageError,
    },

    /// An output directory could not be created.
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// A non-video asset could not be copied to the output directory.
    #[error("Failed to copy {from} to {to}: {source}")]
    PassthroughCopy {
        /// Source asset path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// The asset path has no file name to copy it under.
    #[error("Unsupported asset path: {path}")]
    UnsupportedAsset {
        /// Path of the rejected asset.
        path: PathBuf,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error with no better context.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate outside of frame writing.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for SampleError {
    fn from(error: FfmpegError) -> Self {
        SampleError::FfmpegError(error.to_string())
    }
}
