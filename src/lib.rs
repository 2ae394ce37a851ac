//! # clipsampler
//!
//! Normalize a sketch-sequence video to a fixed-length control clip.
//!
//! `clipsampler` picks a fixed number of evenly spaced frames (14 by
//! default) from a video of any length, re-encodes them as a short video
//! and writes each one as a lossless image. Still-image reference assets
//! are passed through unchanged. Decoding and encoding go through FFmpeg
//! via the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clipsampler::{FrameSampler, SampleError};
//!
//! let output = FrameSampler::new().sample("sketch.mp4", "processed")?;
//! // processed/sketch.mp4 and processed/sketch/frame_000.png ..= frame_013.png
//! println!("{}", output.video_path.display());
//! # Ok::<(), SampleError>(())
//! ```
//!
//! ## Frame selection
//!
//! Output position `i` holds source frame `floor(i * (N - 1) / 13)` for a
//! video of `N` frames. Shorter videos repeat frames so the output length
//! stays fixed; see [`FrameIndexSet`].
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the build machine.

pub mod backend;
pub mod decode;
pub mod encode;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod options;
pub mod paths;
pub mod prepare;
pub mod progress;
pub mod sampler;
pub mod selection;
mod utilities;

pub use backend::{FfmpegBackend, MediaBackend, SampledFrame, VideoSettings, VideoSource};
pub use decode::FfmpegSource;
pub use encode::{VideoCodec, VideoEncoder, VideoEncoderOptions};
pub use error::SampleError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::{FrameRate, VideoMetadata};
pub use options::{FrameImageFormat, SampleOptions};
pub use paths::{display_path, normalize_path};
pub use prepare::{AssetKind, Prepared, passthrough};
pub use progress::{ProgressCallback, ProgressInfo, SampleStage};
pub use sampler::{FrameSampler, SampleOutput, frame_file_name};
pub use selection::{DEFAULT_FRAME_COUNT, FrameIndexSet};
