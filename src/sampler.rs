//! The frame sampler.
//!
//! [`FrameSampler::sample`] normalizes a video of any length to a fixed
//! number of frames (14 by default). It opens the source, selects evenly
//! spaced indices with [`FrameIndexSet::linspace`], decodes forward once
//! collecting the selected frames, releases the source, and then writes:
//!
//! - `<output_dir>/<input file name>`: the selected frames re-encoded at the
//!   source's frame rate and size;
//! - `<output_dir>/<input stem>/frame_NNN.png`: one image per selected frame
//!   (`<input stem>_frames` when the input has no extension).
//!
//! When the source has fewer frames than requested, repeated indices yield
//! repeated frames, so the output still holds the requested count.
//!
//! # Example
//!
//! ```no_run
//! use clipsampler::{FrameSampler, SampleError};
//!
//! let output = FrameSampler::new().sample("sketch.mp4", "processed")?;
//! println!("{}", output.video_path.display());
//! assert_eq!(output.frame_paths.len(), 14);
//! # Ok::<(), SampleError>(())
//! ```

use std::{
    ffi::{OsStr, OsString},
    fs,
    num::{NonZeroU64, NonZeroUsize},
    path::{Path, PathBuf},
};

use crate::{
    backend::{FfmpegBackend, MediaBackend, SampledFrame, VideoSettings, VideoSource},
    error::SampleError,
    metadata::VideoMetadata,
    options::SampleOptions,
    progress::{ProgressTracker, SampleStage},
    selection::FrameIndexSet,
};

/// Artifacts produced by one [`FrameSampler::sample`] call.
#[derive(Debug, Clone)]
#[must_use]
pub struct SampleOutput {
    /// The re-encoded video.
    pub video_path: PathBuf,
    /// Directory holding the per-frame images.
    pub frames_directory: PathBuf,
    /// Per-frame image paths in output order.
    pub frame_paths: Vec<PathBuf>,
    /// Source frame index of each output frame.
    pub source_indices: Vec<u64>,
    /// Metadata of the source video.
    pub metadata: VideoMetadata,
}

/// Normalizes videos to a fixed-length frame sequence.
///
/// Generic over the [`MediaBackend`] so the selection logic can be driven
/// by an in-memory backend; [`FrameSampler::new`] uses FFmpeg.
#[derive(Debug, Clone)]
pub struct FrameSampler<B = FfmpegBackend> {
    backend: B,
    options: SampleOptions,
}

impl FrameSampler<FfmpegBackend> {
    /// Sampler with the FFmpeg backend and default options.
    pub fn new() -> Self {
        Self::with_options(SampleOptions::new())
    }

    /// Sampler with the FFmpeg backend and the given options.
    pub fn with_options(options: SampleOptions) -> Self {
        Self::with_backend(FfmpegBackend, options)
    }
}

impl Default for FrameSampler<FfmpegBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: MediaBackend> FrameSampler<B> {
    /// Sampler with a custom backend.
    pub fn with_backend(backend: B, options: SampleOptions) -> Self {
        Self { backend, options }
    }

    /// Open `input`, read its metadata and release it.
    ///
    /// # Errors
    ///
    /// Any open error from the backend.
    pub fn probe<P: AsRef<Path>>(&self, input: P) -> Result<VideoMetadata, SampleError> {
        let source = self.backend.open(input.as_ref())?;
        Ok(source.metadata().clone())
    }

    /// Sample `input` into `output_directory` and return what was written.
    ///
    /// `output_directory` is created if missing. Existing files with the same
    /// names are overwritten.
    ///
    /// # Errors
    ///
    /// - [`SampleError::InvalidFrameCount`] if the options ask for zero frames.
    /// - [`SampleError::VideoOpen`] / [`SampleError::NoVideoStream`] if the
    ///   source cannot be opened.
    /// - [`SampleError::InvalidVideo`] if it reports zero frames.
    /// - [`SampleError::EmptySequence`] if no frame decodes.
    /// - [`SampleError::VideoWrite`], [`SampleError::VideoEncode`],
    ///   [`SampleError::ImageWrite`] or [`SampleError::CreateDirectory`] if
    ///   output cannot be written.
    pub fn sample<P, Q>(&self, input: P, output_directory: Q) -> Result<SampleOutput, SampleError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        let output_directory = output_directory.as_ref();

        let count = NonZeroUsize::new(self.options.frame_count)
            .ok_or(SampleError::InvalidFrameCount(self.options.frame_count))?;
        let (file_name, stem) = match (input.file_name(), input.file_stem()) {
            (Some(file_name), Some(stem)) => (file_name, stem),
            _ => {
                return Err(SampleError::VideoOpen {
                    path: input.to_path_buf(),
                    reason: "path has no file name".to_string(),
                });
            }
        };

        // The source lives only inside this block, so it is released before
        // any output is written and on every early return.
        let (metadata, frames, expected) = {
            let mut source = self.backend.open(input)?;
            let metadata = source.metadata().clone();
            let frame_count =
                NonZeroU64::new(metadata.frame_count).ok_or_else(|| SampleError::InvalidVideo {
                    path: input.to_path_buf(),
                    reason: "video reports no frames".to_string(),
                })?;

            let targets = FrameIndexSet::linspace(frame_count, count);
            log::debug!(
                "Selected {} positions ({} distinct) from {} frames: {:?}",
                targets.len(),
                targets.distinct_count(),
                frame_count,
                targets.indices(),
            );

            let mut tracker = ProgressTracker::new(
                self.options.progress.clone(),
                SampleStage::Decoding,
                Some(targets.last() + 1),
            );
            let frames = capture_frames(&mut source, &targets, &mut tracker)?;
            (metadata, frames, targets.len())
        };

        if frames.is_empty() {
            return Err(SampleError::EmptySequence {
                path: input.to_path_buf(),
            });
        }
        if frames.len() < expected {
            log::warn!(
                "{} ended early: captured {} of {} frames (container reported {})",
                input.display(),
                frames.len(),
                expected,
                metadata.frame_count,
            );
        }

        create_directory(output_directory)?;

        let video_path = output_directory.join(file_name);
        let settings = VideoSettings {
            frame_rate: metadata.frame_rate,
            width: metadata.width,
            height: metadata.height,
            codec: self.options.codec,
            bitrate: self.options.bitrate,
        };
        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            SampleStage::WritingVideo,
            Some(1),
        );
        self.backend.write_video(&video_path, &frames, &settings)?;
        tracker.advance();

        let frames_directory = output_directory.join(frames_directory_name(input, stem));
        create_directory(&frames_directory)?;

        let extension = self.options.image_format.extension();
        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            SampleStage::WritingImages,
            Some(frames.len() as u64),
        );
        let mut frame_paths = Vec::with_capacity(frames.len());
        for frame in &frames {
            let path = frames_directory.join(frame_file_name(frame.ordinal, extension));
            self.backend
                .write_image(&frame.image, &path, self.options.image_format)?;
            frame_paths.push(path);
            tracker.advance();
        }

        log::info!(
            "Sampled {} frames from {} into {}",
            frames.len(),
            input.display(),
            output_directory.display(),
        );

        Ok(SampleOutput {
            video_path,
            frames_directory,
            frame_paths,
            source_indices: frames.iter().map(|frame| frame.source_index).collect(),
            metadata,
        })
    }
}

/// Name of the per-frame image directory: the input's stem, or
/// `<stem>_frames` when the input has no extension and the stem would
/// collide with the re-encoded video.
fn frames_directory_name(input: &Path, stem: &OsStr) -> OsString {
    let mut name = stem.to_os_string();
    if input.extension().is_none() {
        name.push("_frames");
    }
    name
}

/// File name of the image for output position `ordinal`.
///
/// Ordinals are zero-padded to three digits: `frame_000.png`, `frame_013.png`.
pub fn frame_file_name(ordinal: usize, extension: &str) -> String {
    format!("frame_{ordinal:03}.{extension}")
}

/// Decode `source` forward from its first frame and keep every frame
/// selected by `targets`, once per occurrence, in output order.
///
/// Stops reading as soon as the last selected frame has been kept. If the
/// stream ends first, the frames kept so far are returned.
pub(crate) fn capture_frames<S>(
    source: &mut S,
    targets: &FrameIndexSet,
    progress: &mut ProgressTracker,
) -> Result<Vec<SampledFrame>, SampleError>
where
    S: VideoSource + ?Sized,
{
    let indices = targets.indices();
    let mut frames = Vec::with_capacity(indices.len());
    let mut cursor = 0;
    let mut source_index: u64 = 0;

    while cursor < indices.len() {
        let Some(image) = source.read_frame()? else {
            break;
        };
        progress.advance();

        let repeats = indices[cursor..]
            .iter()
            .take_while(|&&index| index == source_index)
            .count();
        if repeats > 0 {
            for _ in 1..repeats {
                frames.push(SampledFrame {
                    ordinal: frames.len(),
                    source_index,
                    image: image.clone(),
                });
            }
            frames.push(SampledFrame {
                ordinal: frames.len(),
                source_index,
                image,
            });
            cursor += repeats;
        }

        source_index += 1;
    }

    Ok(frames)
}

fn create_directory(path: &Path) -> Result<(), SampleError> {
    fs::create_dir_all(path).map_err(|source| SampleError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}
