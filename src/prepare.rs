//! Asset preparation: sample videos, pass still images through.
//!
//! A control sequence arrives with a reference image. Videos go through
//! the [`FrameSampler`]; still images are copied unchanged into the output
//! directory and get no frame directory.
//!
//! # Example
//!
//! ```no_run
//! use clipsampler::{FrameSampler, Prepared, SampleError};
//!
//! let sampler = FrameSampler::new();
//! for asset in ["sample1.mp4", "sample1.png"] {
//!     match sampler.prepare(asset, "prepared")? {
//!         Prepared::Sampled(output) => println!("sampled {}", output.video_path.display()),
//!         Prepared::Copied(path) => println!("copied {}", path.display()),
//!     }
//! }
//! # Ok::<(), SampleError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    backend::MediaBackend,
    error::SampleError,
    sampler::{FrameSampler, SampleOutput},
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// How an input asset is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Sampled to a fixed-length clip.
    Video,
    /// Copied through unchanged.
    Image,
}

impl AssetKind {
    /// Classify `path` by its extension, ignoring case.
    ///
    /// Known still-image extensions are [`Image`](AssetKind::Image).
    /// Everything else, including paths without an extension, is treated as
    /// a video and left for the decoder to accept or reject.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let is_image = path
            .as_ref()
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
            });
        if is_image { AssetKind::Image } else { AssetKind::Video }
    }
}

/// Result of [`FrameSampler::prepare`].
#[derive(Debug, Clone)]
pub enum Prepared {
    /// The asset was a video and has been sampled.
    Sampled(SampleOutput),
    /// The asset was a still image and has been copied to this path.
    Copied(PathBuf),
}

impl Prepared {
    /// The primary artifact: the re-encoded video or the copied file.
    pub fn output_path(&self) -> &Path {
        match self {
            Prepared::Sampled(output) => &output.video_path,
            Prepared::Copied(path) => path,
        }
    }
}

impl<B: MediaBackend> FrameSampler<B> {
    /// Sample a video or copy a still image into `output_directory`.
    ///
    /// # Errors
    ///
    /// - Any error from [`sample`](FrameSampler::sample) or [`passthrough`].
    pub fn prepare<P, Q>(&self, input: P, output_directory: Q) -> Result<Prepared, SampleError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        match AssetKind::from_path(input) {
            AssetKind::Video => self.sample(input, output_directory).map(Prepared::Sampled),
            AssetKind::Image => passthrough(input, output_directory).map(Prepared::Copied),
        }
    }
}

/// Copy `input` byte-for-byte to `output_directory/<file name>`.
///
/// Returns the destination path. Copying a file onto itself is a no-op.
///
/// # Errors
///
/// [`SampleError::PassthroughCopy`] if the copy fails (including a missing
/// source), [`SampleError::CreateDirectory`] if the directory cannot be
/// created.
pub fn passthrough<P, Q>(input: P, output_directory: Q) -> Result<PathBuf, SampleError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output_directory = output_directory.as_ref();

    let file_name = input.file_name().ok_or_else(|| SampleError::UnsupportedAsset {
        path: input.to_path_buf(),
    })?;
    let destination = output_directory.join(file_name);

    fs::create_dir_all(output_directory).map_err(|source| SampleError::CreateDirectory {
        path: output_directory.to_path_buf(),
        source,
    })?;

    // fs::copy onto the same file truncates it.
    if let (Ok(from), Ok(to)) = (fs::canonicalize(input), fs::canonicalize(&destination)) {
        if from == to {
            log::debug!("{} is already in place", input.display());
            return Ok(destination);
        }
    }

    let bytes = fs::copy(input, &destination).map_err(|source| SampleError::PassthroughCopy {
        from: input.to_path_buf(),
        to: destination.clone(),
        source,
    })?;

    log::info!(
        "Copied {} to {} ({bytes} bytes)",
        input.display(),
        destination.display(),
    );
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::{AssetKind, passthrough};
    use crate::error::SampleError;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(AssetKind::from_path("clip.mp4"), AssetKind::Video);
        assert_eq!(AssetKind::from_path("CLIP.MP4"), AssetKind::Video);
        assert_eq!(AssetKind::from_path("a/b/take.mkv"), AssetKind::Video);
        assert_eq!(AssetKind::from_path("ref.png"), AssetKind::Image);
        assert_eq!(AssetKind::from_path("ref.JPEG"), AssetKind::Image);
    }

    #[test]
    fn unlisted_extensions_go_to_the_decoder() {
        for path in ["take.mpg", "take.ts", "take.flv", "take.wmv", "take.3gp", "take", "notes.txt"] {
            assert_eq!(AssetKind::from_path(path), AssetKind::Video, "{path}");
        }
    }

    #[test]
    fn copies_bytes_unchanged() {
        let source_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let input = source_dir.path().join("sample5.png");
        std::fs::write(&input, b"\x89PNG not really").unwrap();

        let destination = passthrough(&input, output_dir.path().join("nested")).unwrap();

        assert_eq!(destination, output_dir.path().join("nested").join("sample5.png"));
        assert_eq!(std::fs::read(&destination).unwrap(), b"\x89PNG not really");
        assert!(!output_dir.path().join("nested").join("sample5").exists());
    }

    #[test]
    fn copy_onto_itself_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ref.png");
        std::fs::write(&input, b"pixels").unwrap();

        let destination = passthrough(&input, dir.path()).unwrap();
        assert_eq!(std::fs::read(destination).unwrap(), b"pixels");
    }

    #[test]
    fn missing_source_is_a_copy_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = passthrough(dir.path().join("absent.png"), dir.path().join("out"));
        assert!(matches!(result, Err(SampleError::PassthroughCopy { .. })));
    }
}
