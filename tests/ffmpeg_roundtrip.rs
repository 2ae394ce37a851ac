//! End-to-end tests through FFmpeg.
//!
//! Each test encodes its own fixture with [`VideoEncoder`] and skips when
//! the local FFmpeg build lacks the MPEG-4 encoder.

use std::path::{Path, PathBuf};

use clipsampler::{
    FfmpegSource, FrameRate, FrameSampler, SampleError, SampleOptions, VideoCodec, VideoEncoder,
    VideoEncoderOptions, VideoSource,
};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

const FIXTURE_WIDTH: u32 = 64;
const FIXTURE_HEIGHT: u32 = 48;

fn gradient_frames(count: u32) -> Vec<DynamicImage> {
    (0..count)
        .map(|index| {
            let shade = (index * 255 / count.max(1)) as u8;
            DynamicImage::ImageRgb8(RgbImage::from_fn(FIXTURE_WIDTH, FIXTURE_HEIGHT, |x, _| {
                Rgb([shade, (x * 4) as u8, 255 - shade])
            }))
        })
        .collect()
}

/// Encode a synthetic clip into `directory`, or `None` if the encoder is
/// unavailable here.
fn synthesize_clip(directory: &Path, name: &str, frames: u32) -> Option<PathBuf> {
    let path = directory.join(name);
    let options = VideoEncoderOptions::default()
        .frame_rate(FrameRate::from_integer(30))
        .codec(VideoCodec::Mpeg4);
    let result = VideoEncoder::new(options).write(&path, &gradient_frames(frames));

    if let Err(ref e) = result {
        let msg = format!("{e}");
        if msg.contains("not available") || msg.contains("cannot open encoder") {
            eprintln!("Skipping: MPEG-4 encoder not available ({msg})");
            return None;
        }
    }
    result.expect("write fixture");
    Some(path)
}

#[test]
fn source_reports_fixture_metadata() {
    let directory = tempfile::tempdir().unwrap();
    let Some(path) = synthesize_clip(directory.path(), "fixture.mp4", 40) else {
        return;
    };

    let mut source = FfmpegSource::open(&path).expect("open fixture");
    let metadata = source.metadata().clone();
    assert_eq!((metadata.width, metadata.height), (FIXTURE_WIDTH, FIXTURE_HEIGHT));
    assert_eq!(metadata.frame_count, 40);
    assert!((metadata.frames_per_second() - 30.0).abs() < 0.01);

    let mut decoded = 0;
    while let Some(frame) = source.read_frame().expect("decode") {
        assert_eq!(frame.dimensions(), (FIXTURE_WIDTH, FIXTURE_HEIGHT));
        decoded += 1;
    }
    assert_eq!(decoded, 40);
}

#[test]
fn sample_normalizes_to_fourteen_frames() {
    let directory = tempfile::tempdir().unwrap();
    let Some(path) = synthesize_clip(directory.path(), "sketch.mp4", 40) else {
        return;
    };
    let output_dir = directory.path().join("processed");

    let output = FrameSampler::new()
        .sample(&path, &output_dir)
        .expect("sample fixture");

    assert_eq!(output.video_path, output_dir.join("sketch.mp4"));
    assert_eq!(
        output.source_indices,
        vec![0, 3, 6, 9, 12, 15, 18, 21, 24, 27, 30, 33, 36, 39]
    );
    assert_eq!(output.frame_paths.len(), 14);
    for (ordinal, frame_path) in output.frame_paths.iter().enumerate() {
        assert_eq!(
            frame_path,
            &output_dir.join("sketch").join(format!("frame_{ordinal:03}.png"))
        );
        let image = image::open(frame_path).expect("read frame");
        assert_eq!(image.dimensions(), (FIXTURE_WIDTH, FIXTURE_HEIGHT));
    }

    let resampled = FrameSampler::new().probe(&output.video_path).expect("probe output");
    assert_eq!(resampled.frame_count, 14);
    assert!((resampled.frames_per_second() - 30.0).abs() < 0.01);
    assert_eq!((resampled.width, resampled.height), (FIXTURE_WIDTH, FIXTURE_HEIGHT));
}

#[test]
fn short_clip_is_padded_with_repeats() {
    let directory = tempfile::tempdir().unwrap();
    let Some(path) = synthesize_clip(directory.path(), "short.mp4", 5) else {
        return;
    };

    let output = FrameSampler::new()
        .sample(&path, directory.path().join("out"))
        .expect("sample short fixture");

    assert_eq!(
        output.source_indices,
        vec![0, 0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4]
    );
    let first = std::fs::read(&output.frame_paths[0]).unwrap();
    let third = std::fs::read(&output.frame_paths[2]).unwrap();
    assert_eq!(first, third);
}

#[test]
fn frame_images_are_reproducible() {
    let directory = tempfile::tempdir().unwrap();
    let Some(path) = synthesize_clip(directory.path(), "clip.mp4", 30) else {
        return;
    };
    let sampler = FrameSampler::with_options(SampleOptions::new().with_frame_count(6));

    let first = sampler.sample(&path, directory.path().join("a")).expect("first run");
    let second = sampler.sample(&path, directory.path().join("b")).expect("second run");

    for (left, right) in first.frame_paths.iter().zip(&second.frame_paths) {
        assert_eq!(std::fs::read(left).unwrap(), std::fs::read(right).unwrap());
    }
}

#[test]
fn sampling_in_place_overwrites() {
    let directory = tempfile::tempdir().unwrap();
    let Some(path) = synthesize_clip(directory.path(), "clip.mp4", 20) else {
        return;
    };
    let output_dir = directory.path().join("out");

    let first = FrameSampler::new().sample(&path, &output_dir).expect("first run");
    let again = FrameSampler::new().sample(&path, &output_dir).expect("second run");
    assert_eq!(first.frame_paths, again.frame_paths);
}

#[test]
fn variable_rate_source_is_reencoded() {
    let directory = tempfile::tempdir().unwrap();
    if synthesize_clip(directory.path(), "warmup.mp4", 2).is_none() {
        return;
    }

    // Average rate of a variable-rate phone capture.
    let source_rate = FrameRate::new(1_509_000, 50_333);
    let path = directory.path().join("vfr.mp4");
    let options = VideoEncoderOptions::default()
        .frame_rate(source_rate)
        .codec(VideoCodec::Mpeg4);
    VideoEncoder::new(options)
        .write(&path, &gradient_frames(30))
        .expect("encode at variable-rate average");

    let output = FrameSampler::new()
        .sample(&path, directory.path().join("out"))
        .expect("sample variable-rate clip");
    assert_eq!(output.frame_paths.len(), 14);

    let written = FrameSampler::new().probe(&output.video_path).expect("probe output");
    assert!((written.frames_per_second() - source_rate.as_f64()).abs() < 0.01);
}

#[test]
fn garbage_input_fails_to_open() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("garbage.mp4");
    std::fs::write(&path, b"this is not a media file").unwrap();

    let result = FrameSampler::new().sample(&path, directory.path().join("out"));
    assert!(matches!(
        result,
        Err(SampleError::VideoOpen { .. } | SampleError::NoVideoStream { .. })
    ));
    assert!(!directory.path().join("out").exists());
}
