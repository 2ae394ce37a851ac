//! Benchmarks for frame selection and end-to-end sampling.
//!
//! Run with: cargo bench
//!
//! The end-to-end group encodes its own fixture and is skipped when the
//! MPEG-4 encoder is unavailable.

use std::{hint::black_box, num::NonZero};

use clipsampler::{
    FrameIndexSet, FrameRate, FrameSampler, SampleOptions, VideoCodec, VideoEncoder,
    VideoEncoderOptions,
};
use criterion::Criterion;
use ffmpeg_next::util::log::Level as LogLevel;
use image::{DynamicImage, Rgb, RgbImage};

fn benchmark_selection(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("linspace selection");

    for frame_count in [5_u64, 420, 1_000_000] {
        let frames = NonZero::new(frame_count).unwrap();
        let count = NonZero::new(14_usize).unwrap();
        group.bench_function(format!("{frame_count} frames"), |bencher| {
            bencher.iter(|| FrameIndexSet::linspace(black_box(frames), black_box(count)));
        });
    }

    group.finish();
}

fn benchmark_sampling(criterion: &mut Criterion) {
    ffmpeg_next::util::log::set_level(LogLevel::Error);

    let directory = tempfile::tempdir().unwrap();
    let fixture = directory.path().join("bench.mp4");
    let frames: Vec<DynamicImage> = (0..120_u32)
        .map(|index| {
            DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb([(index * 2) as u8, 64, 128])))
        })
        .collect();
    let options = VideoEncoderOptions::default()
        .frame_rate(FrameRate::from_integer(30))
        .codec(VideoCodec::Mpeg4);
    if let Err(error) = VideoEncoder::new(options).write(&fixture, &frames) {
        eprintln!("Skipping benchmark: cannot encode fixture ({error})");
        return;
    }

    let mut group = criterion.benchmark_group("sample");
    group.sample_size(10);

    group.bench_function("120 frames to 14", |bencher| {
        let sampler = FrameSampler::new();
        let output = directory.path().join("out14");
        bencher.iter(|| sampler.sample(&fixture, &output).unwrap());
    });

    group.bench_function("120 frames to 60", |bencher| {
        let sampler = FrameSampler::with_options(SampleOptions::new().with_frame_count(60));
        let output = directory.path().join("out60");
        bencher.iter(|| sampler.sample(&fixture, &output).unwrap());
    });

    group.bench_function("probe", |bencher| {
        let sampler = FrameSampler::new();
        bencher.iter(|| sampler.probe(&fixture).unwrap());
    });

    group.finish();
}

criterion::criterion_group!(benches, benchmark_selection, benchmark_sampling);
criterion::criterion_main!(benches);
