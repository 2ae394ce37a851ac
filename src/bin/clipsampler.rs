use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use clipsampler::{
    DEFAULT_FRAME_COUNT, FfmpegLogLevel, FrameImageFormat, FrameSampler, Prepared,
    ProgressCallback, ProgressInfo, SampleOptions, SampleStage, VideoCodec, VideoMetadata,
    display_path, normalize_path,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  clipsampler sketch.mp4 outputs/processed\n  clipsampler sketch.mp4 outputs/processed --frames 16 --codec h264 --json\n  clipsampler reference.png outputs/processed\n  clipsampler sketch.mp4 --probe";

#[derive(Debug, Parser)]
#[command(
    name = "clipsampler",
    version,
    about = "Normalize a video to a fixed-length clip plus one image per frame",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input video, or a still image to copy through unchanged.
    input: PathBuf,

    /// Output directory (created if missing).
    #[arg(required_unless_present = "probe")]
    output: Option<PathBuf>,

    /// Number of frames to keep.
    #[arg(long, default_value_t = DEFAULT_FRAME_COUNT)]
    frames: usize,

    /// Output video codec (mpeg4, h264, h265).
    #[arg(long, default_value = "mpeg4")]
    codec: String,

    /// Output video bitrate in bits per second.
    #[arg(long)]
    bitrate: Option<usize>,

    /// Frame image format (png, bmp, tiff).
    #[arg(long, default_value = "png")]
    image_format: String,

    /// Print the input's video metadata and exit without writing anything.
    #[arg(long)]
    probe: bool,

    /// Print a machine-readable JSON summary instead of the bare output path.
    #[arg(long)]
    json: bool,

    /// Show a progress bar on stderr.
    #[arg(long)]
    progress: bool,

    /// Show debug logging.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long)]
    ffmpeg_log_level: Option<String>,
}

fn parse_codec(value: &str) -> Option<VideoCodec> {
    match value.to_ascii_lowercase().as_str() {
        "mpeg4" | "mp4v" => Some(VideoCodec::Mpeg4),
        "h264" | "avc" => Some(VideoCodec::H264),
        "h265" | "hevc" => Some(VideoCodec::H265),
        _ => None,
    }
}

fn parse_image_format(value: &str) -> Option<FrameImageFormat> {
    match value.to_ascii_lowercase().as_str() {
        "png" => Some(FrameImageFormat::Png),
        "bmp" => Some(FrameImageFormat::Bmp),
        "tif" | "tiff" => Some(FrameImageFormat::Tiff),
        _ => None,
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let message = match info.stage {
            SampleStage::Decoding => "decoding",
            SampleStage::WritingVideo => "encoding",
            SampleStage::WritingImages => "writing frames",
            _ => "working",
        };
        self.bar.set_message(message);
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
    }
}

fn metadata_json(metadata: &VideoMetadata) -> serde_json::Value {
    json!({
        "width": metadata.width,
        "height": metadata.height,
        "fps": metadata.frames_per_second(),
        "frame_rate": metadata.frame_rate.to_string(),
        "frame_count": metadata.frame_count,
        "codec": metadata.codec,
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(level) = &cli.ffmpeg_log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        clipsampler::set_ffmpeg_log_level(parsed);
    }

    let input = normalize_path(&cli.input)?;

    let codec = parse_codec(&cli.codec).ok_or(format!("unsupported --codec: {}", cli.codec))?;
    let image_format = parse_image_format(&cli.image_format)
        .ok_or(format!("unsupported --image-format: {}", cli.image_format))?;
    let mut options = SampleOptions::new()
        .with_frame_count(cli.frames)
        .with_codec(codec)
        .with_image_format(image_format);
    if let Some(bitrate) = cli.bitrate {
        options = options.with_bitrate(bitrate);
    }

    let progress = if cli.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        options = options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    let sampler = FrameSampler::with_options(options);

    if cli.probe {
        let metadata = sampler.probe(&input)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&metadata_json(&metadata))?);
        } else {
            println!("{}", display_path(&input).bold());
            println!("  resolution: {}x{}", metadata.width, metadata.height);
            println!("  frame rate: {} ({:.3} fps)", metadata.frame_rate, metadata.frames_per_second());
            println!("  frames:     {}", metadata.frame_count);
            println!("  codec:      {}", metadata.codec);
            if metadata.frame_count == cli.frames as u64 {
                println!("  {}", "already at target length".green());
            }
        }
        return Ok(());
    }

    let output_directory = match &cli.output {
        Some(output) => normalize_path(output)?,
        None => return Err("an output directory is required".into()),
    };

    let prepared = sampler.prepare(&input, &output_directory);
    if let Some(progress) = &progress {
        progress.bar.finish_and_clear();
    }
    let prepared = prepared?;

    if cli.json {
        let payload = match &prepared {
            Prepared::Sampled(output) => json!({
                "kind": "sampled",
                "video": display_path(&output.video_path),
                "frames_directory": display_path(&output.frames_directory),
                "frames": output.frame_paths.iter().map(display_path).collect::<Vec<_>>(),
                "source_indices": output.source_indices,
                "source": metadata_json(&output.metadata),
            }),
            Prepared::Copied(path) => json!({
                "kind": "copied",
                "path": display_path(path),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", display_path(prepared.output_path()));
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
