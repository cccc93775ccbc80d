use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framegrab::{
    Canvas, FfmpegLogLevel, FrameGrab, GrabOptions, GrabTime, ImageElement, MediaElement,
    MediaSource, SkipSolidsOptions, VideoElement,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framegrab grab input.mp4 --time 00:00:02:00 --out thumb.png\n  framegrab grab input.mp4 --time 12.5 --max-size 320 --skip-solids --progress\n  framegrab probe https://cdn.example/clip.mp4 --json\n  framegrab completions zsh > _framegrab";

#[derive(Debug, Parser)]
#[command(
    name = "framegrab",
    version,
    about = "Grab still frames from videos, skipping solid black frames",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone)]
struct GlobalOptions {
    /// Show additional output on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a spinner while the frame is acquired.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true, default_value = "error")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Grab one frame to an image file.
    #[command(
        after_help = "Examples:\n  framegrab grab input.mp4 --time 2.0\n  framegrab grab input.mp4 --time 01:30:00 --frame-rate 25 --out frame.jpg\n  framegrab grab input.mp4 --time 0 --skip-solids --skip-frames 12 --max-retries 50"
    )]
    Grab {
        /// Input video path or URL. Repeat to provide fallback sources.
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Seconds, or a `[[[HH:]MM:]SS:]FF` timecode.
        #[arg(long)]
        time: String,

        /// Frame rate for timecodes and skips. Defaults to the probed rate.
        #[arg(long)]
        frame_rate: Option<f64>,

        /// Output image path. The format follows the extension.
        #[arg(long, default_value = "frame.png")]
        out: PathBuf,

        /// Print the frame as a PNG data URL instead of writing a file.
        #[arg(long, conflicts_with = "out")]
        data_url: bool,

        /// Scale the frame down so its width is at most this many pixels.
        #[arg(long)]
        max_size: Option<u32>,

        /// Skip ahead past mostly-black frames.
        #[arg(long)]
        skip_solids: bool,

        /// Frames to advance per skip.
        #[arg(long, requires = "skip_solids")]
        skip_frames: Option<u32>,

        /// Solid-pixel ratio above which a frame is skipped.
        #[arg(long, requires = "skip_solids")]
        max_ratio: Option<f64>,

        /// Give up after this many skips.
        #[arg(long, requires = "skip_solids")]
        max_retries: Option<u32>,

        /// Print a machine-readable JSON summary.
        #[arg(long)]
        json: bool,
    },

    /// Print video metadata (alias: info).
    #[command(visible_alias = "info")]
    Probe {
        /// Input video path or URL.
        input: String,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn parse_time(value: &str) -> GrabTime {
    match value.parse::<f64>() {
        Ok(seconds) => GrabTime::Seconds(seconds),
        Err(_) => GrabTime::Timecode(value.to_string()),
    }
}

fn open_input(inputs: &[String]) -> Result<VideoElement, Box<dyn std::error::Error>> {
    let sources = inputs
        .iter()
        .map(|input| MediaSource::parse(input))
        .collect();
    Ok(VideoElement::with_sources(sources)?)
}

fn spinner(enabled: bool, message: &str) -> Result<Option<ProgressBar>, Box<dyn std::error::Error>> {
    if !enabled {
        return Ok(None);
    }
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    progress_bar.set_message(message.to_string());
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    Ok(Some(progress_bar))
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let level: FfmpegLogLevel = cli
        .global
        .log_level
        .parse()
        .map_err(|_| format!("unsupported --log-level: {}", cli.global.log_level))?;
    framegrab::set_ffmpeg_log_level(level);

    match cli.command {
        Commands::Grab {
            inputs,
            time,
            frame_rate,
            out,
            data_url,
            max_size,
            skip_solids,
            skip_frames,
            max_ratio,
            max_retries,
            json,
        } => {
            if !data_url {
                ensure_writable_path(&out, cli.global.overwrite)?;
            }

            let video = open_input(&inputs)?;
            let probed_rate = video
                .metadata()
                .map_or(0.0, |metadata| metadata.frames_per_second);
            let frame_rate = frame_rate.unwrap_or(probed_rate);
            if frame_rate <= 0.0 {
                return Err("could not determine the frame rate; pass --frame-rate".into());
            }

            let mut skip = if skip_solids {
                SkipSolidsOptions::enabled()
            } else {
                SkipSolidsOptions::default()
            };
            if let Some(frames) = skip_frames {
                skip = skip.with_frames(frames);
            }
            if let Some(ratio) = max_ratio {
                skip = skip.with_max_ratio(ratio);
            }
            if let Some(retries) = max_retries {
                skip = skip.with_max_retries(retries);
            }

            if cli.global.verbose {
                eprintln!(
                    "{} {} at {frame_rate:.3} fps ({:.3}s long)",
                    "opened".cyan().bold(),
                    video
                        .source()
                        .map_or_else(|| inputs.join(", "), |source| source.to_string()),
                    video.duration()
                );
            }

            let session = FrameGrab::new(&video, GrabOptions::new(frame_rate).with_skip_solids(skip))?;
            let grab_time = parse_time(&time);
            let seconds = framegrab::normalize_time(&grab_time, frame_rate)?;

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let progress_bar = spinner(cli.global.progress, &format!("grabbing frame at {seconds:.3}s"))?;

            let (width, height, data) = if data_url {
                let mut image = ImageElement::new();
                runtime.block_on(session.grab(&mut image, grab_time, max_size)?)?;
                (image.width(), image.height(), image.src().map(str::to_string))
            } else {
                let mut canvas = Canvas::default();
                runtime.block_on(session.grab(&mut canvas, grab_time, max_size)?)?;
                canvas.save(&out)?;
                (canvas.width(), canvas.height(), None)
            };

            if let Some(progress_bar) = progress_bar {
                progress_bar.finish_and_clear();
            }

            if json {
                let output = (!data_url).then(|| out.display().to_string());
                let payload = json!({
                    "inputs": inputs,
                    "time": time,
                    "seconds": seconds,
                    "frame_rate": frame_rate,
                    "width": width,
                    "height": height,
                    "max_size": max_size,
                    "skip_solids": skip.enabled,
                    "output": output,
                    "data_url": data,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if let Some(data) = data {
                println!("{data}");
            } else {
                println!(
                    "{} {}",
                    "saved".green().bold(),
                    format!("{width}x{height} frame -> {}", out.display()).green()
                );
            }
        }
        Commands::Probe { input, json } => {
            let video = open_input(std::slice::from_ref(&input))?;
            let metadata = video.metadata().ok_or("video has no metadata")?;
            if json {
                let payload = json!({
                    "source": input,
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "duration_seconds": metadata.duration,
                    "frame_count": metadata.frame_count(),
                    "codec": metadata.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Source: {input}");
                println!("Dimensions: {}x{}", metadata.width, metadata.height);
                println!("Frame rate: {:.3}", metadata.frames_per_second);
                println!("Duration: {:.3}s", metadata.duration);
                println!("Frames: ~{}", metadata.frame_count());
                println!("Codec: {}", metadata.codec);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framegrab", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
