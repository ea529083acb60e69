use std::{
    fs,
    path::PathBuf,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use frameload::{
    BackendLogLevel, DEFAULT_TIMEOUT, ErrorKind, FrameBuffer, IndicesRequest, LoadError,
    WindowRequest, extract_by_indices, extract_by_window, open_session, set_backend_log_level,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  frameload info input.mp4 --json\n  frameload window input.mp4 -n 32 --random-seek --out frames.rgb\n  frameload frames input.mp4 --indices 0,10,10,25 --resize 224 --png-dir frames\n  frameload completions zsh > _frameload";

#[derive(Debug, Parser)]
#[command(
    name = "frameload",
    version,
    about = "Decode bounded runs of video frames into flat RGB buffers",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,

    /// Decode timeout budget in seconds (0 means the 3s default).
    #[arg(long, default_value_t = 0.0)]
    timeout: f64,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print resolved stream metadata (alias: probe).
    #[command(
        about = "Print resolved video stream metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  frameload info input.mp4\n  frameload info input.mp4 --json"
    )]
    Info {
        /// Input media path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Decode a window of consecutive frames.
    #[command(
        about = "Decode a window of consecutive frames",
        after_help = "Examples:\n  frameload window input.mp4 -n 32 --out window.rgb\n  frameload window input.mp4 -n 32 --random-seek --png-dir frames --progress"
    )]
    Window {
        /// Input media path.
        input: PathBuf,
        /// Number of consecutive frames to decode.
        #[arg(short = 'n', long, default_value_t = 1)]
        num_frames: usize,
        /// Expected frame width (0 adopts the stream's native width).
        #[arg(long, default_value_t = 0)]
        width: u32,
        /// Expected frame height (0 adopts the stream's native height).
        #[arg(long, default_value_t = 0)]
        height: u32,
        /// Seek to a uniformly random start before decoding.
        #[arg(long)]
        random_seek: bool,
        /// Fixed normalized seek position in [0, 1] (overridden by --random-seek).
        #[arg(long)]
        seek_distance: Option<f64>,
        /// Treat a missing video stream as an error even with explicit dimensions.
        #[arg(long)]
        strict: bool,
        /// Write the raw packed RGB24 buffer to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Write one PNG per decoded frame into this directory.
        #[arg(long)]
        png_dir: Option<PathBuf>,
        /// Show a progress bar while writing PNGs.
        #[arg(long)]
        progress: bool,
    },

    /// Decode an explicit list of frame indices.
    #[command(
        about = "Decode an explicit list of frame indices",
        after_help = "Examples:\n  frameload frames input.mp4 --indices 0,10,25 --out frames.rgb\n  frameload frames input.mp4 --indices 0,100,200 --seek --resize 224 --png-dir frames"
    )]
    Frames {
        /// Input media path.
        input: PathBuf,
        /// Comma-separated frame indices, in output order (duplicates allowed).
        #[arg(long, value_delimiter = ',', required = true)]
        indices: Vec<i64>,
        /// Expected frame width (0 adopts the stream's native width).
        #[arg(long, default_value_t = 0)]
        width: u32,
        /// Expected frame height (0 adopts the stream's native height).
        #[arg(long, default_value_t = 0)]
        height: u32,
        /// Pin the longer output side to this many pixels.
        #[arg(long, default_value_t = 0)]
        resize: u32,
        /// Count only keyframes when matching indices.
        #[arg(long)]
        keyframes_only: bool,
        /// Seek per index instead of scanning sequentially.
        #[arg(long)]
        seek: bool,
        /// Write the raw packed RGB24 buffer to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Write one PNG per decoded frame into this directory.
        #[arg(long)]
        png_dir: Option<PathBuf>,
        /// Show a progress bar while writing PNGs.
        #[arg(long)]
        progress: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_log_level(value: &str) -> Option<BackendLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(BackendLogLevel::Quiet),
        "panic" => Some(BackendLogLevel::Panic),
        "fatal" => Some(BackendLogLevel::Fatal),
        "error" => Some(BackendLogLevel::Error),
        "warning" | "warn" => Some(BackendLogLevel::Warning),
        "info" => Some(BackendLogLevel::Info),
        "verbose" => Some(BackendLogLevel::Verbose),
        "debug" => Some(BackendLogLevel::Debug),
        "trace" => Some(BackendLogLevel::Trace),
        _ => None,
    }
}

fn parse_timeout(seconds: f64) -> Result<Duration, Box<dyn std::error::Error>> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("invalid --timeout: {seconds}").into());
    }
    if seconds == 0.0 {
        Ok(DEFAULT_TIMEOUT)
    } else {
        Ok(Duration::from_secs_f64(seconds))
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        set_backend_log_level(parsed);
    }
    Ok(())
}

fn ensure_writable_path(
    path: &std::path::Path,
    overwrite: bool,
) -> Result<(), Box<dyn std::error::Error>> {
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

fn write_raw_buffer(
    buffer: &FrameBuffer,
    path: &std::path::Path,
    overwrite: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_writable_path(path, overwrite)?;
    fs::write(path, buffer.data())?;
    println!("{} {}", "saved".green().bold(), path.display());
    Ok(())
}

fn write_png_frames(
    buffer: &FrameBuffer,
    frames_decoded: usize,
    directory: &std::path::Path,
    overwrite: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if directory.exists() && !overwrite {
        return Err(format!(
            "output directory already exists: {} (use --overwrite)",
            directory.display()
        )
        .into());
    }
    fs::create_dir_all(directory)?;

    let progress_bar = if progress {
        let pb = ProgressBar::new(frames_decoded as u64);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        pb.set_style(style.progress_chars("##-"));
        Some(pb)
    } else {
        None
    };

    for slot in 0..frames_decoded {
        let image = buffer
            .frame_image(slot)
            .ok_or(format!("frame slot {slot} out of range"))?;
        let output_path = directory.join(format!("frame_{slot:06}.png"));
        image.save(&output_path)?;
        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("done");
    }

    println!(
        "{} {}",
        "success:".green().bold(),
        format!("wrote {frames_decoded} frame(s) to {}", directory.display()).green()
    );
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;
    let timeout = parse_timeout(cli.global.timeout)?;

    match cli.command {
        Commands::Info { input, json } => {
            let session = open_session(&input, timeout)?;
            let info = session.info();
            if json {
                let payload = json!({
                    "path": input.display().to_string(),
                    "stream_index": info.stream_index,
                    "width": info.width,
                    "height": info.height,
                    "codec": info.codec,
                    "frame_count": info.frame_count,
                    "duration_time_base_units": info.duration,
                    "time_base": format!(
                        "{}/{}",
                        info.time_base.numerator(),
                        info.time_base.denominator()
                    ),
                    "avg_frame_rate": format!(
                        "{}/{}",
                        info.avg_frame_rate.numerator(),
                        info.avg_frame_rate.denominator()
                    ),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                let rate = if info.avg_frame_rate.denominator() > 0 {
                    info.avg_frame_rate.numerator() as f64
                        / info.avg_frame_rate.denominator() as f64
                } else {
                    0.0
                };
                println!(
                    "Video: {}x{} @ {rate:.2} fps [{}]",
                    info.width, info.height, info.codec
                );
                println!("Frames: {}", info.frame_count);
                println!(
                    "Duration: {} units @ {}/{}",
                    info.duration,
                    info.time_base.numerator(),
                    info.time_base.denominator()
                );
            }
        }
        Commands::Window {
            input,
            num_frames,
            width,
            height,
            random_seek,
            seek_distance,
            strict,
            out,
            png_dir,
            progress,
        } => {
            let mut request = WindowRequest::new(num_frames).with_dimensions(width, height);
            if random_seek {
                request = request.with_random_seek();
            } else if let Some(distance) = seek_distance {
                request = request.with_seek_distance(distance);
            }

            let mut extraction = extract_by_window(&input, &request, timeout)?;
            if strict {
                extraction = extraction.require_video()?;
            }

            if extraction.missing_stream {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "no video stream; buffer left zero-filled".yellow()
                );
            }
            if cli.global.verbose {
                eprintln!(
                    "decoded {} of {} frame(s) at {}x{} (seek_distance {:.4})",
                    extraction.frames_decoded,
                    num_frames,
                    extraction.width,
                    extraction.height,
                    extraction.seek_distance
                );
            }

            if let Some(path) = &out {
                write_raw_buffer(&extraction.buffer, path, cli.global.overwrite)?;
            }
            if let Some(directory) = &png_dir {
                write_png_frames(
                    &extraction.buffer,
                    extraction.frames_decoded,
                    directory,
                    cli.global.overwrite,
                    progress,
                )?;
            }
            if out.is_none() && png_dir.is_none() {
                println!(
                    "decoded {} frame(s) at {}x{} ({} bytes)",
                    extraction.frames_decoded,
                    extraction.width,
                    extraction.height,
                    extraction.buffer.data().len()
                );
            }
        }
        Commands::Frames {
            input,
            indices,
            width,
            height,
            resize,
            keyframes_only,
            seek,
            out,
            png_dir,
            progress,
        } => {
            let mut request = IndicesRequest::new(indices)
                .with_dimensions(width, height)
                .with_resize(resize);
            if keyframes_only {
                request = request.with_keyframes_only();
            }
            if seek {
                request = request.with_seek();
            }
            if keyframes_only && seek {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "--seek is ignored with --keyframes-only".yellow()
                );
            }

            let slot_count = request.indices.len();
            let extraction = extract_by_indices(&input, &request, timeout)?;

            if cli.global.verbose {
                eprintln!(
                    "filled {} of {} slot(s) at {}x{}{}",
                    extraction.slots_filled,
                    slot_count,
                    extraction.width,
                    extraction.height,
                    if extraction.resized { " (resized)" } else { "" }
                );
            }

            if let Some(path) = &out {
                write_raw_buffer(&extraction.buffer, path, cli.global.overwrite)?;
            }
            if let Some(directory) = &png_dir {
                write_png_frames(
                    &extraction.buffer,
                    extraction.buffer.frames(),
                    directory,
                    cli.global.overwrite,
                    progress,
                )?;
            }
            if out.is_none() && png_dir.is_none() {
                println!(
                    "filled {} of {} slot(s) at {}x{} ({} bytes)",
                    extraction.slots_filled,
                    slot_count,
                    extraction.width,
                    extraction.height,
                    extraction.buffer.data().len()
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "frameload", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn error_tag(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Io => "io error:",
        ErrorKind::Validation => "invalid:",
        ErrorKind::Timeout => "timeout:",
        ErrorKind::OutOfMemory => "out of memory:",
    }
}

fn main() {
    if let Err(error) = run() {
        if let Some(load_error) = error.downcast_ref::<LoadError>() {
            eprintln!(
                "{} {load_error}",
                error_tag(load_error.kind()).red().bold()
            );
        } else {
            eprintln!("{} {error}", "error:".red().bold());
        }
        std::process::exit(1);
    }
}
