use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "flightpath", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Capture the raw WebM recording (requires `ffmpeg` with libvpx on PATH).
    Record(RecordArgs),
    /// Record and export the final MP4 (requires `ffmpeg` with libvpx and libx264 on PATH).
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input flight config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Animation progress in `[0, 1]`.
    #[arg(long, default_value_t = 1.0)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Input flight config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory artifacts are written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Capture rate (frames per second).
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Hold the final frame this many milliseconds after arrival.
    #[arg(long, default_value_t = flightpath::DEFAULT_TRAILING_DELAY.as_millis() as u64)]
    hold_ms: u64,

    /// Frame pacing.
    #[arg(long, value_enum, default_value_t = PacingChoice::Offline)]
    pacing: PacingChoice,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[command(flatten)]
    capture: CaptureArgs,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    capture: CaptureArgs,

    /// Optional audio track muxed into the MP4 (cut to the shorter stream).
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Also keep the raw WebM capture next to the MP4.
    #[arg(long)]
    keep_raw: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PacingChoice {
    Offline,
    Realtime,
}

impl From<PacingChoice> for flightpath::Pacing {
    fn from(p: PacingChoice) -> Self {
        match p {
            PacingChoice::Offline => Self::Offline,
            PacingChoice::Realtime => Self::Realtime,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = flightpath::telemetry::init_default_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Record(args) => cmd_record(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<flightpath::FlightConfig> {
    let cfg = flightpath::FlightConfig::from_path(path)
        .with_context(|| format!("load flight config '{}'", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn make_recorder(args: &CaptureArgs) -> anyhow::Result<flightpath::FlightRecorder> {
    let cfg = read_config(&args.in_path)?;
    let opts = flightpath::RecorderOpts {
        out_dir: args.out_dir.clone(),
        record: flightpath::RecordOpts {
            fps: flightpath::Fps::new(args.fps, 1)?,
            pacing: args.pacing.into(),
            trailing_delay: Duration::from_millis(args.hold_ms),
            ..flightpath::RecordOpts::default()
        },
    };
    Ok(flightpath::FlightRecorder::new(cfg, opts)?)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&args.progress) {
        anyhow::bail!("--progress must be within [0, 1], got {}", args.progress);
    }
    let cfg = read_config(&args.in_path)?;
    let assets = flightpath::AssetStore::new(flightpath::RecordOpts::default().asset_timeout)
        .load_for(&cfg)?;
    let mut renderer = flightpath::FrameRenderer::new(&cfg, assets)?;
    renderer.render_png(args.progress, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let recorder = make_recorder(&args.capture)?;
    let blob = recorder.record_animation(true, &flightpath::CancelToken::new())?;

    eprintln!(
        "captured {} bytes into {}",
        blob.len(),
        args.capture.out_dir.display()
    );
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let recorder = make_recorder(&args.capture)?;
    let outcome = recorder.export(
        args.audio.as_deref(),
        args.keep_raw,
        &flightpath::CancelToken::new(),
    )?;

    if let Some(raw) = &outcome.raw_path {
        eprintln!("wrote {}", raw.display());
    }
    eprintln!("wrote {}", outcome.video_path.display());
    Ok(())
}
