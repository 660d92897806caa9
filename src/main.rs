use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};

use make_loop::{
    config::Config,
    pipeline::LoopEngine,
    video::{FfmpegRunner, FfprobeProber},
};

#[derive(Parser)]
#[command(
    name = "make-loop",
    version,
    about = "Make a reversed loop video",
    long_about = "Concatenates a video with its reversed copy and retimes the result to a target frame rate and duration, producing a clip that loops seamlessly."
)]
struct Cli {
    /// Path to the input video
    #[arg(short = 'i', long = "input_file_path", visible_alias = "input")]
    input_file_path: PathBuf,

    /// Path to the output video
    #[arg(short = 'o', long = "output_file_path", visible_alias = "output")]
    output_file_path: PathBuf,

    /// Frames per second for target file [default: 25.0]
    #[arg(long = "target_fps")]
    target_fps: Option<f64>,

    /// Duration of target video in seconds [default: 8.0]
    #[arg(long = "target_duration")]
    target_duration: Option<f64>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Leave the intermediate looped file on disk
    #[arg(long)]
    keep_intermediate: bool,

    /// Overwrite existing files without asking
    #[arg(long)]
    overwrite: bool,

    /// Print the encoder commands without running them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Load the config file if one was given, then apply command-line overrides
fn load_config(cli: &Cli) -> make_loop::Result<Config> {
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };

    apply_cli(cli, &mut config);
    config.validate()?;
    Ok(config)
}

/// Command-line flags take precedence over the config file
fn apply_cli(cli: &Cli, config: &mut Config) {
    if let Some(fps) = cli.target_fps {
        config.target.fps = fps;
    }
    if let Some(duration) = cli.target_duration {
        config.target.duration = duration;
    }
    config.pipeline.keep_intermediate |= cli.keep_intermediate;
    config.encoder.overwrite |= cli.overwrite;
}

async fn run(cli: Cli) -> make_loop::Result<()> {
    let config = load_config(&cli)?;

    let prober = FfprobeProber::new(config.encoder.ffprobe_path.clone());
    let ffmpeg_path = config.encoder.ffmpeg_path.clone();
    let engine = LoopEngine::new(config, Box::new(prober), Box::new(FfmpegRunner::new()));

    if cli.dry_run {
        let job = engine.plan(&cli.input_file_path, &cli.output_file_path).await?;
        println!("{}", job.loop_command);
        println!("{}", job.retime_command);
        return Ok(());
    }

    FfmpegRunner::check_available(&ffmpeg_path).await?;
    engine.run(&cli.input_file_path, &cli.output_file_path).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting make-loop v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        error!("{}", e.user_message());
        return Err(e.into());
    }

    Ok(())
}
