use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use afterglow_core::TrailConfig;
use afterglow_headless::{run_app, RunOptions};

#[derive(Debug, Parser)]
#[command(name = "afterglow")]
#[command(about = "Replays a scripted pointer through a decaying trail")]
struct Cli {
    /// TOML trail config; defaults apply when omitted.
    config: Option<PathBuf>,
    /// Directory for PNG field frames and item snapshots.
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, default_value_t = 640)]
    width: u32,
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Total virtual run time.
    #[arg(long = "duration-ms", default_value_t = 8_000)]
    duration_ms: u64,
    /// Pointer input stops at this virtual time.
    #[arg(long = "input-until-ms", default_value_t = 3_000)]
    input_until_ms: u64,
    /// Write every n-th presented frame.
    #[arg(long = "snapshot-every", default_value_t = 30)]
    snapshot_every: u64,
    /// Fixed jitter seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    // Init logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => match TrailConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Afterglow config error ({}): {e}", path.display());
                std::process::exit(2);
            }
        },
        None => TrailConfig::default(),
    };

    info!(mode = ?config.mode, width = cli.width, height = cli.height, "Afterglow starting");
    let options = RunOptions {
        config,
        width: cli.width,
        height: cli.height,
        duration_ms: cli.duration_ms,
        input_until_ms: cli.input_until_ms,
        snapshot_every: cli.snapshot_every,
        output_dir: cli.output,
        seed: cli.seed,
        ..RunOptions::default()
    };
    match run_app(options) {
        Ok(summary) => info!(
            frames = summary.frames,
            peak = summary.peak_intensity,
            max_items = summary.max_items,
            "Afterglow finished"
        ),
        Err(e) => {
            eprintln!("Afterglow error: {e}");
            std::process::exit(1);
        }
    }
}
