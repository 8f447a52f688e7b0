//! Guided capture demo running a scripted session through the sampler.

use anyhow::Result;
use clap::Parser;
use guided_pose_capture::{
    clock::SystemClock,
    config::Config,
    encoder::{EncodedImage, JpegEncoder},
    ledger::CaptureSet,
    runner::{CaptureRunner, RunOutcome},
    simulation::{PoseScript, ScriptedExtractor, SimulatedCamera},
};
use log::{info, warn};

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Sampler period in milliseconds (overrides the config file)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Use unmirrored prompts (preview not flipped horizontally)
    #[arg(long)]
    no_mirror: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(interval) = args.interval_ms {
        config.timing.sample_interval_ms = interval;
    }
    if args.no_mirror {
        config.prompts.mirrored = false;
    }

    if args.print_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    info!("Guided Pose Capture - simulated session");

    let encoder = JpegEncoder::new(config.encoder.jpeg_quality)?;
    let runner = CaptureRunner::new(
        config,
        SimulatedCamera::new(FRAME_WIDTH, FRAME_HEIGHT),
        ScriptedExtractor::new(PoseScript::guided()),
        encoder,
        SystemClock::new(),
    )?;

    let handle = runner.spawn(|set: CaptureSet<EncodedImage>| {
        for (label, image) in set.iter() {
            info!(
                "{label}: {} bytes {} ({}x{})",
                image.len(),
                image.mime,
                image.width,
                image.height
            );
        }
    });

    let mut snapshots = handle.snapshots();
    let watcher = tokio::spawn(async move {
        let mut last_prompt = None;
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if snapshot.prompt != last_prompt {
                if let Some(prompt) = &snapshot.prompt {
                    info!("[{:?}] {prompt}", snapshot.phase);
                }
                last_prompt = snapshot.prompt;
            }
        }
    });

    let stop = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.cancel();
        }
    });

    let outcome = handle.join().await?;
    if let Err(e) = watcher.await {
        warn!("Snapshot watcher ended abnormally: {e}");
    }

    match outcome {
        RunOutcome::Delivered => info!("Capture complete"),
        RunOutcome::Cancelled => info!("Capture cancelled"),
        RunOutcome::Failed(reason) => anyhow::bail!("Capture failed: {reason}"),
    }

    Ok(())
}
