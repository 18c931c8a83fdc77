use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use world_viewer::engine::{SyntheticEngine, Variant};
use world_viewer::{export, viewer, RenderSession, ViewMode, ViewerConfig};

#[derive(Parser, Debug)]
#[command(name = "world_viewer")]
#[command(about = "Pan, zoom and play back a tile-world simulation")]
struct Args {
    /// Width of the world in tiles
    #[arg(short = 'W', long, default_value = "400")]
    width: u32,

    /// Height of the world in tiles
    #[arg(short = 'H', long, default_value = "200")]
    height: u32,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Simulation model to run
    #[arg(short, long, value_enum, default_value = "civilization")]
    variant: Variant,

    /// Initial view mode (defaults per variant)
    #[arg(short, long, value_enum)]
    mode: Option<ViewMode>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run without a window and export a PNG to this path
    #[arg(long)]
    export: Option<PathBuf>,

    /// Frames to play before a headless export
    #[arg(long, default_value = "0")]
    frames: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("world_viewer=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if args.mode.is_some() {
        config.view_mode = args.mode;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating {:?} world with seed: {}", args.variant, seed);
    println!("Map size: {}x{}", args.width, args.height);

    let engine = SyntheticEngine::with_config(args.variant, config.engine.clone());
    let mut session = RenderSession::new(engine, config, args.width, args.height, seed)
        .context("could not start the simulation")?;

    match args.export {
        Some(path) => {
            let output = export::run_headless(&mut session, args.frames, &path)
                .with_context(|| format!("exporting {}", path.display()))?;
            println!("Exported {}", output.frame.display());
            if let Some(modes) = output.modes {
                println!("Exported {}", modes.display());
            }
        }
        None => viewer::run_viewer(session).context("viewer failed")?,
    }
    Ok(())
}
