use anyhow::Result;
use clap::Parser;
use podviz::{aggregate::Granularity, config::TileKind, Config};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render POD well records into map frames, an animated GIF and a cumulative chart"
)]
struct Args {
    /// Pipe-delimited POD export; overrides `input` from the config
    input: Option<PathBuf>,

    /// YAML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Group by year instead of by decade
    #[arg(long)]
    year: bool,

    /// Use a blank background instead of downloading tiles
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) build config ─────────────────────────────────────────────
    let args = Args::parse();
    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(input) = args.input {
        cfg.input = input;
    }
    if let Some(dir) = args.output_dir {
        cfg.output_dir = dir;
    }
    if args.year {
        cfg.granularity = Granularity::Year;
    }
    if args.offline {
        cfg.map.tiles.kind = TileKind::Blank;
    }
    info!(input = %cfg.input.display(), output = %cfg.output_dir.display(), "startup");

    // ─── 3) run ──────────────────────────────────────────────────────
    let summary = podviz::run(&cfg)?;
    for path in &summary.outputs {
        info!("wrote {}", path.display());
    }
    Ok(())
}
