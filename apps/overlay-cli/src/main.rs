//! Overlay inspection binary
//!
//! Prints the overlay frame an analysis payload produces for one rendered page.

use anyhow::{Context, Result};
use clap::Parser;
use overlay_cli::{inspect, read_page, resolve_geometry, SizeArgs};
use overlay_core::{CoordinateConvention, OverlayConfig, OverlayDisplayMode};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "overlay-inspect")]
#[command(version, about = "Compute drawing overlays for a rendered page")]
struct Args {
    /// Analysis JSON (bare result or upload response)
    analysis: PathBuf,

    /// PDF to read the page size from
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Page number (1-indexed)
    #[arg(long, default_value = "1")]
    page: u32,

    /// Intrinsic page width in document units (overrides --pdf)
    #[arg(long)]
    original_width: Option<f64>,

    /// Intrinsic page height in document units (overrides --pdf)
    #[arg(long)]
    original_height: Option<f64>,

    /// Rendered page width in pixels
    #[arg(short = 'W', long)]
    rendered_width: Option<f64>,

    /// Rendered page height in pixels
    #[arg(short = 'H', long)]
    rendered_height: Option<f64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Coordinate convention (overrides the config file)
    #[arg(long)]
    convention: Option<CoordinateConvention>,

    /// Compute the frame with overlays hidden
    #[arg(long)]
    hidden: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the JSON report, logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => OverlayConfig::from_file(path)?,
        None => OverlayConfig::default(),
    };
    if let Some(convention) = args.convention {
        config = config.with_convention(convention);
    }
    tracing::info!("Convention: {}", config.placement.convention);

    let page = match &args.pdf {
        Some(pdf) => Some(read_page(pdf, args.page)?),
        None => None,
    };

    let geometry = resolve_geometry(
        page.as_ref(),
        SizeArgs {
            original_width: args.original_width,
            original_height: args.original_height,
            rendered_width: args.rendered_width,
            rendered_height: args.rendered_height,
        },
    )?;

    let analysis_text = std::fs::read_to_string(&args.analysis)
        .with_context(|| format!("Failed to read analysis: {}", args.analysis.display()))?;

    let mode = if args.hidden {
        OverlayDisplayMode::Hidden
    } else {
        OverlayDisplayMode::Visible
    };
    let report = inspect(&analysis_text, &config, page, geometry, mode)?;
    tracing::info!(
        "{} overlays placed, {} excluded",
        report.frame.boxes.len(),
        report.excluded.len()
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    Ok(())
}
