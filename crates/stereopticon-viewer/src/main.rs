//! Stereoscopic slideshow viewer.
//!
//! Renders a deck of images as a side-by-side stereo pair on one window:
//! left half for the left eye, right half for the right. With no image paths
//! on the command line a generated test card is shown.

mod app;
mod deck;
mod quad;
mod stereo;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::info;

use stereopticon_engine::device::GpuInit;
use stereopticon_engine::logging::{init_logging, LoggingConfig};
use stereopticon_engine::window::{Runtime, RuntimeConfig};

use app::{ViewerApp, ViewerConfig};
use deck::SlideDeck;

#[derive(Parser, Debug)]
#[command(name = "stereopticon", about = "Stereoscopic slideshow viewer")]
struct Args {
    /// Image files to show, in deck order (PNG or JPEG).
    slides: Vec<PathBuf>,

    /// Seconds for one sway sweep, edge to edge.
    #[arg(long, default_value_t = 4.0)]
    sway_seconds: f64,

    /// Sway amplitude in degrees of yaw.
    #[arg(long, default_value_t = 30.0)]
    sway_degrees: f32,

    /// Interocular distance in world units.
    #[arg(long, default_value_t = 0.35)]
    eye_separation: f32,

    /// Window title.
    #[arg(long)]
    title: Option<String>,
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let args = Args::parse();

    let deck = SlideDeck::load(&args.slides)?;
    info!("deck loaded: {} slide(s)", deck.len());

    let app = ViewerApp::new(deck, ViewerConfig {
        sway_half_period: Duration::from_secs_f64(args.sway_seconds.max(0.0)),
        sway_amplitude_deg: args.sway_degrees,
        eye_separation: args.eye_separation,
    });

    let mut runtime = RuntimeConfig::default();
    if let Some(title) = args.title {
        runtime.title = title;
    }

    Runtime::run(runtime, GpuInit::default(), app)
}
