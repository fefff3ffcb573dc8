use std::cell::RefCell;
use std::collections::BTreeMap;

use clap::Parser;
use foundation::GeoPoint;
use globe::{FinishOutcome, GlobeConfig, GlobeController, Orchestrator, run_confirmed};
use layers::symbology::{ScoreBand, clamp_score};
use runtime::JobStatus;
use scene::{MemorySurface, Viewport};
use streaming::HttpBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score a square region around a point and summarize the heatmap")]
struct Args {
    /// Center latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Center longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Region side length in km (clamped to the configured range)
    #[arg(long)]
    side_km: Option<f64>,

    /// Scoring backend base URL (default: SCORING_BASE_URL or the hosted API)
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = GlobeConfig::from_env();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let center = GeoPoint::new(args.lat, args.lon)
        .ok_or_else(|| format!("invalid coordinate ({}, {})", args.lat, args.lon))?;

    // A view centered on the requested point; clicking the canvas center
    // selects it.
    let viewport = Viewport::new(center, 0.001, 1000.0, 1000.0);
    let click = viewport.geo_to_screen(center);

    let backend = HttpBackend::new(&config.base_url, config.request_timeout)?;
    let orchestrator = Orchestrator::new(backend, config.poll)
        .with_default_tile_width(config.tile_width_deg);
    let controller = RefCell::new(GlobeController::new(MemorySurface::new(viewport), &config));

    {
        let mut c = controller.borrow_mut();
        c.toggle_selection();
        if !c.on_click(click) {
            return Err("region center is not on the globe".into());
        }
        if let Some(km) = args.side_km {
            c.set_side_length(km);
        }
        info!(
            "scoring ({:.4}, {:.4}) with side {} km against {}",
            center.latitude(),
            center.longitude(),
            c.side_length_km(),
            config.base_url
        );
    }

    let outcome = run_confirmed(&controller, &orchestrator).await;
    let c = controller.borrow();
    match (outcome, c.status()) {
        (Some(FinishOutcome::Rendered(summary)), _) => {
            println!(
                "rendered {} tiles ({} without a score, {} duplicates)",
                summary.placed, summary.skipped_invalid, summary.skipped_duplicate
            );
            let mut bands: BTreeMap<u8, usize> = BTreeMap::new();
            for tile in c.tiles() {
                if let Some(band) = clamp_score(tile.score).and_then(ScoreBand::for_score) {
                    *bands.entry(band.level()).or_default() += 1;
                }
            }
            for (level, count) in bands {
                println!("  band {level}: {count}");
            }
            Ok(())
        }
        (_, JobStatus::Failed { stage, message }) => {
            Err(format!("{stage:?} failed: {message}").into())
        }
        (other, status) => Err(format!("job ended without results: {other:?} ({status:?})").into()),
    }
}
