//! page-tiler - level-of-detail tile rendering demo driver.
//!
//! This binary runs a scripted viewing session over one page: it walks a
//! zoom schedule, letting the tile tree split, decode, and evict, and
//! writes the final composited frame as a JPEG.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use page_tiler::{
    AtomicProgress, Config, CountingRedraw, DecodeService, DecodingProgress, JpegPageCodec,
    PaintStyle, RectF, Rgba, SharedBrightness, SharedZoom, SimplePage, SoftwareCanvas,
    SurfaceCache, SyntheticCodec, TileNode, TileTree, ViewContext, FixedViewport,
    WorkerDecodeService, DEFAULT_ROOT_THRESHOLD,
};

/// Aspect ratio of the synthetic page used when no source file is given.
const SYNTHETIC_PAGE_ASPECT: f32 = 0.75;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), String> {
    info!("page-tiler v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Viewport: {}x{}", config.view_width, config.view_height);
    info!("  Zoom schedule: {:?}", config.zoom_steps);
    info!("  Split policy: {:?}", config.split_policy);
    info!(
        "  Surface cache: {}MB",
        config.cache_surfaces / (1024 * 1024)
    );

    // Decode completions flow through this queue back to the tree's thread.
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let (decoder, aspect): (Arc<dyn DecodeService>, f32) = match &config.page {
        Some(path) => {
            let bytes = std::fs::read(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            let codec = JpegPageCodec::from_jpeg_bytes(&bytes)
                .map_err(|e| format!("Failed to decode {}: {}", path.display(), e))?;
            let aspect = codec.aspect_ratio();
            info!("  Page source: {} (aspect {:.3})", path.display(), aspect);
            (Arc::new(WorkerDecodeService::new(codec, events_tx)), aspect)
        }
        None => {
            info!("  Page source: synthetic");
            let codec = SyntheticCodec::new(SYNTHETIC_PAGE_ASPECT);
            (
                Arc::new(WorkerDecodeService::new(codec, events_tx)),
                SYNTHETIC_PAGE_ASPECT,
            )
        }
    };

    let zoom = Arc::new(SharedZoom::new(config.zoom_steps[0]));
    let surfaces = Arc::new(SurfaceCache::with_capacity(config.cache_surfaces));
    let progress = Arc::new(AtomicProgress::new());
    let redraw = Arc::new(CountingRedraw::new());

    let ctx = Arc::new(
        ViewContext::new(
            decoder,
            Arc::clone(&zoom) as _,
            Arc::new(FixedViewport(config.view_width)),
        )
        .with_surfaces(Arc::clone(&surfaces))
        .with_progress(Arc::clone(&progress) as _)
        .with_redraw(Arc::clone(&redraw) as _)
        .with_brightness(Arc::new(SharedBrightness::new(config.brightness))),
    );

    let page = Arc::new(SimplePage::new(0, aspect));
    let mut tree = TileTree::new(
        ctx,
        Arc::clone(&page) as _,
        DEFAULT_ROOT_THRESHOLD,
        config.policy(),
        events_rx,
    );

    for (step, &zoom_level) in config.zoom_steps.iter().enumerate() {
        zoom.set(zoom_level);

        // Page layout at this zoom: anchored top-left, scaled uniformly.
        let page_width = config.view_width as f32 * zoom_level;
        page.set_bounds(RectF::new(0.0, 0.0, page_width, page_width / aspect));

        tree.update_visibility();

        // Apply completions until the tree settles; each applied result can
        // newly satisfy a split or recycle condition, so reconcile after
        // every one.
        while progress.current() > 0 {
            if !tree.next_completion().await {
                return Err("Decode service shut down unexpectedly".to_string());
            }
            tree.pump_completions();
            tree.update_visibility();
        }

        info!(
            step,
            zoom = zoom_level,
            tiles = count_tiles(tree.root()),
            cached_surfaces = surfaces.len(),
            cache_bytes = surfaces.size(),
            redraws = redraw.count(),
            "zoom step settled"
        );
    }

    // Composite the final frame for the top-left corner of the page.
    let mut canvas = SoftwareCanvas::new(config.view_width, config.view_height, Rgba::WHITE);
    let view_rect = RectF::new(
        0.0,
        0.0,
        config.view_width as f32,
        config.view_height as f32,
    );
    tree.draw(&mut canvas, view_rect, &PaintStyle::day());

    write_jpeg(canvas, &config)?;
    info!("Frame written to {}", config.output.display());

    Ok(())
}

/// Count the tiles currently alive in a subtree.
fn count_tiles(node: &TileNode) -> usize {
    1 + node
        .children()
        .map(|children| children.iter().map(count_tiles).sum())
        .unwrap_or(0)
}

/// Encode the canvas as JPEG and write it to the configured output path.
fn write_jpeg(canvas: SoftwareCanvas, config: &Config) -> Result<(), String> {
    let rgb = image::DynamicImage::ImageRgba8(canvas.into_image()).to_rgb8();
    let mut encoded = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, 90)
        .encode_image(&rgb)
        .map_err(|e| format!("Failed to encode frame: {}", e))?;
    std::fs::write(&config.output, encoded)
        .map_err(|e| format!("Failed to write {}: {}", config.output.display(), e))
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "page_tiler=debug"
    } else {
        "page_tiler=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
