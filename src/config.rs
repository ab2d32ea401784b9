//! Configuration for the page-tiler demo driver.
//!
//! All options can be set via command-line arguments or environment
//! variables with the `TILER_` prefix:
//!
//! - `TILER_VIEW_WIDTH` / `TILER_VIEW_HEIGHT` - viewport size in pixels
//! - `TILER_PAGE` - path to a JPEG page source (synthetic page if unset)
//! - `TILER_ZOOM_STEPS` - comma-separated zoom schedule (default: 1,2.5,4)
//! - `TILER_SPLIT_POLICY` - `zoom` or `area-limit`
//! - `TILER_AREA_CEILING` - per-tile area ceiling for `area-limit`
//! - `TILER_CACHE_SURFACES` - surface cache capacity in bytes
//! - `TILER_BRIGHTNESS` - display brightness, 0-100
//! - `TILER_OUTPUT` - path for the rendered frame

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::tile::{SplitPolicy, DEFAULT_AREA_CEILING, DEFAULT_SURFACE_CACHE_CAPACITY};

// =============================================================================
// Default Values
// =============================================================================

/// Default viewport width in pixels.
pub const DEFAULT_VIEW_WIDTH: u32 = 800;

/// Default viewport height in pixels.
pub const DEFAULT_VIEW_HEIGHT: u32 = 1000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Split policy selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Split when zoom exceeds a tile's threshold.
    Zoom,
    /// Split when a tile's estimated decode area exceeds the ceiling.
    AreaLimit,
}

impl fmt::Display for PolicyArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyArg::Zoom => write!(f, "zoom"),
            PolicyArg::AreaLimit => write!(f, "area-limit"),
        }
    }
}

/// page-tiler - level-of-detail tile rendering for paginated raster content.
///
/// Runs a scripted viewing session over one page: walks a zoom schedule,
/// letting the tile tree split, decode, and evict, then writes the final
/// composited frame as a JPEG.
#[derive(Parser, Debug, Clone)]
#[command(name = "page-tiler")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Viewport Configuration
    // =========================================================================
    /// Viewport width in pixels.
    #[arg(long, default_value_t = DEFAULT_VIEW_WIDTH, env = "TILER_VIEW_WIDTH")]
    pub view_width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = DEFAULT_VIEW_HEIGHT, env = "TILER_VIEW_HEIGHT")]
    pub view_height: u32,

    // =========================================================================
    // Page Source
    // =========================================================================
    /// Path to a JPEG file used as the page source.
    ///
    /// If not specified, a synthetic checkerboard page is rendered instead.
    #[arg(long, env = "TILER_PAGE")]
    pub page: Option<PathBuf>,

    // =========================================================================
    // Zoom and Split Configuration
    // =========================================================================
    /// Zoom levels to step through, in order.
    #[arg(
        long,
        default_value = "1.0,2.5,4.0",
        env = "TILER_ZOOM_STEPS",
        value_delimiter = ','
    )]
    pub zoom_steps: Vec<f32>,

    /// Policy deciding when tiles split into children.
    #[arg(long, value_enum, default_value_t = PolicyArg::Zoom, env = "TILER_SPLIT_POLICY")]
    pub split_policy: PolicyArg,

    /// Area ceiling for the area-limit policy, in estimated pixels per tile.
    #[arg(long, default_value_t = DEFAULT_AREA_CEILING, env = "TILER_AREA_CEILING")]
    pub area_ceiling: f32,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Surface cache capacity in bytes.
    #[arg(long, default_value_t = DEFAULT_SURFACE_CACHE_CAPACITY, env = "TILER_CACHE_SURFACES")]
    pub cache_surfaces: usize,

    // =========================================================================
    // Display Configuration
    // =========================================================================
    /// Display brightness, 0-100. Below 100 a dimming overlay is drawn.
    #[arg(long, default_value_t = 100, env = "TILER_BRIGHTNESS")]
    pub brightness: u8,

    /// Path for the rendered output frame (JPEG).
    #[arg(long, default_value = "frame.jpg", env = "TILER_OUTPUT")]
    pub output: PathBuf,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.view_width == 0 || self.view_height == 0 {
            return Err("viewport dimensions must be greater than 0".to_string());
        }

        if self.zoom_steps.is_empty() {
            return Err("at least one zoom step is required".to_string());
        }
        if self.zoom_steps.iter().any(|z| !z.is_finite() || *z <= 0.0) {
            return Err("zoom steps must be positive numbers".to_string());
        }

        if self.brightness > 100 {
            return Err("brightness must be between 0 and 100".to_string());
        }

        if self.cache_surfaces == 0 {
            return Err("cache_surfaces must be greater than 0".to_string());
        }

        if !self.area_ceiling.is_finite() || self.area_ceiling <= 0.0 {
            return Err("area_ceiling must be a positive number".to_string());
        }

        Ok(())
    }

    /// The split policy selected by this configuration.
    pub fn policy(&self) -> SplitPolicy {
        match self.split_policy {
            PolicyArg::Zoom => SplitPolicy::Zoom,
            PolicyArg::AreaLimit => SplitPolicy::AreaLimit {
                ceiling: self.area_ceiling,
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
