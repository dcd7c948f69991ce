use clap::{Parser, ValueEnum};
use market_scene::{LayoutPolicy, SceneSettings};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutKind {
    /// Evenly spaced on a horizontal circle.
    Ring,
    /// Uniformly random inside a cube around the origin.
    Random,
}

/// `market_viewer` - shows a market snapshot as a ring of spinning spheres.
///
/// Each entity in the data file becomes a translucent sphere with its logo
/// inside and a floating label carrying its name and price.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Path to a JSON array of entity records.
    ///
    /// Records need `name`, `symbol` and `price` (or `current_price`), and
    /// may carry an icon reference in `icon_ref` (or `image`).
    #[arg(long, env = "MARKET_DATA_PATH")]
    pub data_path: PathBuf,

    /// How entities are placed in the scene.
    #[arg(long, env = "MARKET_LAYOUT", value_enum, default_value_t = LayoutKind::Ring)]
    pub layout: LayoutKind,

    /// Radius of the ring layout, in world units.
    #[arg(long, default_value_t = 10.0, value_parser = parse_extent)]
    pub ring_radius: f32,

    /// Half the edge length of the random layout cube, in world units.
    #[arg(long, default_value_t = 15.0, value_parser = parse_extent)]
    pub volume_half_extent: f32,

    /// Seed for the random layout, for reproducible scenes.
    #[arg(long)]
    pub layout_seed: Option<u64>,

    /// Re-read the data file every N seconds and rebuild the scene.
    #[arg(long, env = "MARKET_REFRESH_SECS")]
    pub refresh_secs: Option<u64>,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

/// World-space distances must be finite and non-negative.
fn parse_extent(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("`{s}` must be a finite, non-negative distance"));
    }
    Ok(value)
}

impl Config {
    pub fn layout_policy(&self) -> LayoutPolicy {
        match self.layout {
            LayoutKind::Ring => LayoutPolicy::Ring {
                radius: self.ring_radius,
            },
            LayoutKind::Random => LayoutPolicy::RandomVolume {
                half_extent: self.volume_half_extent,
            },
        }
    }

    pub fn scene_settings(&self) -> SceneSettings {
        SceneSettings {
            layout_seed: self.layout_seed,
            ..SceneSettings::default()
        }
    }

    /// `None` disables refreshing; a zero interval counts as disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
