//! Tile colorizer: `(tile attributes, view mode) -> RGB`.
//!
//! Each view mode maps to one pure function in [`MODE_TABLE`]. Every
//! fractional channel is clamped to [0, 255] and then floored, so identical
//! inputs produce identical bytes on every path.

use serde::{Deserialize, Serialize};

use crate::biomes::Biome;

pub type Rgb = [u8; 3];

pub const FALLBACK_COLOR: Rgb = [128, 128, 128];
pub const SETTLEMENT_HIGHLIGHT: Rgb = [255, 215, 0];

/// Temperature range mapped onto the cold → hot ramp, °C.
const TEMPERATURE_MIN: f32 = -40.0;
const TEMPERATURE_SPAN: f32 = 80.0;
/// Rainfall at which the dry → wet ramp saturates, mm/year.
const RAINFALL_MAX: f32 = 4000.0;

/// Active tile-to-color strategy. Deserializes from any string; unknown
/// names become `Biome`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ViewMode {
    Political,
    Biome,
    Terrain,
    Temperature,
    Rainfall,
    Population,
}

impl ViewMode {
    pub const ALL: [ViewMode; 6] = [
        ViewMode::Political,
        ViewMode::Biome,
        ViewMode::Terrain,
        ViewMode::Temperature,
        ViewMode::Rainfall,
        ViewMode::Population,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Political => "Political",
            ViewMode::Biome => "Biome",
            ViewMode::Terrain => "Terrain",
            ViewMode::Temperature => "Temperature",
            ViewMode::Rainfall => "Rainfall",
            ViewMode::Population => "Population",
        }
    }

    /// Parse a mode name from the UI. Unrecognized names behave as `Biome`.
    pub fn from_name(name: &str) -> ViewMode {
        ViewMode::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(ViewMode::Biome)
    }

    /// Modes whose colors depend on ownership or settlement placement.
    pub fn depends_on_territory(&self) -> bool {
        matches!(self, ViewMode::Political | ViewMode::Population)
    }

    pub fn next(&self) -> ViewMode {
        let idx = ViewMode::ALL.iter().position(|m| m == self).unwrap_or(0);
        ViewMode::ALL[(idx + 1) % ViewMode::ALL.len()]
    }
}

impl From<String> for ViewMode {
    fn from(name: String) -> Self {
        ViewMode::from_name(&name)
    }
}

/// Everything the colorizer needs to know about one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileAttributes {
    pub biome: Option<Biome>,
    pub altitude: f32,
    pub temperature: f32,
    pub rainfall: f32,
    /// Registered color of the owning nation, if any.
    pub owner_color: Option<Rgb>,
    pub has_settlement: bool,
}

type ColorFn = fn(&TileAttributes) -> Rgb;

pub const MODE_TABLE: [(ViewMode, ColorFn); 6] = [
    (ViewMode::Political, political_color),
    (ViewMode::Biome, biome_color),
    (ViewMode::Terrain, terrain_color),
    (ViewMode::Temperature, temperature_color),
    (ViewMode::Rainfall, rainfall_color),
    (ViewMode::Population, population_color),
];

pub fn colorize(tile: &TileAttributes, mode: ViewMode) -> Rgb {
    MODE_TABLE
        .iter()
        .find(|(m, _)| *m == mode)
        .map(|(_, f)| f(tile))
        .unwrap_or_else(|| biome_color(tile))
}

/// Clamp into [0, 255] and floor.
#[inline]
fn channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).floor() as u8
}

pub fn biome_color(tile: &TileAttributes) -> Rgb {
    tile.biome.map(|b| b.color()).unwrap_or(FALLBACK_COLOR)
}

pub fn political_color(tile: &TileAttributes) -> Rgb {
    tile.owner_color.unwrap_or_else(|| biome_color(tile))
}

/// Water darkens with depth, land lightens with elevation.
pub fn terrain_color(tile: &TileAttributes) -> Rgb {
    let altitude = tile.altitude;
    if altitude < 0.0 {
        let depth = channel(altitude.abs() * 100.0) as i32;
        [0, (100 - depth).max(50) as u8, (200 - depth).max(150) as u8]
    } else {
        let normalized = channel(((altitude + 1.0) / 2.0).clamp(0.0, 1.0) * 255.0) as u32;
        [
            (100 + normalized / 3).min(255) as u8,
            (80 + normalized / 4).min(200) as u8,
            60,
        ]
    }
}

/// Blue (cold) to red (hot).
pub fn temperature_color(tile: &TileAttributes) -> Rgb {
    let t = ((tile.temperature - TEMPERATURE_MIN) / TEMPERATURE_SPAN).clamp(0.0, 1.0);
    let t = if t.is_nan() { 0.0 } else { t };
    [channel(t * 255.0), 50, channel((1.0 - t) * 255.0)]
}

/// Brown (dry) to blue (wet).
pub fn rainfall_color(tile: &TileAttributes) -> Rgb {
    let r = (tile.rainfall / RAINFALL_MAX).clamp(0.0, 1.0);
    let r = if r.is_nan() { 0.0 } else { r };
    [
        channel((1.0 - r) * 200.0),
        channel((1.0 - r) * 150.0),
        channel(r * 255.0),
    ]
}

pub fn population_color(tile: &TileAttributes) -> Rgb {
    if tile.has_settlement {
        SETTLEMENT_HIGHLIGHT
    } else {
        biome_color(tile)
    }
}
