//! Boundary to the simulation engine.
//!
//! The viewer only ever talks to an [`Engine`]: it advances it, then reads a
//! fresh snapshot, entity list and history for the next frame. Everything
//! returned here is owned by the engine and borrowed by the renderer until the
//! next `advance` call.

pub mod synthetic;

use serde::{Deserialize, Serialize};

use crate::biomes::Biome;
use crate::error::EngineError;

pub use synthetic::{SyntheticConfig, SyntheticEngine};

/// Which simulation model the world represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Nations, settlements and a chronicle of events, keyed by year.
    Civilization,
    /// Species of creatures grazing and hunting, keyed by tick.
    Ecology,
}

/// One grid cell as seen by the renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    /// `None` when the engine reported a biome name the viewer does not know.
    pub biome: Option<Biome>,
    /// Normalized elevation, negative below sea level.
    pub altitude: f32,
    pub temperature: f32,
    pub rainfall: f32,
    pub owner_id: Option<u64>,
    pub settlement_id: Option<u64>,
}

/// Full tile grid for one frame.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub width: u32,
    pub height: u32,
    /// Identity of the generated world. Changes only when the world is regenerated.
    pub generation: u64,
    /// Bumped whenever tile ownership or settlement placement changes.
    pub territory_revision: u64,
    /// Row-major, `width * height` entries.
    pub tiles: Vec<Tile>,
}

impl WorldSnapshot {
    pub fn tile(&self, x: i64, y: i64) -> Option<&Tile> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.tiles.get(y as usize * self.width as usize + x as usize)
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub name: String,
    pub population: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatureSummary {
    pub id: u64,
    pub species: String,
    pub diet: DietClass,
    pub energy: f32,
    pub size: f32,
}

/// On-demand detail for a single coordinate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileInfo {
    pub x: u32,
    pub y: u32,
    pub biome: Option<Biome>,
    pub altitude: f32,
    pub temperature: f32,
    pub rainfall: f32,
    pub plant_biomass: Option<f32>,
    pub resources: Vec<String>,
    pub settlement: Option<SettlementSummary>,
    pub nation_name: Option<String>,
    pub creatures: Vec<CreatureSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NationEntity {
    pub id: u64,
    pub name: String,
    pub color: [u8; 3],
    pub government: String,
    pub population: u64,
    pub territory: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementEntity {
    pub id: u64,
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub population: u32,
    pub nation_id: Option<u64>,
    pub color: [u8; 3],
    pub capital: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Nation(NationEntity),
    Settlement(SettlementEntity),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietClass {
    Herbivore,
    Omnivore,
    Carnivore,
}

impl DietClass {
    pub fn from_diet(diet: f32) -> Self {
        if diet < 0.4 {
            DietClass::Herbivore
        } else if diet > 0.6 {
            DietClass::Carnivore
        } else {
            DietClass::Omnivore
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DietClass::Herbivore => "Herbivore",
            DietClass::Omnivore => "Omnivore",
            DietClass::Carnivore => "Carnivore",
        }
    }
}

/// Fixed-layout view of one creature in the packed buffer.
///
/// Layout per creature: `[x, y, r, g, b, size, diet, energy]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreatureRecord {
    pub x: f32,
    pub y: f32,
    pub color: [u8; 3],
    pub size: f32,
    pub diet: f32,
    pub energy: f32,
}

impl CreatureRecord {
    pub const STRIDE: usize = 8;

    /// Decode every complete record. A trailing partial record is ignored.
    pub fn decode_all(buffer: &[f32]) -> Vec<CreatureRecord> {
        buffer.chunks_exact(Self::STRIDE).map(Self::decode).collect()
    }

    fn decode(chunk: &[f32]) -> CreatureRecord {
        let channel = |v: f32| v.clamp(0.0, 255.0) as u8;
        CreatureRecord {
            x: chunk[0],
            y: chunk[1],
            color: [channel(chunk[2]), channel(chunk[3]), channel(chunk[4])],
            size: chunk[5],
            diet: chunk[6],
            energy: chunk[7],
        }
    }

    pub fn encode_into(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&[
            self.x,
            self.y,
            self.color[0] as f32,
            self.color[1] as f32,
            self.color[2] as f32,
            self.size,
            self.diet,
            self.energy,
        ]);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationSample {
    pub tick: u64,
    pub total: u32,
    pub herbivores: u32,
    pub carnivores: u32,
    pub species_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChronicleEntry {
    pub year: i64,
    pub description: String,
}

/// One time-stamped history sample. Append-only, ordered by time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum HistoryPoint {
    Population(PopulationSample),
    Event(ChronicleEntry),
}

impl HistoryPoint {
    pub fn time(&self) -> i64 {
        match self {
            HistoryPoint::Population(sample) => sample.tick as i64,
            HistoryPoint::Event(entry) => entry.year,
        }
    }

    pub fn as_population(&self) -> Option<&PopulationSample> {
        match self {
            HistoryPoint::Population(sample) => Some(sample),
            HistoryPoint::Event(_) => None,
        }
    }
}

/// Aggregate counters for the status line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub time: i64,
    pub population: u64,
    pub nations: u32,
    pub settlements: u32,
    pub cultures: u32,
    pub species: u32,
    pub events: u32,
}

/// Capability contract of a simulation engine.
pub trait Engine {
    fn variant(&self) -> Variant;

    /// Generate a new world. Replaces any previous one.
    fn initialize(&mut self, width: u32, height: u32, seed: u64) -> Result<(), EngineError>;

    /// Advance by `ticks`. Fails when the engine is not in a state to advance.
    fn advance(&mut self, ticks: u32) -> Result<(), EngineError>;

    /// Current tick or year.
    fn current_time(&self) -> i64;

    fn snapshot(&self) -> Option<&WorldSnapshot>;

    fn statistics(&self) -> Statistics;

    fn entities(&self) -> Vec<Entity>;

    fn history(&self) -> &[HistoryPoint];

    /// `None` for out-of-bounds or ungenerated coordinates.
    fn tile_info(&self, x: i64, y: i64) -> Option<TileInfo>;

    /// Packed creature buffer, see [`CreatureRecord`].
    fn creature_buffer(&self) -> Option<&[f32]> {
        None
    }

    /// Engine-colored terrain, three bytes (`r, g, b`) per tile in row-major
    /// order. When present the biome view shows it instead of the viewer's
    /// own palette.
    fn terrain_buffer(&self) -> Option<&[u8]> {
        None
    }

    /// Registered color of a nation, used by the political view.
    fn nation_color(&self, _nation_id: u64) -> Option<[u8; 3]> {
        None
    }
}
