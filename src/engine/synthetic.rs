//! Deterministic stand-in engine.
//!
//! Generates a noise terrain and a small amount of moving state for either
//! variant so the viewer has something to render without an external
//! simulation. Same seed, same sequence of frames.

use noise::{NoiseFn, Perlin, Seedable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    ChronicleEntry, CreatureRecord, CreatureSummary, DietClass, Engine, Entity, HistoryPoint,
    NationEntity, PopulationSample, SettlementEntity, SettlementSummary, Statistics, Tile, TileInfo,
    Variant, WorldSnapshot,
};
use crate::biomes::Biome;
use crate::error::EngineError;
use crate::tilemap::Tilemap;

const MAX_DIMENSION: u32 = 4096;
const CREATURE_MAX_AGE: u32 = 400;
const SYLLABLES: [&str; 16] = [
    "ka", "lo", "mi", "ra", "to", "vex", "zan", "qui", "bor", "eth", "ul", "dra", "sen", "mor",
    "ta", "lin",
];
const GOVERNMENTS: [&str; 5] = ["Monarchy", "Republic", "Theocracy", "Confederation", "Oligarchy"];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub nations: u32,
    pub herbivore_species: u32,
    pub carnivore_species: u32,
    pub creatures_per_species: u32,
    pub max_creatures: usize,
    /// Ticks between population history samples.
    pub history_interval: u64,
    pub max_history: usize,
    /// Entries dropped from the front once `max_history` is exceeded.
    pub history_trim: usize,
    /// Largest single `advance` request accepted.
    pub max_advance: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            nations: 8,
            herbivore_species: 5,
            carnivore_species: 2,
            creatures_per_species: 40,
            max_creatures: 12_000,
            history_interval: 10,
            max_history: 500,
            history_trim: 100,
            max_advance: 100_000,
        }
    }
}

struct Nation {
    id: u64,
    name: String,
    color: [u8; 3],
    government: &'static str,
    territory: Vec<(usize, usize)>,
}

struct Settlement {
    id: u64,
    name: String,
    x: usize,
    y: usize,
    population: f32,
    nation_id: u64,
    capital: bool,
}

struct Species {
    name: String,
    color: [u8; 3],
}

#[derive(Clone)]
struct Creature {
    id: u64,
    species: usize,
    x: f32,
    y: f32,
    size: f32,
    diet: f32,
    energy: f32,
    age: u32,
}

struct World {
    snapshot: WorldSnapshot,
    plant_biomass: Tilemap<f32>,
    nations: Vec<Nation>,
    settlements: Vec<Settlement>,
    species: Vec<Species>,
    creatures: Vec<Creature>,
    creature_buffer: Vec<f32>,
    /// Ecology palette per tile, empty for civilization worlds.
    terrain_rgb: Vec<u8>,
}

impl World {
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.snapshot.width as usize + x
    }

    fn tile(&self, x: usize, y: usize) -> &Tile {
        &self.snapshot.tiles[self.index(x, y)]
    }

    fn is_land(&self, x: usize, y: usize) -> bool {
        self.tile(x, y).biome.map(|b| !b.is_water()).unwrap_or(false)
    }
}

pub struct SyntheticEngine {
    variant: Variant,
    config: SyntheticConfig,
    rng: ChaCha8Rng,
    world: Option<World>,
    time: u64,
    generation: u64,
    next_id: u64,
    history: Vec<HistoryPoint>,
}

impl SyntheticEngine {
    pub fn new(variant: Variant) -> Self {
        Self::with_config(variant, SyntheticConfig::default())
    }

    pub fn with_config(variant: Variant, config: SyntheticConfig) -> Self {
        Self {
            variant,
            config,
            rng: ChaCha8Rng::seed_from_u64(0),
            world: None,
            time: 0,
            generation: 0,
            next_id: 1,
            history: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn random_name(&mut self, syllables: usize) -> String {
        let mut name = String::new();
        for _ in 0..syllables {
            name.push_str(SYLLABLES[self.rng.gen_range(0..SYLLABLES.len())]);
        }
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => name,
        }
    }

    fn random_color(&mut self) -> [u8; 3] {
        [
            self.rng.gen_range(60..=235),
            self.rng.gen_range(60..=235),
            self.rng.gen_range(60..=235),
        ]
    }

    fn random_land_tile(&mut self, world: &World) -> Option<(usize, usize)> {
        let (width, height) = world.snapshot.dimensions();
        for _ in 0..2000 {
            let x = self.rng.gen_range(0..width);
            let y = self.rng.gen_range(0..height);
            if world.is_land(x, y) && world.tile(x, y).owner_id.is_none() {
                return Some((x, y));
            }
        }
        None
    }

    fn populate_civilization(&mut self, world: &mut World) {
        for _ in 0..self.config.nations {
            let Some((x, y)) = self.random_land_tile(world) else {
                break;
            };
            let nation_id = self.allocate_id();
            let settlement_id = self.allocate_id();
            let nation = Nation {
                id: nation_id,
                name: self.random_name(2),
                color: self.random_color(),
                government: GOVERNMENTS[self.rng.gen_range(0..GOVERNMENTS.len())],
                territory: vec![(x, y)],
            };
            let settlement = Settlement {
                id: settlement_id,
                name: self.random_name(3),
                x,
                y,
                population: self.rng.gen_range(800.0..2500.0),
                nation_id,
                capital: true,
            };
            let idx = world.index(x, y);
            world.snapshot.tiles[idx].owner_id = Some(nation_id);
            world.snapshot.tiles[idx].settlement_id = Some(settlement_id);
            self.push_history(HistoryPoint::Event(ChronicleEntry {
                year: self.time as i64,
                description: format!("{} founded {}", nation.name, settlement.name),
            }));
            world.nations.push(nation);
            world.settlements.push(settlement);
        }
        world.snapshot.territory_revision += 1;
    }

    fn populate_ecology(&mut self, world: &mut World) {
        world.terrain_rgb = world
            .snapshot
            .tiles
            .iter()
            .flat_map(|t| t.biome.map(|b| b.ecology_color()).unwrap_or([0, 0, 0]))
            .collect();

        let herbivores = self.config.herbivore_species;
        let carnivores = self.config.carnivore_species;
        for s in 0..(herbivores + carnivores) {
            let carnivore = s >= herbivores;
            let species = Species {
                name: self.random_name(2),
                color: self.random_color(),
            };
            let species_idx = world.species.len();
            world.species.push(species);

            let Some((cx, cy)) = self.random_land_tile(world) else {
                continue;
            };
            for _ in 0..self.config.creatures_per_species {
                let id = self.allocate_id();
                let creature = Creature {
                    id,
                    species: species_idx,
                    x: cx as f32 + self.rng.gen_range(0.0..1.0),
                    y: cy as f32 + self.rng.gen_range(0.0..1.0),
                    size: self.rng.gen_range(0.6..2.0),
                    diet: if carnivore {
                        self.rng.gen_range(0.7..1.0)
                    } else {
                        self.rng.gen_range(0.0..0.3)
                    },
                    energy: self.rng.gen_range(30.0..60.0),
                    age: 0,
                };
                world.creatures.push(creature);
            }
        }
        rebuild_creature_buffer(world);
        self.record_population_sample(world);
    }

    fn step_civilization(&mut self, world: &mut World) {
        let mut changed = false;

        for n in 0..world.nations.len() {
            if !self.rng.gen_bool(0.3) || world.nations[n].territory.is_empty() {
                continue;
            }
            let pick = self.rng.gen_range(0..world.nations[n].territory.len());
            let (x, y) = world.nations[n].territory[pick];
            let neighbors = world.plant_biomass.neighbors(x, y);
            if neighbors.is_empty() {
                continue;
            }
            let (nx, ny) = neighbors[self.rng.gen_range(0..neighbors.len())];
            if world.is_land(nx, ny) && world.tile(nx, ny).owner_id.is_none() {
                let idx = world.index(nx, ny);
                world.snapshot.tiles[idx].owner_id = Some(world.nations[n].id);
                world.nations[n].territory.push((nx, ny));
                changed = true;
            }
        }

        for settlement in world.settlements.iter_mut() {
            let growth = 1.0 + self.rng.gen_range(0.0..0.02);
            settlement.population = (settlement.population * growth).min(250_000.0);
        }

        if self.time % 25 == 0 {
            for n in 0..world.nations.len() {
                if world.nations[n].territory.len() < 12 {
                    continue;
                }
                let pick = self.rng.gen_range(0..world.nations[n].territory.len());
                let (x, y) = world.nations[n].territory[pick];
                if world.tile(x, y).settlement_id.is_some() {
                    continue;
                }
                let id = self.allocate_id();
                let name = self.random_name(3);
                let idx = world.index(x, y);
                world.snapshot.tiles[idx].settlement_id = Some(id);
                self.push_history(HistoryPoint::Event(ChronicleEntry {
                    year: self.time as i64,
                    description: format!("{} founded {}", world.nations[n].name, name),
                }));
                world.settlements.push(Settlement {
                    id,
                    name,
                    x,
                    y,
                    population: 300.0,
                    nation_id: world.nations[n].id,
                    capital: false,
                });
                changed = true;
            }
        }

        if changed {
            world.snapshot.territory_revision += 1;
        }
    }

    fn step_ecology(&mut self, world: &mut World) {
        let (width, height) = world.snapshot.dimensions();

        for (i, biomass) in world.plant_biomass.as_mut_slice().iter_mut().enumerate() {
            let capacity = world.snapshot.tiles[i]
                .biome
                .map(|b| b.max_plant_biomass())
                .unwrap_or(0.0);
            *biomass += (capacity - *biomass) * 0.02;
        }

        let mut offspring = Vec::new();
        let mut creatures = std::mem::take(&mut world.creatures);
        let population = creatures.len();
        for creature in creatures.iter_mut() {
            let tx = (creature.x + self.rng.gen_range(-0.6..0.6)).clamp(0.0, width as f32 - 0.01);
            let ty = (creature.y + self.rng.gen_range(-0.6..0.6)).clamp(0.0, height as f32 - 0.01);
            if world.is_land(tx as usize, ty as usize) {
                creature.x = tx;
                creature.y = ty;
            }

            creature.age += 1;
            creature.energy -= 0.4 * creature.size;
            let (cx, cy) = (creature.x as usize, creature.y as usize);
            match DietClass::from_diet(creature.diet) {
                DietClass::Carnivore => {
                    if self.rng.gen_bool(0.12) {
                        creature.energy += 6.0;
                    }
                }
                _ => {
                    let biomass = world.plant_biomass.get_mut(cx, cy);
                    let eaten = biomass.min(1.5);
                    *biomass -= eaten;
                    creature.energy += eaten;
                }
            }

            if creature.energy > 80.0 && population + offspring.len() < self.config.max_creatures {
                creature.energy /= 2.0;
                let mut child = creature.clone();
                child.id = self.next_id;
                self.next_id += 1;
                child.age = 0;
                child.size = (child.size + self.rng.gen_range(-0.1..0.1)).max(0.3);
                child.diet = (child.diet + self.rng.gen_range(-0.03..0.03)).clamp(0.0, 1.0);
                offspring.push(child);
            }
        }
        creatures.retain(|c| c.energy > 0.0 && c.age < CREATURE_MAX_AGE);
        let room = self.config.max_creatures.saturating_sub(creatures.len());
        creatures.extend(offspring.into_iter().take(room));
        world.creatures = creatures;

        rebuild_creature_buffer(world);
        if self.time % self.config.history_interval.max(1) == 0 {
            self.record_population_sample(world);
        }
    }

    fn record_population_sample(&mut self, world: &World) {
        let herbivores = world.creatures.iter().filter(|c| c.diet < 0.4).count() as u32;
        let carnivores = world.creatures.iter().filter(|c| c.diet > 0.6).count() as u32;
        self.push_history(HistoryPoint::Population(PopulationSample {
            tick: self.time,
            total: world.creatures.len() as u32,
            herbivores,
            carnivores,
            species_count: living_species(world),
        }));
    }

    /// Append, dropping the oldest `history_trim` entries past `max_history`.
    fn push_history(&mut self, point: HistoryPoint) {
        self.history.push(point);
        if self.history.len() > self.config.max_history {
            let trim = self.config.history_trim.clamp(1, self.history.len());
            self.history.drain(0..trim);
        }
    }
}

fn living_species(world: &World) -> u32 {
    let mut alive = vec![false; world.species.len()];
    for creature in &world.creatures {
        alive[creature.species] = true;
    }
    alive.into_iter().filter(|a| *a).count() as u32
}

fn rebuild_creature_buffer(world: &mut World) {
    world.creature_buffer.clear();
    world.creature_buffer.reserve(world.creatures.len() * CreatureRecord::STRIDE);
    for creature in &world.creatures {
        let color = world.species[creature.species].color;
        CreatureRecord {
            x: creature.x,
            y: creature.y,
            color,
            size: creature.size,
            diet: creature.diet,
            energy: creature.energy,
        }
        .encode_into(&mut world.creature_buffer);
    }
}

/// Fractal noise sample in roughly [-1, 1].
fn fbm(noise: &Perlin, x: f64, y: f64, octaves: u32) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut norm = 0.0;
    for _ in 0..octaves {
        total += noise.get([x * frequency, y * frequency]) * amplitude;
        norm += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    total / norm
}

fn generate_terrain(width: usize, height: usize, seed: u64, generation: u64) -> World {
    let terrain_noise = Perlin::new(1).set_seed(seed as u32);
    let rain_noise = Perlin::new(1).set_seed((seed as u32).wrapping_add(1111));
    let heat_noise = Perlin::new(1).set_seed((seed as u32).wrapping_add(2222));

    let aspect = width as f64 / height.max(1) as f64;
    let altitude = Tilemap::from_fn(width, height, |x, y| {
        let nx = x as f64 / width as f64 * 4.0 * aspect;
        let ny = y as f64 / height as f64 * 4.0;
        ((fbm(&terrain_noise, nx, ny, 5) * 1.6 - 0.05) as f32).clamp(-1.0, 1.0)
    });

    let mut tiles = Vec::with_capacity(width * height);
    let mut plant_biomass = Tilemap::new_with(width, height, 0.0f32);
    for y in 0..height {
        // 0 at the equator, 1 at the poles
        let latitude = ((y as f32 + 0.5) / height as f32 - 0.5).abs() * 2.0;
        for x in 0..width {
            let alt = *altitude.get(x, y);
            let nx = x as f64 / width as f64 * 6.0;
            let ny = y as f64 / height as f64 * 3.0;
            let temperature = 30.0 - 60.0 * latitude.powf(1.3) - alt.max(0.0) * 25.0
                + heat_noise.get([nx, ny]) as f32 * 3.0;
            let wetness = (fbm(&rain_noise, nx, ny, 3) as f32 + 1.0) * 0.5;
            let rainfall = (wetness * 3200.0 * (1.0 - latitude * 0.5)).max(0.0);
            let biome = Biome::classify(alt, temperature, rainfall);
            plant_biomass.set(x, y, biome.max_plant_biomass() * 0.5);
            tiles.push(Tile {
                x: x as u32,
                y: y as u32,
                biome: Some(biome),
                altitude: alt,
                temperature,
                rainfall,
                owner_id: None,
                settlement_id: None,
            });
        }
    }

    World {
        snapshot: WorldSnapshot {
            width: width as u32,
            height: height as u32,
            generation,
            territory_revision: 0,
            tiles,
        },
        plant_biomass,
        nations: Vec::new(),
        settlements: Vec::new(),
        species: Vec::new(),
        creatures: Vec::new(),
        creature_buffer: Vec::new(),
        terrain_rgb: Vec::new(),
    }
}

fn resources_for(biome: Biome) -> &'static [&'static str] {
    match biome {
        Biome::Ocean | Biome::CoastalWaters => &["Fish"],
        Biome::DeepOcean | Biome::IceCap => &[],
        Biome::Tundra => &["Furs"],
        Biome::Taiga => &["Wood", "Furs"],
        Biome::Grassland => &["Grain", "Horses"],
        Biome::Savanna => &["Cattle", "Ivory"],
        Biome::Desert => &["Salt"],
        Biome::Forest => &["Wood", "Game"],
        Biome::Rainforest => &["Spices", "Fruit"],
        Biome::Mountains => &["Iron", "Stone"],
        Biome::Hills => &["Copper", "Stone"],
        Biome::Wetlands => &["Clay", "Dyes"],
    }
}

impl Engine for SyntheticEngine {
    fn variant(&self) -> Variant {
        self.variant
    }

    fn initialize(&mut self, width: u32, height: u32, seed: u64) -> Result<(), EngineError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        info!(width, height, seed, variant = ?self.variant, "generating world");

        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.time = 0;
        self.next_id = 1;
        self.history.clear();
        self.generation += 1;

        let mut world = generate_terrain(width as usize, height as usize, seed, self.generation);
        match self.variant {
            Variant::Civilization => self.populate_civilization(&mut world),
            Variant::Ecology => self.populate_ecology(&mut world),
        }
        debug!(
            nations = world.nations.len(),
            creatures = world.creatures.len(),
            "world populated"
        );
        self.world = Some(world);
        Ok(())
    }

    fn advance(&mut self, ticks: u32) -> Result<(), EngineError> {
        if ticks == 0 || ticks > self.config.max_advance {
            return Err(EngineError::InvalidAdvance {
                requested: ticks,
                reason: format!("must be between 1 and {}", self.config.max_advance),
            });
        }
        let mut world = self.world.take().ok_or(EngineError::NotInitialized)?;
        for _ in 0..ticks {
            self.time += 1;
            match self.variant {
                Variant::Civilization => self.step_civilization(&mut world),
                Variant::Ecology => self.step_ecology(&mut world),
            }
        }
        self.world = Some(world);
        Ok(())
    }

    fn current_time(&self) -> i64 {
        self.time as i64
    }

    fn snapshot(&self) -> Option<&WorldSnapshot> {
        self.world.as_ref().map(|w| &w.snapshot)
    }

    fn statistics(&self) -> Statistics {
        let Some(world) = self.world.as_ref() else {
            return Statistics::default();
        };
        let events = self
            .history
            .iter()
            .filter(|p| matches!(p, HistoryPoint::Event(_)))
            .count() as u32;
        match self.variant {
            Variant::Civilization => Statistics {
                time: self.current_time(),
                population: world.settlements.iter().map(|s| s.population as u64).sum(),
                nations: world.nations.len() as u32,
                settlements: world.settlements.len() as u32,
                cultures: world.nations.len() as u32,
                species: 0,
                events,
            },
            Variant::Ecology => Statistics {
                time: self.current_time(),
                population: world.creatures.len() as u64,
                species: living_species(world),
                ..Statistics::default()
            },
        }
    }

    fn entities(&self) -> Vec<Entity> {
        let Some(world) = self.world.as_ref() else {
            return Vec::new();
        };
        let nations = world.nations.iter().map(|n| {
            Entity::Nation(NationEntity {
                id: n.id,
                name: n.name.clone(),
                color: n.color,
                government: n.government.to_string(),
                population: world
                    .settlements
                    .iter()
                    .filter(|s| s.nation_id == n.id)
                    .map(|s| s.population as u64)
                    .sum(),
                territory: n.territory.len() as u32,
            })
        });
        let settlements = world.settlements.iter().map(|s| {
            let color = world
                .nations
                .iter()
                .find(|n| n.id == s.nation_id)
                .map(|n| n.color)
                .unwrap_or([255, 255, 255]);
            Entity::Settlement(SettlementEntity {
                id: s.id,
                name: s.name.clone(),
                x: s.x as u32,
                y: s.y as u32,
                population: s.population as u32,
                nation_id: Some(s.nation_id),
                color,
                capital: s.capital,
            })
        });
        nations.chain(settlements).collect()
    }

    fn history(&self) -> &[HistoryPoint] {
        &self.history
    }

    fn tile_info(&self, x: i64, y: i64) -> Option<TileInfo> {
        let world = self.world.as_ref()?;
        let tile = world.snapshot.tile(x, y)?;
        let (tx, ty) = (tile.x as usize, tile.y as usize);

        let settlement = tile
            .settlement_id
            .and_then(|id| world.settlements.iter().find(|s| s.id == id))
            .map(|s| SettlementSummary {
                name: s.name.clone(),
                population: s.population as u32,
            });
        let nation_name = tile
            .owner_id
            .and_then(|id| world.nations.iter().find(|n| n.id == id))
            .map(|n| n.name.clone());
        let creatures = world
            .creatures
            .iter()
            .filter(|c| c.x as usize == tx && c.y as usize == ty)
            .take(20)
            .map(|c| CreatureSummary {
                id: c.id,
                species: world.species[c.species].name.clone(),
                diet: DietClass::from_diet(c.diet),
                energy: c.energy,
                size: c.size,
            })
            .collect();

        Some(TileInfo {
            x: tile.x,
            y: tile.y,
            biome: tile.biome,
            altitude: tile.altitude,
            temperature: tile.temperature,
            rainfall: tile.rainfall,
            plant_biomass: match self.variant {
                Variant::Ecology => Some(*world.plant_biomass.get(tx, ty)),
                Variant::Civilization => None,
            },
            resources: tile
                .biome
                .map(|b| resources_for(b).iter().map(|r| r.to_string()).collect())
                .unwrap_or_default(),
            settlement,
            nation_name,
            creatures,
        })
    }

    fn creature_buffer(&self) -> Option<&[f32]> {
        match self.variant {
            Variant::Ecology => self.world.as_ref().map(|w| w.creature_buffer.as_slice()),
            Variant::Civilization => None,
        }
    }

    fn terrain_buffer(&self) -> Option<&[u8]> {
        match self.variant {
            Variant::Ecology => self.world.as_ref().map(|w| w.terrain_rgb.as_slice()),
            Variant::Civilization => None,
        }
    }

    fn nation_color(&self, nation_id: u64) -> Option<[u8; 3]> {
        self.world
            .as_ref()?
            .nations
            .iter()
            .find(|n| n.id == nation_id)
            .map(|n| n.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_before_initialize_fails() {
        let mut engine = SyntheticEngine::new(Variant::Ecology);
        assert_eq!(engine.advance(1), Err(EngineError::NotInitialized));
        assert!(engine.snapshot().is_none());
        assert!(engine.tile_info(0, 0).is_none());
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = SyntheticEngine::new(Variant::Civilization);
        let mut b = SyntheticEngine::new(Variant::Civilization);
        a.initialize(64, 32, 7).unwrap();
        b.initialize(64, 32, 7).unwrap();
        a.advance(30).unwrap();
        b.advance(30).unwrap();
        assert_eq!(a.snapshot().unwrap().tiles, b.snapshot().unwrap().tiles);
        assert_eq!(a.entities(), b.entities());
    }

    #[test]
    fn test_regeneration_changes_generation() {
        let mut engine = SyntheticEngine::new(Variant::Civilization);
        engine.initialize(32, 16, 1).unwrap();
        let first = engine.snapshot().unwrap().generation;
        engine.initialize(32, 16, 2).unwrap();
        assert_ne!(engine.snapshot().unwrap().generation, first);
    }

    #[test]
    fn test_rejects_zero_tick_advance() {
        let mut engine = SyntheticEngine::new(Variant::Ecology);
        engine.initialize(32, 16, 3).unwrap();
        assert!(matches!(engine.advance(0), Err(EngineError::InvalidAdvance { .. })));
        assert!(engine.advance(1).is_ok());
    }

    #[test]
    fn test_ecology_buffer_matches_population() {
        let mut engine = SyntheticEngine::new(Variant::Ecology);
        engine.initialize(80, 40, 11).unwrap();
        engine.advance(20).unwrap();
        let records = CreatureRecord::decode_all(engine.creature_buffer().unwrap());
        assert_eq!(records.len() as u64, engine.statistics().population);
        assert!(engine
            .history()
            .iter()
            .all(|p| p.as_population().is_some()));
    }

    #[test]
    fn test_ecology_terrain_uses_ecology_palette() {
        let mut engine = SyntheticEngine::new(Variant::Ecology);
        engine.initialize(40, 20, 5).unwrap();
        let terrain = engine.terrain_buffer().unwrap();
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(terrain.len(), snapshot.tiles.len() * 3);
        for (tile, rgb) in snapshot.tiles.iter().zip(terrain.chunks_exact(3)) {
            assert_eq!(rgb, tile.biome.unwrap().ecology_color());
        }

        let mut civ = SyntheticEngine::new(Variant::Civilization);
        civ.initialize(40, 20, 5).unwrap();
        assert!(civ.terrain_buffer().is_none());
    }

    #[test]
    fn test_chronicle_history_is_bounded() {
        let config = SyntheticConfig {
            nations: 12,
            max_history: 20,
            history_trim: 5,
            ..SyntheticConfig::default()
        };
        let mut engine = SyntheticEngine::with_config(Variant::Civilization, config);
        engine.initialize(120, 60, 9).unwrap();
        for _ in 0..40 {
            engine.advance(25).unwrap();
            assert!(engine.history().len() <= 20);
        }
        let times: Vec<i64> = engine.history().iter().map(|p| p.time()).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }
}
