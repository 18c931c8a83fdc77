use world_viewer::biomes::Biome;
use world_viewer::engine::{CreatureRecord, Engine, HistoryPoint, SyntheticEngine, Variant};
use world_viewer::raster::RasterCache;
use world_viewer::ViewMode;

#[test]
fn civilization_world_400_by_200() {
    let mut engine = SyntheticEngine::new(Variant::Civilization);
    engine.initialize(400, 200, 42).unwrap();

    let snapshot = engine.snapshot().unwrap();
    assert_eq!(snapshot.tiles.len(), 80_000);
    assert!(snapshot.tiles.iter().all(|t| t.biome.is_some_and(|b| Biome::ALL.contains(&b))));

    assert!(engine.tile_info(0, 0).is_some());
    assert!(engine.tile_info(399, 199).is_some());
    assert!(engine.tile_info(400, 0).is_none());
    assert!(engine.tile_info(0, -1).is_none());
}

#[test]
fn ecology_buffer_matches_population() {
    let mut engine = SyntheticEngine::new(Variant::Ecology);
    engine.initialize(120, 60, 42).unwrap();
    engine.advance(30).unwrap();

    let buffer = engine.creature_buffer().unwrap();
    assert_eq!(buffer.len() % CreatureRecord::STRIDE, 0);
    let records = CreatureRecord::decode_all(buffer);
    assert_eq!(records.len() as u64, engine.statistics().population);

    let samples: Vec<_> = engine.history().iter().filter_map(HistoryPoint::as_population).collect();
    assert!(samples.len() >= 3);
    assert!(samples.windows(2).all(|w| w[0].tick < w[1].tick));
}

#[test]
fn ecology_biome_raster_shows_engine_terrain() {
    let mut engine = SyntheticEngine::new(Variant::Ecology);
    engine.initialize(120, 60, 42).unwrap();
    let snapshot = engine.snapshot().unwrap();
    let terrain = engine.terrain_buffer().unwrap();

    let mut cache = RasterCache::new();
    cache.ensure(snapshot, ViewMode::Biome, Some(terrain), |_| None);
    let raster = cache.raster().unwrap();

    for (i, rgb) in terrain.chunks_exact(3).enumerate() {
        let (x, y) = (i % 120, i / 120);
        assert_eq!(raster.get(x, y), Some([rgb[0], rgb[1], rgb[2]]));
    }
    let forest = snapshot.tiles.iter().position(|t| t.biome == Some(Biome::Forest));
    if let Some(i) = forest {
        assert_eq!(raster.get(i % 120, i / 120), Some(Biome::Forest.ecology_color()));
    }
}
