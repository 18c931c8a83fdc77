//! Raster compositor: one pixel per tile, cached until the view mode or the
//! world changes, then blitted through the camera with nearest-neighbour
//! sampling so tiles stay square at any zoom.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::camera::Camera;
use crate::canvas::{pack, Canvas};
use crate::colorize::{colorize, Rgb, TileAttributes, ViewMode, FALLBACK_COLOR};
use crate::engine::WorldSnapshot;

/// What a cached raster was built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterKey {
    pub mode: ViewMode,
    pub generation: u64,
    /// Only tracked for modes that color by ownership or settlements.
    pub territory_revision: Option<u64>,
}

impl RasterKey {
    pub fn for_snapshot(snapshot: &WorldSnapshot, mode: ViewMode) -> Self {
        Self {
            mode,
            generation: snapshot.generation,
            territory_revision: mode
                .depends_on_territory()
                .then_some(snapshot.territory_revision),
        }
    }
}

#[derive(Debug, Default)]
pub struct RasterCache {
    key: Option<RasterKey>,
    raster: Option<Canvas>,
    rebuilds: u64,
}

impl RasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild if the key changed. Returns true when a rebuild happened.
    ///
    /// `terrain` is the engine's packed RGB terrain, if it provides one.
    pub fn ensure(
        &mut self,
        snapshot: &WorldSnapshot,
        mode: ViewMode,
        terrain: Option<&[u8]>,
        nation_color: impl Fn(u64) -> Option<Rgb>,
    ) -> bool {
        let key = RasterKey::for_snapshot(snapshot, mode);
        if self.key == Some(key) && self.raster.is_some() {
            return false;
        }

        let owner_colors = collect_owner_colors(snapshot, mode, nation_color);
        self.raster = Some(build_raster(snapshot, mode, terrain, &owner_colors));
        self.key = Some(key);
        self.rebuilds += 1;
        debug!(mode = mode.label(), generation = snapshot.generation, rebuilds = self.rebuilds, "raster rebuilt");
        true
    }

    pub fn raster(&self) -> Option<&Canvas> {
        self.raster.as_ref()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

/// Resolve each owning nation's color once, before the parallel pass.
fn collect_owner_colors(
    snapshot: &WorldSnapshot,
    mode: ViewMode,
    nation_color: impl Fn(u64) -> Option<Rgb>,
) -> HashMap<u64, Rgb> {
    let mut colors = HashMap::new();
    if mode != ViewMode::Political {
        return colors;
    }
    for owner in snapshot.tiles.iter().filter_map(|t| t.owner_id) {
        if !colors.contains_key(&owner) {
            if let Some(color) = nation_color(owner) {
                colors.insert(owner, color);
            }
        }
    }
    colors
}

/// Color every tile into a `width x height` canvas.
///
/// The biome view copies `terrain` verbatim when it covers every tile.
pub fn build_raster(
    snapshot: &WorldSnapshot,
    mode: ViewMode,
    terrain: Option<&[u8]>,
    owner_colors: &HashMap<u64, Rgb>,
) -> Canvas {
    let (width, height) = snapshot.dimensions();
    let mut raster = Canvas::new(width, height, FALLBACK_COLOR);
    if width == 0 {
        return raster;
    }
    let terrain = terrain.filter(|t| mode == ViewMode::Biome && t.len() == width * height * 3);

    raster
        .pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let idx = y * width + x;
                if let Some(rgb) = terrain.and_then(|t| t.get(idx * 3..idx * 3 + 3)) {
                    *pixel = pack([rgb[0], rgb[1], rgb[2]]);
                    continue;
                }
                let Some(tile) = snapshot.tiles.get(idx) else {
                    continue;
                };
                let attributes = TileAttributes {
                    biome: tile.biome,
                    altitude: tile.altitude,
                    temperature: tile.temperature,
                    rainfall: tile.rainfall,
                    owner_color: tile.owner_id.and_then(|id| owner_colors.get(&id).copied()),
                    has_settlement: tile.settlement_id.is_some(),
                };
                *pixel = pack(colorize(&attributes, mode));
            }
        });
    raster
}

/// Draw `raster` onto `target` through the camera, nearest-neighbour.
///
/// Each screen pixel samples the tile under its centre; pixels outside the
/// world get `background`.
pub fn blit_scaled(raster: &Canvas, camera: &Camera, target: &mut Canvas, background: Rgb) {
    let (src_w, src_h) = raster.size();
    let target_w = target.width();
    if target_w == 0 {
        return;
    }
    let scale = camera.scale();
    let (offset_x, offset_y) = camera.offset();
    let bg = pack(background);

    let columns: Vec<Option<usize>> = (0..target_w)
        .map(|sx| source_index(sx, offset_x, scale, src_w))
        .collect();
    let source = raster.pixels();

    target
        .pixels_mut()
        .par_chunks_mut(target_w)
        .enumerate()
        .for_each(|(sy, row)| {
            let Some(ty) = source_index(sy, offset_y, scale, src_h) else {
                row.fill(bg);
                return;
            };
            let src_row = &source[ty * src_w..(ty + 1) * src_w];
            for (pixel, column) in row.iter_mut().zip(columns.iter()) {
                *pixel = match column {
                    Some(tx) => src_row[*tx],
                    None => bg,
                };
            }
        });
}

#[inline]
fn source_index(screen: usize, offset: f64, scale: f64, extent: usize) -> Option<usize> {
    let world = ((screen as f64 + 0.5) - offset) / scale;
    if world < 0.0 || !world.is_finite() {
        return None;
    }
    let idx = world.floor() as usize;
    (idx < extent).then_some(idx)
}
