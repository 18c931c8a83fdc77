use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb as ImageRgb, RgbImage};
use tracing::info;

use crate::canvas::{Canvas, GLYPH_HEIGHT};
use crate::colorize::{Rgb, ViewMode};
use crate::engine::{Engine, WorldSnapshot};
use crate::error::ViewerError;
use crate::raster::RasterCache;
use crate::session::{FrameReport, RenderSession};

const GRID_COLUMNS: usize = 3;
const LABEL_HEIGHT: usize = 14;
const GRID_BACKGROUND: Rgb = [30, 30, 30];
const LABEL_BACKGROUND: Rgb = [50, 50, 50];

/// Every view mode of `snapshot` side by side, one raster pixel per tile.
///
/// Row 1: Political, Biome, Terrain
/// Row 2: Temperature, Rainfall, Population
pub fn render_mode_grid(
    snapshot: &WorldSnapshot,
    terrain: Option<&[u8]>,
    nation_color: impl Fn(u64) -> Option<Rgb>,
) -> RgbImage {
    let (tile_w, tile_h) = snapshot.dimensions();
    let rows = ViewMode::ALL.len().div_ceil(GRID_COLUMNS);
    let grid_w = tile_w * GRID_COLUMNS;
    let grid_h = (tile_h + LABEL_HEIGHT) * rows;
    let mut grid = Canvas::new(grid_w, grid_h, GRID_BACKGROUND);

    for (idx, mode) in ViewMode::ALL.into_iter().enumerate() {
        let mut cache = RasterCache::new();
        cache.ensure(snapshot, mode, terrain, &nation_color);
        let col = idx % GRID_COLUMNS;
        let row = idx / GRID_COLUMNS;
        let x = (col * tile_w) as i64;
        let label_y = (row * (tile_h + LABEL_HEIGHT)) as i64;

        if let Some(raster) = cache.raster() {
            grid.blit(raster, x, label_y + LABEL_HEIGHT as i64);
        }
        grid.fill_rect(x, label_y, tile_w as i64, LABEL_HEIGHT as i64, LABEL_BACKGROUND);
        let text_y = label_y + (LABEL_HEIGHT - GLYPH_HEIGHT) as i64 / 2;
        grid.draw_text(x + 4, text_y, mode.label(), [255, 255, 255]);
    }
    grid.to_rgb_image()
}

/// Map, minimap and chart stacked into one image.
pub fn render_session<E: Engine>(session: &RenderSession<E>) -> RgbImage {
    let map = session.map_canvas();
    let minimap = session.minimap_canvas();
    let chart = session.chart_canvas();
    let side_w = minimap.width().max(chart.width());
    let width = map.width() + side_w;
    let height = map.height().max(minimap.height() + chart.height());

    let mut image: RgbImage = ImageBuffer::from_pixel(
        width as u32,
        height as u32,
        ImageRgb(session.config().layout.background),
    );
    let mut paste = |canvas: &Canvas, ox: usize, oy: usize| {
        for (x, y, pixel) in canvas.to_rgb_image().enumerate_pixels() {
            image.put_pixel(ox as u32 + x, oy as u32 + y, *pixel);
        }
    };
    paste(map, 0, 0);
    paste(minimap, map.width(), 0);
    paste(chart, map.width(), minimap.height());
    image
}

/// Files written by [`run_headless`].
#[derive(Clone, Debug)]
pub struct HeadlessOutput {
    pub report: FrameReport,
    pub frame: PathBuf,
    pub modes: Option<PathBuf>,
}

/// Play `frames` frames without a window, then write the composed frame to
/// `output` and, if the world exists, a grid of every view mode next to it.
pub fn run_headless<E: Engine>(
    session: &mut RenderSession<E>,
    frames: u32,
    output: impl AsRef<Path>,
) -> Result<HeadlessOutput, ViewerError> {
    let output = output.as_ref();
    let mut report = session.render();
    if frames > 0 {
        session.play();
        for _ in 0..frames {
            report = session.frame();
            if !session.run_loop().is_running() {
                break;
            }
        }
        session.pause();
    }

    render_session(session).save(output)?;
    info!(path = %output.display(), frame = report.frame, time = report.time, "frame exported");

    let modes = match session.engine().snapshot() {
        Some(snapshot) => {
            let path = sibling_path(output, "modes");
            let engine = session.engine();
            render_mode_grid(snapshot, engine.terrain_buffer(), |id| engine.nation_color(id)).save(&path)?;
            info!(path = %path.display(), "mode grid exported");
            Some(path)
        }
        None => None,
    };

    Ok(HeadlessOutput {
        report,
        frame: output.to_path_buf(),
        modes,
    })
}

/// `dir/name.png` -> `dir/name_suffix.png`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("png");
    path.with_file_name(format!("{stem}_{suffix}.{ext}"))
}
