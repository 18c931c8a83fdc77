//! Render session: the one owned context the front-ends drive.
//!
//! Holds the engine, camera, raster cache, run loop and the canvases for the
//! map, minimap and chart. Input arrives as [`ViewerEvent`]s; every call to
//! [`RenderSession::frame`] or [`RenderSession::render`] produces a
//! [`FrameReport`] that registered callbacks also receive.

use tracing::{debug, info, warn};

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::chart::{ecology_chart, rescale_species, TimeSeriesChart};
use crate::colorize::ViewMode;
use crate::config::ViewerConfig;
use crate::engine::{CreatureRecord, Engine, Entity, PopulationSample, SettlementEntity, TileInfo, Variant};
use crate::error::ViewerError;
use crate::minimap::{Minimap, ViewportRect};
use crate::overlay::{OverlayRenderer, OverlayStats};
use crate::raster::{blit_scaled, RasterCache};
use crate::run_loop::{FrameOutcome, RunLoop, RunSpeed, RunState};

/// Input understood by the session. Coordinates are canvas pixels of the
/// map (or of the minimap for [`ViewerEvent::MinimapClick`]).
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerEvent {
    DragStart { x: f64, y: f64 },
    Drag { x: f64, y: f64 },
    DragEnd,
    /// Positive `delta` zooms in.
    Wheel { x: f64, y: f64, delta: f64 },
    Click { x: f64, y: f64 },
    MinimapClick { x: f64, y: f64 },
    SetViewMode(ViewMode),
    CycleViewMode,
    Play,
    Pause,
    TogglePlay,
    Step,
    /// `None` uses the configured batch size.
    FastForward(Option<u32>),
    Regenerate(u64),
    CycleSpeed,
}

/// Summary of one rendered frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub time: i64,
    pub view_mode: ViewMode,
    pub run_state: RunState,
    pub speed: RunSpeed,
    pub busy: bool,
    pub raster_rebuilt: bool,
    pub raster_rebuilds: u64,
    pub overlay: OverlayStats,
    pub chart_drawn: bool,
    pub viewport: Option<ViewportRect>,
    pub outcome: FrameOutcome,
}

type RenderCallback = Box<dyn FnMut(&FrameReport)>;

pub struct RenderSession<E: Engine> {
    engine: E,
    config: ViewerConfig,
    world_size: (u32, u32),
    seed: u64,
    camera: Camera,
    raster: RasterCache,
    view_mode: ViewMode,
    run_loop: RunLoop,
    overlay: OverlayRenderer,
    minimap: Minimap,
    map: Canvas,
    chart: Canvas,
    /// Population chart, only for engines that record population samples.
    population_chart: Option<TimeSeriesChart<PopulationSample>>,
    selected: Option<TileInfo>,
    frame: u64,
    callbacks: Vec<RenderCallback>,
}

impl<E: Engine> RenderSession<E> {
    /// Initialize `engine` and build the session around it.
    ///
    /// Fails with [`ViewerError::Init`] if the engine cannot generate the
    /// world; no session exists in that case.
    pub fn new(mut engine: E, config: ViewerConfig, width: u32, height: u32, seed: u64) -> Result<Self, ViewerError> {
        engine.initialize(width, height, seed).map_err(ViewerError::Init)?;
        info!(width, height, seed, variant = ?engine.variant(), "session started");

        let layout = &config.layout;
        let map = Canvas::new(layout.map_width, layout.map_height, layout.background);
        let chart = Canvas::new(layout.chart_width, layout.chart_height, config.chart.background);
        let minimap = Minimap::new(layout.minimap_width, layout.minimap_height, layout.background);
        let mut camera = Camera::new(&config.camera);
        camera.fit((width as usize, height as usize), map.size());

        let view_mode = config.view_mode.unwrap_or(match engine.variant() {
            Variant::Civilization => ViewMode::Political,
            Variant::Ecology => ViewMode::Biome,
        });
        let population_chart = match engine.variant() {
            Variant::Ecology => Some(ecology_chart(&[], config.chart.clone())),
            Variant::Civilization => None,
        };

        Ok(Self {
            engine,
            world_size: (width, height),
            seed,
            camera,
            raster: RasterCache::new(),
            view_mode,
            run_loop: RunLoop::new(&config.run_loop),
            overlay: OverlayRenderer::new(config.overlay.clone()),
            minimap,
            map,
            chart,
            population_chart,
            selected: None,
            frame: 0,
            callbacks: Vec::new(),
            config,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn run_loop(&self) -> &RunLoop {
        &self.run_loop
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn map_canvas(&self) -> &Canvas {
        &self.map
    }

    pub fn minimap_canvas(&self) -> &Canvas {
        self.minimap.canvas()
    }

    pub fn chart_canvas(&self) -> &Canvas {
        &self.chart
    }

    pub fn selected_tile(&self) -> Option<&TileInfo> {
        self.selected.as_ref()
    }

    pub fn raster_rebuilds(&self) -> u64 {
        self.raster.rebuild_count()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Register a callback run after every render.
    pub fn on_render(&mut self, callback: impl FnMut(&FrameReport) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn dispatch(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::DragStart { x, y } => self.camera.begin_drag(x, y),
            ViewerEvent::Drag { x, y } => {
                self.camera.drag_to(x, y);
            }
            ViewerEvent::DragEnd => self.camera.end_drag(),
            ViewerEvent::Wheel { x, y, delta } => {
                if delta != 0.0 {
                    let step = self.config.camera.zoom_step;
                    let factor = if delta > 0.0 { step } else { 1.0 / step };
                    self.camera.zoom_at(x, y, factor);
                }
            }
            ViewerEvent::Click { x, y } => self.select_at(x, y),
            ViewerEvent::MinimapClick { x, y } => {
                let world = (self.world_size.0 as usize, self.world_size.1 as usize);
                if let Some((wx, wy)) = self.minimap.minimap_to_world(x, y, world) {
                    self.camera.center_on(wx, wy, self.map.size());
                }
            }
            ViewerEvent::SetViewMode(mode) => self.set_view_mode(mode),
            ViewerEvent::CycleViewMode => self.set_view_mode(self.view_mode.next()),
            ViewerEvent::Play => self.play(),
            ViewerEvent::Pause => self.pause(),
            ViewerEvent::TogglePlay => self.run_loop.toggle(),
            ViewerEvent::Step => {
                self.step();
            }
            ViewerEvent::FastForward(ticks) => self.fast_forward(ticks),
            ViewerEvent::Regenerate(seed) => self.regenerate(seed),
            ViewerEvent::CycleSpeed => {
                let speed = self.run_loop.cycle_speed();
                self.run_loop.set_message(format!("Speed {}", speed.name()));
            }
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode != self.view_mode {
            debug!(from = self.view_mode.label(), to = mode.label(), "view mode changed");
            self.view_mode = mode;
        }
    }

    pub fn play(&mut self) {
        self.run_loop.play();
    }

    pub fn pause(&mut self) {
        self.run_loop.pause();
    }

    /// One tick and one render, whatever the run state.
    pub fn step(&mut self) -> FrameReport {
        let outcome = self.run_loop.step(&mut self.engine);
        self.render_with(outcome)
    }

    pub fn fast_forward(&mut self, ticks: Option<u32>) {
        self.run_loop.request_fast_forward(ticks);
    }

    /// Generate a new world. On failure playback stops and the error is shown.
    pub fn regenerate(&mut self, seed: u64) {
        let (width, height) = self.world_size;
        match self.engine.initialize(width, height, seed) {
            Ok(()) => {
                info!(seed, "world regenerated");
                self.seed = seed;
                self.selected = None;
                self.camera.fit((width as usize, height as usize), self.map.size());
            }
            Err(err) => {
                warn!(error = %err, seed, "regeneration failed");
                self.run_loop.pause();
                self.run_loop.set_message(format!("Regeneration failed: {err}"));
            }
        }
    }

    fn select_at(&mut self, x: f64, y: f64) {
        let (wx, wy) = self.camera.screen_to_world(x, y);
        self.selected = self.engine.tile_info(wx.floor() as i64, wy.floor() as i64);
        if let Some(info) = &self.selected {
            debug!(x = info.x, y = info.y, "tile selected");
        }
    }

    /// Advance per the run loop, then render.
    pub fn frame(&mut self) -> FrameReport {
        let outcome = self.run_loop.frame(&mut self.engine);
        self.render_with(outcome)
    }

    /// Render without advancing.
    pub fn render(&mut self) -> FrameReport {
        self.render_with(FrameOutcome::Idle)
    }

    fn render_with(&mut self, outcome: FrameOutcome) -> FrameReport {
        self.frame += 1;
        let background = self.config.layout.background;

        let mut raster_rebuilt = false;
        let mut viewport = None;
        if let Some(snapshot) = self.engine.snapshot() {
            let engine = &self.engine;
            raster_rebuilt = self.raster.ensure(snapshot, self.view_mode, engine.terrain_buffer(), |id| {
                engine.nation_color(id)
            });
        }
        match self.raster.raster() {
            Some(raster) => {
                blit_scaled(raster, &self.camera, &mut self.map, background);
                viewport = Some(self.minimap.draw(raster, &self.camera, self.map.size()));
            }
            None => self.map.fill(background),
        }

        let settlements: Vec<SettlementEntity> = self
            .engine
            .entities()
            .into_iter()
            .filter_map(|e| match e {
                Entity::Settlement(s) => Some(s),
                Entity::Nation(_) => None,
            })
            .collect();
        let creatures = self
            .engine
            .creature_buffer()
            .map(CreatureRecord::decode_all)
            .unwrap_or_default();
        let overlay = self.overlay.draw(&mut self.map, &self.camera, &settlements, &creatures);

        let mut chart_drawn = false;
        if let Some(chart) = self.population_chart.as_mut() {
            let samples: Vec<PopulationSample> = self
                .engine
                .history()
                .iter()
                .filter_map(|p| p.as_population().cloned())
                .collect();
            rescale_species(chart, &samples);
            chart_drawn = chart.draw(&mut self.chart, &samples).is_some();
        }

        let report = FrameReport {
            frame: self.frame,
            time: self.engine.current_time(),
            view_mode: self.view_mode,
            run_state: self.run_loop.state(),
            speed: self.run_loop.speed(),
            busy: self.run_loop.is_busy(),
            raster_rebuilt,
            raster_rebuilds: self.raster.rebuild_count(),
            overlay,
            chart_drawn,
            viewport,
            outcome,
        };
        for callback in &mut self.callbacks {
            callback(&report);
        }
        report
    }

    /// One-line status for the bottom strip.
    pub fn status_line(&self) -> String {
        let stats = self.engine.statistics();
        let clock = match self.engine.variant() {
            Variant::Civilization => format!("Year {}", stats.time),
            Variant::Ecology => format!("Tick {}", stats.time),
        };
        let counts = match self.engine.variant() {
            Variant::Civilization => format!(
                "Pop {} | Nations {} | Settlements {}",
                stats.population, stats.nations, stats.settlements
            ),
            Variant::Ecology => format!("Creatures {} | Species {}", stats.population, stats.species),
        };
        let state = if self.run_loop.is_busy() {
            "FAST-FORWARDING..."
        } else if self.run_loop.is_running() {
            "RUNNING"
        } else {
            "PAUSED"
        };
        format!(
            "{clock} | {counts} | {} | {} | {state}",
            self.view_mode.label(),
            self.run_loop.speed().name()
        )
    }

    /// Short readout of the selected tile, empty when nothing is selected.
    pub fn selection_lines(&self) -> Vec<String> {
        let Some(info) = &self.selected else {
            return Vec::new();
        };
        let biome = info.biome.map(|b| b.name()).unwrap_or("Unknown");
        let mut lines = vec![
            format!("({}, {}) {}", info.x, info.y, biome),
            format!(
                "Alt {:.2} Temp {:.1} Rain {:.0}",
                info.altitude, info.temperature, info.rainfall
            ),
        ];
        if let Some(settlement) = &info.settlement {
            lines.push(format!("{} pop {}", settlement.name, settlement.population));
        }
        if let Some(nation) = &info.nation_name {
            lines.push(nation.clone());
        }
        if let Some(biomass) = info.plant_biomass {
            lines.push(format!("Plants {:.0} | Creatures {}", biomass, info.creatures.len()));
        }
        for creature in info.creatures.iter().take(3) {
            lines.push(format!(
                "{} {} E{:.0}",
                creature.species,
                creature.diet.label(),
                creature.energy
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SyntheticEngine;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(variant: Variant) -> RenderSession<SyntheticEngine> {
        let config = ViewerConfig::default();
        RenderSession::new(SyntheticEngine::new(variant), config, 80, 40, 7).unwrap()
    }

    #[test]
    fn test_init_failure_is_reported() {
        let result = RenderSession::new(SyntheticEngine::new(Variant::Ecology), ViewerConfig::default(), 0, 10, 1);
        assert!(matches!(result, Err(ViewerError::Init(_))));
    }

    #[test]
    fn test_first_render_builds_raster_once() {
        let mut s = session(Variant::Ecology);
        assert!(s.render().raster_rebuilt);
        assert!(!s.render().raster_rebuilt);
        assert_eq!(s.raster_rebuilds(), 1);
    }

    #[test]
    fn test_click_selects_tile_and_misses_outside() {
        let mut s = session(Variant::Civilization);
        let (px, py) = s.camera().world_to_screen(10.5, 5.5);
        s.dispatch(ViewerEvent::Click { x: px, y: py });
        let info = s.selected_tile().unwrap();
        assert_eq!((info.x, info.y), (10, 5));
        assert!(!s.selection_lines().is_empty());

        let (px, py) = s.camera().world_to_screen(-3.0, 5.0);
        s.dispatch(ViewerEvent::Click { x: px, y: py });
        assert!(s.selected_tile().is_none());
    }

    #[test]
    fn test_selection_lists_creatures_with_diet() {
        let mut s = session(Variant::Ecology);
        let first = CreatureRecord::decode_all(s.engine().creature_buffer().unwrap())[0];
        let (px, py) = s.camera().world_to_screen(first.x.floor() as f64 + 0.5, first.y.floor() as f64 + 0.5);
        s.dispatch(ViewerEvent::Click { x: px, y: py });

        let lines = s.selection_lines();
        assert!(lines
            .iter()
            .any(|l| l.contains("Herbivore") || l.contains("Omnivore") || l.contains("Carnivore")));
    }

    #[test]
    fn test_civilization_skips_population_chart() {
        let mut s = session(Variant::Civilization);
        assert!(s.population_chart.is_none());
        for _ in 0..3 {
            assert!(!s.step().chart_drawn);
        }
        let background = s.config().chart.background;
        assert_eq!(s.chart_canvas().get(0, 0), Some(background));
    }

    #[test]
    fn test_minimap_click_recenters_camera() {
        let mut s = session(Variant::Ecology);
        s.render();
        s.dispatch(ViewerEvent::MinimapClick { x: 50.0, y: 25.0 });
        let (w, h) = s.map_canvas().size();
        let (wx, wy) = s.camera().screen_to_world(w as f64 / 2.0, h as f64 / 2.0);
        assert!((wx - 20.0).abs() < 1e-9);
        assert!((wy - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_callbacks_receive_reports() {
        let mut s = session(Variant::Ecology);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        s.on_render(move |report| sink.borrow_mut().push(report.frame));
        s.render();
        s.step();
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_status_shows_busy_during_fast_forward() {
        let mut s = session(Variant::Ecology);
        s.dispatch(ViewerEvent::FastForward(Some(20)));
        let report = s.frame();
        assert!(report.busy);
        assert!(s.status_line().ends_with("FAST-FORWARDING..."));
        let report = s.frame();
        assert_eq!(report.outcome, FrameOutcome::FastForwarded(20));
        assert_eq!(report.time, 20);
    }
}
