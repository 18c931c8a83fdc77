use world_viewer::engine::{Engine, Entity, HistoryPoint, Statistics, SyntheticEngine, TileInfo, Variant, WorldSnapshot};
use world_viewer::run_loop::{FrameOutcome, RunState};
use world_viewer::{EngineError, RenderSession, ViewerConfig, ViewerEvent};

/// Wraps the synthetic engine and refuses to advance once its budget runs out.
struct FlakyEngine {
    inner: SyntheticEngine,
    budget: u32,
    advance_calls: u32,
}

impl Engine for FlakyEngine {
    fn variant(&self) -> Variant {
        self.inner.variant()
    }
    fn initialize(&mut self, width: u32, height: u32, seed: u64) -> Result<(), EngineError> {
        self.inner.initialize(width, height, seed)
    }
    fn advance(&mut self, ticks: u32) -> Result<(), EngineError> {
        self.advance_calls += 1;
        if self.budget == 0 {
            return Err(EngineError::InvalidAdvance { requested: ticks, reason: "budget spent".into() });
        }
        self.budget -= 1;
        self.inner.advance(ticks)
    }
    fn current_time(&self) -> i64 {
        self.inner.current_time()
    }
    fn snapshot(&self) -> Option<&WorldSnapshot> {
        self.inner.snapshot()
    }
    fn statistics(&self) -> Statistics {
        self.inner.statistics()
    }
    fn entities(&self) -> Vec<Entity> {
        self.inner.entities()
    }
    fn history(&self) -> &[HistoryPoint] {
        self.inner.history()
    }
    fn tile_info(&self, x: i64, y: i64) -> Option<TileInfo> {
        self.inner.tile_info(x, y)
    }
    fn creature_buffer(&self) -> Option<&[f32]> {
        self.inner.creature_buffer()
    }
}

fn session(budget: u32) -> RenderSession<FlakyEngine> {
    let engine = FlakyEngine { inner: SyntheticEngine::new(Variant::Ecology), budget, advance_calls: 0 };
    RenderSession::new(engine, ViewerConfig::default(), 60, 30, 5).unwrap()
}

#[test]
fn failed_advance_stops_playback() {
    let mut s = session(2);
    s.dispatch(ViewerEvent::Play);
    assert!(s.frame().outcome.advanced());
    assert!(s.frame().outcome.advanced());

    let report = s.frame();
    assert!(matches!(report.outcome, FrameOutcome::Failed(_)));
    assert_eq!(report.run_state, RunState::Stopped);
    assert!(s.run_loop().message().is_some());

    for _ in 0..10 {
        assert_eq!(s.frame().outcome, FrameOutcome::Idle);
    }
    assert_eq!(s.engine().advance_calls, 3);
    // Rendering still works after the failure.
    assert!(s.render().viewport.is_some());
}

#[test]
fn restart_after_failure_tries_again() {
    let mut s = session(0);
    s.dispatch(ViewerEvent::Play);
    s.frame();
    assert_eq!(s.run_loop().state(), RunState::Stopped);

    s.dispatch(ViewerEvent::Play);
    s.frame();
    assert_eq!(s.engine().advance_calls, 2);
}

#[test]
fn failed_fast_forward_clears_busy() {
    let mut s = session(0);
    s.dispatch(ViewerEvent::FastForward(None));
    assert!(s.frame().busy);
    let report = s.frame();
    assert!(matches!(report.outcome, FrameOutcome::Failed(_)));
    assert!(!report.busy);
}
