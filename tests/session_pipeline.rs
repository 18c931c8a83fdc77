use world_viewer::engine::{SyntheticEngine, Variant};
use world_viewer::{RenderSession, ViewMode, ViewerConfig, ViewerEvent};

fn session(variant: Variant) -> RenderSession<SyntheticEngine> {
    RenderSession::new(SyntheticEngine::new(variant), ViewerConfig::default(), 100, 50, 42).unwrap()
}

#[test]
fn pan_and_zoom_never_rebuild() {
    let mut s = session(Variant::Civilization);
    s.render();
    let base = s.raster_rebuilds();

    s.dispatch(ViewerEvent::DragStart { x: 10.0, y: 10.0 });
    s.dispatch(ViewerEvent::Drag { x: 60.0, y: 40.0 });
    s.dispatch(ViewerEvent::DragEnd);
    s.render();
    s.dispatch(ViewerEvent::Wheel { x: 200.0, y: 100.0, delta: 1.0 });
    s.render();
    s.dispatch(ViewerEvent::Wheel { x: 200.0, y: 100.0, delta: -2.0 });
    s.render();

    assert_eq!(s.raster_rebuilds(), base);
}

#[test]
fn mode_change_rebuilds_exactly_once() {
    let mut s = session(Variant::Ecology);
    s.render();
    let base = s.raster_rebuilds();

    s.dispatch(ViewerEvent::SetViewMode(ViewMode::Temperature));
    assert!(s.render().raster_rebuilt);
    assert!(!s.render().raster_rebuilt);
    assert_eq!(s.raster_rebuilds(), base + 1);

    // Same mode again changes nothing.
    s.dispatch(ViewerEvent::SetViewMode(ViewMode::Temperature));
    s.render();
    assert_eq!(s.raster_rebuilds(), base + 1);
}

#[test]
fn regenerate_rebuilds_exactly_once() {
    let mut s = session(Variant::Ecology);
    s.render();
    let base = s.raster_rebuilds();

    s.dispatch(ViewerEvent::Regenerate(43));
    s.render();
    s.render();
    assert_eq!(s.raster_rebuilds(), base + 1);
    assert_eq!(s.seed(), 43);
}

#[test]
fn ecology_playback_does_not_rebuild_terrain() {
    let mut s = session(Variant::Ecology);
    s.dispatch(ViewerEvent::SetViewMode(ViewMode::Terrain));
    s.render();
    let base = s.raster_rebuilds();

    s.dispatch(ViewerEvent::Play);
    for _ in 0..4 {
        let report = s.frame();
        assert!(report.outcome.advanced());
    }
    assert_eq!(s.raster_rebuilds(), base);
}

#[test]
fn chart_appears_once_history_has_two_samples() {
    let mut s = session(Variant::Ecology);
    assert!(!s.render().chart_drawn);
    s.dispatch(ViewerEvent::FastForward(Some(25)));
    s.frame();
    let report = s.frame();
    assert!(report.chart_drawn);
}
