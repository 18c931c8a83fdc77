use world_viewer::{Camera, CameraConfig};

const EPS: f64 = 1e-9;

fn close(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < EPS && (a.1 - b.1).abs() < EPS
}

fn states() -> Vec<Camera> {
    let config = CameraConfig::default();
    let mut cameras = Vec::new();
    for scale in [0.25, 0.3, 1.0, 4.0, 17.5, 39.0, 40.0] {
        for (ox, oy) in [(0.0, 0.0), (-350.0, 120.0), (812.5, -64.25)] {
            cameras.push(Camera::with_state(&config, scale, ox, oy));
        }
    }
    cameras
}

const CURSORS: [(f64, f64); 5] = [(0.0, 0.0), (100.0, 100.0), (799.0, 499.0), (-20.0, 35.5), (413.7, 2.2)];

#[test]
fn screen_world_round_trip() {
    for camera in states() {
        for (px, py) in CURSORS {
            let (wx, wy) = camera.screen_to_world(px, py);
            assert!(close(camera.world_to_screen(wx, wy), (px, py)));
        }
    }
}

#[test]
fn zoom_keeps_point_under_cursor() {
    for start in states() {
        for (px, py) in CURSORS {
            for factor in [1.2, 1.0 / 1.2, 3.0, 0.1, 250.0] {
                let mut camera = start.clone();
                let before = camera.screen_to_world(px, py);
                camera.zoom_at(px, py, factor);
                let (lo, hi) = camera.scale_bounds();
                assert!(camera.scale() >= lo && camera.scale() <= hi);
                let after = camera.screen_to_world(px, py);
                assert!(
                    (before.0 - after.0).abs() < 1e-6 && (before.1 - after.1).abs() < 1e-6,
                    "factor {factor} at ({px}, {py}) moved {before:?} to {after:?}"
                );
            }
        }
    }
}

#[test]
fn zoom_in_then_out_restores_state() {
    let mut camera = Camera::with_state(&CameraConfig::default(), 4.0, 0.0, 0.0);
    camera.zoom_at(100.0, 100.0, 1.2);
    camera.zoom_at(100.0, 100.0, 1.0 / 1.2);
    assert!((camera.scale() - 4.0).abs() < EPS);
    assert!(close(camera.offset(), (0.0, 0.0)));
}

#[test]
fn pinned_zoom_is_a_no_op() {
    let config = CameraConfig::default();
    let mut camera = Camera::with_state(&config, config.max_scale, 10.0, 20.0);
    assert!(!camera.zoom_at(50.0, 50.0, 2.0));
    assert_eq!(camera.offset(), (10.0, 20.0));
}
