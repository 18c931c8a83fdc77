use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use tracing::info;

use crate::canvas::{text_width, Canvas, GLYPH_HEIGHT};
use crate::colorize::{Rgb, ViewMode};
use crate::engine::Engine;
use crate::error::ViewerError;
use crate::session::{RenderSession, ViewerEvent};

const PADDING: usize = 8;
const TEXT_COLOR: Rgb = [220, 220, 220];
const DIM_TEXT: Rgb = [150, 150, 160];
const MESSAGE_COLOR: Rgb = [255, 200, 80];
const BUSY_COLOR: Rgb = [255, 120, 60];
/// Cursor travel (pixels) below which a press/release counts as a click.
const CLICK_SLOP: f32 = 3.0;

const MODE_KEYS: [(Key, ViewMode); 6] = [
    (Key::Key1, ViewMode::Political),
    (Key::Key2, ViewMode::Biome),
    (Key::Key3, ViewMode::Terrain),
    (Key::Key4, ViewMode::Temperature),
    (Key::Key5, ViewMode::Rainfall),
    (Key::Key6, ViewMode::Population),
];

/// Screen placement of each panel inside the window.
#[derive(Clone, Copy, Debug)]
struct Layout {
    map: (usize, usize, usize, usize),
    minimap: (usize, usize, usize, usize),
    chart: (usize, usize),
    details: (usize, usize),
    status_y: usize,
    width: usize,
    height: usize,
}

impl Layout {
    fn new<E: Engine>(session: &RenderSession<E>) -> Self {
        let config = &session.config().layout;
        let (map_w, map_h) = session.map_canvas().size();
        let (mini_w, mini_h) = session.minimap_canvas().size();
        let (chart_w, chart_h) = session.chart_canvas().size();
        let side_x = map_w + PADDING;
        let side_w = mini_w.max(chart_w);
        let chart_y = PADDING + mini_h + PADDING;
        Self {
            map: (0, 0, map_w, map_h),
            minimap: (side_x, PADDING, mini_w, mini_h),
            chart: (side_x, chart_y),
            details: (side_x, chart_y + chart_h + PADDING),
            status_y: map_h + 6,
            width: side_x + side_w + PADDING,
            height: (map_h + config.status_height).max(chart_y + chart_h + PADDING),
        }
    }

    fn in_rect(rect: (usize, usize, usize, usize), x: f32, y: f32) -> bool {
        let (rx, ry, rw, rh) = rect;
        x >= rx as f32 && y >= ry as f32 && x < (rx + rw) as f32 && y < (ry + rh) as f32
    }
}

/// Press state of the left button between frames.
#[derive(Clone, Copy)]
enum Pointer {
    Idle,
    /// Pressed on the map at this position; `moved` once past the click slop.
    Map { start: (f32, f32), moved: bool },
    Minimap,
}

/// Run the interactive viewer until the window closes or Escape is pressed.
pub fn run_viewer<E: Engine>(mut session: RenderSession<E>) -> Result<(), ViewerError> {
    let layout = Layout::new(&session);
    let background = session.config().layout.background;

    let mut window = Window::new(
        "World Viewer - 1-6: Views, Space: Play, S: Step, F: Fast-forward, R: Regenerate, Esc: Exit",
        layout.width,
        layout.height,
        WindowOptions {
            resize: false,
            scale: minifb::Scale::X1,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(60);

    println!("Viewer started. Controls:");
    println!("  1-6: Political, Biome, Terrain, Temperature, Rainfall, Population");
    println!("  M: Next view mode");
    println!("  Space: Play / pause");
    println!("  S: Step one tick");
    println!("  F: Fast-forward");
    println!("  +: Cycle speed");
    println!("  R: Regenerate");
    println!("  Drag: Pan, Wheel: Zoom, Click: Inspect tile");
    println!("  Esc: Exit");

    let mut frame = Canvas::new(layout.width, layout.height, background);
    let mut pointer = Pointer::Idle;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        for event in keyboard_events(&window, session.seed()) {
            session.dispatch(event);
        }
        for event in pointer_events(&window, &layout, &mut pointer) {
            session.dispatch(event);
        }

        session.frame();
        compose(&session, &layout, &mut frame);

        window.update_with_buffer(frame.pixels(), layout.width, layout.height)?;
    }

    info!(time = session.engine().current_time(), "viewer closed");
    Ok(())
}

fn keyboard_events(window: &Window, seed: u64) -> Vec<ViewerEvent> {
    let pressed = |key| window.is_key_pressed(key, KeyRepeat::No);
    let mut events = Vec::new();

    if let Some((_, mode)) = MODE_KEYS.iter().find(|(key, _)| pressed(*key)) {
        events.push(ViewerEvent::SetViewMode(*mode));
    }
    if pressed(Key::M) {
        events.push(ViewerEvent::CycleViewMode);
    }
    if pressed(Key::Space) {
        events.push(ViewerEvent::TogglePlay);
    }
    if pressed(Key::S) {
        events.push(ViewerEvent::Step);
    }
    if pressed(Key::F) {
        events.push(ViewerEvent::FastForward(None));
    }
    if pressed(Key::Equal) || pressed(Key::NumPadPlus) {
        events.push(ViewerEvent::CycleSpeed);
    }
    if pressed(Key::R) {
        let next = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        println!("Regenerating with seed: {}", next);
        events.push(ViewerEvent::Regenerate(next));
    }
    events
}

fn pointer_events(window: &Window, layout: &Layout, pointer: &mut Pointer) -> Vec<ViewerEvent> {
    let mut events = Vec::new();
    let Some((mx, my)) = window.get_mouse_pos(MouseMode::Pass) else {
        return events;
    };
    let (map_x, map_y, _, _) = layout.map;
    let local = ((mx - map_x as f32) as f64, (my - map_y as f32) as f64);

    if Layout::in_rect(layout.map, mx, my) {
        if let Some((_, scroll)) = window.get_scroll_wheel() {
            if scroll != 0.0 {
                events.push(ViewerEvent::Wheel { x: local.0, y: local.1, delta: scroll as f64 });
            }
        }
    }

    let down = window.get_mouse_down(MouseButton::Left);
    *pointer = match *pointer {
        Pointer::Idle if down => {
            if Layout::in_rect(layout.map, mx, my) {
                events.push(ViewerEvent::DragStart { x: local.0, y: local.1 });
                Pointer::Map { start: (mx, my), moved: false }
            } else if Layout::in_rect(layout.minimap, mx, my) {
                Pointer::Minimap
            } else {
                Pointer::Idle
            }
        }
        Pointer::Map { start, moved } if down => {
            let moved = moved || (mx - start.0).abs() > CLICK_SLOP || (my - start.1).abs() > CLICK_SLOP;
            events.push(ViewerEvent::Drag { x: local.0, y: local.1 });
            Pointer::Map { start, moved }
        }
        Pointer::Map { moved, .. } => {
            events.push(ViewerEvent::DragEnd);
            if !moved {
                events.push(ViewerEvent::Click { x: local.0, y: local.1 });
            }
            Pointer::Idle
        }
        Pointer::Minimap if down => Pointer::Minimap,
        Pointer::Minimap => {
            let (rx, ry, _, _) = layout.minimap;
            if Layout::in_rect(layout.minimap, mx, my) {
                events.push(ViewerEvent::MinimapClick {
                    x: (mx - rx as f32) as f64,
                    y: (my - ry as f32) as f64,
                });
            }
            Pointer::Idle
        }
        Pointer::Idle => Pointer::Idle,
    };
    events
}

/// Assemble map, minimap, chart and text into the window buffer.
fn compose<E: Engine>(session: &RenderSession<E>, layout: &Layout, frame: &mut Canvas) {
    frame.fill(session.config().layout.background);

    let (map_x, map_y, map_w, _) = layout.map;
    frame.blit(session.map_canvas(), map_x as i64, map_y as i64);
    let (mini_x, mini_y, _, _) = layout.minimap;
    frame.blit(session.minimap_canvas(), mini_x as i64, mini_y as i64);
    frame.blit(session.chart_canvas(), layout.chart.0 as i64, layout.chart.1 as i64);

    let line_height = GLYPH_HEIGHT as i64 + 4;
    let (dx, dy) = layout.details;
    for (i, line) in session.selection_lines().iter().enumerate() {
        frame.draw_text(dx as i64, dy as i64 + i as i64 * line_height, line, TEXT_COLOR);
    }

    let status_y = layout.status_y as i64;
    frame.draw_text(PADDING as i64, status_y, &session.status_line(), TEXT_COLOR);
    if let Some(message) = session.run_loop().message() {
        frame.draw_text(PADDING as i64, status_y + line_height, message, MESSAGE_COLOR);
    } else {
        frame.draw_text(
            PADDING as i64,
            status_y + line_height,
            &format!("Seed {}", session.seed()),
            DIM_TEXT,
        );
    }

    if session.run_loop().is_busy() {
        let text = "FAST-FORWARDING...";
        let x = (map_x + map_w / 2).saturating_sub(text_width(text) / 2) as i64;
        frame.fill_rect(x - 6, 14, text_width(text) as i64 + 12, GLYPH_HEIGHT as i64 + 8, [0, 0, 0]);
        frame.draw_text(x, 18, text, BUSY_COLOR);
    }
}
