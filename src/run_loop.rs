//! Run loop controller.
//!
//! Drives play/pause, single steps and fast-forward batches against an
//! [`Engine`], one call to [`RunLoop::frame`] per displayed frame. A failed
//! advance stops playback and is kept for display; it is never retried.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::engine::Engine;
use crate::error::EngineError;

/// Ticks advanced per displayed frame while running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunSpeed {
    /// 1 tick per frame
    Slow,
    /// 5 ticks per frame
    Normal,
    /// 20 ticks per frame
    Fast,
    /// 100 ticks per frame
    VeryFast,
}

impl RunSpeed {
    pub fn ticks_per_frame(&self) -> u32 {
        match self {
            RunSpeed::Slow => 1,
            RunSpeed::Normal => 5,
            RunSpeed::Fast => 20,
            RunSpeed::VeryFast => 100,
        }
    }

    /// Cycle to next speed.
    pub fn next(&self) -> Self {
        match self {
            RunSpeed::Slow => RunSpeed::Normal,
            RunSpeed::Normal => RunSpeed::Fast,
            RunSpeed::Fast => RunSpeed::VeryFast,
            RunSpeed::VeryFast => RunSpeed::Slow,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RunSpeed::Slow => "1x",
            RunSpeed::Normal => "5x",
            RunSpeed::Fast => "20x",
            RunSpeed::VeryFast => "100x",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunLoopConfig {
    pub speed: RunSpeed,
    /// Ticks in one fast-forward batch.
    pub fast_forward_ticks: u32,
    /// Frames a failure message stays on screen.
    pub message_frames: u32,
}

impl Default for RunLoopConfig {
    fn default() -> Self {
        Self {
            speed: RunSpeed::Normal,
            fast_forward_ticks: 1000,
            message_frames: 180,
        }
    }
}

/// What one call to [`RunLoop::frame`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing advanced.
    Idle,
    /// Engine advanced by this many ticks.
    Advanced(u32),
    /// Fast-forward was requested; this frame only shows the busy indicator.
    BusyPending,
    /// A fast-forward batch of this many ticks completed.
    FastForwarded(u32),
    /// The engine refused to advance; playback is now stopped.
    Failed(EngineError),
}

impl FrameOutcome {
    /// Whether the engine state changed and the view needs fresh data.
    pub fn advanced(&self) -> bool {
        matches!(self, FrameOutcome::Advanced(_) | FrameOutcome::FastForwarded(_))
    }
}

/// Play/pause state machine with deferred fast-forward.
pub struct RunLoop {
    state: RunState,
    speed: RunSpeed,
    fast_forward_ticks: u32,
    /// Batch size waiting for its frame
    pending_fast_forward: Option<u32>,
    /// Set once the busy indicator has been shown for the pending batch
    busy_shown: bool,
    last_error: Option<EngineError>,
    message: Option<(String, u32)>,
    message_frames: u32,
}

impl RunLoop {
    pub fn new(config: &RunLoopConfig) -> Self {
        Self {
            state: RunState::Stopped,
            speed: config.speed,
            fast_forward_ticks: config.fast_forward_ticks.max(1),
            pending_fast_forward: None,
            busy_shown: false,
            last_error: None,
            message: None,
            message_frames: config.message_frames,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn speed(&self) -> RunSpeed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: RunSpeed) {
        self.speed = speed;
    }

    pub fn cycle_speed(&mut self) -> RunSpeed {
        self.speed = self.speed.next();
        self.speed
    }

    /// True while a fast-forward batch is waiting to run.
    pub fn is_busy(&self) -> bool {
        self.pending_fast_forward.is_some()
    }

    pub fn last_error(&self) -> Option<&EngineError> {
        self.last_error.as_ref()
    }

    /// Transient status message, if one is still live.
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some((text.into(), self.message_frames));
    }

    pub fn play(&mut self) {
        if self.state != RunState::Running {
            info!(speed = self.speed.name(), "playback started");
        }
        self.state = RunState::Running;
        self.last_error = None;
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            info!("playback paused");
        }
        self.state = RunState::Stopped;
    }

    pub fn toggle(&mut self) {
        match self.state {
            RunState::Running => self.pause(),
            RunState::Stopped => self.play(),
        }
    }

    /// Exactly one tick, whatever the current state.
    pub fn step<E: Engine + ?Sized>(&mut self, engine: &mut E) -> FrameOutcome {
        self.advance(engine, 1)
    }

    /// Queue a fast-forward batch. The next frame shows the busy indicator and
    /// the frame after runs the batch. `None` uses the configured batch size.
    pub fn request_fast_forward(&mut self, ticks: Option<u32>) {
        let ticks = ticks.unwrap_or(self.fast_forward_ticks).max(1);
        debug!(ticks, "fast-forward requested");
        self.pending_fast_forward = Some(ticks);
        self.busy_shown = false;
    }

    /// Run once per displayed frame.
    pub fn frame<E: Engine + ?Sized>(&mut self, engine: &mut E) -> FrameOutcome {
        if let Some((_, frames)) = self.message.as_mut() {
            *frames = frames.saturating_sub(1);
            if *frames == 0 {
                self.message = None;
            }
        }

        if let Some(ticks) = self.pending_fast_forward {
            if !self.busy_shown {
                self.busy_shown = true;
                return FrameOutcome::BusyPending;
            }
            self.pending_fast_forward = None;
            self.busy_shown = false;
            return match self.advance(engine, ticks) {
                FrameOutcome::Advanced(n) => {
                    info!(ticks = n, time = engine.current_time(), "fast-forward complete");
                    FrameOutcome::FastForwarded(n)
                }
                other => other,
            };
        }

        if self.state != RunState::Running {
            return FrameOutcome::Idle;
        }
        self.advance(engine, self.speed.ticks_per_frame())
    }

    fn advance<E: Engine + ?Sized>(&mut self, engine: &mut E, ticks: u32) -> FrameOutcome {
        match engine.advance(ticks) {
            Ok(()) => FrameOutcome::Advanced(ticks),
            Err(err) => {
                error!(error = %err, ticks, "engine advance failed, stopping playback");
                self.state = RunState::Stopped;
                self.pending_fast_forward = None;
                self.busy_shown = false;
                self.set_message(format!("Simulation error: {err}"));
                self.last_error = Some(err.clone());
                FrameOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Entity, HistoryPoint, Statistics, TileInfo, Variant, WorldSnapshot};

    /// Counts advances and fails once `fail_after` calls have succeeded.
    struct CountingEngine {
        calls: Vec<u32>,
        fail_after: Option<usize>,
    }

    impl Engine for CountingEngine {
        fn variant(&self) -> Variant {
            Variant::Ecology
        }
        fn initialize(&mut self, _: u32, _: u32, _: u64) -> Result<(), EngineError> {
            Ok(())
        }
        fn advance(&mut self, ticks: u32) -> Result<(), EngineError> {
            if self.fail_after.is_some_and(|n| self.calls.len() >= n) {
                return Err(EngineError::InvalidAdvance { requested: ticks, reason: "boom".into() });
            }
            self.calls.push(ticks);
            Ok(())
        }
        fn current_time(&self) -> i64 {
            self.calls.iter().map(|&t| t as i64).sum()
        }
        fn snapshot(&self) -> Option<&WorldSnapshot> {
            None
        }
        fn statistics(&self) -> Statistics {
            Statistics::default()
        }
        fn entities(&self) -> Vec<Entity> {
            Vec::new()
        }
        fn history(&self) -> &[HistoryPoint] {
            &[]
        }
        fn tile_info(&self, _: i64, _: i64) -> Option<TileInfo> {
            None
        }
    }

    fn engine(fail_after: Option<usize>) -> CountingEngine {
        CountingEngine { calls: Vec::new(), fail_after }
    }

    #[test]
    fn test_running_advances_speed_ticks_per_frame() {
        let mut run = RunLoop::new(&RunLoopConfig::default());
        let mut e = engine(None);
        assert_eq!(run.frame(&mut e), FrameOutcome::Idle);
        run.play();
        run.set_speed(RunSpeed::Fast);
        assert_eq!(run.frame(&mut e), FrameOutcome::Advanced(20));
        assert_eq!(e.calls, vec![20]);
    }

    #[test]
    fn test_step_works_while_stopped() {
        let mut run = RunLoop::new(&RunLoopConfig::default());
        let mut e = engine(None);
        assert_eq!(run.step(&mut e), FrameOutcome::Advanced(1));
        assert_eq!(run.state(), RunState::Stopped);
    }

    #[test]
    fn test_failure_stops_and_reports() {
        let mut run = RunLoop::new(&RunLoopConfig::default());
        let mut e = engine(Some(2));
        run.play();
        run.frame(&mut e);
        run.frame(&mut e);
        assert!(matches!(run.frame(&mut e), FrameOutcome::Failed(_)));
        assert_eq!(run.state(), RunState::Stopped);
        assert!(run.last_error().is_some());
        assert!(run.message().unwrap().starts_with("Simulation error"));

        for _ in 0..5 {
            assert_eq!(run.frame(&mut e), FrameOutcome::Idle);
        }
        assert_eq!(e.calls.len(), 2);
    }

    #[test]
    fn test_fast_forward_is_deferred_one_frame() {
        let mut run = RunLoop::new(&RunLoopConfig { fast_forward_ticks: 500, ..Default::default() });
        let mut e = engine(None);
        run.request_fast_forward(None);
        assert!(run.is_busy());
        assert_eq!(run.frame(&mut e), FrameOutcome::BusyPending);
        assert!(e.calls.is_empty());
        assert_eq!(run.frame(&mut e), FrameOutcome::FastForwarded(500));
        assert!(!run.is_busy());
        assert_eq!(e.calls, vec![500]);
    }

    #[test]
    fn test_speed_presets_cycle() {
        let mut speed = RunSpeed::Slow;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(speed.ticks_per_frame());
            speed = speed.next();
        }
        assert_eq!(seen, vec![1, 5, 20, 100]);
        assert_eq!(speed, RunSpeed::Slow);
    }
}
