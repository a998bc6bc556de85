use std::error::Error as StdError;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::content::LevelError;
use crate::StartupError;

use super::input::InputSnapshot;
use super::scene::{CanvasView, Scene};

pub type PresentError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    /// `None` runs until the scene asks to quit.
    pub max_ticks: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            max_ticks: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("failed to present frame after tick {tick}: {source}")]
    Present {
        tick: u64,
        #[source]
        source: PresentError,
    },
}

pub trait InputSource {
    fn poll(&mut self, tick: u64) -> InputSnapshot;
}

/// Called once per frame that advanced at least one tick.
pub trait FrameSink {
    fn present(&mut self, frame: &CanvasView<'_>) -> Result<(), PresentError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub ticks_to_run: u32,
    pub dropped_backlog: Duration,
}

/// Backlog beyond `max_ticks_per_frame` ticks is dropped, not replayed.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
}

impl FixedStepClock {
    pub fn new(config: &LoopConfig) -> Self {
        let target_tps = config.target_tps.max(1);
        Self {
            fixed_dt: Duration::from_secs_f64(1.0 / target_tps as f64),
            max_frame_delta: normalize_non_zero_duration(
                config.max_frame_delta,
                Duration::from_millis(250),
            ),
            max_ticks_per_frame: config.max_ticks_per_frame.max(1),
            accumulator: Duration::ZERO,
        }
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    pub fn until_next_tick(&self) -> Duration {
        self.fixed_dt.saturating_sub(self.accumulator)
    }

    pub fn advance(&mut self, frame_dt: Duration) -> StepPlan {
        let available = self
            .accumulator
            .saturating_add(frame_dt.min(self.max_frame_delta));
        let due = available.as_nanos() / self.fixed_dt.as_nanos().max(1);
        let ticks_to_run = due.min(u128::from(self.max_ticks_per_frame)) as u32;
        let remainder = available.saturating_sub(self.fixed_dt * ticks_to_run);

        if due > u128::from(ticks_to_run) {
            self.accumulator = Duration::ZERO;
            StepPlan {
                ticks_to_run,
                dropped_backlog: remainder,
            }
        } else {
            self.accumulator = remainder;
            StepPlan {
                ticks_to_run,
                dropped_backlog: Duration::ZERO,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames: u64,
    pub dropped_backlog: Duration,
    pub quit_requested: bool,
}

/// Drives `scene` on the wall clock with no window. Input is polled once per
/// tick.
pub fn run_headless(
    scene: &mut dyn Scene,
    config: &LoopConfig,
    input: &mut dyn InputSource,
    sink: &mut dyn FrameSink,
) -> Result<RunSummary, AppError> {
    let mut clock = FixedStepClock::new(config);
    info!(
        target_tps = config.target_tps.max(1),
        max_ticks_per_frame = clock.max_ticks_per_frame,
        max_ticks = ?config.max_ticks,
        "loop_config"
    );

    let reached_limit = |ticks: u64| config.max_ticks.is_some_and(|limit| ticks >= limit);
    let mut ticks = 0u64;
    let mut frames = 0u64;
    let mut dropped_backlog = Duration::ZERO;
    let mut last_frame_instant = Instant::now();

    while !reached_limit(ticks) && !scene.quit_requested() {
        let now = Instant::now();
        let frame_dt = now.saturating_duration_since(last_frame_instant);
        last_frame_instant = now;

        let plan = clock.advance(frame_dt);
        let mut ticked = false;
        for _ in 0..plan.ticks_to_run {
            if reached_limit(ticks) || scene.quit_requested() {
                break;
            }
            let snapshot = input.poll(ticks);
            scene.advance_one_tick(&snapshot);
            ticks += 1;
            ticked = true;
        }

        if plan.dropped_backlog > Duration::ZERO {
            dropped_backlog = dropped_backlog.saturating_add(plan.dropped_backlog);
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame = clock.max_ticks_per_frame,
                "sim_clamp_triggered"
            );
        }

        if ticked {
            sink.present(&scene.current_canvas()).map_err(|source| {
                warn!(tick = ticks, error = %source, "frame_present_failed");
                AppError::Present {
                    tick: ticks,
                    source,
                }
            })?;
            frames += 1;
        } else {
            thread::sleep(clock.until_next_tick());
        }
    }

    let quit_requested = scene.quit_requested();
    info!(
        ticks,
        frames,
        dropped_backlog_ms = dropped_backlog.as_millis() as u64,
        quit_requested,
        "loop_finished"
    );
    Ok(RunSummary {
        ticks,
        frames,
        dropped_backlog,
        quit_requested,
    })
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Camera2D, Canvas, InputAction, Size2, World};

    struct CountingScene {
        world: World,
        canvas: Canvas,
        camera: Camera2D,
        ticks: u32,
        moves_right: u32,
        quit_after: Option<u32>,
    }

    impl CountingScene {
        fn new(quit_after: Option<u32>) -> Self {
            let canvas = Canvas::new(Size2::new(32.0, 32.0));
            Self {
                world: World::new(),
                camera: Camera2D::new(canvas.viewport),
                canvas,
                ticks: 0,
                moves_right: 0,
                quit_after,
            }
        }
    }

    impl Scene for CountingScene {
        fn advance_one_tick(&mut self, input: &InputSnapshot) {
            self.ticks += 1;
            if input.is_down(InputAction::MoveRight) {
                self.moves_right += 1;
            }
        }

        fn current_canvas(&self) -> CanvasView<'_> {
            CanvasView {
                canvas: &self.canvas,
                world: &self.world,
                camera: &self.camera,
                tilemap: None,
            }
        }

        fn quit_requested(&self) -> bool {
            self.quit_after.is_some_and(|limit| self.ticks >= limit)
        }
    }

    #[derive(Default)]
    struct EvenTicksRight {
        polled: Vec<u64>,
    }

    impl InputSource for EvenTicksRight {
        fn poll(&mut self, tick: u64) -> InputSnapshot {
            self.polled.push(tick);
            InputSnapshot::empty().with_action_down(InputAction::MoveRight, tick % 2 == 0)
        }
    }

    #[derive(Default)]
    struct CountingSink {
        frames: u64,
        fail: bool,
    }

    impl FrameSink for CountingSink {
        fn present(&mut self, frame: &CanvasView<'_>) -> Result<(), PresentError> {
            if self.fail {
                return Err("sink closed".into());
            }
            assert!(frame.draw_list().is_empty());
            self.frames += 1;
            Ok(())
        }
    }

    fn fast_config(max_ticks: Option<u64>) -> LoopConfig {
        LoopConfig {
            target_tps: 1000,
            max_ticks,
            ..LoopConfig::default()
        }
    }

    #[test]
    fn clock_clamps_large_frame_delta() {
        let mut clock = FixedStepClock::new(&LoopConfig {
            target_tps: 10,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            ..LoopConfig::default()
        });
        let plan = clock.advance(Duration::from_millis(600));
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
        assert_eq!(clock.accumulator(), Duration::from_millis(50));
    }

    #[test]
    fn clock_runs_expected_ticks_and_carries_remainder() {
        let mut clock = FixedStepClock::new(&LoopConfig {
            target_tps: 50,
            ..LoopConfig::default()
        });
        let plan = clock.advance(Duration::from_millis(50));
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(clock.accumulator(), Duration::from_millis(10));
        assert_eq!(clock.until_next_tick(), Duration::from_millis(10));
    }

    #[test]
    fn clock_drops_backlog_when_tick_cap_hit() {
        let mut clock = FixedStepClock::new(&LoopConfig {
            target_tps: 50,
            max_ticks_per_frame: 3,
            ..LoopConfig::default()
        });
        let plan = clock.advance(Duration::from_millis(200));
        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(140));
        assert_eq!(clock.accumulator(), Duration::ZERO);
    }

    #[test]
    fn short_frames_accumulate_into_one_tick() {
        let mut clock = FixedStepClock::new(&LoopConfig {
            target_tps: 50,
            ..LoopConfig::default()
        });
        assert_eq!(clock.advance(Duration::from_millis(15)).ticks_to_run, 0);
        assert_eq!(clock.until_next_tick(), Duration::from_millis(5));

        let plan = clock.advance(Duration::from_millis(15));
        assert_eq!(plan.ticks_to_run, 1);
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
        assert_eq!(clock.accumulator(), Duration::from_millis(10));
    }

    #[test]
    fn zero_settings_fall_back_to_sane_values() {
        let clock = FixedStepClock::new(&LoopConfig {
            target_tps: 0,
            max_frame_delta: Duration::ZERO,
            max_ticks_per_frame: 0,
            ..LoopConfig::default()
        });
        assert_eq!(clock.fixed_dt(), Duration::from_secs(1));
        assert_eq!(clock.max_frame_delta, Duration::from_millis(250));
        assert_eq!(clock.max_ticks_per_frame, 1);
    }

    #[test]
    fn headless_run_stops_at_tick_limit() {
        let mut scene = CountingScene::new(None);
        let mut input = EvenTicksRight::default();
        let mut sink = CountingSink::default();

        let summary =
            run_headless(&mut scene, &fast_config(Some(6)), &mut input, &mut sink).expect("run");

        assert_eq!(summary.ticks, 6);
        assert!(!summary.quit_requested);
        assert_eq!(scene.ticks, 6);
        assert_eq!(scene.moves_right, 3);
        assert_eq!(input.polled, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(summary.frames, sink.frames);
        assert!(sink.frames >= 1);
    }

    #[test]
    fn headless_run_stops_when_scene_quits() {
        let mut scene = CountingScene::new(Some(4));
        let mut input = EvenTicksRight::default();
        let mut sink = CountingSink::default();

        let summary =
            run_headless(&mut scene, &fast_config(None), &mut input, &mut sink).expect("run");

        assert_eq!(summary.ticks, 4);
        assert!(summary.quit_requested);
    }

    #[test]
    fn present_failure_is_reported() {
        let mut scene = CountingScene::new(None);
        let mut input = EvenTicksRight::default();
        let mut sink = CountingSink {
            fail: true,
            ..CountingSink::default()
        };

        let err = run_headless(&mut scene, &fast_config(Some(10)), &mut input, &mut sink)
            .expect_err("sink failure");
        assert!(matches!(err, AppError::Present { tick, .. } if tick >= 1));
    }
}
