use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use super::input::InputSource;
use super::metrics::MetricsAccumulator;
use super::scene::{Scene, SceneCommand, SceneRuntime};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub realtime: bool,
    pub max_ticks: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            realtime: false,
            max_ticks: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid loop config: {field} must be greater than zero")]
    InvalidConfig { field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    InputQuit,
    SceneQuit,
    TickLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub stop_reason: StopReason,
}

/// Drives `scene` one fixed tick at a time until input or the scene asks to
/// stop. The scene is always unloaded before this returns.
pub fn run_app(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    input_source: &mut dyn InputSource,
) -> Result<LoopSummary, AppError> {
    validate_config(&config)?;

    let fixed_dt = Duration::from_secs_f64(1.0 / config.target_tps as f64);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    info!(
        target_tps = config.target_tps,
        realtime = config.realtime,
        max_ticks = ?config.max_ticks,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame = config.max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut runtime = SceneRuntime::new(scene);
    runtime.load();
    info!(title = ?runtime.debug_title(), "scene_loaded");

    let mut metrics = MetricsAccumulator::new(metrics_log_interval);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut ticks = 0u64;

    let stop_reason = 'frames: loop {
        let frame_start = Instant::now();
        let ticks_to_run = if config.realtime {
            let raw_frame_dt = frame_start.saturating_duration_since(last_frame_instant);
            accumulator =
                accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));
            let step_plan = plan_sim_steps(accumulator, fixed_dt, config.max_ticks_per_frame);
            accumulator = step_plan.remaining_accumulator;
            if step_plan.dropped_backlog > Duration::ZERO {
                warn!(
                    dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                    max_ticks_per_frame = config.max_ticks_per_frame,
                    "sim_clamp_triggered"
                );
            }
            step_plan.ticks_to_run
        } else {
            1
        };
        last_frame_instant = frame_start;

        for _ in 0..ticks_to_run {
            if config.max_ticks.is_some_and(|limit| ticks >= limit) {
                info!(reason = "tick_limit", ticks, "shutdown_requested");
                break 'frames StopReason::TickLimit;
            }
            let input = input_source.snapshot_for_tick();
            if input.quit_requested() {
                info!(reason = "input", ticks, "shutdown_requested");
                break 'frames StopReason::InputQuit;
            }

            let tick_start = Instant::now();
            let command = runtime.update(&input);
            metrics.record_tick(tick_start.elapsed());
            ticks += 1;

            if command == SceneCommand::Quit {
                info!(reason = "scene", ticks, "shutdown_requested");
                break 'frames StopReason::SceneQuit;
            }
        }

        if let Some(snapshot) = metrics.maybe_snapshot(Instant::now()) {
            info!(
                tps = snapshot.tps,
                mean_tick_ms = snapshot.mean_tick_ms,
                peak_tick_ms = snapshot.peak_tick_ms,
                ticks,
                title = ?runtime.debug_title(),
                "loop_metrics"
            );
        }

        if config.realtime {
            let elapsed = Instant::now().saturating_duration_since(frame_start);
            let pace_sleep = compute_pace_sleep(elapsed, fixed_dt);
            if pace_sleep > Duration::ZERO {
                thread::sleep(pace_sleep);
            }
        }
    };

    runtime.shutdown();
    info!(ticks, stop_reason = ?stop_reason, "shutdown");
    Ok(LoopSummary { ticks, stop_reason })
}

fn validate_config(config: &LoopConfig) -> Result<(), AppError> {
    if config.target_tps == 0 {
        return Err(AppError::InvalidConfig {
            field: "target_tps",
        });
    }
    if config.max_ticks_per_frame == 0 {
        return Err(AppError::InvalidConfig {
            field: "max_ticks_per_frame",
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::replace(&mut accumulator, Duration::ZERO)
    } else {
        Duration::ZERO
    };

    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn compute_pace_sleep(elapsed: Duration, target: Duration) -> Duration {
    target.saturating_sub(elapsed)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::app::input::{InputAction, InputScript, InputSnapshot, InputStep, ScriptedInput};

    struct CountingScene {
        quit_after: Option<u64>,
        updates: Rc<RefCell<u64>>,
        unloaded: Rc<RefCell<bool>>,
    }

    impl Scene for CountingScene {
        fn load(&mut self) {}

        fn update(&mut self, _input: &InputSnapshot) -> SceneCommand {
            *self.updates.borrow_mut() += 1;
            match self.quit_after {
                Some(limit) if *self.updates.borrow() >= limit => SceneCommand::Quit,
                _ => SceneCommand::None,
            }
        }

        fn unload(&mut self) {
            *self.unloaded.borrow_mut() = true;
        }
    }

    struct IdleInput;

    impl InputSource for IdleInput {
        fn snapshot_for_tick(&mut self) -> InputSnapshot {
            InputSnapshot::empty()
        }
    }

    fn counting_scene(
        quit_after: Option<u64>,
    ) -> (Box<dyn Scene>, Rc<RefCell<u64>>, Rc<RefCell<bool>>) {
        let updates = Rc::new(RefCell::new(0));
        let unloaded = Rc::new(RefCell::new(false));
        let scene = CountingScene {
            quit_after,
            updates: Rc::clone(&updates),
            unloaded: Rc::clone(&unloaded),
        };
        (Box::new(scene), updates, unloaded)
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_secs(2), max_frame_delta),
            max_frame_delta
        );
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(16), max_frame_delta),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(20), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 1);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(4));
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn pace_sleep_zero_when_over_budget() {
        let target = Duration::from_millis(16);
        assert_eq!(compute_pace_sleep(Duration::from_millis(20), target), Duration::ZERO);
        assert_eq!(
            compute_pace_sleep(Duration::from_millis(10), target),
            Duration::from_millis(6)
        );
    }

    #[test]
    fn run_stops_at_tick_limit_and_unloads() {
        let (scene, updates, unloaded) = counting_scene(None);
        let config = LoopConfig {
            max_ticks: Some(25),
            ..LoopConfig::default()
        };

        let summary = run_app(config, scene, &mut IdleInput).expect("run");
        assert_eq!(summary.ticks, 25);
        assert_eq!(summary.stop_reason, StopReason::TickLimit);
        assert_eq!(*updates.borrow(), 25);
        assert!(*unloaded.borrow());
    }

    #[test]
    fn run_stops_when_scene_quits() {
        let (scene, _updates, unloaded) = counting_scene(Some(3));
        let summary = run_app(LoopConfig::default(), scene, &mut IdleInput).expect("run");
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.stop_reason, StopReason::SceneQuit);
        assert!(*unloaded.borrow());
    }

    #[test]
    fn run_stops_when_script_is_exhausted() {
        let (scene, updates, _unloaded) = counting_scene(None);
        let mut input = ScriptedInput::new(InputScript {
            steps: vec![InputStep {
                frames: 7,
                actions: vec![InputAction::MoveRight],
            }],
        });

        let summary = run_app(LoopConfig::default(), scene, &mut input).expect("run");
        assert_eq!(summary.stop_reason, StopReason::InputQuit);
        assert_eq!(summary.ticks, 7);
        assert_eq!(*updates.borrow(), 7);
    }

    #[test]
    fn run_rejects_zero_tick_rate() {
        let (scene, updates, unloaded) = counting_scene(None);
        let config = LoopConfig {
            target_tps: 0,
            ..LoopConfig::default()
        };
        let error = run_app(config, scene, &mut IdleInput).expect_err("invalid config");
        assert!(error.to_string().contains("target_tps"));
        assert_eq!(*updates.borrow(), 0);
        assert!(!*unloaded.borrow());
    }
}
