//! Headless host for Afterglow: a virtual clock, a scripted pointer and a
//! snapshot presenter standing in for a window system.
use std::path::PathBuf;

use afterglow_core::{RngJitter, TrailConfig, TrailEngine};
use afterglow_platform::{InputSource, Result, TrailMount};
use tracing::{info, warn};

mod input;
mod presenter;
mod scheduler;

pub use crate::input::ScriptedInput;
pub use crate::presenter::SnapshotPresenter;
pub use crate::scheduler::VirtualScheduler;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: TrailConfig,
    pub width: u32,
    pub height: u32,
    /// Pointer moves stop here; the run continues until `duration_ms`.
    pub input_until_ms: u64,
    pub duration_ms: u64,
    pub frame_period_ms: u64,
    pub input_step_ms: u64,
    /// Write every n-th presented frame.
    pub snapshot_every: u64,
    pub output_dir: Option<PathBuf>,
    /// Fixed jitter seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: TrailConfig::default(),
            width: 640,
            height: 480,
            input_until_ms: 3_000,
            duration_ms: 8_000,
            frame_period_ms: 16,
            input_step_ms: 8,
            snapshot_every: 30,
            output_dir: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub peak_intensity: f32,
    pub max_items: usize,
    pub dropped_moves: usize,
    /// Items or samples still held when the run ended.
    pub residual: usize,
}

/// Mounts a trail on the virtual host, replays an orbiting pointer, lets the
/// trail fade, then disposes everything.
pub fn run_app(options: RunOptions) -> Result<RunSummary> {
    let jitter = match options.seed {
        Some(seed) => RngJitter::seeded(seed),
        None => RngJitter::from_entropy(),
    };
    let engine = TrailEngine::with_jitter(
        options.config.clone(),
        options.width as f32,
        options.height as f32,
        jitter,
    )?;

    let mut scheduler = VirtualScheduler::new(options.frame_period_ms);
    let presenter = SnapshotPresenter::new(
        options.output_dir.clone(),
        options.width,
        options.height,
        options.config.display_grid,
        options.snapshot_every,
    );
    let mut mount = TrailMount::mount(engine, presenter, &mut scheduler)?;

    let path = ScriptedInput::orbit(
        options.width as f32,
        options.height as f32,
        options.input_until_ms,
        options.input_step_ms,
    );
    let sender = mount
        .pointer_sender()
        .ok_or("trail mount lost its engine before input started")?;
    let mut input = ScriptedInput::new(path, sender);
    input.start()?;

    let mut frames = 0;
    while let Some((now_ms, due)) = scheduler.advance() {
        if now_ms > options.duration_ms {
            break;
        }
        input.pump(now_ms);
        for handle in due {
            if Some(handle) == mount.frame_task() {
                frames += 1;
            }
            mount.on_task(handle, now_ms)?;
        }
    }
    input.stop()?;

    let residual = mount
        .engine()
        .map(|engine| {
            engine.queue().map(|queue| queue.len()).unwrap_or(0)
                + engine.field().map(|field| field.samples().len()).unwrap_or(0)
        })
        .unwrap_or(0);

    let summary = RunSummary {
        frames,
        peak_intensity: mount.presenter().peak_intensity(),
        max_items: mount.presenter().max_items(),
        dropped_moves: input.dropped(),
        residual,
    };

    mount.dispose(&mut scheduler)?;
    if scheduler.active_tasks() != 0 {
        warn!(tasks = scheduler.active_tasks(), "tasks still scheduled after dispose");
    }
    info!(?summary, "headless run finished");
    Ok(summary)
}
