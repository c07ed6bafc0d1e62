use afterglow_core::{PointerSender, TrailConfig, TrailEngine, TrailMode};
use tracing::{debug, info, warn};

use crate::{Result, Scheduler, TaskHandle, TrailPresenter};

/// An engine attached to a host: owns the frame loop and idle timer handles
/// and forwards each frame to the presenter.
///
/// The frame loop and the idle timer start together and stop together; a
/// mount is never left with only one of them running.
pub struct TrailMount<P: TrailPresenter> {
    engine: Option<TrailEngine>,
    presenter: P,
    frame_task: Option<TaskHandle>,
    idle_task: Option<(TaskHandle, u64)>,
}

impl<P: TrailPresenter> TrailMount<P> {
    pub fn mount(engine: TrailEngine, mut presenter: P, scheduler: &mut dyn Scheduler) -> Result<Self> {
        presenter.init()?;
        presenter.configure(engine.config())?;
        let frame_task = scheduler.start_frame_loop()?;

        let idle_task = match idle_period(engine.config()) {
            Some(period_ms) => match scheduler.start_interval(period_ms) {
                Ok(handle) => Some((handle, period_ms)),
                Err(err) => {
                    if let Err(cancel_err) = scheduler.cancel(frame_task) {
                        warn!("failed to roll back frame loop after idle timer error: {cancel_err}");
                    }
                    return Err(err);
                }
            },
            None => None,
        };

        info!(mode = ?engine.mode(), ?frame_task, ?idle_task, "trail mounted");
        Ok(Self {
            engine: Some(engine),
            presenter,
            frame_task: Some(frame_task),
            idle_task,
        })
    }

    /// Dispatches a scheduler callback. Unknown handles and callbacks after
    /// dispose are ignored.
    pub fn on_task(&mut self, handle: TaskHandle, now_ms: u64) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };

        if self.frame_task == Some(handle) {
            engine.frame(now_ms);
            match engine.mode() {
                TrailMode::Field => {
                    if engine.take_field_dirty() {
                        if let Some(field) = engine.field() {
                            self.presenter.present_field(field, now_ms)?;
                        }
                    }
                }
                TrailMode::Queue => {
                    let events = engine.drain_events();
                    let frames = engine.item_frames(now_ms);
                    self.presenter.present_items(&frames, &events, now_ms)?;
                }
            }
        } else if self.idle_task.map(|(idle, _)| idle) == Some(handle) {
            if let Some(id) = engine.idle_tick(now_ms) {
                debug!(id, now_ms, "idle eviction");
            }
        } else {
            debug!(?handle, "callback for unknown task ignored");
        }
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(engine) = self.engine.as_mut() {
            engine.resize(width as f32, height as f32);
            self.presenter.resize(width, height)?;
        }
        Ok(())
    }

    /// Applies a new configuration and starts, restarts or stops the idle
    /// timer to match it.
    ///
    /// A replacement timer is started before the engine changes, so a failure
    /// leaves the previous config and timers in place. A failed cancel of the
    /// old timer is reported after the switch; its callbacks no longer match
    /// and are ignored.
    pub fn set_config(&mut self, config: TrailConfig, scheduler: &mut dyn Scheduler) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Err("trail mount already disposed".into());
        };
        config.validate()?;

        let wanted = idle_period(&config);
        let current = self.idle_task.map(|(_, period)| period);
        let replacement = match wanted {
            Some(period_ms) if current != wanted => Some((scheduler.start_interval(period_ms)?, period_ms)),
            _ => None,
        };

        if let Err(err) = engine.set_config(config) {
            if let Some((handle, _)) = replacement {
                if let Err(cancel_err) = scheduler.cancel(handle) {
                    warn!(?handle, "failed to roll back idle timer after config error: {cancel_err}");
                }
            }
            return Err(err.into());
        }

        let mut cancelled = Ok(());
        if current != wanted {
            let stale = std::mem::replace(&mut self.idle_task, replacement);
            debug!(idle_task = ?self.idle_task, "idle timer reconciled");
            if let Some((handle, _)) = stale {
                cancelled = scheduler.cancel(handle);
            }
        }
        self.presenter.configure(engine.config())?;
        cancelled
    }

    /// Stops the frame loop and the idle timer, then releases the engine and
    /// its field buffer. Calling it again is a no-op.
    ///
    /// Both cancellations are attempted even if the first fails; the first
    /// error is returned afterwards.
    pub fn dispose(&mut self, scheduler: &mut dyn Scheduler) -> Result<()> {
        if self.engine.is_none() {
            return Ok(());
        }
        let mut first_err = None;
        for handle in [self.frame_task.take(), self.idle_task.take().map(|(h, _)| h)]
            .into_iter()
            .flatten()
        {
            if let Err(err) = scheduler.cancel(handle) {
                warn!(?handle, "failed to cancel trail task: {err}");
                first_err.get_or_insert(err);
            }
        }
        self.engine = None;
        if let Err(err) = self.presenter.release() {
            first_err.get_or_insert(err);
        }
        info!("trail disposed");
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&TrailEngine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut TrailEngine> {
        self.engine.as_mut()
    }

    pub fn pointer_sender(&self) -> Option<PointerSender> {
        self.engine.as_ref().map(TrailEngine::pointer_sender)
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn frame_task(&self) -> Option<TaskHandle> {
        self.frame_task
    }

    pub fn idle_task(&self) -> Option<TaskHandle> {
        self.idle_task.map(|(handle, _)| handle)
    }
}

fn idle_period(config: &TrailConfig) -> Option<u64> {
    (config.mode == TrailMode::Queue).then_some(config.removal_interval_ms)
}
