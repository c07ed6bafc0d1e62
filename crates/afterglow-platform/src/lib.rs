//! Platform abstraction traits so `afterglow-core` stays host-agnostic, plus
//! the mount that binds an engine to a host's scheduler and presenter.

use serde::{Deserialize, Serialize};

mod mount;

pub use mount::TrailMount;

use afterglow_core::{DecayField, ItemFrame, LifecycleEvent, TrailConfig};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Identifies a recurring task handed out by a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(pub u64);

/// Host frame and timer primitives. Callbacks come back through
/// [`TrailMount::on_task`] with the handle returned here.
pub trait Scheduler {
    /// Starts calling back once per rendered frame.
    fn start_frame_loop(&mut self) -> Result<TaskHandle>;
    /// Starts calling back every `period_ms`.
    fn start_interval(&mut self, period_ms: u64) -> Result<TaskHandle>;
    fn cancel(&mut self, handle: TaskHandle) -> Result<()>;
}

/// Source of pointer moves (mouse, touch, scripted).
pub trait InputSource {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

/// Presentation boundary: uploads, DOM-like mutations and drawing happen here.
pub trait TrailPresenter {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }
    /// Called on mount and after every accepted config change.
    fn configure(&mut self, _config: &TrailConfig) -> Result<()> {
        Ok(())
    }
    /// Called after a field tick that changed the grid.
    fn present_field(&mut self, field: &DecayField, now_ms: u64) -> Result<()>;
    /// Called after each queue frame with the current snapshots and the
    /// lifecycle transitions since the previous call.
    fn present_items(&mut self, frames: &[ItemFrame], events: &[LifecycleEvent], now_ms: u64) -> Result<()>;
    fn resize(&mut self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }
    /// Last call before the mount lets go of the engine.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
