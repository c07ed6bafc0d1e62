use std::collections::BTreeMap;

use afterglow_platform::{Result, Scheduler, TaskHandle};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskKind {
    Frame,
    Interval,
}

#[derive(Debug, Clone, Copy)]
struct Task {
    kind: TaskKind,
    period_ms: u64,
    next_due_ms: u64,
}

/// Deterministic scheduler driven by an explicit clock instead of a display
/// or OS timers. Frames and intervals never fire concurrently; callers
/// dispatch due tasks one at a time.
pub struct VirtualScheduler {
    now_ms: u64,
    frame_period_ms: u64,
    next_id: u64,
    tasks: BTreeMap<u64, Task>,
}

impl VirtualScheduler {
    pub fn new(frame_period_ms: u64) -> Self {
        Self {
            now_ms: 0,
            frame_period_ms: frame_period_ms.max(1),
            next_id: 0,
            tasks: BTreeMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn has_frame_loop(&self) -> bool {
        self.tasks.values().any(|task| task.kind == TaskKind::Frame)
    }

    pub fn has_interval(&self) -> bool {
        self.tasks.values().any(|task| task.kind == TaskKind::Interval)
    }

    /// Earliest time any task is due, if any is running.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.tasks.values().map(|task| task.next_due_ms).min()
    }

    /// Moves the clock to the next due time (never backwards) and returns the
    /// tasks due then, frames first. Each returned task is rescheduled one
    /// period later.
    pub fn advance(&mut self) -> Option<(u64, Vec<TaskHandle>)> {
        let due_at = self.next_due_ms()?;
        self.now_ms = self.now_ms.max(due_at);

        let mut due: Vec<(TaskKind, u64)> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.next_due_ms <= self.now_ms)
            .map(|(id, task)| (task.kind, *id))
            .collect();
        due.sort_by_key(|(kind, id)| (*kind == TaskKind::Interval, *id));

        for (_, id) in &due {
            if let Some(task) = self.tasks.get_mut(id) {
                task.next_due_ms = self.now_ms + task.period_ms;
            }
        }
        Some((self.now_ms, due.into_iter().map(|(_, id)| TaskHandle(id)).collect()))
    }

    fn insert(&mut self, kind: TaskKind, period_ms: u64) -> TaskHandle {
        self.next_id += 1;
        self.tasks.insert(
            self.next_id,
            Task {
                kind,
                period_ms,
                next_due_ms: self.now_ms + period_ms,
            },
        );
        debug!(id = self.next_id, ?kind, period_ms, "virtual task started");
        TaskHandle(self.next_id)
    }
}

impl Scheduler for VirtualScheduler {
    fn start_frame_loop(&mut self) -> Result<TaskHandle> {
        Ok(self.insert(TaskKind::Frame, self.frame_period_ms))
    }

    fn start_interval(&mut self, period_ms: u64) -> Result<TaskHandle> {
        if period_ms == 0 {
            return Err("interval period must be greater than zero".into());
        }
        Ok(self.insert(TaskKind::Interval, period_ms))
    }

    fn cancel(&mut self, handle: TaskHandle) -> Result<()> {
        if self.tasks.remove(&handle.0).is_none() {
            warn!(?handle, "cancel for unknown virtual task");
        }
        Ok(())
    }
}
