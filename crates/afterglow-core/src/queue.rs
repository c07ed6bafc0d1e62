//! Bounded FIFO of discrete trail items with enter/exit lifecycles.

use std::collections::VecDeque;

use glam::Vec2;
use serde::Serialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::jitter::Jitter;
use crate::motion::MotionTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Entering,
    Alive,
    Exiting,
    /// Reported once through [`LifecycleEvent`]; such items are no longer
    /// held by the queue.
    Removed,
}

impl Lifecycle {
    /// Counts against `max_points`.
    pub fn is_active(self) -> bool {
        matches!(self, Lifecycle::Entering | Lifecycle::Alive)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailItem {
    pub id: u64,
    /// Surface pixels.
    pub position: Vec2,
    /// Degrees.
    pub angle: f32,
    pub jitter: Jitter,
    pub lifecycle: Lifecycle,
    pub created_at_ms: u64,
    pub exit_started_at_ms: Option<u64>,
}

/// A lifecycle transition the host can bind an animation to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LifecycleEvent {
    pub id: u64,
    pub lifecycle: Lifecycle,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvictReason {
    Capacity,
    Idle,
    Shrink,
}

pub struct TrailQueue {
    /// Exiting items first, then active ones.
    items: VecDeque<TrailItem>,
    /// Length of the exiting prefix of `items`.
    exiting: usize,
    max_points: usize,
    next_id: u64,
    last_push_ms: Option<u64>,
    timing: MotionTiming,
    events: Vec<LifecycleEvent>,
}

impl TrailQueue {
    pub fn new(max_points: usize, timing: MotionTiming) -> Result<Self, ConfigError> {
        if max_points == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            items: VecDeque::with_capacity(max_points + 1),
            exiting: 0,
            max_points,
            next_id: 0,
            last_push_ms: None,
            timing,
            events: Vec::new(),
        })
    }

    /// Appends an entering item and evicts the oldest active one when the
    /// queue goes over capacity. Returns the new item's id.
    pub fn push(&mut self, position: Vec2, angle: f32, jitter: Jitter, now_ms: u64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(TrailItem {
            id,
            position,
            angle,
            jitter,
            lifecycle: Lifecycle::Entering,
            created_at_ms: now_ms,
            exit_started_at_ms: None,
        });
        self.emit(id, Lifecycle::Entering, now_ms);
        self.last_push_ms = Some(now_ms);

        if self.active_len() > self.max_points {
            self.begin_exit(now_ms, EvictReason::Capacity);
        }
        id
    }

    /// Evicts the oldest active item when nothing was pushed for longer than
    /// `idle_threshold_ms`. Returns the evicted id.
    pub fn evict_idle(&mut self, now_ms: u64, idle_threshold_ms: u64) -> Option<u64> {
        let last_push = self.last_push_ms?;
        if now_ms.saturating_sub(last_push) <= idle_threshold_ms {
            return None;
        }
        self.begin_exit(now_ms, EvictReason::Idle)
    }

    /// Finishes enter animations and drops items whose exit completed.
    pub fn advance(&mut self, now_ms: u64) {
        let enter_total = self.timing.enter_total_ms();
        let exit_total = self.timing.exit_duration_ms;
        let mut transitions = Vec::new();

        for item in self.items.iter_mut() {
            match item.lifecycle {
                Lifecycle::Entering if now_ms.saturating_sub(item.created_at_ms) >= enter_total => {
                    item.lifecycle = Lifecycle::Alive;
                    transitions.push((item.id, Lifecycle::Alive));
                }
                Lifecycle::Exiting => {
                    let started = item.exit_started_at_ms.unwrap_or(now_ms);
                    if now_ms.saturating_sub(started) >= exit_total {
                        item.lifecycle = Lifecycle::Removed;
                        transitions.push((item.id, Lifecycle::Removed));
                    }
                }
                _ => {}
            }
        }

        if transitions.is_empty() {
            return;
        }
        let before = self.items.len();
        self.items.retain(|item| item.lifecycle != Lifecycle::Removed);
        self.exiting -= before - self.items.len();
        for (id, lifecycle) in transitions {
            self.emit(id, lifecycle, now_ms);
        }
    }

    /// Changes the capacity; surplus active items start exiting immediately.
    pub fn set_capacity(&mut self, max_points: usize, now_ms: u64) -> Result<(), ConfigError> {
        if max_points == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.max_points = max_points;
        while self.active_len() > self.max_points {
            self.begin_exit(now_ms, EvictReason::Shrink);
        }
        Ok(())
    }

    pub fn set_timing(&mut self, timing: MotionTiming) {
        self.timing = timing;
    }

    pub fn timing(&self) -> &MotionTiming {
        &self.timing
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// All held items in insertion order, exiting ones included.
    pub fn items(&self) -> impl Iterator<Item = &TrailItem> + '_ {
        self.items.iter()
    }

    pub fn get(&self, id: u64) -> Option<&TrailItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active_len(&self) -> usize {
        self.items.len() - self.exiting
    }

    /// The most recently pushed item that is still entering or alive.
    pub fn newest_active(&self) -> Option<&TrailItem> {
        if self.active_len() == 0 {
            return None;
        }
        self.items.back()
    }

    pub fn last_push_ms(&self) -> Option<u64> {
        self.last_push_ms
    }

    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }

    /// The single exit transition shared by capacity, idle and shrink
    /// eviction.
    fn begin_exit(&mut self, now_ms: u64, reason: EvictReason) -> Option<u64> {
        let item = self.items.get_mut(self.exiting)?;
        debug_assert!(item.lifecycle.is_active());
        item.lifecycle = Lifecycle::Exiting;
        self.exiting += 1;
        item.exit_started_at_ms = Some(now_ms);
        let id = item.id;
        debug!(id, ?reason, "trail item exiting");
        self.emit(id, Lifecycle::Exiting, now_ms);
        Some(id)
    }

    fn emit(&mut self, id: u64, lifecycle: Lifecycle, at_ms: u64) {
        self.events.push(LifecycleEvent { id, lifecycle, at_ms });
    }
}
