//! Enter, float and exit curves for queue items.
//!
//! The host gets a finished [`ItemFrame`] per item and never has to run its
//! own animation clock.

use glam::Vec2;
use serde::Serialize;

use crate::config::TrailConfig;
use crate::queue::{Lifecycle, TrailItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotionTiming {
    /// Wait between creation and the start of the enter fade.
    pub enter_delay_ms: u64,
    pub enter_duration_ms: u64,
    pub exit_duration_ms: u64,
    /// One full `0 → jitter → 0` float cycle.
    pub float_period_ms: u64,
}

impl MotionTiming {
    /// The enter fade reuses the exit duration.
    pub fn from_config(config: &TrailConfig) -> Self {
        Self {
            enter_delay_ms: config.enter_delay_ms,
            enter_duration_ms: config.exit_duration_ms,
            exit_duration_ms: config.exit_duration_ms,
            float_period_ms: config.float_period_ms,
        }
    }

    /// Time from creation until an item counts as fully entered.
    pub fn enter_total_ms(&self) -> u64 {
        self.enter_delay_ms.saturating_add(self.enter_duration_ms)
    }
}

impl Default for MotionTiming {
    fn default() -> Self {
        Self::from_config(&TrailConfig::default())
    }
}

/// What the host draws for one item at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemFrame {
    pub id: u64,
    pub position: Vec2,
    /// Degrees.
    pub rotation: f32,
    pub opacity: f32,
    pub scale: f32,
    pub lifecycle: Lifecycle,
}

#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fraction of `duration_ms` covered by `elapsed_ms`; a zero duration is
/// already complete.
#[inline]
pub fn progress(elapsed_ms: u64, duration_ms: u64) -> f32 {
    if duration_ms == 0 {
        return 1.0;
    }
    (elapsed_ms as f32 / duration_ms as f32).min(1.0)
}

/// Float weight in `[0, 1]`: rises to 1 at half period and back to 0.
pub fn float_wave(elapsed_ms: u64, period_ms: u64) -> f32 {
    if period_ms == 0 {
        return 0.0;
    }
    let phase = (elapsed_ms % period_ms) as f32 / period_ms as f32;
    if phase < 0.5 {
        ease_in_out(phase * 2.0)
    } else {
        ease_in_out((1.0 - phase) * 2.0)
    }
}

pub fn item_frame(item: &TrailItem, now_ms: u64, timing: &MotionTiming) -> ItemFrame {
    let age_ms = now_ms.saturating_sub(item.created_at_ms);

    let enter = ease_out(progress(
        age_ms.saturating_sub(timing.enter_delay_ms),
        timing.enter_duration_ms,
    ));
    let mut opacity = enter;
    let mut scale = 1.0;
    let mut rotation = item.angle * enter;
    let mut position = item.position;

    if !item.jitter.is_zero() {
        let wave = float_wave(age_ms, timing.float_period_ms);
        position += Vec2::new(item.jitter.dx, item.jitter.dy) * wave;
        rotation += item.jitter.d_rotate * wave;
    }

    if let Some(started) = item.exit_started_at_ms {
        let remaining = 1.0 - ease_out(progress(now_ms.saturating_sub(started), timing.exit_duration_ms));
        opacity *= remaining;
        scale = remaining;
    }

    ItemFrame {
        id: item.id,
        position,
        rotation,
        opacity,
        scale,
        lifecycle: item.lifecycle,
    }
}
