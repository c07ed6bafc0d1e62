//! Gap filling between consecutive pointer positions.

use glam::Vec2;

use crate::error::ConfigError;

/// Folds a direction in degrees into `(-90, 90]` so glyphs stay upright
/// whichever way the pointer travels.
pub fn normalize_angle(degrees: f32) -> f32 {
    if degrees > 90.0 {
        degrees - 180.0
    } else if degrees <= -90.0 {
        degrees + 180.0
    } else {
        degrees
    }
}

/// Evenly spaced points along one pointer movement, all sharing an angle.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub angle: f32,
    pub points: Vec<Vec2>,
    /// Leading points left out by [`GeometryInterpolator::interpolate_tail`].
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryInterpolator {
    spacing: f32,
    follow_direction: bool,
}

impl GeometryInterpolator {
    pub fn new(spacing: f32, follow_direction: bool) -> Result<Self, ConfigError> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(ConfigError::InvalidSpacing(spacing));
        }
        Ok(Self {
            spacing,
            follow_direction,
        })
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn follow_direction(&self) -> bool {
        self.follow_direction
    }

    /// Returns `None` when `to` is closer than one spacing to `from`.
    /// Otherwise yields `floor(distance / spacing)` points, the first one
    /// spacing away from `from`.
    pub fn interpolate(&self, from: Vec2, to: Vec2) -> Option<Segment> {
        self.interpolate_tail(from, to, usize::MAX)
    }

    /// Like [`interpolate`](Self::interpolate) but keeps only the last `keep`
    /// points of the segment. Earlier points are counted in `skipped` and
    /// never built.
    pub fn interpolate_tail(&self, from: Vec2, to: Vec2, keep: usize) -> Option<Segment> {
        let delta = to - from;
        let distance = delta.length();
        if !distance.is_finite() || distance < self.spacing {
            return None;
        }

        let angle = if self.follow_direction {
            normalize_angle(delta.y.atan2(delta.x).to_degrees())
        } else {
            0.0
        };
        let direction = delta / distance;
        // Float-to-int casts saturate, so a huge distance cannot wrap.
        let steps = (distance / self.spacing).floor() as usize;
        let skipped = steps.saturating_sub(keep);
        let points = (skipped + 1..=steps)
            .map(|i| from + direction * (self.spacing * i as f32))
            .collect();

        Some(Segment { angle, points, skipped })
    }
}
