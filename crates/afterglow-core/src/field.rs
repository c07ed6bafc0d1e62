//! The decay field: a fixed `size × size` intensity grid fed by pointer samples.

use glam::Vec2;
use serde::Serialize;
use tracing::trace;

use crate::config::TrailConfig;
use crate::error::ConfigError;
use crate::evolver;

/// One recorded pointer position in normalized surface space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub position_uv: Vec2,
    /// Ticks survived since recording.
    pub age: u32,
    /// Field tick at which the sample was recorded.
    pub born_at: u64,
}

pub struct DecayField {
    size: usize,
    cells: Vec<f32>,
    samples: Vec<Sample>,
    trail_radius: f32,
    max_age: u32,
    ticks: u64,
    dirty: bool,
}

impl DecayField {
    pub fn new(size: u32, trail_radius: f32, max_age: u32) -> Result<Self, ConfigError> {
        validate_decay(size, trail_radius, max_age)?;
        let size = size as usize;
        Ok(Self {
            size,
            cells: vec![0.0; size * size],
            samples: Vec::new(),
            trail_radius,
            max_age,
            ticks: 0,
            dirty: true,
        })
    }

    pub fn from_config(config: &TrailConfig) -> Result<Self, ConfigError> {
        Self::new(config.grid_resolution, config.trail_radius, config.max_age_ticks)
    }

    /// Records a sample at `(u, v)`.
    ///
    /// Coordinates outside `[0, 1]` (or NaN) are ignored and `false` is
    /// returned; callers never see an error from this path.
    pub fn record_sample(&mut self, u: f32, v: f32) -> bool {
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            trace!(u, v, "sample outside unit square ignored");
            return false;
        }
        self.samples.push(Sample {
            position_uv: Vec2::new(u, v),
            age: 0,
            born_at: self.ticks,
        });
        true
    }

    /// Advances the field by one frame: age, expire, rasterize, mark dirty.
    pub fn tick(&mut self) {
        evolver::age_samples(&mut self.samples, self.max_age);
        evolver::rasterize(
            &mut self.cells,
            self.size,
            &self.samples,
            self.trail_radius,
            self.max_age,
        );
        self.ticks += 1;
        self.dirty = true;
    }

    /// Changes the decay parameters in place. The grid size is fixed; samples
    /// older than a shortened `max_age` expire on the next tick.
    pub fn set_decay(&mut self, trail_radius: f32, max_age: u32) -> Result<(), ConfigError> {
        validate_decay(self.size as u32, trail_radius, max_age)?;
        self.trail_radius = trail_radius;
        self.max_age = max_age;
        Ok(())
    }

    /// Drops every sample and zeroes the grid.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.cells.fill(0.0);
        self.dirty = true;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn trail_radius(&self) -> f32 {
        self.trail_radius
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Completed ticks since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Row-major cells, `y * size + x`.
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(self.cells[y * self.size + x])
    }

    /// Nearest-cell lookup at normalized coordinates, clamped to the grid.
    pub fn sample_uv(&self, uv: Vec2) -> f32 {
        let max_index = (self.size - 1) as f32;
        let x = (uv.x * self.size as f32).floor().clamp(0.0, max_index) as usize;
        let y = (uv.y * self.size as f32).floor().clamp(0.0, max_index) as usize;
        self.cells[y * self.size + x]
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Raw `f32` bytes of the grid, ready for a single-channel float texture.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether the grid changed since the last call and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

fn validate_decay(size: u32, trail_radius: f32, max_age: u32) -> Result<(), ConfigError> {
    if size == 0 {
        return Err(ConfigError::ZeroResolution);
    }
    if max_age == 0 {
        return Err(ConfigError::ZeroMaxAge);
    }
    if !(trail_radius.is_finite() && trail_radius > 0.0) {
        return Err(ConfigError::InvalidRadius(trail_radius));
    }
    Ok(())
}
