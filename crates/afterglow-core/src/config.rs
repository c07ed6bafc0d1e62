//! Engine configuration, loaded from TOML or built in code.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, TrailResult};

/// Which trail variant an engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailMode {
    /// Continuous decay field (pixel trail).
    Field,
    /// Discrete item queue (glyph trail).
    Queue,
}

/// Where pixel `y = 0` sits on the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceOrigin {
    TopLeft,
    /// GL convention: `v` grows upwards, so pixel rows are flipped.
    BottomLeft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub mode: TrailMode,

    // Field mode
    pub grid_resolution: u32,
    pub trail_radius: f32,
    pub max_age_ticks: u32,
    pub display_grid: u32,
    pub surface_origin: SurfaceOrigin,

    // Queue mode
    pub spacing: f32,
    pub max_points: usize,
    pub idle_threshold_ms: u64,
    pub removal_interval_ms: u64,
    pub exit_duration_ms: u64,
    pub enter_delay_ms: u64,
    pub jitter_enabled: bool,
    pub jitter_amplitude: f32,
    pub float_period_ms: u64,
    pub follow_direction: bool,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            mode: TrailMode::Field,
            grid_resolution: 512,
            trail_radius: 0.1,
            max_age_ticks: 250,
            display_grid: 40,
            surface_origin: SurfaceOrigin::BottomLeft,
            spacing: 100.0,
            max_points: 5,
            idle_threshold_ms: 100,
            removal_interval_ms: 30,
            exit_duration_ms: 500,
            enter_delay_ms: 10,
            jitter_enabled: true,
            jitter_amplitude: 5.0,
            float_period_ms: 2_000,
            follow_direction: true,
        }
    }
}

impl TrailConfig {
    /// Defaults for a glyph trail.
    pub fn queue() -> Self {
        Self {
            mode: TrailMode::Queue,
            ..Self::default()
        }
    }

    /// Rejects every value the engine cannot run with. Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if self.display_grid == 0 {
            return Err(ConfigError::ZeroDisplayGrid);
        }
        if self.max_age_ticks == 0 {
            return Err(ConfigError::ZeroMaxAge);
        }
        if !(self.trail_radius.is_finite() && self.trail_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.trail_radius));
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(ConfigError::InvalidSpacing(self.spacing));
        }
        if self.max_points == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.removal_interval_ms == 0 {
            return Err(ConfigError::ZeroRemovalInterval);
        }
        if self.float_period_ms == 0 {
            return Err(ConfigError::ZeroFloatPeriod);
        }
        if !(self.jitter_amplitude.is_finite() && self.jitter_amplitude >= 0.0) {
            return Err(ConfigError::InvalidJitterAmplitude(self.jitter_amplitude));
        }
        Ok(())
    }

    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> TrailResult<Self> {
        let config: TrailConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> TrailResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
