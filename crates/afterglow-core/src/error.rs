use thiserror::Error;

/// Rejected configuration. Raised at construction or `set_config`, never from
/// the per-frame paths.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid_resolution must be greater than zero")]
    ZeroResolution,
    #[error("display_grid must be greater than zero")]
    ZeroDisplayGrid,
    #[error("max_age_ticks must be greater than zero")]
    ZeroMaxAge,
    #[error("max_points must be greater than zero")]
    ZeroCapacity,
    #[error("removal_interval_ms must be greater than zero")]
    ZeroRemovalInterval,
    #[error("float_period_ms must be greater than zero")]
    ZeroFloatPeriod,
    #[error("trail_radius must be a positive finite number, got {0}")]
    InvalidRadius(f32),
    #[error("spacing must be a positive finite number, got {0}")]
    InvalidSpacing(f32),
    #[error("jitter_amplitude must be a non-negative finite number, got {0}")]
    InvalidJitterAmplitude(f32),
}

#[derive(Debug, Error)]
pub enum TrailError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to parse trail config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read trail config: {0}")]
    Io(#[from] std::io::Error),
}

pub type TrailResult<T> = std::result::Result<T, TrailError>;
