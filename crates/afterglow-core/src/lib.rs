//! Afterglow core engine: platform-agnostic pointer trails.
//!
//! Two variants share one engine. Field mode keeps a fixed-size decay grid fed
//! by pointer samples; queue mode keeps a bounded FIFO of discrete items with
//! enter/exit lifecycles.

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod evolver;
pub mod field;
pub mod input;
pub mod interpolator;
pub mod jitter;
pub mod motion;
pub mod queue;
pub mod recorder;

pub use config::{SurfaceOrigin, TrailConfig, TrailMode};
pub use engine::TrailEngine;
pub use error::{ConfigError, TrailError, TrailResult};
pub use field::{DecayField, Sample};
pub use input::{PointerEvent, PointerSender, PointerSpace, INBOX_CAPACITY};
pub use interpolator::{normalize_angle, GeometryInterpolator, Segment};
pub use jitter::{FnJitter, Jitter, JitterSource, NoJitter, RngJitter};
pub use motion::{ItemFrame, MotionTiming};
pub use queue::{Lifecycle, LifecycleEvent, TrailItem, TrailQueue};
pub use recorder::SampleRecorder;
