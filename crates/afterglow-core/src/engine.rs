//! The trail engine: one owner for the field or queue, its pointer inbox and
//! its configuration.

use glam::Vec2;
use tracing::{debug, info, trace};

use crate::config::{TrailConfig, TrailMode};
use crate::error::ConfigError;
use crate::field::DecayField;
use crate::input::{PointerEvent, PointerInbox, PointerSender, PointerSpace};
use crate::interpolator::GeometryInterpolator;
use crate::jitter::{Jitter, JitterSource, RngJitter};
use crate::motion::{self, ItemFrame, MotionTiming};
use crate::queue::{LifecycleEvent, TrailQueue};
use crate::recorder::SampleRecorder;

struct FieldTrail {
    field: DecayField,
    recorder: SampleRecorder,
}

struct QueueTrail {
    queue: TrailQueue,
    interpolator: GeometryInterpolator,
}

enum TrailState {
    Field(FieldTrail),
    Queue(QueueTrail),
}

impl TrailState {
    fn build(config: &TrailConfig, surface: Vec2) -> Result<Self, ConfigError> {
        Ok(match config.mode {
            TrailMode::Field => TrailState::Field(FieldTrail {
                field: DecayField::from_config(config)?,
                recorder: SampleRecorder::new(surface.x, surface.y, config.surface_origin),
            }),
            TrailMode::Queue => TrailState::Queue(QueueTrail {
                queue: TrailQueue::new(config.max_points, MotionTiming::from_config(config))?,
                interpolator: GeometryInterpolator::new(config.spacing, config.follow_direction)?,
            }),
        })
    }
}

/// Drives one pointer trail. Every mutating call takes `&mut self`, so a tick
/// can never be re-entered by a pointer move; moves from other threads go
/// through [`TrailEngine::pointer_sender`] and are applied at the next frame.
pub struct TrailEngine {
    config: TrailConfig,
    surface: Vec2,
    state: TrailState,
    inbox: PointerInbox,
    jitter: Box<dyn JitterSource + Send>,
    clock_ms: u64,
}

impl TrailEngine {
    /// Builds an engine with entropy-seeded jitter.
    pub fn new(config: TrailConfig, width: f32, height: f32) -> Result<Self, ConfigError> {
        Self::with_jitter(config, width, height, RngJitter::from_entropy())
    }

    pub fn with_jitter(
        config: TrailConfig,
        width: f32,
        height: f32,
        jitter: impl JitterSource + Send + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let surface = Vec2::new(width, height);
        let state = TrailState::build(&config, surface)?;
        info!(mode = ?config.mode, width, height, "trail engine created");
        Ok(Self {
            config,
            surface,
            state,
            inbox: PointerInbox::new(),
            jitter: Box::new(jitter),
            clock_ms: 0,
        })
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    pub fn mode(&self) -> TrailMode {
        self.config.mode
    }

    pub fn surface(&self) -> Vec2 {
        self.surface
    }

    /// Latest host time the engine has seen.
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn pointer_sender(&self) -> PointerSender {
        self.inbox.sender()
    }

    /// Moves queued through [`PointerSender`] and not yet applied.
    pub fn pending_moves(&self) -> usize {
        self.inbox.pending()
    }

    /// Applies one pointer move immediately.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.observe(event.at_ms);
        match &mut self.state {
            TrailState::Field(trail) => match event.space {
                PointerSpace::Pixel => {
                    trail.recorder.record(&mut trail.field, event.position);
                }
                PointerSpace::Normalized => {
                    trail.field.record_sample(event.position.x, event.position.y);
                }
            },
            TrailState::Queue(trail) => {
                let position = match event.space {
                    PointerSpace::Pixel => event.position,
                    PointerSpace::Normalized => event.position * self.surface,
                };
                if !accepts_pixel(self.surface, position) {
                    return;
                }
                let amplitude = if self.config.jitter_enabled {
                    self.config.jitter_amplitude
                } else {
                    0.0
                };
                let jitter = &mut self.jitter;
                let mut draw = || {
                    if amplitude > 0.0 {
                        jitter.next_jitter(amplitude)
                    } else {
                        Jitter::default()
                    }
                };

                match trail.queue.newest_active().map(|item| item.position) {
                    None => {
                        trail.queue.push(position, 0.0, draw(), event.at_ms);
                    }
                    Some(last) => {
                        // Points older than the last `max_points` would exit on arrival.
                        let keep = trail.queue.max_points();
                        if let Some(segment) = trail.interpolator.interpolate_tail(last, position, keep) {
                            if segment.skipped > 0 {
                                trace!(skipped = segment.skipped, "burst trimmed to capacity");
                            }
                            for point in segment.points {
                                trail.queue.push(point, segment.angle, draw(), event.at_ms);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Per-frame step: applies queued moves, then ticks the field or advances
    /// item lifecycles.
    pub fn frame(&mut self, now_ms: u64) {
        for _ in 0..self.inbox.pending() {
            match self.inbox.try_next() {
                Some(event) => self.pointer_move(event),
                None => break,
            }
        }
        self.observe(now_ms);
        match &mut self.state {
            TrailState::Field(trail) => trail.field.tick(),
            TrailState::Queue(trail) => trail.queue.advance(now_ms),
        }
    }

    /// Idle-timer step. Evicts the oldest item when the pointer has not
    /// produced a push for longer than `idle_threshold_ms`. Field mode has
    /// nothing to evict here.
    pub fn idle_tick(&mut self, now_ms: u64) -> Option<u64> {
        self.observe(now_ms);
        match &mut self.state {
            TrailState::Queue(trail) => trail.queue.evict_idle(now_ms, self.config.idle_threshold_ms),
            TrailState::Field(_) => None,
        }
    }

    /// New surface dimensions. The field keeps its resolution.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface = Vec2::new(width, height);
        if let TrailState::Field(trail) = &mut self.state {
            trail.recorder.resize(width, height);
        }
        debug!(width, height, "trail surface resized");
    }

    /// Replaces the configuration. On error nothing changes.
    ///
    /// Switching mode or field resolution rebuilds the trail from empty;
    /// other changes apply to the live trail.
    pub fn set_config(&mut self, config: TrailConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let rebuild = config.mode != self.config.mode
            || (config.mode == TrailMode::Field && config.grid_resolution != self.config.grid_resolution);

        if rebuild {
            self.state = TrailState::build(&config, self.surface)?;
            info!(mode = ?config.mode, "trail rebuilt for new config");
        } else {
            match &mut self.state {
                TrailState::Field(trail) => {
                    trail.field.set_decay(config.trail_radius, config.max_age_ticks)?;
                    trail.recorder.set_origin(config.surface_origin);
                }
                TrailState::Queue(trail) => {
                    let interpolator = GeometryInterpolator::new(config.spacing, config.follow_direction)?;
                    trail.queue.set_capacity(config.max_points, self.clock_ms)?;
                    trail.queue.set_timing(MotionTiming::from_config(&config));
                    trail.interpolator = interpolator;
                }
            }
            info!(mode = ?config.mode, "trail config updated");
        }
        self.config = config;
        Ok(())
    }

    pub fn field(&self) -> Option<&DecayField> {
        match &self.state {
            TrailState::Field(trail) => Some(&trail.field),
            TrailState::Queue(_) => None,
        }
    }

    /// Returns whether the field changed since the last upload and clears the
    /// flag. Always `false` in queue mode.
    pub fn take_field_dirty(&mut self) -> bool {
        match &mut self.state {
            TrailState::Field(trail) => trail.field.take_dirty(),
            TrailState::Queue(_) => false,
        }
    }

    pub fn queue(&self) -> Option<&TrailQueue> {
        match &self.state {
            TrailState::Queue(trail) => Some(&trail.queue),
            TrailState::Field(_) => None,
        }
    }

    /// Render snapshots of every held item at `now_ms`, oldest first.
    pub fn item_frames(&self, now_ms: u64) -> Vec<ItemFrame> {
        match &self.state {
            TrailState::Queue(trail) => {
                let timing = trail.queue.timing();
                trail
                    .queue
                    .items()
                    .map(|item| motion::item_frame(item, now_ms, timing))
                    .collect()
            }
            TrailState::Field(_) => Vec::new(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        match &mut self.state {
            TrailState::Queue(trail) => trail.queue.drain_events(),
            TrailState::Field(_) => Vec::new(),
        }
    }

    fn observe(&mut self, now_ms: u64) {
        self.clock_ms = self.clock_ms.max(now_ms);
    }
}

/// Finite and inside a surface with an area.
fn accepts_pixel(surface: Vec2, position: Vec2) -> bool {
    if !(surface.x > 0.0 && surface.y > 0.0) {
        trace!(?position, "move on zero-area surface ignored");
        return false;
    }
    position.is_finite()
        && (0.0..=surface.x).contains(&position.x)
        && (0.0..=surface.y).contains(&position.y)
}
