use glam::Vec2;
use tracing::trace;

use crate::config::SurfaceOrigin;
use crate::field::DecayField;

/// Turns pixel-space pointer moves into field samples.
///
/// Every accepted move becomes exactly one sample. Moves that land on the
/// same cell simply restamp it with a fresher strength on the next tick.
#[derive(Debug, Clone)]
pub struct SampleRecorder {
    surface: Vec2,
    origin: SurfaceOrigin,
}

impl SampleRecorder {
    pub fn new(width: f32, height: f32, origin: SurfaceOrigin) -> Self {
        Self {
            surface: Vec2::new(width, height),
            origin,
        }
    }

    /// Only the normalization bounds change; the field keeps its resolution.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface = Vec2::new(width, height);
    }

    pub fn surface(&self) -> Vec2 {
        self.surface
    }

    pub fn origin(&self) -> SurfaceOrigin {
        self.origin
    }

    pub fn set_origin(&mut self, origin: SurfaceOrigin) {
        self.origin = origin;
    }

    /// Maps a pixel position to `[0, 1]²`, or `None` when the surface has no
    /// area or the position falls outside it.
    pub fn normalize(&self, pixel: Vec2) -> Option<Vec2> {
        if !(self.surface.x > 0.0 && self.surface.y > 0.0) {
            return None;
        }
        let mut uv = pixel / self.surface;
        if self.origin == SurfaceOrigin::BottomLeft {
            uv.y = 1.0 - uv.y;
        }
        let inside = (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y);
        inside.then_some(uv)
    }

    pub fn record(&self, field: &mut DecayField, pixel: Vec2) -> bool {
        match self.normalize(pixel) {
            Some(uv) => field.record_sample(uv.x, uv.y),
            None => {
                trace!(x = pixel.x, y = pixel.y, "pointer outside surface ignored");
                false
            }
        }
    }
}
