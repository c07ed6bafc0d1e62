//! Per-tick evolution of the decay field: ageing, expiry and rasterization.
//!
//! Everything here is pure over plain slices so the same math can back a CPU
//! texture upload or be checked in isolation.

use crate::field::Sample;

/// Ages every sample by one tick and drops those that reached `max_age`.
pub fn age_samples(samples: &mut Vec<Sample>, max_age: u32) {
    samples.retain_mut(|sample| {
        sample.age = sample.age.saturating_add(1);
        sample.age < max_age
    });
}

/// Linear fade: 1 at birth, exactly 0 at `max_age`.
///
/// The same curve drives both the peak intensity and the disc radius.
#[inline]
pub fn strength(age: u32, max_age: u32) -> f32 {
    if age >= max_age {
        return 0.0;
    }
    1.0 - age as f32 / max_age as f32
}

/// Disc radius in cells, never below one so a fading sample still lights its
/// own cell. Huge radii saturate at `i64::MAX`.
#[inline]
pub fn radius_cells(trail_radius: f32, strength: f32, size: usize) -> i64 {
    let radius = trail_radius * strength;
    ((radius * size as f32).floor() as i64).max(1)
}

/// Clears `cells` and stamps every sample into it with max-compositing.
pub fn rasterize(cells: &mut [f32], size: usize, samples: &[Sample], trail_radius: f32, max_age: u32) {
    debug_assert_eq!(cells.len(), size * size);
    cells.fill(0.0);

    for sample in samples {
        let strength = strength(sample.age, max_age);
        if strength <= 0.0 {
            continue;
        }
        let center_x = (sample.position_uv.x * size as f32).floor() as i64;
        let center_y = (sample.position_uv.y * size as f32).floor() as i64;
        let radius = radius_cells(trail_radius, strength, size);
        stamp_disc(cells, size, center_x, center_y, radius, strength);
    }
}

fn stamp_disc(cells: &mut [f32], size: usize, center_x: i64, center_y: i64, radius: i64, strength: f32) {
    let size_i = size as i64;
    let y_range = center_y.saturating_sub(radius).max(0)..=center_y.saturating_add(radius).min(size_i - 1);
    let x_range = center_x.saturating_sub(radius).max(0)..=center_x.saturating_add(radius).min(size_i - 1);

    for y in y_range {
        let dy = (y - center_y) as f32;
        for x in x_range.clone() {
            let dx = (x - center_x) as f32;
            let distance = (dx * dx + dy * dy).sqrt() / radius as f32;
            if distance > 1.0 {
                continue;
            }
            let value = strength * (1.0 - distance);
            let cell = &mut cells[y as usize * size + x as usize];
            if value > *cell {
                *cell = value;
            }
        }
    }
}
