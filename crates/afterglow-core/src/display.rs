//! Pixelated read-back of the decay field, as a fragment shader would do it.

use glam::Vec2;

use crate::field::DecayField;

/// Aspect-corrects a screen UV so the square field covers the surface's
/// longer side, then clamps to the unit square.
pub fn cover_uv(screen_uv: Vec2, surface: Vec2) -> Vec2 {
    let longest = surface.max_element();
    if !(longest > 0.0) {
        return screen_uv.clamp(Vec2::ZERO, Vec2::ONE);
    }
    let scale = surface / longest;
    ((screen_uv - 0.5) * scale + 0.5).clamp(Vec2::ZERO, Vec2::ONE)
}

/// Center of the display cell containing `uv` on a `grid × grid` lattice.
pub fn cell_center(uv: Vec2, grid: u32) -> Vec2 {
    let grid = grid.max(1) as f32;
    ((uv * grid).floor() + 0.5) / grid
}

/// Field intensity shown at `screen_uv`: every point of a display cell reads
/// the field at that cell's center.
pub fn sample_display(field: &DecayField, screen_uv: Vec2, surface: Vec2, grid: u32) -> f32 {
    let uv = cover_uv(screen_uv, surface);
    field.sample_uv(cell_center(uv, grid))
}

/// Renders the display at surface resolution as row-major intensities, top
/// row first, with `v` measured from the bottom of the surface.
pub fn render_display(field: &DecayField, width: u32, height: u32, grid: u32) -> Vec<f32> {
    let surface = Vec2::new(width as f32, height as f32);
    let mut out = Vec::with_capacity(width as usize * height as usize);
    for row in 0..height {
        let v = 1.0 - (row as f32 + 0.5) / height as f32;
        for col in 0..width {
            let u = (col as f32 + 0.5) / width as f32;
            out.push(sample_display(field, Vec2::new(u, v), surface, grid));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_surface_is_identity() {
        let uv = Vec2::new(0.3, 0.7);
        assert_eq!(cover_uv(uv, Vec2::new(512.0, 512.0)), uv);
    }

    #[test]
    fn wide_surface_squeezes_vertical_axis() {
        let uv = cover_uv(Vec2::new(0.5, 1.0), Vec2::new(200.0, 100.0));
        assert_eq!(uv, Vec2::new(0.5, 0.75));
    }

    #[test]
    fn cell_centers_snap() {
        assert_eq!(cell_center(Vec2::new(0.01, 0.99), 10), Vec2::new(0.05, 0.95));
    }

    #[test]
    fn display_reads_lit_cell() {
        let mut field = DecayField::new(4, 0.1, 4).unwrap();
        field.record_sample(0.6, 0.6);
        field.tick();
        let lit = sample_display(&field, Vec2::new(0.6, 0.6), Vec2::new(100.0, 100.0), 4);
        assert!(lit > 0.0);
        let dark = sample_display(&field, Vec2::new(0.05, 0.05), Vec2::new(100.0, 100.0), 4);
        assert_eq!(dark, 0.0);

        let frame = render_display(&field, 8, 8, 4);
        assert_eq!(frame.len(), 64);
        assert!(frame.iter().any(|v| *v > 0.0));
    }
}
