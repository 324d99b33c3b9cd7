//! Slot layouts for group orders.

use crate::geom::Vec2;

/// `count` slots on a square-ish grid, `spacing` apart, row by row.
///
/// With `centered` the grid's middle sits on `center`; otherwise its first
/// slot does.
pub fn grid_slots(center: Vec2, count: usize, spacing: f32, centered: bool) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let cols = (count as f32).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    let mut origin = center;
    if centered {
        let width = (cols - 1) as f32 * spacing;
        let height = (rows - 1) as f32 * spacing;
        origin -= Vec2::new(width, height) * 0.5;
    }
    (0..count)
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            origin + Vec2::new(col as f32 * spacing, row as f32 * spacing)
        })
        .collect()
}

/// `count` slots evenly spaced on a circle, starting at angle zero.
pub fn ring_slots(center: Vec2, count: usize, radius: f32) -> Vec<Vec2> {
    let step = std::f32::consts::TAU / count.max(1) as f32;
    (0..count)
        .map(|i| {
            let angle = step * i as f32;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}
