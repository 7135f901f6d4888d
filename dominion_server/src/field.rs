//! Field engine.
//!
//! A `Brush` blends a circular region of a scalar grid toward a target
//! value. The blend weight decays linearly from `strength` at the center to
//! `falloff` at the radius, so repeated application converges the region
//! toward the target rather than hard-painting it. Vision and border fields
//! are both driven entirely through brushes.

use dominion_shared::{
    grid::{ScalarGrid, WorldDims},
    math::Vec2,
};

/// A reusable radius/strength/falloff blend operator.
#[derive(Debug, Clone, Copy)]
pub struct Brush {
    pub radius: f32,
    /// Blend weight at the center.
    pub strength: f32,
    /// Blend weight at the edge of the radius.
    pub falloff: f32,
}

impl Brush {
    pub fn new(radius: f32, strength: f32, falloff: f32) -> Self {
        Self {
            radius,
            strength,
            falloff,
        }
    }

    /// Blends every grid vertex within `radius` of `pos` toward `target`.
    pub fn apply(&self, grid: &mut ScalarGrid, dims: &WorldDims, pos: Vec2, target: f32) {
        let cs = dims.cell_size;
        let r = self.radius;

        // Restrict the scan to the bounding box of the circle.
        let row_start = (((pos.x - r) / cs).max(0.0)) as usize;
        let row_end = ((((pos.x + r) / cs) as usize) + 1).min(dims.rows + 1);
        let col_start = (((pos.y - r) / cs).max(0.0)) as usize;
        let col_end = ((((pos.y + r) / cs) as usize) + 1).min(dims.cols + 1);

        let inv_r = 1.0 / r;

        for x in row_start..row_end {
            let px = x as f32 * cs;
            let dx_sq = (px - pos.x) * (px - pos.x);

            for y in col_start..col_end {
                let py = y as f32 * cs;
                let dy = py - pos.y;
                let dist_sq = dy * dy + dx_sq;

                if dist_sq <= r * r {
                    let t = dist_sq.sqrt() * inv_r;
                    let weight = self.strength + t * (self.falloff - self.strength);
                    let old = grid.get(x, y);
                    grid.set(x, y, old + (target - old) * weight);
                }
            }
        }
    }
}
