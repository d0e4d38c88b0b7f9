//! Terrain height queries and ground following
//!
//! The terrain itself belongs to the world; the simulation only asks for the
//! ground height under a point. Whatever height comes back is trusted.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::settings::Settings;
use crate::planar;

/// Ground height lookup
pub trait HeightOracle {
    /// Ground height at world (x, z). Must be deterministic.
    fn height_at(&self, x: f32, z: f32) -> f32;
}

impl<F> HeightOracle for F
where
    F: Fn(f32, f32) -> f32,
{
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Level ground at a fixed height
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FlatGround(pub f32);

impl HeightOracle for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Regular grid of height samples, bilinearly interpolated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeightGrid {
    /// World (x, z) of sample (0, 0), stored in x and z
    pub origin: Vec3,
    pub cell_size: f32,
    pub width: usize,
    pub depth: usize,
    /// Row-major, `depth` rows of `width` samples
    pub heights: Vec<f32>,
    /// Returned outside the grid
    pub default_height: f32,
}

impl HeightGrid {
    /// Grid filled with `default_height`
    pub fn flat(origin: Vec3, cell_size: f32, width: usize, depth: usize, default_height: f32) -> Self {
        Self {
            origin,
            cell_size,
            width,
            depth,
            heights: vec![default_height; width * depth],
            default_height,
        }
    }

    /// Grid sampled from a function of world (x, z)
    pub fn from_fn(
        origin: Vec3,
        cell_size: f32,
        width: usize,
        depth: usize,
        f: impl Fn(f32, f32) -> f32,
    ) -> Self {
        let mut heights = Vec::with_capacity(width * depth);
        for row in 0..depth {
            for col in 0..width {
                let x = origin.x + col as f32 * cell_size;
                let z = origin.z + row as f32 * cell_size;
                heights.push(f(x, z));
            }
        }
        Self {
            origin,
            cell_size,
            width,
            depth,
            heights,
            default_height: 0.0,
        }
    }

    #[inline]
    fn sample(&self, col: usize, row: usize) -> f32 {
        self.heights
            .get(row * self.width + col)
            .copied()
            .unwrap_or(self.default_height)
    }
}

impl HeightOracle for HeightGrid {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        if self.width < 2 || self.depth < 2 || self.cell_size <= 0.0 {
            return self.default_height;
        }
        let gx = (x - self.origin.x) / self.cell_size;
        let gz = (z - self.origin.z) / self.cell_size;
        let max_x = (self.width - 1) as f32;
        let max_z = (self.depth - 1) as f32;
        if !(0.0..=max_x).contains(&gx) || !(0.0..=max_z).contains(&gz) {
            return self.default_height;
        }

        let col = (gx.floor() as usize).min(self.width - 2);
        let row = (gz.floor() as usize).min(self.depth - 2);
        let fx = gx - col as f32;
        let fz = gz - row as f32;

        let h00 = self.sample(col, row);
        let h10 = self.sample(col + 1, row);
        let h01 = self.sample(col, row + 1);
        let h11 = self.sample(col + 1, row + 1);

        let near = h00 + (h10 - h00) * fx;
        let far = h01 + (h11 - h01) * fx;
        near + (far - near) * fz
    }
}

/// Snap the body to the ground (or integrate its flight) and update the speed
/// penalty from how steeply the ground rose over the last move.
pub fn follow_terrain(
    body: &mut Body,
    terrain: &dyn HeightOracle,
    height_scale: f32,
    settings: &Settings,
    dt: f32,
) {
    let ground = terrain.height_at(body.position.x, body.position.z) * height_scale;
    let rise = ground - body.target_height;
    let travelled = planar(body.position - body.step_origin).length();
    body.target_height = ground;

    if body.flying {
        body.vertical_speed -= settings.gravity * dt;
        body.position.y += body.vertical_speed * dt;
        if body.position.y <= ground {
            body.position.y = ground;
            body.vertical_speed = 0.0;
            body.flying = false;
            log::trace!("body {:?} landed", body.id);
        }
        return;
    }

    body.position.y = ground;

    let slope = if travelled > 1.0e-4 { rise / travelled } else { 0.0 };
    if slope > settings.bump_slope {
        let excess = slope - settings.bump_slope;
        body.speed_penalty =
            (1.0 - excess * settings.bump_penalty).clamp(settings.min_speed_penalty, 1.0);
        body.velocity.x *= body.speed_penalty;
        body.velocity.z *= body.speed_penalty;
    } else {
        body.speed_penalty = 1.0;
    }
}
