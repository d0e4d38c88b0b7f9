//! Ballsim - ball physics for vehicles and props on heightmapped terrain
//!
//! Core modules:
//! - `sim`: Sub-stepped simulation (bodies, collisions, steering, stepper)
//! - `settings`: Data-driven simulation tuning
//! - `error`: Error type for settings and level loading

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::{Settings, StepPreset, SteeringMode, SteeringSettings};

use glam::{Vec2, Vec3};

/// Simulation configuration constants
pub mod consts {
    /// Coarse time slices per frame
    pub const SUB_UPDATES: u32 = 2;
    /// Collision refinement passes per sub-update
    pub const MAX_SIMULATION_STEPS: u32 = 15;

    /// Id reserved for ephemeral phantom bodies
    pub const PHANTOM_ID: u32 = u32::MAX;
    /// Mass of a phantom relative to the body that spawned it
    pub const PHANTOM_MASS_SCALE: f32 = 0.8;
    /// Extra mass multiplier that makes a wall phantom effectively immovable
    pub const WALL_MASS_MULTIPLIER: f32 = 1000.0;

    /// Undrained events kept by a world; later ones are dropped
    pub const MAX_PENDING_EVENTS: usize = 1024;

    /// Centers closer than this are treated as coincident
    pub const DEGENERATE_DISTANCE: f32 = 1.0e-6;

    /// Restitution used when two bodies crash (1.0 = elastic)
    pub const COLLISION_EFFICIENCY: f32 = 0.8;

    /// Altitude above ground at which bodies clear walls
    pub const WALL_FLY_HEIGHT: f32 = 1.5;
    /// Downward acceleration while airborne (units/s²)
    pub const GRAVITY: f32 = 20.0;

    /// Ground rise per unit of travel tolerated before the speed penalty kicks in
    pub const BUMP_SLOPE: f32 = 0.35;
    /// How strongly excess slope reduces speed
    pub const BUMP_PENALTY: f32 = 0.6;
    /// Floor for the speed penalty factor
    pub const MIN_SPEED_PENALTY: f32 = 0.4;
    /// Rolling drag for passive bodies (fraction of speed lost per second)
    pub const PASSIVE_DRAG: f32 = 0.5;

    /// Vehicle defaults
    pub const MAX_STEER_ANGLE: f32 = 0.6; // radians (~34 degrees)
    pub const STEER_FALLOFF: f32 = 0.5;
    pub const MAX_SPEED: f32 = 30.0;
    pub const MAX_ACCEL: f32 = 12.0;
    /// Below this speed heading is not recovered from velocity
    pub const HEADING_SPEED_THRESHOLD: f32 = 0.5;
    pub const COAST_DRAG: f32 = 0.3;
    /// Wheelbase as a multiple of body radius
    pub const WHEELBASE_FACTOR: f32 = 1.6;

    /// Path follower defaults
    pub const ARRIVE_RADIUS: f32 = 3.0;
    pub const AVOID_DURATION: f32 = 0.5;
    pub const PATH_THROTTLE: f32 = 0.8;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector on the ground plane for a heading (x = cos, z = sin)
#[inline]
pub fn heading_vector(heading: f32) -> Vec3 {
    Vec3::new(heading.cos(), 0.0, heading.sin())
}

/// Heading of a vector's ground-plane projection
#[inline]
pub fn heading_of(v: Vec3) -> f32 {
    v.z.atan2(v.x)
}

/// Ground-plane (x, z) components
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Rotate the ground-plane part of `v` by `angle`, leaving y untouched
#[inline]
pub fn rotate_planar(v: Vec3, angle: f32) -> Vec3 {
    let rotated = Vec2::from_angle(angle).rotate(planar(v));
    Vec3::new(rotated.x, v.y, rotated.y)
}
