//! Simulated circular bodies and the context that creates them

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::planar;

/// Body identifier. Ids are handed out in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl BodyId {
    /// Shared by every phantom body
    pub const PHANTOM: BodyId = BodyId(PHANTOM_ID);

    #[inline]
    pub fn is_phantom(self) -> bool {
        self == Self::PHANTOM
    }
}

/// Per-world creation state: id counter and world scales.
///
/// Owned by a world; reset when the world is torn down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimContext {
    next_id: u32,
    /// Applied to every radius at creation
    pub base_scale: f32,
    /// Applied to every terrain height query
    pub height_scale: f32,
}

impl Default for SimContext {
    fn default() -> Self {
        Self {
            next_id: 1,
            base_scale: 1.0,
            height_scale: 1.0,
        }
    }
}

impl SimContext {
    pub fn new(base_scale: f32, height_scale: f32) -> Self {
        Self {
            base_scale,
            height_scale,
            ..Self::default()
        }
    }

    /// Allocate a new body id
    pub fn next_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a body with a fresh id. `radius` is scaled by `base_scale`.
    pub fn create_body(&mut self, radius: f32, mass: f32, position: Vec3, is_static: bool) -> Body {
        let id = self.next_body_id();
        Body::new(id, radius * self.base_scale, mass, position, is_static)
    }

    /// Forget every id handed out (world teardown)
    pub fn reset(&mut self) {
        self.next_id = 1;
    }
}

/// A simulated circular entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,

    base_radius: f32,
    radius_multiplier: f32,
    /// Prediction radius, 0 disables prediction
    outer_radius: f32,
    base_mass: f32,
    mass_multiplier: f32,
    is_static: bool,
    disabled: bool,

    pub(crate) position: Vec3,
    /// Euler angles; y is the heading
    pub(crate) rotation: Vec3,
    pub(crate) velocity: Vec3,
    /// Only x and z are used; vertical motion goes through `vertical_speed`
    pub acceleration: Vec3,
    pub(crate) vertical_speed: f32,

    /// Position when the current integration started
    pub(crate) step_origin: Vec3,
    /// Sub-update time not yet consumed by movement
    pub(crate) remaining_time: f32,
    /// Planar distance the last integration moved the body, before any
    /// collision correction
    pub(crate) intended_travel: f32,

    /// Ground height under the body at the last terrain query
    pub(crate) target_height: f32,
    /// Speed factor in (0, 1] from terrain irregularities
    pub(crate) speed_penalty: f32,
    pub(crate) flying: bool,
}

impl Body {
    pub fn new(id: BodyId, radius: f32, mass: f32, position: Vec3, is_static: bool) -> Self {
        Self {
            id,
            base_radius: radius,
            radius_multiplier: 1.0,
            outer_radius: 0.0,
            base_mass: mass,
            mass_multiplier: 1.0,
            is_static,
            disabled: false,
            position,
            rotation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            vertical_speed: 0.0,
            step_origin: position,
            remaining_time: 0.0,
            intended_travel: 0.0,
            target_height: position.y,
            speed_penalty: 1.0,
            flying: false,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.base_radius * self.radius_multiplier
    }

    #[inline]
    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    /// Set the prediction radius (0 disables prediction)
    pub fn set_outer_radius(&mut self, outer_radius: f32) {
        self.outer_radius = outer_radius.max(0.0);
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.base_mass * self.mass_multiplier
    }

    /// Magnitude of the horizontal velocity
    #[inline]
    pub fn speed(&self) -> f32 {
        planar(self.velocity).length()
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    #[inline]
    pub fn heading(&self) -> f32 {
        self.rotation.y
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Teleport. Also resets the step origin so the jump is not counted as travel.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.step_origin = position;
    }

    pub fn set_heading(&mut self, heading: f32) {
        self.rotation.y = heading;
    }

    /// Power-up hook. Never changed by the physics itself.
    pub fn set_mass_multiplier(&mut self, multiplier: f32) {
        self.mass_multiplier = multiplier;
    }

    /// Power-up hook. The effective radius must stay positive.
    pub fn set_radius_multiplier(&mut self, multiplier: f32) {
        self.radius_multiplier = multiplier;
    }

    /// Builder form of [`set_mass_multiplier`](Self::set_mass_multiplier)
    pub fn with_mass_multiplier(mut self, multiplier: f32) -> Self {
        self.mass_multiplier = multiplier;
        self
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Ghost mode: the stepper skips disabled bodies entirely
    pub fn disable(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    #[inline]
    pub fn is_phantom(&self) -> bool {
        self.id.is_phantom()
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        self.flying
    }

    #[inline]
    pub fn remaining_time(&self) -> f32 {
        self.remaining_time
    }

    #[inline]
    pub fn speed_penalty(&self) -> f32 {
        self.speed_penalty
    }

    /// Height above the ground under the body
    #[inline]
    pub fn altitude(&self) -> f32 {
        self.position.y - self.target_height
    }

    /// Launch upward. Ignored while already airborne.
    pub fn jump(&mut self, impulse: f32) {
        if !self.flying && impulse > 0.0 {
            self.flying = true;
            self.vertical_speed = impulse;
        }
    }

    /// Planar distance between centers
    #[inline]
    pub fn distance_to(&self, other: &Body) -> f32 {
        planar(self.position - other.position).length()
    }

    /// Planar squared distance between centers
    #[inline]
    pub fn distance_squared_to(&self, other: &Body) -> f32 {
        planar(self.position - other.position).length_squared()
    }

    /// Phantom body standing in for a contact point: stationary, non-static,
    /// carrying this body's mass scaled by [`PHANTOM_MASS_SCALE`].
    pub fn make_collision_ball(&self, radius: f32, position: Vec3) -> Body {
        Body::new(
            BodyId::PHANTOM,
            radius,
            self.mass() * PHANTOM_MASS_SCALE,
            position,
            false,
        )
    }

    /// Start a sub-update: the whole slice is available again
    pub(crate) fn begin_sub_update(&mut self, sub_time: f32) {
        self.remaining_time = sub_time;
        self.step_origin = self.position;
        self.intended_travel = 0.0;
    }

    /// Record how far integration moved the body since `step_origin`.
    ///
    /// Must run right after integrating, before collisions move the body.
    pub(crate) fn mark_integrated(&mut self) {
        self.intended_travel = planar(self.position - self.step_origin).length();
    }

    /// Account for the part of `remaining_time` that movement actually used.
    ///
    /// The intended distance is what the last integration moved the body, not
    /// its post-move speed times time. A body stopped partway by a collision
    /// keeps the unused time for the following refinement passes.
    pub fn commit_simulation(&mut self) {
        if self.remaining_time <= 0.0 {
            return;
        }
        let intended = self.intended_travel;
        if intended <= DEGENERATE_DISTANCE {
            self.remaining_time = 0.0;
            return;
        }
        let actual = planar(self.position - self.step_origin).length();
        if actual >= intended {
            self.remaining_time = 0.0;
            return;
        }
        let consumed = self.remaining_time * (actual / intended);
        self.remaining_time = (self.remaining_time - consumed).max(0.0);
        self.step_origin = self.position;
        self.intended_travel = 0.0;
    }
}
