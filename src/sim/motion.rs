//! Per-entity integration strategies
//!
//! The stepper does not know what kind of entity it is moving. It calls the
//! entity's [`MotionModel`] to integrate, to take a collision response, and to
//! hear about predicted collisions.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::steering::{SteerInput, SteeringState};
use crate::settings::Settings;
use crate::{heading_of, normalize_angle, planar};

/// What the stepper needs from an integration strategy
pub trait MotionModel {
    /// Move the body through `dt` seconds
    fn integrate(&mut self, body: &mut Body, input: SteerInput, dt: f32, settings: &Settings);

    /// Apply a resolved collision velocity
    fn on_collision(&mut self, body: &mut Body, velocity: Vec3, _dt: f32, _settings: &Settings) {
        body.velocity = velocity;
    }

    /// Another body entered this body's outer radius
    fn on_future_collision(&mut self, _body: &Body, _other: Vec3, _settings: &Settings) {}
}

/// Rolls with whatever velocity it has; slowed by rolling drag
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Passive;

impl MotionModel for Passive {
    fn integrate(&mut self, body: &mut Body, _input: SteerInput, dt: f32, settings: &Settings) {
        body.velocity.x += body.acceleration.x * dt;
        body.velocity.z += body.acceleration.z * dt;

        let keep = (1.0 - settings.passive_drag * dt).max(0.0);
        body.velocity.x *= keep;
        body.velocity.z *= keep;

        body.position.x += body.velocity.x * dt;
        body.position.z += body.velocity.z * dt;
    }
}

impl MotionModel for SteeringState {
    fn integrate(&mut self, body: &mut Body, input: SteerInput, dt: f32, settings: &Settings) {
        self.advance(body, input, dt, &settings.steering);
    }

    fn on_collision(&mut self, body: &mut Body, velocity: Vec3, _dt: f32, settings: &Settings) {
        self.accept_collision(body, velocity, &settings.steering);
    }
}

/// AI driver: steers along a waypoint path and swerves from predicted hits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathFollower {
    pub steering: SteeringState,
    pub waypoints: Vec<Vec3>,
    /// Start over after the last waypoint
    pub looped: bool,
    /// Index of the waypoint being driven to
    pub target: usize,
    /// Extra steer while avoiding (-1..=1)
    avoid_steer: f32,
    /// Seconds of avoidance left
    avoid_time: f32,
}

impl PathFollower {
    pub fn new(steering: SteeringState, waypoints: Vec<Vec3>, looped: bool) -> Self {
        Self {
            steering,
            waypoints,
            looped,
            target: 0,
            avoid_steer: 0.0,
            avoid_time: 0.0,
        }
    }

    /// Path exhausted (never true for looped paths)
    pub fn finished(&self) -> bool {
        self.target >= self.waypoints.len()
    }

    #[inline]
    pub fn is_avoiding(&self) -> bool {
        self.avoid_time > 0.0
    }

    /// Input that drives toward the current waypoint
    pub fn drive_input(&mut self, body: &Body, settings: &Settings) -> SteerInput {
        while let Some(&wp) = self.waypoints.get(self.target) {
            if planar(wp - body.position).length() > settings.arrive_radius {
                break;
            }
            self.target += 1;
            if self.looped && self.target >= self.waypoints.len() {
                self.target = 0;
                break;
            }
        }

        let Some(&wp) = self.waypoints.get(self.target) else {
            return SteerInput::NONE;
        };
        let desired = heading_of(wp - body.position);
        let error = normalize_angle(desired - self.steering.heading);
        let steer = error / settings.steering.max_steer.max(1.0e-3);
        SteerInput::new(steer + self.avoid_steer, settings.path_throttle)
    }
}

impl MotionModel for PathFollower {
    fn integrate(&mut self, body: &mut Body, _input: SteerInput, dt: f32, settings: &Settings) {
        let input = self.drive_input(body, settings);
        self.steering.advance(body, input, dt, &settings.steering);

        if self.avoid_time > 0.0 {
            self.avoid_time = (self.avoid_time - dt).max(0.0);
            if self.avoid_time == 0.0 {
                self.avoid_steer = 0.0;
            }
        }
    }

    fn on_collision(&mut self, body: &mut Body, velocity: Vec3, _dt: f32, settings: &Settings) {
        self.steering.accept_collision(body, velocity, &settings.steering);
    }

    fn on_future_collision(&mut self, body: &Body, other: Vec3, settings: &Settings) {
        // Steer away from the side the obstacle is on
        let to_other = planar(other - body.position);
        let forward = planar(crate::heading_vector(self.steering.heading));
        let side = forward.perp_dot(to_other);
        self.avoid_steer = if side > 0.0 { -1.0 } else { 1.0 };
        self.avoid_time = settings.avoid_duration;
    }
}

/// Integration strategy chosen per entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Motion {
    Passive(Passive),
    /// Player-controlled vehicle driven by external input
    Vehicle(SteeringState),
    PathFollower(PathFollower),
}

impl Motion {
    pub fn passive() -> Self {
        Motion::Passive(Passive)
    }

    /// Vehicle with a wheelbase derived from the body
    pub fn vehicle(body: &Body, settings: &Settings) -> Self {
        Motion::Vehicle(SteeringState::for_body(body, &settings.steering))
    }

    pub fn path_follower(body: &Body, waypoints: Vec<Vec3>, looped: bool, settings: &Settings) -> Self {
        Motion::PathFollower(PathFollower::new(
            SteeringState::for_body(body, &settings.steering),
            waypoints,
            looped,
        ))
    }

    pub fn model_mut(&mut self) -> &mut dyn MotionModel {
        match self {
            Motion::Passive(m) => m,
            Motion::Vehicle(m) => m,
            Motion::PathFollower(m) => m,
        }
    }

    /// Steering state, if this entity steers
    pub fn steering(&self) -> Option<&SteeringState> {
        match self {
            Motion::Passive(_) => None,
            Motion::Vehicle(s) => Some(s),
            Motion::PathFollower(f) => Some(&f.steering),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyId;

    fn body() -> Body {
        Body::new(BodyId(1), 1.0, 1.0, Vec3::ZERO, false)
    }

    #[test]
    fn test_passive_moves_and_drags() {
        let settings = Settings::default();
        let mut b = body();
        b.set_velocity(Vec3::new(2.0, 0.0, 0.0));
        Passive.integrate(&mut b, SteerInput::NONE, 0.5, &settings);
        assert!(b.position().x > 0.0 && b.position().x < 1.0);
        assert!(b.speed() < 2.0);
    }

    #[test]
    fn test_passive_takes_collision_velocity() {
        let settings = Settings::default();
        let mut b = body();
        let mut motion = Motion::passive();
        motion
            .model_mut()
            .on_collision(&mut b, Vec3::new(0.0, 0.0, 3.0), 0.1, &settings);
        assert_eq!(b.velocity(), Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_path_follower_steers_toward_waypoint() {
        let settings = Settings::default();
        let mut b = body();
        let mut follower = PathFollower::new(
            SteeringState::new(0.0, 2.0),
            vec![Vec3::new(10.0, 0.0, 10.0)],
            false,
        );
        let input = follower.drive_input(&b, &settings);
        assert!(input.steer > 0.0);
        assert!(input.throttle > 0.0);

        for _ in 0..120 {
            follower.integrate(&mut b, SteerInput::NONE, 1.0 / 60.0, &settings);
        }
        assert!(b.speed() > 0.0);
        assert!(b.position().z > 0.0);
    }

    #[test]
    fn test_path_follower_advances_and_loops() {
        let settings = Settings::default();
        let b = body();
        let mut follower = PathFollower::new(
            SteeringState::new(0.0, 2.0),
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)],
            true,
        );
        follower.drive_input(&b, &settings);
        assert_eq!(follower.target, 1);

        let mut open = PathFollower::new(SteeringState::new(0.0, 2.0), vec![Vec3::ZERO], false);
        assert_eq!(open.drive_input(&b, &settings), SteerInput::NONE);
        assert!(open.finished());
    }

    #[test]
    fn test_future_collision_swerves_away() {
        let settings = Settings::default();
        let b = body();
        let mut follower = PathFollower::new(
            SteeringState::new(0.0, 2.0),
            vec![Vec3::new(50.0, 0.0, 0.0)],
            false,
        );
        // Obstacle ahead and to the +z side
        follower.on_future_collision(&b, Vec3::new(3.0, 0.0, 1.0), &settings);
        assert!(follower.is_avoiding());
        let input = follower.drive_input(&b, &settings);
        assert!(input.steer < 0.0);
    }
}
