//! Vehicle steering
//!
//! The two-axle model places a front and a rear wheel contact point half a
//! wheelbase ahead of and behind the center. The rear point rolls along the
//! heading, the front point along heading + steer angle. The new center is
//! their midpoint and the new heading points from rear to front.
//!
//! The simpler yaw-rate model is kept as [`SteeringMode::Simple`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::settings::{SteeringMode, SteeringSettings};
use crate::{heading_of, heading_vector, normalize_angle, rotate_planar};

/// Normalized control input for one body
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SteerInput {
    /// -1 (full one way) ..= 1 (full the other way); positive turns toward +heading
    pub steer: f32,
    /// -1 (full reverse/brake) ..= 1 (full throttle)
    pub throttle: f32,
}

impl SteerInput {
    pub const NONE: SteerInput = SteerInput {
        steer: 0.0,
        throttle: 0.0,
    };

    /// Clamps both axes into [-1, 1]
    pub fn new(steer: f32, throttle: f32) -> Self {
        Self {
            steer: steer.clamp(-1.0, 1.0),
            throttle: throttle.clamp(-1.0, 1.0),
        }
    }
}

/// Steering state owned by a steerable body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringState {
    /// Current steer angle (radians, signed)
    pub steer_angle: f32,
    /// Last known heading; kept while the body is too slow to derive one
    pub heading: f32,
    pub wheelbase: f32,
    /// Throttle applied on the last update
    pub accel_input: f32,
}

impl SteeringState {
    pub fn new(heading: f32, wheelbase: f32) -> Self {
        Self {
            steer_angle: 0.0,
            heading: normalize_angle(heading),
            wheelbase,
            accel_input: 0.0,
        }
    }

    /// Wheelbase derived from the body's radius
    pub fn for_body(body: &Body, settings: &SteeringSettings) -> Self {
        Self::new(body.heading(), body.radius() * settings.wheelbase_factor)
    }

    /// Speed along the heading; negative when rolling backwards
    #[inline]
    pub fn forward_speed(&self, body: &Body) -> f32 {
        body.velocity.dot(heading_vector(self.heading))
    }

    /// Re-derive the heading from velocity when fast enough to trust it
    pub fn recover_heading(&mut self, body: &Body, settings: &SteeringSettings) {
        if body.speed() <= settings.heading_threshold {
            return;
        }
        let moving = heading_of(body.velocity);
        self.heading = if self.forward_speed(body) < 0.0 {
            normalize_angle(moving + std::f32::consts::PI)
        } else {
            normalize_angle(moving)
        };
    }

    /// Steer angle for an input; authority fades with speed
    pub fn steer_angle_for(steer: f32, speed_percent: f32, settings: &SteeringSettings) -> f32 {
        steer * settings.max_steer * (1.0 - settings.steer_falloff * speed_percent)
    }

    /// Advance the body by `dt` with the configured strategy
    pub fn advance(&mut self, body: &mut Body, input: SteerInput, dt: f32, settings: &SteeringSettings) {
        match settings.mode {
            SteeringMode::TwoAxle => self.advance_two_axle(body, input, dt, settings),
            SteeringMode::Simple => self.advance_simple(body, input, dt, settings),
        }
    }

    /// Two-axle kinematic step.
    ///
    /// Both wheel points start on the heading axis, `wheelbase / 2` either
    /// side of the center; only the front point's direction of travel takes
    /// the steer angle. Starting the front point along `heading + steer`
    /// would turn and shift a car that is not moving.
    pub fn advance_two_axle(
        &mut self,
        body: &mut Body,
        input: SteerInput,
        dt: f32,
        settings: &SteeringSettings,
    ) {
        self.recover_heading(body, settings);
        let forward = self.forward_speed(body);
        let speed_percent = (forward.abs() / settings.max_speed).min(1.0);
        self.steer_angle = Self::steer_angle_for(input.steer, speed_percent, settings);

        let previous = self.heading;
        let back_dir = heading_vector(self.heading);
        let front_dir = heading_vector(self.heading + self.steer_angle);
        let axle = back_dir * (self.wheelbase * 0.5);

        // Both contact points sit on the heading axis; each rolls along its own direction
        let travel = forward * dt;
        let front = body.position + axle + front_dir * travel;
        let back = body.position - axle + back_dir * travel;

        let center = (front + back) * 0.5;
        body.position.x = center.x;
        body.position.z = center.z;
        self.heading = normalize_angle(heading_of(front - back));

        let turned = normalize_angle(self.heading - previous);
        body.velocity = rotate_planar(body.velocity, turned);
        self.apply_throttle(body, input, speed_percent, forward, dt, settings);
    }

    /// Yaw-rate step: rotate velocity by the turn the steer angle implies
    pub fn advance_simple(
        &mut self,
        body: &mut Body,
        input: SteerInput,
        dt: f32,
        settings: &SteeringSettings,
    ) {
        self.recover_heading(body, settings);
        let forward = self.forward_speed(body);
        let speed_percent = (forward.abs() / settings.max_speed).min(1.0);
        self.steer_angle = Self::steer_angle_for(input.steer, speed_percent, settings);

        let turned = if self.wheelbase > 0.0 {
            forward * self.steer_angle.tan() / self.wheelbase * dt
        } else {
            0.0
        };
        self.heading = normalize_angle(self.heading + turned);
        body.velocity = rotate_planar(body.velocity, turned);
        self.apply_throttle(body, input, speed_percent, forward, dt, settings);

        body.position.x += body.velocity.x * dt;
        body.position.z += body.velocity.z * dt;
    }

    fn apply_throttle(
        &mut self,
        body: &mut Body,
        input: SteerInput,
        speed_percent: f32,
        forward: f32,
        dt: f32,
        settings: &SteeringSettings,
    ) {
        self.accel_input = input.throttle;
        body.rotation.y = self.heading;

        if input.throttle == 0.0 {
            let keep = (1.0 - settings.coast_drag * dt).max(0.0);
            body.velocity.x *= keep;
            body.velocity.z *= keep;
            return;
        }

        // Falloff only while pushing toward top speed; braking keeps full authority
        let falloff = if input.throttle * forward > 0.0 {
            1.0 - speed_percent
        } else {
            1.0
        };
        let accel = settings.max_accel * input.throttle * falloff;
        body.velocity += heading_vector(self.heading) * (accel * dt);
    }

    /// Accept a collision response. Heading follows the new velocity unless
    /// the response drives the body backwards, which keeps the heading.
    pub fn accept_collision(&mut self, body: &mut Body, velocity: Vec3, settings: &SteeringSettings) {
        body.velocity = velocity;
        if body.speed() > settings.heading_threshold && self.forward_speed(body) >= 0.0 {
            self.heading = normalize_angle(heading_of(velocity));
            body.rotation.y = self.heading;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyId;

    fn car(speed: f32) -> Body {
        let mut body = Body::new(BodyId(1), 1.25, 1.0, Vec3::ZERO, false);
        body.set_velocity(Vec3::new(speed, 0.0, 0.0));
        body
    }

    #[test]
    fn test_input_clamped() {
        let input = SteerInput::new(3.0, -2.0);
        assert_eq!(input.steer, 1.0);
        assert_eq!(input.throttle, -1.0);
    }

    #[test]
    fn test_two_axle_turns_toward_steer() {
        let settings = SteeringSettings::default();
        let mut body = car(10.0);
        let mut state = SteeringState::new(0.0, 2.0);
        state.advance_two_axle(&mut body, SteerInput::new(1.0, 0.0), 1.0, &settings);

        assert!(state.heading > 0.0, "heading should rotate toward +steer");
        let p = body.position();
        assert!(p.x > 0.0 && p.z > 0.0);
        assert!(p.x > p.z, "mostly forward with a lateral offset");
        assert_eq!(body.heading(), state.heading);
    }

    #[test]
    fn test_two_axle_straight_line() {
        let settings = SteeringSettings::default();
        let mut body = car(4.0);
        let mut state = SteeringState::new(0.0, 2.0);
        state.advance_two_axle(&mut body, SteerInput::NONE, 0.5, &settings);
        assert!((body.position().x - 2.0).abs() < 1e-5);
        assert!(body.position().z.abs() < 1e-6);
        assert!(state.heading.abs() < 1e-6);
    }

    #[test]
    fn test_two_axle_deterministic() {
        let settings = SteeringSettings::default();
        let run = || {
            let mut body = car(7.5);
            body.set_position(Vec3::new(1.0, 0.0, -2.0));
            let mut state = SteeringState::new(0.3, 2.0);
            state.advance_two_axle(&mut body, SteerInput::new(-0.4, 0.6), 1.0 / 60.0, &settings);
            (body.position(), state.heading)
        };
        let (p1, h1) = run();
        let (p2, h2) = run();
        assert_eq!(p1, p2);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_heading_kept_at_rest() {
        let settings = SteeringSettings::default();
        let mut body = car(0.0);
        let mut state = SteeringState::new(1.0, 2.0);
        state.advance_two_axle(&mut body, SteerInput::new(1.0, 0.0), 0.1, &settings);
        assert!((state.heading - 1.0).abs() < 1e-6);
        assert_eq!(body.position(), Vec3::ZERO);
    }

    #[test]
    fn test_steering_authority_fades_with_speed() {
        let settings = SteeringSettings::default();
        let slow = SteeringState::steer_angle_for(1.0, 0.0, &settings);
        let fast = SteeringState::steer_angle_for(1.0, 1.0, &settings);
        assert!(fast < slow);
        assert!((slow - settings.max_steer).abs() < 1e-6);
    }

    #[test]
    fn test_throttle_accelerates_along_heading() {
        let settings = SteeringSettings::default();
        let mut body = car(0.0);
        let mut state = SteeringState::new(std::f32::consts::FRAC_PI_2, 2.0);
        state.advance_two_axle(&mut body, SteerInput::new(0.0, 1.0), 0.5, &settings);
        assert!(body.velocity().z > 0.0);
        assert!(body.velocity().x.abs() < 1e-5);
    }

    #[test]
    fn test_acceleration_diminishes_near_top_speed() {
        let settings = SteeringSettings::default();
        let gain = |speed: f32| {
            let mut body = car(speed);
            let mut state = SteeringState::new(0.0, 2.0);
            state.advance_two_axle(&mut body, SteerInput::new(0.0, 1.0), 0.1, &settings);
            body.speed() - speed
        };
        assert!(gain(0.0) > gain(settings.max_speed * 0.9));
        assert!(gain(settings.max_speed).abs() < 1e-4);
    }

    #[test]
    fn test_reversing_keeps_heading() {
        let settings = SteeringSettings::default();
        let mut body = car(-5.0);
        let mut state = SteeringState::new(0.0, 2.0);
        state.advance_two_axle(&mut body, SteerInput::NONE, 0.1, &settings);
        assert!(state.heading.abs() < 1e-5);
        assert!(body.position().x < 0.0);
    }

    #[test]
    fn test_simple_mode_turns() {
        let settings = SteeringSettings {
            mode: SteeringMode::Simple,
            ..SteeringSettings::default()
        };
        let mut body = car(10.0);
        let mut state = SteeringState::new(0.0, 2.0);
        state.advance(&mut body, SteerInput::new(1.0, 0.0), 0.1, &settings);
        assert!(state.heading > 0.0);
        assert!(body.velocity().z > 0.0);
        assert!(body.position().x > 0.0);
    }

    #[test]
    fn test_collision_backwards_keeps_heading() {
        let settings = SteeringSettings::default();
        let mut body = car(10.0);
        let mut state = SteeringState::new(0.0, 2.0);
        state.accept_collision(&mut body, Vec3::new(-3.0, 0.0, 0.5), &settings);
        assert_eq!(state.heading, 0.0);
        assert_eq!(body.velocity(), Vec3::new(-3.0, 0.0, 0.5));

        state.accept_collision(&mut body, Vec3::new(3.0, 0.0, 3.0), &settings);
        assert!((state.heading - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
    }
}
