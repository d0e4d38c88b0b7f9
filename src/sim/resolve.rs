//! Collision response
//!
//! Positional resolution pushes overlapping shapes apart. Dynamic resolution
//! exchanges momentum along the contact normal and keeps the tangential part
//! of each velocity (frictionless contact). Walls go through the same dynamic
//! path by way of a heavy phantom body at the contact point.

use glam::{Vec2, Vec3};

use super::body::Body;
use super::collision::WallContact;
use super::segment::LineSegment;
use crate::consts::DEGENERATE_DISTANCE;
use crate::planar;

#[inline]
fn lift(v: Vec2, y: f32) -> Vec3 {
    Vec3::new(v.x, y, v.y)
}

/// Unit planar direction from `from` to `to`, or +X when they coincide
#[inline]
fn direction(from: Vec3, to: Vec3) -> (Vec2, f32) {
    let diff = planar(to - from);
    let dist = diff.length();
    if dist > DEGENERATE_DISTANCE {
        (diff / dist, dist)
    } else {
        (Vec2::X, dist)
    }
}

/// Push two overlapping bodies apart, half the overlap each.
///
/// Leaves the pair exactly touching. Non-overlapping pairs are untouched.
pub fn separate(a: &mut Body, b: &mut Body) {
    let (dir, dist) = direction(a.position, b.position);
    let depth = 0.5 * (dist - a.radius() - b.radius());
    if depth >= 0.0 {
        return;
    }
    let shift = lift(dir * depth, 0.0);
    a.position += shift;
    b.position -= shift;
}

/// Push a body out of a wall. The wall does not move, so the body takes the
/// full correction, along the line from the contact point to its center.
pub fn push_out_of_wall(body: &mut Body, wall: &LineSegment, contact: &WallContact) {
    if contact.penetration <= 0.0 {
        return;
    }
    let dir = if contact.distance > DEGENERATE_DISTANCE {
        planar(body.position - contact.point) / contact.distance
    } else {
        // Center sits on the centerline, push out through the wall's left side
        planar(wall.normal())
    };
    body.position += lift(dir * contact.penetration, 0.0);
}

/// Post-collision velocities for a pair, or `None` when they are not closing.
///
/// `efficiency` is the restitution along the normal: 1 is elastic, lower
/// values lose energy. Vertical velocity passes through unchanged.
pub fn collision_response(a: &Body, b: &Body, efficiency: f32) -> Option<(Vec3, Vec3)> {
    let (normal, _) = direction(a.position, b.position);
    let tangent = normal.perp();

    let va = planar(a.velocity);
    let vb = planar(b.velocity);
    let (an, at) = (va.dot(normal), va.dot(tangent));
    let (bn, bt) = (vb.dot(normal), vb.dot(tangent));

    // Separating or resting along the normal
    if an - bn <= 0.0 {
        return None;
    }

    let (ma, mb) = (a.mass(), b.mass());
    let total = ma + mb;
    if total <= 0.0 {
        return None;
    }

    let momentum = ma * an + mb * bn;
    let an_new = (momentum + mb * efficiency * (bn - an)) / total;
    let bn_new = (momentum + ma * efficiency * (an - bn)) / total;

    Some((
        lift(normal * an_new + tangent * at, a.velocity.y),
        lift(normal * bn_new + tangent * bt, b.velocity.y),
    ))
}

/// New velocity for a body bouncing off a wall phantom
pub fn wall_response(body: &Body, phantom: &Body, efficiency: f32) -> Option<Vec3> {
    collision_response(body, phantom, efficiency).map(|(v, _)| v)
}

/// Planar kinetic energy
#[inline]
pub fn kinetic_energy(body: &Body) -> f32 {
    0.5 * body.mass() * planar(body.velocity).length_squared()
}
