//! Collision detection between bodies and against walls
//!
//! Two tiers for body pairs: a hard overlap of the physical radii, and a
//! predictive overlap of the first body's outer radius. The predictive tier
//! only notifies, it never moves anything.

use glam::Vec3;

use super::body::Body;
use super::segment::LineSegment;
use crate::planar;

/// Overlap classification for a body pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    None,
    /// Physical radii intersect
    Overlaps,
    /// Only `a`'s outer radius reaches `b`
    OverlapsOuter,
}

/// Classify the overlap of `a` against `b`.
///
/// The outer test uses `a`'s outer radius only and is skipped when it is 0.
pub fn overlaps(a: &Body, b: &Body) -> Overlap {
    let dist_sq = a.distance_squared_to(b);
    let reach = a.radius() + b.radius();
    if dist_sq < reach * reach {
        return Overlap::Overlaps;
    }

    let outer = a.outer_radius();
    if outer <= 0.0 {
        return Overlap::None;
    }
    let outer_reach = outer + b.radius();
    if dist_sq < outer_reach * outer_reach {
        Overlap::OverlapsOuter
    } else {
        Overlap::None
    }
}

/// Contact between a body and a wall
#[derive(Debug, Clone, Copy)]
pub struct WallContact {
    /// Closest point on the wall centerline
    pub point: Vec3,
    /// Planar distance from the body center to `point`
    pub distance: f32,
    /// How far the body reaches into the wall (>= 0)
    pub penetration: f32,
}

/// Check a body against a wall segment.
///
/// Touching counts as contact so a body resting on a wall keeps being stopped.
pub fn wall_contact(body: &Body, wall: &LineSegment) -> Option<WallContact> {
    let center = body.position();
    let point = wall.closest_point(center);
    let distance = planar(center - point).length();
    let reach = body.radius() + wall.radius;

    if distance <= reach {
        Some(WallContact {
            point,
            distance,
            penetration: reach - distance,
        })
    } else {
        None
    }
}

/// Whether the body is high enough above the ground to clear walls
#[inline]
pub fn clears_walls(body: &Body, fly_height: f32) -> bool {
    body.altitude() >= fly_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyId;

    fn ball(x: f32, z: f32, radius: f32) -> Body {
        Body::new(BodyId(1), radius, 1.0, Vec3::new(x, 0.0, z), false)
    }

    #[test]
    fn test_overlap_tiers() {
        let mut a = ball(0.0, 0.0, 1.0);
        let b = ball(2.5, 0.0, 1.0);
        assert_eq!(overlaps(&a, &b), Overlap::None);

        a.set_outer_radius(2.0);
        assert_eq!(overlaps(&a, &b), Overlap::OverlapsOuter);

        let c = ball(1.5, 0.0, 1.0);
        assert_eq!(overlaps(&a, &c), Overlap::Overlaps);
    }

    #[test]
    fn test_outer_radius_is_one_sided() {
        let mut a = ball(0.0, 0.0, 1.0);
        a.set_outer_radius(3.0);
        let b = ball(3.0, 0.0, 1.0);
        assert_eq!(overlaps(&a, &b), Overlap::OverlapsOuter);
        assert_eq!(overlaps(&b, &a), Overlap::None);
    }

    #[test]
    fn test_overlap_ignores_height() {
        let a = ball(0.0, 0.0, 1.0);
        let mut b = ball(1.0, 0.0, 1.0);
        b.position.y = 10.0;
        assert_eq!(overlaps(&a, &b), Overlap::Overlaps);
    }

    #[test]
    fn test_wall_contact_axis_aligned() {
        let wall = LineSegment::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.5);
        assert!(wall_contact(&ball(5.0, -1.6, 1.0), &wall).is_none());

        let contact = wall_contact(&ball(5.0, -1.2, 1.0), &wall).unwrap();
        assert!((contact.point - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-6);
        assert!((contact.penetration - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_wall_contact_at_endpoint() {
        let wall = LineSegment::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.5);
        // Past the end of the segment but within reach of the end cap
        let contact = wall_contact(&ball(11.2, 0.0, 1.0), &wall).unwrap();
        assert_eq!(contact.point, wall.end);
        // Would hit the infinite line, misses the segment
        assert!(wall_contact(&ball(12.0, 0.5, 1.0), &wall).is_none());
    }

    #[test]
    fn test_wall_contact_rotated() {
        let wall = LineSegment::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 10.0), 0.5);
        let n = wall.normal();
        let near = ball(0.0, 0.0, 1.0);
        let mut probe = near.clone();
        probe.position = Vec3::new(5.0, 0.0, 5.0) + n * 1.4;
        assert!(wall_contact(&probe, &wall).is_some());
        probe.position = Vec3::new(5.0, 0.0, 5.0) + n * 1.6;
        assert!(wall_contact(&probe, &wall).is_none());
    }

    #[test]
    fn test_clears_walls() {
        let mut body = ball(0.0, 0.0, 1.0);
        assert!(!clears_walls(&body, 1.5));
        body.position.y = 2.0;
        assert!(clears_walls(&body, 1.5));
    }
}
