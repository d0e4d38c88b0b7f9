//! Static wall edges
//!
//! A wall is a line segment on the ground plane with a thickness, so it acts
//! as a capsule: every point within `radius` of the segment is solid.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::planar;

/// A thickened line segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
    /// Collision radius around the centerline
    pub radius: f32,
}

impl LineSegment {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Planar length of the centerline
    #[inline]
    pub fn length(&self) -> f32 {
        planar(self.end - self.start).length()
    }

    /// Segment parameter of the point closest to `p`, clamped to [0, 1].
    ///
    /// Only x and z take part. A zero-length segment returns 0.
    pub fn project(&self, p: Vec3) -> f32 {
        let line = planar(self.end - self.start);
        let len_sq = line.length_squared();
        if len_sq < 1.0e-12 {
            return 0.0;
        }
        (planar(p - self.start).dot(line) / len_sq).clamp(0.0, 1.0)
    }

    /// Point on the segment at parameter `t`
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.start + (self.end - self.start) * t
    }

    /// Closest point on the segment to `p` (endpoints included)
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        self.point_at(self.project(p))
    }

    /// Unit normal on the ground plane (left of start -> end)
    pub fn normal(&self) -> Vec3 {
        let d = planar(self.end - self.start).normalize_or_zero();
        Vec3::new(-d.y, 0.0, d.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_interior() {
        let seg = LineSegment::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.5);
        let t = seg.project(Vec3::new(3.0, 0.0, -4.0));
        assert!((t - 0.3).abs() < 1e-6);
        let c = seg.closest_point(Vec3::new(3.0, 0.0, -4.0));
        assert!((c - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_project_clamps_to_endpoints() {
        let seg = LineSegment::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.5);
        assert_eq!(seg.project(Vec3::new(-5.0, 0.0, 1.0)), 0.0);
        assert_eq!(seg.project(Vec3::new(15.0, 0.0, 1.0)), 1.0);
        assert_eq!(seg.closest_point(Vec3::new(15.0, 0.0, 1.0)), seg.end);
    }

    #[test]
    fn test_degenerate_segment() {
        let p = Vec3::new(2.0, 0.0, 2.0);
        let seg = LineSegment::new(p, p, 1.0);
        assert_eq!(seg.length(), 0.0);
        assert_eq!(seg.closest_point(Vec3::ZERO), p);
    }

    #[test]
    fn test_normal_is_perpendicular() {
        let seg = LineSegment::new(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0), 0.5);
        let n = seg.normal();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!(n.dot(seg.end - seg.start).abs() < 1e-5);
    }
}
