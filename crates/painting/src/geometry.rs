//! Geometry primitives shared by the subdivision traversals.
//!
//! Parametric points use the (u, v) convention of barycentric coordinates:
//! `u` weighs the second corner, `v` the third, and `1 - u - v` the first.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{MIN_BOUNDS_EXTENT, ROOT_PARAM_CORNERS};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Tight box around three points.
    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            min: v0.min(v1).min(v2),
            max: v0.max(v1).max(v2),
        }
    }

    /// Box around a mesh triangle, with every extent floored to
    /// [`MIN_BOUNDS_EXTENT`] and grown from the minimum corner.
    pub fn for_mesh_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let tight = Self::from_triangle(v0, v1, v2);
        let size = tight.size().max(Vec3::splat(MIN_BOUNDS_EXTENT));
        Self::from_center_size(tight.min + size * 0.5, size)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}

/// Interpolate a Vec3 attribute using barycentric coordinates.
pub fn interpolate_vec3(v0: Vec3, v1: Vec3, v2: Vec3, u: f32, v: f32) -> Vec3 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// Interpolate a Vec2 attribute (like UVs) using barycentric coordinates.
pub fn interpolate_vec2(v0: Vec2, v1: Vec2, v2: Vec2, u: f32, v: f32) -> Vec2 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// Area of a world-space triangle: half the length of the edge cross product.
pub fn triangle_area(v0: Vec3, v1: Vec3, v2: Vec3) -> f32 {
    (v1 - v0).cross(v2 - v0).length() * 0.5
}

/// Closest point on a triangle to `point` (Ericson, Real-Time Collision Detection 5.1.5).
pub fn closest_point_on_triangle(point: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = point - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = point - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = point - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = va + vb + vc;
    if denom.abs() <= f32::EPSILON {
        // Degenerate triangle: fall back to the nearest corner.
        return [a, b, c]
            .into_iter()
            .min_by(|x, y| x.distance_squared(point).total_cmp(&y.distance_squared(point)))
            .unwrap_or(a);
    }
    let v = vb / denom;
    let w = vc / denom;
    a + ab * v + ac * w
}

/// A sub-triangle in the root's parametric space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamTriangle {
    pub corners: [Vec2; 3],
}

impl Default for ParamTriangle {
    fn default() -> Self {
        Self::root()
    }
}

impl ParamTriangle {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2) -> Self {
        Self {
            corners: [p0, p1, p2],
        }
    }

    /// The fixed (0,0), (1,0), (0,1) triangle.
    pub fn root() -> Self {
        Self {
            corners: ROOT_PARAM_CORNERS,
        }
    }

    /// Edge-midpoint split in child order corner0, corner1, corner2, center.
    ///
    /// Corner children share the parent's orientation; the center child is
    /// point-reflected, with each of its corners on the edge opposite the
    /// matching parent corner. Every child keeps the parent's winding.
    pub fn split(&self) -> [ParamTriangle; 4] {
        let [p0, p1, p2] = self.corners;
        let m01 = (p0 + p1) * 0.5;
        let m12 = (p1 + p2) * 0.5;
        let m20 = (p2 + p0) * 0.5;
        [
            ParamTriangle::new(p0, m01, m20),
            ParamTriangle::new(m01, p1, m12),
            ParamTriangle::new(m20, m12, p2),
            ParamTriangle::new(m12, m20, m01),
        ]
    }

    /// Signed area; positive for counter-clockwise corners.
    pub fn signed_area(&self) -> f32 {
        let [p0, p1, p2] = self.corners;
        (p1 - p0).perp_dot(p2 - p0) * 0.5
    }

    pub fn centroid(&self) -> Vec2 {
        (self.corners[0] + self.corners[1] + self.corners[2]) / 3.0
    }

    /// Map every corner through the barycentric frame `(a0, a1, a2)` in world space.
    pub fn to_world(&self, frame: &[Vec3; 3]) -> [Vec3; 3] {
        self.corners
            .map(|p| interpolate_vec3(frame[0], frame[1], frame[2], p.x, p.y))
    }

    /// Map every corner through the barycentric frame `(a0, a1, a2)` in texture space.
    pub fn to_uv(&self, frame: &[Vec2; 3]) -> [Vec2; 3] {
        self.corners
            .map(|p| interpolate_vec2(frame[0], frame[1], frame[2], p.x, p.y))
    }

    /// Whether every corner matches `other` within `epsilon`.
    pub fn approx_eq(&self, other: &ParamTriangle, epsilon: f32) -> bool {
        self.corners
            .iter()
            .zip(other.corners.iter())
            .all(|(a, b)| a.abs_diff_eq(*b, epsilon))
    }

    pub fn is_finite(&self) -> bool {
        self.corners.iter().all(|c| c.is_finite())
    }
}
