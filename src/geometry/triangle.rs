use std::ops::{Index, IndexMut};

use crate::math::closest_point::closest_point_on_triangle;
use crate::math::intersect_3d::{ray_triangle_collision, sphere_triangle_collision};
use crate::math::{Point3, Vector3, VertexKey};

use super::{Ray, Segment};

/// An oriented triangle.
///
/// The vertex order determines the outward normal through the right-hand
/// rule: vertices appear counter-clockwise when viewed from outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle(pub [Point3; 3]);

impl Triangle {
    /// Creates a triangle from three vertices.
    #[must_use]
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self([a, b, c])
    }

    /// Returns the three vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point3; 3] {
        &self.0
    }

    /// Returns the keys of the three vertices.
    #[must_use]
    pub fn keys(&self) -> [VertexKey; 3] {
        [
            VertexKey::new(&self.0[0]),
            VertexKey::new(&self.0[1]),
            VertexKey::new(&self.0[2]),
        ]
    }

    /// Cross product of the two edges leaving the first vertex.
    ///
    /// Points along the outward normal; its length is twice the area.
    #[must_use]
    pub fn area_normal(&self) -> Vector3 {
        (self.0[1] - self.0[0]).cross(&(self.0[2] - self.0[0]))
    }

    /// Unit outward normal, or the zero vector for a degenerate triangle.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        self.area_normal()
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.area_normal().norm() / 2.0
    }

    #[must_use]
    pub fn centroid(&self) -> Point3 {
        Point3::from((self.0[0].coords + self.0[1].coords + self.0[2].coords) / 3.0)
    }

    /// Minimum corner of the bounding box.
    #[must_use]
    pub fn min(&self) -> Point3 {
        self.0[0].inf(&self.0[1]).inf(&self.0[2])
    }

    /// Maximum corner of the bounding box.
    #[must_use]
    pub fn max(&self) -> Point3 {
        self.0[0].sup(&self.0[1]).sup(&self.0[2])
    }

    /// Returns the three edges.
    #[must_use]
    pub fn segments(&self) -> [Segment; 3] {
        [
            Segment::new(self.0[0], self.0[1]),
            Segment::new(self.0[1], self.0[2]),
            Segment::new(self.0[2], self.0[0]),
        ]
    }

    /// Returns the index of the vertex with the given key, if any.
    #[must_use]
    pub fn position_of(&self, key: VertexKey) -> Option<usize> {
        self.keys().iter().position(|k| *k == key)
    }

    /// Closest point on the triangle to `p`.
    #[must_use]
    pub fn closest(&self, p: &Point3) -> Point3 {
        closest_point_on_triangle(p, &self.0[0], &self.0[1], &self.0[2])
    }

    /// Distance from `p` to the triangle.
    #[must_use]
    pub fn dist(&self, p: &Point3) -> f64 {
        (self.closest(p) - p).norm()
    }

    /// Ray parameter of the intersection with this triangle, if the ray
    /// (forward half-line) hits it.
    #[must_use]
    pub fn ray_collision(&self, ray: &Ray) -> Option<f64> {
        ray_triangle_collision(&ray.origin, &ray.direction, &self.0[0], &self.0[1], &self.0[2])
            .filter(|t| *t >= 0.0)
    }

    /// Checks whether a sphere touches the triangle.
    #[must_use]
    pub fn sphere_collision(&self, center: &Point3, r: f64) -> bool {
        sphere_triangle_collision(center, r, &self.0[0], &self.0[1], &self.0[2])
    }

    /// Applies `f` to every vertex, keeping the vertex order.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(&Point3) -> Point3) -> Self {
        Self([f(&self.0[0]), f(&self.0[1]), f(&self.0[2])])
    }
}

impl Index<usize> for Triangle {
    type Output = Point3;

    fn index(&self, index: usize) -> &Point3 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Triangle {
    fn index_mut(&mut self, index: usize) -> &mut Point3 {
        &mut self.0[index]
    }
}
