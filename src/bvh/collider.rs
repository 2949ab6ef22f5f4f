use crate::geometry::{Collider, Ray, RayCollision, Triangle};
use crate::math::intersect_3d::{ray_bounds_collision, sphere_bounds_collision};
use crate::math::Point3;

use super::{Bvh, Node, NodeKind};

impl Node {
    fn ray_collisions(&self, ray: &Ray) -> usize {
        if !ray_bounds_collision(&ray.origin, &ray.direction, &self.min, &self.max) {
            return 0;
        }
        match &self.kind {
            NodeKind::Leaf(t) => Collider::ray_collisions(t, ray),
            NodeKind::Branch(a, b) => a.ray_collisions(ray) + b.ray_collisions(ray),
        }
    }

    fn first_ray_collision(&self, ray: &Ray) -> Option<RayCollision> {
        if !ray_bounds_collision(&ray.origin, &ray.direction, &self.min, &self.max) {
            return None;
        }
        match &self.kind {
            NodeKind::Leaf(t) => Collider::first_ray_collision(t, ray),
            NodeKind::Branch(a, b) => match (a.first_ray_collision(ray), b.first_ray_collision(ray)) {
                (Some(x), Some(y)) => Some(if y.scale < x.scale { y } else { x }),
                (x, y) => x.or(y),
            },
        }
    }

    fn sphere_collision(&self, center: &Point3, r: f64) -> bool {
        if !sphere_bounds_collision(center, r, &self.min, &self.max) {
            return false;
        }
        match &self.kind {
            NodeKind::Leaf(t) => Triangle::sphere_collision(t, center, r),
            NodeKind::Branch(a, b) => a.sphere_collision(center, r) || b.sphere_collision(center, r),
        }
    }
}

impl Collider for Bvh {
    fn min(&self) -> Point3 {
        self.root.min
    }

    fn max(&self) -> Point3 {
        self.root.max
    }

    fn ray_collisions(&self, ray: &Ray) -> usize {
        self.root.ray_collisions(ray)
    }

    fn first_ray_collision(&self, ray: &Ray) -> Option<RayCollision> {
        self.root.first_ray_collision(ray)
    }

    fn sphere_collision(&self, center: &Point3, r: f64) -> bool {
        self.root.sphere_collision(center, r)
    }
}
