use super::closest_point::closest_point_on_segment;
use super::{point_to_bounds_dist_squared, Matrix3, Point3, Vector3, RAY_DETERMINANT_EPSILON};

/// Intersects the line `origin + t * direction` with the triangle
/// `v0`, `v1`, `v2`.
///
/// Solves `v0 + u * (v1 - v0) + v * (v2 - v0) = origin + t * direction` as a
/// 3x3 system and returns `t` when the barycentric point lies inside the
/// triangle (edges included). A negative `t` means the triangle is behind
/// the ray origin.
///
/// A near-singular system (ray nearly parallel to the triangle's plane, or a
/// degenerate triangle) is treated as no intersection.
#[must_use]
pub fn ray_triangle_collision(
    origin: &Point3,
    direction: &Vector3,
    v0: &Point3,
    v1: &Point3,
    v2: &Point3,
) -> Option<f64> {
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let matrix = Matrix3::from_columns(&[e1, e2, -direction]);
    let threshold = RAY_DETERMINANT_EPSILON * e1.norm() * e2.norm() * direction.norm();
    if matrix.determinant().abs() <= threshold {
        return None;
    }
    let solution = matrix.try_inverse()? * (origin - v0);
    let (u, v, t) = (solution.x, solution.y, solution.z);
    (u >= 0.0 && v >= 0.0 && u + v <= 1.0).then_some(t)
}

/// Checks whether a ray (forward half-line only) passes through an
/// axis-aligned box.
#[must_use]
pub fn ray_bounds_collision(
    origin: &Point3,
    direction: &Vector3,
    min: &Point3,
    max: &Point3,
) -> bool {
    let mut min_frac = f64::NEG_INFINITY;
    let mut max_frac = f64::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let rate = direction[axis];
        if rate == 0.0 {
            if o < min[axis] || o > max[axis] {
                return false;
            }
            continue;
        }
        let mut t1 = (min[axis] - o) / rate;
        let mut t2 = (max[axis] - o) / rate;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        min_frac = min_frac.max(t1);
        max_frac = max_frac.min(t2);
    }
    min_frac <= max_frac && max_frac >= 0.0
}

/// Checks whether a sphere can touch anything inside an axis-aligned box.
#[must_use]
pub fn sphere_bounds_collision(center: &Point3, r: f64, min: &Point3, max: &Point3) -> bool {
    point_to_bounds_dist_squared(center, min, max) <= r * r
}

/// Checks whether a sphere of radius `r` touches the segment `a`-`b`.
///
/// Endpoint distances are checked first, then the projection of the center
/// onto the segment with its parameter clamped to `[0, 1]`.
#[must_use]
pub fn sphere_segment_collision(center: &Point3, r: f64, a: &Point3, b: &Point3) -> bool {
    if (a - center).norm() < r || (b - center).norm() < r {
        return true;
    }
    (closest_point_on_segment(center, a, b) - center).norm() < r
}

/// Checks whether a sphere of radius `r` touches the triangle
/// `v0`, `v1`, `v2`.
#[must_use]
pub fn sphere_triangle_collision(
    center: &Point3,
    r: f64,
    v0: &Point3,
    v1: &Point3,
    v2: &Point3,
) -> bool {
    if [v0, v1, v2].iter().any(|v| (*v - center).norm() < r) {
        return true;
    }

    let normal = (v1 - v0).cross(&(v2 - v0));
    let len = normal.norm();
    if len > 0.0 {
        let normal = normal / len;
        let plane_dist = (center - v0).dot(&normal);
        if plane_dist.abs() >= r {
            return false;
        }
        // Inside the triangle's prism, the plane distance is the distance.
        let projected = center - normal * plane_dist;
        if point_in_triangle_prism(&projected, &normal, v0, v1, v2) {
            return true;
        }
    }

    sphere_segment_collision(center, r, v0, v1)
        || sphere_segment_collision(center, r, v1, v2)
        || sphere_segment_collision(center, r, v2, v0)
}

fn point_in_triangle_prism(
    p: &Point3,
    normal: &Vector3,
    v0: &Point3,
    v1: &Point3,
    v2: &Point3,
) -> bool {
    [(v0, v1), (v1, v2), (v2, v0)]
        .iter()
        .all(|(a, b)| (*b - *a).cross(&(p - *a)).dot(normal) >= 0.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn unit_tri() -> [Point3; 3] {
        [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]
    }

    // ── ray_triangle_collision ──

    #[test]
    fn ray_hits_triangle_from_above() {
        let [a, b, c] = unit_tri();
        let t = ray_triangle_collision(&p(0.2, 0.2, 2.0), &v(0.0, 0.0, -1.0), &a, &b, &c).unwrap();
        assert_relative_eq!(t, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn triangle_behind_ray_reports_negative_t() {
        let [a, b, c] = unit_tri();
        let t = ray_triangle_collision(&p(0.2, 0.2, 2.0), &v(0.0, 0.0, 4.0), &a, &b, &c).unwrap();
        assert_relative_eq!(t, -0.5, epsilon = 1e-12);
    }

    #[test]
    fn ray_misses_outside_triangle() {
        let [a, b, c] = unit_tri();
        let hit = ray_triangle_collision(&p(0.8, 0.8, 2.0), &v(0.0, 0.0, -1.0), &a, &b, &c);
        assert!(hit.is_none());
    }

    #[test]
    fn parallel_ray_is_no_intersection() {
        let [a, b, c] = unit_tri();
        let hit = ray_triangle_collision(&p(-1.0, 0.2, 0.0), &v(1.0, 0.0, 0.0), &a, &b, &c);
        assert!(hit.is_none());
    }

    #[test]
    fn degenerate_triangle_is_no_intersection() {
        let hit = ray_triangle_collision(
            &p(0.5, 0.0, 1.0),
            &v(0.0, 0.0, -1.0),
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(2.0, 0.0, 0.0),
        );
        assert!(hit.is_none());
    }

    // ── ray_bounds_collision ──

    #[test]
    fn ray_enters_box() {
        assert!(ray_bounds_collision(
            &p(-2.0, 0.5, 0.5),
            &v(1.0, 0.0, 0.0),
            &p(0.0, 0.0, 0.0),
            &p(1.0, 1.0, 1.0),
        ));
    }

    #[test]
    fn ray_pointing_away_from_box() {
        assert!(!ray_bounds_collision(
            &p(-2.0, 0.5, 0.5),
            &v(-1.0, 0.0, 0.0),
            &p(0.0, 0.0, 0.0),
            &p(1.0, 1.0, 1.0),
        ));
    }

    #[test]
    fn ray_starting_inside_box() {
        assert!(ray_bounds_collision(
            &p(0.5, 0.5, 0.5),
            &v(0.3, -0.2, 0.9),
            &p(0.0, 0.0, 0.0),
            &p(1.0, 1.0, 1.0),
        ));
    }

    // ── sphere predicates ──

    #[test]
    fn sphere_touches_segment_middle() {
        assert!(sphere_segment_collision(
            &p(0.0, 0.5, 0.0),
            0.6,
            &p(-3.0, 0.0, 0.0),
            &p(3.0, 0.0, 0.0),
        ));
    }

    #[test]
    fn sphere_beyond_segment_end() {
        assert!(!sphere_segment_collision(
            &p(4.0, 0.0, 0.0),
            0.5,
            &p(-3.0, 0.0, 0.0),
            &p(3.0, 0.0, 0.0),
        ));
    }

    #[test]
    fn sphere_touches_triangle_face() {
        let [a, b, c] = unit_tri();
        assert!(sphere_triangle_collision(&p(0.25, 0.25, 0.1), 0.2, &a, &b, &c));
        assert!(!sphere_triangle_collision(&p(0.25, 0.25, 0.3), 0.2, &a, &b, &c));
    }

    #[test]
    fn sphere_touches_triangle_edge_only() {
        let [a, b, c] = unit_tri();
        // Center projects outside the triangle, next to the hypotenuse.
        assert!(sphere_triangle_collision(&p(0.6, 0.6, 0.0), 0.2, &a, &b, &c));
        assert!(!sphere_triangle_collision(&p(0.8, 0.8, 0.0), 0.2, &a, &b, &c));
    }

    #[test]
    fn sphere_bounds_overlap() {
        assert!(sphere_bounds_collision(
            &p(1.5, 0.5, 0.5),
            0.6,
            &p(0.0, 0.0, 0.0),
            &p(1.0, 1.0, 1.0),
        ));
        assert!(!sphere_bounds_collision(
            &p(2.0, 2.0, 2.0),
            1.0,
            &p(0.0, 0.0, 0.0),
            &p(1.0, 1.0, 1.0),
        ));
    }
}
