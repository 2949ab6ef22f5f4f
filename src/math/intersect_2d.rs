use super::{Matrix2, Point2, Vector2, RAY_DETERMINANT_EPSILON};

/// Intersects the line through a 2D ray with a bounded segment `a`-`b`.
///
/// Solves `a + s * (b - a) = origin + t * direction` as a 2x2 system and
/// returns `t` when `s` lies in `[0, 1]`. A negative `t` means the segment
/// is behind the ray origin.
///
/// A near-singular system (ray nearly parallel to the segment) is treated
/// as no intersection.
#[must_use]
pub fn ray_segment_collision(
    origin: &Point2,
    direction: &Vector2,
    a: &Point2,
    b: &Point2,
) -> Option<f64> {
    let v = b - a;
    let matrix = Matrix2::new(v.x, -direction.x, v.y, -direction.y);
    let threshold = RAY_DETERMINANT_EPSILON * v.norm() * direction.norm();
    if matrix.determinant().abs() <= threshold {
        return None;
    }
    let solution = matrix.try_inverse()? * (origin - a);
    let (s, t) = (solution.x, solution.y);
    (0.0..=1.0).contains(&s).then_some(t)
}

/// Checks whether a circle of radius `r` around `center` touches the
/// segment `a`-`b`.
#[must_use]
pub fn circle_segment_collision(center: &Point2, r: f64, a: &Point2, b: &Point2) -> bool {
    if (a - center).norm() < r || (b - center).norm() < r {
        return true;
    }

    // The segment may pass through the circle with both endpoints outside.
    let v = b - a;
    let len_sq = v.norm_squared();
    if len_sq == 0.0 {
        return false;
    }
    let frac = (center - a).dot(&v) / len_sq;
    let closest = a + v * frac;
    (0.0..=1.0).contains(&frac) && (closest - center).norm() < r
}
