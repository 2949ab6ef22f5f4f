pub mod closest_point;
pub mod intersect_2d;
pub mod intersect_3d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 2x2 matrix.
pub type Matrix2 = nalgebra::Matrix2<f64>;

/// 3x3 matrix.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Relative determinant threshold below which a ray is treated as parallel
/// to the primitive it is tested against.
///
/// The threshold is scaled by the magnitudes of the operands, so it does
/// not depend on the units of the model.
pub const RAY_DETERMINANT_EPSILON: f64 = 1e-8;

/// Exact, hashable identity of a coordinate.
///
/// Two points map to the same key only if all three components are
/// bit-identical, with `-0.0` folded onto `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey([u64; 3]);

impl VertexKey {
    /// Creates the key of a point.
    #[must_use]
    pub fn new(p: &Point3) -> Self {
        let bits = |c: f64| if c == 0.0 { 0.0_f64.to_bits() } else { c.to_bits() };
        Self([bits(p.x), bits(p.y), bits(p.z)])
    }
}

impl From<&Point3> for VertexKey {
    fn from(p: &Point3) -> Self {
        Self::new(p)
    }
}

/// Squared distance from a point to an axis-aligned box.
///
/// Zero when the point is inside the box. This is a lower bound on the
/// squared distance to anything contained in the box.
#[must_use]
pub fn point_to_bounds_dist_squared(p: &Point3, min: &Point3, max: &Point3) -> f64 {
    let mut sum = 0.0;
    for axis in 0..3 {
        let v = p[axis];
        let d = if v < min[axis] {
            min[axis] - v
        } else if v > max[axis] {
            v - max[axis]
        } else {
            0.0
        };
        sum += d * d;
    }
    sum
}
