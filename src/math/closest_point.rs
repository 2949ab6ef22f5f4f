use super::Point3;

/// Closest point to `p` on the segment `a`-`b`.
///
/// The projection parameter is clamped to `[0, 1]`; a zero-length segment
/// returns `a`.
#[must_use]
pub fn closest_point_on_segment(p: &Point3, a: &Point3, b: &Point3) -> Point3 {
    let v = b - a;
    let len_sq = v.norm_squared();
    if len_sq == 0.0 {
        return *a;
    }
    let t = ((p - a).dot(&v) / len_sq).clamp(0.0, 1.0);
    a + v * t
}

/// Closest point to `p` on the triangle `v0`, `v1`, `v2`.
///
/// Classifies `p` against the Voronoi regions of the triangle's vertices,
/// edges and face ("Real-Time Collision Detection", Ericson, 5.1.5).
#[must_use]
pub fn closest_point_on_triangle(p: &Point3, v0: &Point3, v1: &Point3, v2: &Point3) -> Point3 {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = p - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *v0;
    }

    let bp = p - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *v1;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return v0 + ab * v;
    }

    let cp = p - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *v2;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return v0 + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return v1 + (v2 - v1) * w;
    }

    let denom = va + vb + vc;
    if denom == 0.0 {
        // Degenerate (zero-area) triangle: fall back to its longest edge.
        return closest_point_on_degenerate(p, v0, v1, v2);
    }
    let v = vb / denom;
    let w = vc / denom;
    v0 + ab * v + ac * w
}

fn closest_point_on_degenerate(p: &Point3, v0: &Point3, v1: &Point3, v2: &Point3) -> Point3 {
    [(v0, v1), (v1, v2), (v2, v0)]
        .into_iter()
        .map(|(a, b)| closest_point_on_segment(p, a, b))
        .min_by(|x, y| (x - p).norm_squared().total_cmp(&(y - p).norm_squared()))
        .unwrap_or(*v0)
}
