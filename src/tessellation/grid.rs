//! Lattice of cell corners and a windowed cache of solid membership.

use rayon::prelude::*;

use crate::error::{Result, SamplingError, SolidMeshError, TessellationError};
use crate::geometry::Solid;
use crate::math::Point3;

/// A uniform lattice covering `[min - delta, max + delta]` on every axis.
///
/// Coordinates are computed as `min - delta + i * delta`, never by
/// accumulation, so every corner shared by neighbouring cells is bit-identical.
#[derive(Debug, Clone, Copy)]
pub struct GridSpacer {
    origin: Point3,
    delta: f64,
    counts: [usize; 3],
}

impl GridSpacer {
    /// Creates the lattice for a box and a cell size.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::InvalidParameters`] if `delta` is not
    /// positive and finite, if the box has a non-finite or inverted extent,
    /// or if a plane of the lattice has more points than can be addressed.
    pub fn new(min: &Point3, max: &Point3, delta: f64) -> Result<Self> {
        if !(delta.is_finite() && delta > 0.0) {
            return Err(invalid(format!(
                "cell size must be positive and finite, got {delta}"
            )));
        }
        let count = |axis: usize| -> Result<usize> {
            let (lo, hi) = (min[axis], max[axis]);
            if !(lo.is_finite() && hi.is_finite()) {
                return Err(invalid(format!(
                    "bounds must be finite, got [{lo}, {hi}] on axis {axis}"
                )));
            }
            if hi < lo {
                return Err(invalid(format!(
                    "bounds are inverted, got [{lo}, {hi}] on axis {axis}"
                )));
            }
            let span = ((hi - lo) / delta).floor();
            // Saturates for spans beyond `usize`, which the checked add rejects.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let cells = span as usize;
            cells
                .checked_add(3)
                .filter(|_| span.is_finite())
                .ok_or_else(|| invalid(format!("lattice too large on axis {axis}")))
        };
        let counts = [count(0)?, count(1)?, count(2)?];
        if counts[0].checked_mul(counts[1]).is_none() {
            return Err(invalid(format!(
                "lattice plane too large: {} x {}",
                counts[0], counts[1]
            )));
        }
        Ok(Self {
            origin: min.map(|c| c - delta),
            delta,
            counts,
        })
    }

    /// Number of lattice points along each axis.
    #[must_use]
    pub fn counts(&self) -> [usize; 3] {
        self.counts
    }

    #[must_use]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Coordinate of the `i`-th lattice point along `axis`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coord(&self, axis: usize, i: usize) -> f64 {
        self.origin[axis] + i as f64 * self.delta
    }

    #[must_use]
    pub fn corner(&self, i: usize, j: usize, k: usize) -> Point3 {
        Point3::new(self.coord(0, i), self.coord(1, j), self.coord(2, k))
    }

    /// Position of `c` along `axis` relative to the lattice, in `[0, delta)`.
    #[must_use]
    pub fn offset(&self, axis: usize, c: f64) -> f64 {
        (c - self.origin[axis]).rem_euclid(self.delta)
    }

    /// Whether `(i, j, k)` lies on the outermost layer of the lattice.
    #[must_use]
    pub fn is_border(&self, i: usize, j: usize, k: usize) -> bool {
        let [nx, ny, nz] = self.counts;
        i == 0 || j == 0 || k == 0 || i + 1 == nx || j + 1 == ny || k + 1 == nz
    }
}

/// Solid membership on a [`GridSpacer`], keeping a window of Z planes.
///
/// Accessing a plane outside the window re-centers it on that plane. Planes
/// that remain inside the new window are kept; the others are sampled again
/// in parallel.
pub struct SolidCache<'a, S: Solid + ?Sized> {
    solid: &'a S,
    spacer: GridSpacer,
    planes: usize,
    start: usize,
    values: Vec<bool>,
}

impl<'a, S: Solid + ?Sized> SolidCache<'a, S> {
    /// Creates a cache and samples the first window.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::SolidOutsideBounds`] if the solid contains a
    /// corner on the border of the lattice, or
    /// [`TessellationError::InvalidParameters`] if the window cannot be
    /// allocated.
    pub fn new(solid: &'a S, spacer: GridSpacer, planes: usize) -> Result<Self> {
        let [nx, ny, nz] = spacer.counts();
        let planes = planes.clamp(1, nz);
        let len = nx
            .checked_mul(ny)
            .and_then(|plane| plane.checked_mul(planes))
            .ok_or_else(|| invalid(format!("cache window of {planes} planes is too large")))?;
        let mut values = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|e| invalid(format!("cannot allocate cache window: {e}")))?;
        values.resize(len, false);
        let mut cache = Self {
            solid,
            spacer,
            planes,
            start: 0,
            values,
        };
        cache.fill(0, planes)?;
        Ok(cache)
    }

    #[must_use]
    pub fn spacer(&self) -> &GridSpacer {
        &self.spacer
    }

    /// Index of the first cached plane.
    #[must_use]
    pub fn window_start(&self) -> usize {
        self.start
    }

    /// Whether the lattice point `(i, j, k)` is inside the solid.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::SolidOutsideBounds`] if moving the window
    /// samples an inside corner on the lattice border.
    pub fn get(&mut self, i: usize, j: usize, k: usize) -> Result<bool> {
        if k < self.start || k >= self.start + self.planes {
            self.recenter(k)?;
        }
        let [nx, ny, _] = self.spacer.counts();
        Ok(self.values[((k - self.start) * ny + j) * nx + i])
    }

    fn recenter(&mut self, k: usize) -> Result<()> {
        let nz = self.spacer.counts()[2];
        let new_start = k.saturating_sub(self.planes / 2).min(nz - self.planes);
        let old_start = self.start;
        let plane_len = self.values.len() / self.planes;
        tracing::trace!(old_start, new_start, "moving solid cache window");

        self.start = new_start;
        if new_start > old_start {
            let shift = new_start - old_start;
            if shift < self.planes {
                self.values.copy_within(shift * plane_len.., 0);
                self.fill(self.planes - shift, self.planes)
            } else {
                self.fill(0, self.planes)
            }
        } else {
            let shift = old_start - new_start;
            if shift < self.planes {
                let kept = self.planes - shift;
                self.values.copy_within(..kept * plane_len, shift * plane_len);
                self.fill(0, shift)
            } else {
                self.fill(0, self.planes)
            }
        }
    }

    /// Samples window-relative planes `from..to`.
    fn fill(&mut self, from: usize, to: usize) -> Result<()> {
        let [nx, ny, _] = self.spacer.counts();
        let spacer = self.spacer;
        let solid = self.solid;
        let first_plane = self.start + from;

        self.values[from * nx * ny..to * nx * ny]
            .par_chunks_mut(nx)
            .enumerate()
            .for_each(|(row, out)| {
                let j = row % ny;
                let k = first_plane + row / ny;
                for (i, v) in out.iter_mut().enumerate() {
                    *v = solid.contains(&spacer.corner(i, j, k));
                }
            });

        for local in from..to {
            let k = self.start + local;
            for j in 0..ny {
                for i in 0..nx {
                    if self.values[(local * ny + j) * nx + i] && spacer.is_border(i, j, k) {
                        let p = spacer.corner(i, j, k);
                        tracing::error!(?p, "solid is inside on the lattice border");
                        return Err(SamplingError::SolidOutsideBounds {
                            x: p.x,
                            y: p.y,
                            z: p.z,
                        }
                        .into());
                    }
                }
            }
        }
        Ok(())
    }
}

fn invalid(reason: String) -> SolidMeshError {
    TessellationError::InvalidParameters(reason).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::solid::{CuboidSolid, SphereSolid};
    use crate::SolidMeshError;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Inside everywhere, regardless of its declared bounds.
    struct Everywhere;

    impl Solid for Everywhere {
        fn min(&self) -> Point3 {
            p(0.0, 0.0, 0.0)
        }

        fn max(&self) -> Point3 {
            p(1.0, 1.0, 1.0)
        }

        fn contains(&self, _p: &Point3) -> bool {
            true
        }
    }

    #[test]
    fn spacer_pads_by_one_cell() {
        let spacer = GridSpacer::new(&p(-1.0, -1.0, 0.0), &p(1.0, 1.0, 0.5), 0.5).unwrap();
        assert_eq!(spacer.counts(), [7, 7, 4]);
        assert_relative_eq!(spacer.coord(0, 0), -1.5);
        assert_relative_eq!(spacer.coord(0, 6), 1.5);
        assert_relative_eq!(spacer.coord(2, 3), 1.0);
    }

    #[test]
    fn spacer_offset_finds_midpoints() {
        let spacer = GridSpacer::new(&p(-1.0, -1.0, -1.0), &p(1.0, 1.0, 1.0), 0.1).unwrap();
        let mid = (spacer.coord(1, 4) + spacer.coord(1, 5)) / 2.0;
        assert_relative_eq!(spacer.offset(1, mid), 0.05, epsilon = 1e-9);
        let on = spacer.offset(1, spacer.coord(1, 7));
        assert!(on < 0.025 || on > 0.075);
    }

    #[test]
    fn cache_matches_direct_sampling() {
        let sphere = SphereSolid::new(p(0.0, 0.0, 0.0), 1.0);
        let spacer = GridSpacer::new(&sphere.min(), &sphere.max(), 0.25).unwrap();
        let mut cache = SolidCache::new(&sphere, spacer, 3).unwrap();
        let [nx, ny, nz] = spacer.counts();
        // Walk up and then back down to move the window both ways.
        let order: Vec<usize> = (0..nz).chain((0..nz).rev()).collect();
        for k in order {
            for j in 0..ny {
                for i in 0..nx {
                    let expected = sphere.contains(&spacer.corner(i, j, k));
                    assert_eq!(cache.get(i, j, k).unwrap(), expected, "({i}, {j}, {k})");
                }
            }
            assert!(cache.window_start() <= k && k < cache.window_start() + 3);
        }
    }

    #[test]
    fn window_larger_than_lattice() {
        let cube = CuboidSolid::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let spacer = GridSpacer::new(&cube.min(), &cube.max(), 0.5).unwrap();
        let mut cache = SolidCache::new(&cube, spacer, 100).unwrap();
        assert!(cache.get(1, 1, 1).unwrap());
        assert!(!cache.get(0, 1, 1).unwrap());
    }

    #[test]
    fn inside_border_corner_is_rejected() {
        let spacer = GridSpacer::new(&Everywhere.min(), &Everywhere.max(), 0.5).unwrap();
        let result = SolidCache::new(&Everywhere, spacer, 2);
        assert!(matches!(
            result,
            Err(SolidMeshError::Sampling(SamplingError::SolidOutsideBounds { .. }))
        ));
    }

    #[test]
    fn spacer_rejects_unusable_bounds() {
        let unit = p(1.0, 1.0, 1.0);
        let cases = [
            (p(0.0, 0.0, 0.0), p(f64::INFINITY, 1.0, 1.0)),
            (p(f64::NEG_INFINITY, 0.0, 0.0), unit),
            (p(0.0, f64::NAN, 0.0), unit),
            (p(0.0, 0.0, 2.0), unit),
            (p(-1e300, 0.0, 0.0), p(1e300, 1.0, 1.0)),
            (p(-1e12, -1e12, 0.0), p(1e12, 1e12, 1.0)),
        ];
        for (min, max) in cases {
            let result = GridSpacer::new(&min, &max, 0.1);
            assert!(
                matches!(
                    result,
                    Err(SolidMeshError::Tessellation(TessellationError::InvalidParameters(_)))
                ),
                "[{min}, {max}]"
            );
        }
    }

    #[test]
    fn spacer_accepts_flat_box() {
        let spacer = GridSpacer::new(&p(0.0, 0.0, 0.0), &p(1.0, 1.0, 0.0), 0.5).unwrap();
        assert_eq!(spacer.counts(), [5, 5, 3]);
    }
}
