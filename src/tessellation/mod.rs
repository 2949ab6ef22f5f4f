pub mod case_table;
pub mod grid;
mod marching_cubes;

pub use grid::{GridSpacer, SolidCache};
pub use marching_cubes::MarchingCubes;

use crate::error::{Result, TessellationError};

/// Parameters controlling how a solid is sampled and triangulated.
#[derive(Debug, Clone, Copy)]
pub struct TessellationParams {
    /// Edge length of a lattice cell.
    pub delta: f64,
    /// Bisection steps used to move each vertex toward the true boundary.
    pub refine_iterations: usize,
    /// Number of Z planes of membership values kept in memory.
    pub cache_planes: usize,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            delta: 0.05,
            refine_iterations: 0,
            cache_planes: 10,
        }
    }
}

impl TessellationParams {
    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    #[must_use]
    pub fn with_refine_iterations(mut self, iterations: usize) -> Self {
        self.refine_iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_cache_planes(mut self, planes: usize) -> Self {
        self.cache_planes = planes;
        self
    }

    /// Checks that the parameters describe a usable lattice.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::InvalidParameters`] if `delta` is not a
    /// positive finite number or fewer than two planes are cached.
    pub fn validate(&self) -> Result<()> {
        if !(self.delta.is_finite() && self.delta > 0.0) {
            return Err(TessellationError::InvalidParameters(format!(
                "cell size must be positive and finite, got {}",
                self.delta
            ))
            .into());
        }
        if self.cache_planes < 2 {
            return Err(TessellationError::InvalidParameters(format!(
                "at least two planes must be cached, got {}",
                self.cache_planes
            ))
            .into());
        }
        Ok(())
    }
}
