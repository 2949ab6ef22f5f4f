//! Marching-cubes lookup table built from canonical cases and the cube's
//! rotation group.
//!
//! Corner `c` of a unit cell sits at `(c & 1, (c >> 1) & 1, (c >> 2) & 1)`.
//! Bit `c` of a [`CornerMask`] is set when that corner is inside the solid.

use std::collections::{HashSet, VecDeque};
use std::sync::LazyLock;

/// Set of inside corners of one cell.
pub type CornerMask = u8;

/// Number of distinct corner masks.
pub const CASE_COUNT: usize = 256;

/// A triangle whose vertices are the midpoints of pairs of cell corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeTriangle(pub [[u8; 2]; 3]);

impl EdgeTriangle {
    const fn new(t: [u8; 6]) -> Self {
        Self([[t[0], t[1]], [t[2], t[3]], [t[4], t[5]]])
    }

    fn rotate(&self, rotation: &Rotation) -> Self {
        Self(self.0.map(|[a, b]| [rotation.apply(a), rotation.apply(b)]))
    }
}

/// A permutation of cell corners induced by a rigid rotation of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rotation([u8; 8]);

impl Rotation {
    const IDENTITY: Self = Self([0, 1, 2, 3, 4, 5, 6, 7]);
    const ABOUT_Z: Self = Self([2, 0, 3, 1, 6, 4, 7, 5]);
    const ABOUT_X: Self = Self([2, 3, 6, 7, 0, 1, 4, 5]);

    /// Where corner `c` ends up.
    #[must_use]
    pub fn apply(&self, c: u8) -> u8 {
        self.0[usize::from(c)]
    }

    /// Rotation that applies `inner` first and `self` second.
    #[must_use]
    pub fn compose(&self, inner: &Rotation) -> Rotation {
        Rotation(inner.0.map(|c| self.apply(c)))
    }

    /// Maps every inside corner of `mask` through the rotation.
    #[must_use]
    pub fn apply_mask(&self, mask: CornerMask) -> CornerMask {
        (0..8u8)
            .filter(|c| mask & (1 << c) != 0)
            .fold(0, |acc, c| acc | (1 << self.apply(c)))
    }
}

/// All 24 rotations of the cube, in sorted order.
///
/// Enumerated by a breadth-first closure over two quarter turns.
#[must_use]
pub fn rotations() -> Vec<Rotation> {
    let mut seen = HashSet::from([Rotation::IDENTITY]);
    let mut queue = VecDeque::from([Rotation::IDENTITY]);
    while let Some(r) = queue.pop_front() {
        for generator in [Rotation::ABOUT_Z, Rotation::ABOUT_X] {
            let next = generator.compose(&r);
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    let mut all: Vec<Rotation> = seen.into_iter().collect();
    all.sort_unstable();
    all
}

const fn mask(corners: &[u8]) -> CornerMask {
    let mut m = 0;
    let mut i = 0;
    while i < corners.len() {
        m |= 1 << corners[i];
        i += 1;
    }
    m
}

macro_rules! stencil {
    ($($t:expr),* $(,)?) => {
        &[$(EdgeTriangle::new($t)),*]
    };
}

/// Canonical cases. Every mask is a rotation of exactly one entry.
static CANONICAL: &[(CornerMask, &[EdgeTriangle])] = &[
    (mask(&[]), stencil![]),
    (mask(&[0]), stencil![[0, 1, 0, 2, 0, 4]]),
    (mask(&[0, 1]), stencil![[0, 4, 1, 5, 0, 2], [1, 5, 1, 3, 0, 2]]),
    (mask(&[0, 5]), stencil![[0, 1, 0, 2, 0, 4], [5, 7, 1, 5, 4, 5]]),
    (mask(&[0, 7]), stencil![[0, 1, 0, 2, 0, 4], [6, 7, 3, 7, 5, 7]]),
    (
        mask(&[1, 2, 3]),
        stencil![[0, 1, 1, 5, 0, 2], [0, 2, 1, 5, 2, 6], [2, 6, 1, 5, 3, 7]],
    ),
    (
        mask(&[0, 1, 7]),
        stencil![[0, 4, 1, 5, 0, 2], [1, 5, 1, 3, 0, 2], [6, 7, 3, 7, 5, 7]],
    ),
    (
        mask(&[1, 4, 7]),
        stencil![[4, 6, 4, 5, 0, 4], [1, 5, 1, 3, 0, 1], [6, 7, 3, 7, 5, 7]],
    ),
    (
        mask(&[0, 1, 2, 3]),
        stencil![[0, 4, 1, 5, 3, 7], [0, 4, 3, 7, 2, 6]],
    ),
    (
        mask(&[0, 2, 3, 6]),
        stencil![
            [0, 1, 4, 6, 0, 4],
            [0, 1, 6, 7, 4, 6],
            [0, 1, 1, 3, 6, 7],
            [1, 3, 3, 7, 6, 7],
        ],
    ),
    (
        mask(&[1, 2, 5, 6]),
        stencil![
            [0, 2, 2, 3, 6, 7],
            [0, 2, 6, 7, 4, 6],
            [0, 1, 4, 5, 5, 7],
            [5, 7, 1, 3, 0, 1],
        ],
    ),
    (
        mask(&[0, 2, 3, 7]),
        stencil![
            [0, 4, 0, 1, 2, 6],
            [0, 1, 5, 7, 2, 6],
            [2, 6, 5, 7, 6, 7],
            [0, 1, 1, 3, 5, 7],
        ],
    ),
    (
        mask(&[1, 2, 3, 4]),
        stencil![
            [0, 1, 1, 5, 0, 2],
            [0, 2, 1, 5, 2, 6],
            [2, 6, 1, 5, 3, 7],
            [4, 5, 0, 4, 4, 6],
        ],
    ),
    (
        mask(&[1, 2, 4, 7]),
        stencil![
            [0, 1, 1, 5, 1, 3],
            [0, 2, 2, 3, 2, 6],
            [4, 5, 0, 4, 4, 6],
            [5, 7, 6, 7, 3, 7],
        ],
    ),
    (
        mask(&[1, 2, 3, 6]),
        stencil![
            [0, 2, 0, 1, 4, 6],
            [0, 1, 3, 7, 4, 6],
            [0, 1, 1, 5, 3, 7],
            [4, 6, 3, 7, 6, 7],
        ],
    ),
    (
        mask(&[0, 2, 3, 5, 6]),
        stencil![
            [0, 1, 4, 6, 0, 4],
            [0, 1, 6, 7, 4, 6],
            [0, 1, 1, 3, 6, 7],
            [1, 3, 3, 7, 6, 7],
            [5, 7, 1, 5, 4, 5],
        ],
    ),
    (
        mask(&[2, 3, 4, 5, 6]),
        stencil![
            [5, 7, 1, 5, 0, 4],
            [0, 4, 6, 7, 5, 7],
            [0, 2, 6, 7, 0, 4],
            [0, 2, 3, 7, 6, 7],
            [0, 2, 1, 3, 3, 7],
        ],
    ),
    (
        mask(&[0, 4, 5, 6, 7]),
        stencil![[1, 5, 0, 1, 0, 2], [0, 2, 2, 6, 1, 5], [1, 5, 2, 6, 3, 7]],
    ),
    (
        mask(&[1, 2, 3, 4, 5, 6]),
        stencil![[0, 2, 0, 1, 0, 4], [3, 7, 6, 7, 5, 7]],
    ),
    (
        mask(&[1, 2, 3, 4, 6, 7]),
        stencil![
            [0, 2, 4, 5, 0, 4],
            [0, 2, 5, 7, 4, 5],
            [0, 2, 1, 5, 5, 7],
            [0, 1, 1, 5, 0, 2],
        ],
    ),
    (
        mask(&[2, 3, 4, 5, 6, 7]),
        stencil![[1, 5, 0, 4, 0, 2], [1, 3, 1, 5, 0, 2]],
    ),
    (mask(&[1, 2, 3, 4, 5, 6, 7]), stencil![[0, 2, 0, 1, 0, 4]]),
    (mask(&[0, 1, 2, 3, 4, 5, 6, 7]), stencil![]),
];

/// Lookup from corner mask to the triangles emitted for that cell.
#[derive(Debug)]
pub struct CaseTable {
    cases: Vec<Vec<EdgeTriangle>>,
}

impl CaseTable {
    fn build() -> Self {
        let rotations = rotations();
        let mut cases: Vec<Option<Vec<EdgeTriangle>>> = vec![None; CASE_COUNT];
        for (base, stencil) in CANONICAL {
            for rotation in &rotations {
                let slot = &mut cases[usize::from(rotation.apply_mask(*base))];
                if slot.is_none() {
                    *slot = Some(stencil.iter().map(|t| t.rotate(rotation)).collect());
                }
            }
        }
        let filled = cases.iter().filter(|c| c.is_some()).count();
        tracing::debug!(rotations = rotations.len(), filled, "built marching cubes table");
        Self {
            cases: cases.into_iter().map(Option::unwrap_or_default).collect(),
        }
    }

    /// Triangles for the given corner mask.
    #[must_use]
    pub fn triangles(&self, mask: CornerMask) -> &[EdgeTriangle] {
        &self.cases[usize::from(mask)]
    }
}

/// The process-wide table, built on first use.
pub static CASE_TABLE: LazyLock<CaseTable> = LazyLock::new(CaseTable::build);
