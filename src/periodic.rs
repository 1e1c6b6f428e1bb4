//! Euclidean and periodic metric spaces for the dual construction, and periodic ghosting.

use crate::{
    error::GeometryError,
    utils::{linalg::sub, types::Vertex3},
};

/// How difference vectors between two points are measured.
pub trait Space {
    /// The vector from `a` to `b`.
    fn difference(&self, a: &Vertex3, b: &Vertex3) -> Vertex3;

    /// `origin` displaced by `offset`.
    fn translate(&self, origin: &Vertex3, offset: &Vertex3) -> Vertex3 {
        core::array::from_fn(|i| origin[i] + offset[i])
    }
}

/// Plain `R³`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl Space for Euclidean {
    #[inline]
    fn difference(&self, a: &Vertex3, b: &Vertex3) -> Vertex3 {
        sub(b, a)
    }
}

/// An axis-aligned box with periodic boundaries, i.e. a flat 3-torus.
///
/// Differences follow the minimum-image convention: each component is wrapped into
/// `[-size / 2, size / 2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct PeriodicBox {
    pub(crate) min: Vertex3,
    pub(crate) max: Vertex3,
}

impl PeriodicBox {
    /// Number of periodic images of every point.
    pub const NUM_IMAGES: usize = 26;

    /// ## Errors
    /// Fails unless `min < max` on every axis with a finite extent.
    pub fn new(min: Vertex3, max: Vertex3) -> Result<Self, GeometryError> {
        let periodic_box = Self { min, max };
        periodic_box.validate()?;
        Ok(periodic_box)
    }

    /// The cube `[lo, hi]³`.
    pub fn cube(lo: f64, hi: f64) -> Result<Self, GeometryError> {
        Self::new([lo; 3], [hi; 3])
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        let valid = (0..3).all(|i| {
            (self.max[i] - self.min[i]).is_finite() && self.min[i] < self.max[i]
        });

        if valid {
            Ok(())
        } else {
            Err(GeometryError::InvalidPeriodicBox {
                min: self.min,
                max: self.max,
            })
        }
    }

    pub const fn min(&self) -> &Vertex3 {
        &self.min
    }

    pub const fn max(&self) -> &Vertex3 {
        &self.max
    }

    pub fn size(&self) -> Vertex3 {
        sub(&self.max, &self.min)
    }

    /// The 26 translation vectors `size * (i, j, k)` with `i, j, k ∈ {-1, 0, 1}`, not all zero, in
    /// lexicographic order of `(i, j, k)`.
    pub fn image_offsets(&self) -> Vec<Vertex3> {
        let size = self.size();
        let mut offsets = Vec::with_capacity(Self::NUM_IMAGES);

        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    if (i, j, k) == (0, 0, 0) {
                        continue;
                    }
                    offsets.push([
                        f64::from(i) * size[0],
                        f64::from(j) * size[1],
                        f64::from(k) * size[2],
                    ]);
                }
            }
        }

        offsets
    }

    /// The points followed by their 26 images.
    ///
    /// Image `k` of point `i` ends up at index `n * (k + 1) + i`, so the first `n` indices are
    /// exactly the input points.
    pub fn ghost_points(&self, points: &[Vertex3]) -> Vec<Vertex3> {
        let mut ghosted = Vec::with_capacity(points.len() * (Self::NUM_IMAGES + 1));
        ghosted.extend_from_slice(points);

        for offset in self.image_offsets() {
            ghosted.extend(points.iter().map(|p| Euclidean.translate(p, &offset)));
        }

        ghosted
    }

    /// Wraps a difference vector to its shortest periodic representative.
    pub fn minimum_image(&self, d: &Vertex3) -> Vertex3 {
        let size = self.size();
        core::array::from_fn(|i| d[i] - size[i] * (d[i] / size[i]).round())
    }
}

impl Space for PeriodicBox {
    #[inline]
    fn difference(&self, a: &Vertex3, b: &Vertex3) -> Vertex3 {
        self.minimum_image(&sub(b, a))
    }
}
