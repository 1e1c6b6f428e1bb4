use core::fmt;

use crate::utils::types::{FacetIdx, VertexIdx};

use super::{convex_hull::ConvexHull, facet::Plane, ridge_iterator::RidgeIterator};

#[derive(Copy, Clone)]
pub struct FacetIterator<'a, const D: usize> {
    pub(crate) hull: &'a ConvexHull<D>,
    pub(crate) facet_idx: FacetIdx,
}

impl<'a, const D: usize> FacetIterator<'a, D> {
    pub(crate) const fn new(hull: &'a ConvexHull<D>, facet_idx: FacetIdx) -> Self {
        Self { hull, facet_idx }
    }

    pub const fn idx(&self) -> FacetIdx {
        self.facet_idx
    }

    /// Vertex indices in outward winding order.
    pub fn nodes(&self) -> [VertexIdx; D] {
        self.hull.facets[self.facet_idx].vertices
    }

    pub fn plane(&self) -> Plane<D> {
        self.hull.facets[self.facet_idx].plane
    }

    /// Ridge `k` is the facet without its `k`-th node.
    pub fn ridges(&self) -> [RidgeIterator<'a, D>; D] {
        core::array::from_fn(|slot| RidgeIterator::new(self.hull, self.facet_idx, slot))
    }

    /// The facets across the ridges, `None` where the hull has been cut open.
    pub fn neighbors(&self) -> [Option<FacetIterator<'a, D>>; D] {
        self.ridges().map(|ridge| ridge.neighbor())
    }

    /// A lower facet has an outward normal pointing downwards in the last coordinate.
    pub fn is_lower(&self) -> bool {
        self.plane().normal[D - 1] <= 0.0
    }
}

impl<const D: usize> fmt::Display for FacetIterator<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Facet {}: {:?}", self.facet_idx, self.nodes())
    }
}
