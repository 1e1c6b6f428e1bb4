use core::fmt;

use crate::utils::types::VertexIdx;

use super::{convex_hull::ConvexHull, facet_iterator::FacetIterator};

/// A ridge seen from one of its two facets.
#[derive(Copy, Clone)]
pub struct RidgeIterator<'a, const D: usize> {
    pub(crate) hull: &'a ConvexHull<D>,
    pub(crate) facet_idx: usize,
    pub(crate) slot: usize,
}

impl<'a, const D: usize> RidgeIterator<'a, D> {
    pub(crate) const fn new(hull: &'a ConvexHull<D>, facet_idx: usize, slot: usize) -> Self {
        Self {
            hull,
            facet_idx,
            slot,
        }
    }

    /// The position of the node of the facet that is not on this ridge.
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// The `D - 1` vertex indices of the ridge, in facet order.
    pub fn nodes(&self) -> Vec<VertexIdx> {
        let vertices = &self.hull.facets[self.facet_idx].vertices;
        vertices
            .iter()
            .enumerate()
            .filter(|&(slot, _)| slot != self.slot)
            .map(|(_, &v_idx)| v_idx)
            .collect()
    }

    /// Get the node of the facet that is not part of the ridge.
    pub fn opposite_node(&self) -> VertexIdx {
        self.hull.facets[self.facet_idx].vertices[self.slot]
    }

    pub const fn facet(&self) -> FacetIterator<'a, D> {
        FacetIterator::new(self.hull, self.facet_idx)
    }

    /// The facet on the other side, `None` for a boundary ridge.
    pub fn neighbor(&self) -> Option<FacetIterator<'a, D>> {
        self.hull.facets[self.facet_idx].neighbors[self.slot]
            .and_then(|n_idx| self.hull.get_facet(n_idx))
    }

    /// The same ridge seen from the neighboring facet.
    pub fn opposite(&self) -> Option<RidgeIterator<'a, D>> {
        let neighbor = self.neighbor()?;
        let slot = self.hull.facets[neighbor.idx()].neighbor_slot(self.facet_idx)?;

        Some(RidgeIterator::new(self.hull, neighbor.idx(), slot))
    }

    /// The neighbor links back across a ridge with the same nodes.
    pub fn is_sound(&self) -> bool {
        let Some(opposite) = self.opposite() else {
            #[cfg(feature = "logging")]
            log::error!("{self}: neighbor does not link back");
            return false;
        };

        let facet = &self.hull.facets[self.facet_idx];
        let other = &self.hull.facets[opposite.facet_idx];
        if facet.ridge_key(self.slot) != other.ridge_key(opposite.slot) {
            #[cfg(feature = "logging")]
            log::error!("{self}: wrong opposite ridge {opposite}");
            return false;
        }

        true
    }
}

impl<const D: usize> fmt::Display for RidgeIterator<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ridge {} of facet {}: {:?}",
            self.slot,
            self.facet_idx,
            self.nodes()
        )
    }
}
