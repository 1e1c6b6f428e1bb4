use crate::utils::types::{FacetIdx, VertexIdx};

/// A point assigned to a facet it lies strictly outside of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Conflict {
    pub point: VertexIdx,
    pub distance: f64,
}

/// Outside sets of all facets during hull construction.
///
/// Every point is owned by at most one facet. Each point remembers its owner and its slot in the
/// owner's list, so removing a single point is a swap with the last entry.
#[derive(Debug, Default)]
pub(crate) struct OutsideSets {
    lists: Vec<Vec<Conflict>>,
    owner: Vec<Option<FacetIdx>>,
    slot: Vec<usize>,
}

impl OutsideSets {
    pub fn new(num_points: usize) -> Self {
        Self {
            lists: Vec::new(),
            owner: vec![None; num_points],
            slot: vec![0; num_points],
        }
    }

    fn list_mut(&mut self, facet: FacetIdx) -> &mut Vec<Conflict> {
        if facet >= self.lists.len() {
            self.lists.resize_with(facet + 1, Vec::new);
        }
        &mut self.lists[facet]
    }

    pub fn insert(&mut self, facet: FacetIdx, point: VertexIdx, distance: f64) {
        debug_assert!(self.owner[point].is_none());

        let list = self.list_mut(facet);
        let slot = list.len();
        list.push(Conflict { point, distance });

        self.owner[point] = Some(facet);
        self.slot[point] = slot;
    }

    /// Removes `point` from the set of its owner.
    pub fn remove(&mut self, point: VertexIdx) -> Option<Conflict> {
        let facet = self.owner[point].take()?;
        let slot = self.slot[point];

        let list = &mut self.lists[facet];
        let conflict = list.swap_remove(slot);
        if let Some(moved) = list.get(slot) {
            self.slot[moved.point] = slot;
        }

        Some(conflict)
    }

    /// Empties the set of `facet`, releasing ownership of its points.
    pub fn take_all(&mut self, facet: FacetIdx) -> Vec<Conflict> {
        let Some(list) = self.lists.get_mut(facet) else {
            return Vec::new();
        };

        let conflicts = core::mem::take(list);
        for conflict in &conflicts {
            self.owner[conflict.point] = None;
        }
        conflicts
    }

    /// The point farthest from `facet`. Ties go to the earlier entry.
    pub fn farthest(&self, facet: FacetIdx) -> Option<Conflict> {
        self.lists
            .get(facet)?
            .iter()
            .fold(None, |best: Option<Conflict>, &c| match best {
                Some(b) if b.distance >= c.distance => Some(b),
                _ => Some(c),
            })
    }

    pub fn is_empty(&self, facet: FacetIdx) -> bool {
        self.lists.get(facet).is_none_or(Vec::is_empty)
    }

    pub fn owner(&self, point: VertexIdx) -> Option<FacetIdx> {
        self.owner[point]
    }
}
