use crate::utils::{
    linalg::{dot, hyperplane_normal, norm, sub},
    types::{FacetIdx, VertexIdx},
};

/// Oriented hyperplane `normal . x + offset = 0` with a unit normal.
///
/// Points strictly inside the hull evaluate negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane<const D: usize> {
    pub normal: [f64; D],
    pub offset: f64,
}

impl<const D: usize> Plane<D> {
    /// Plane through the points `vertices`, in that order.
    ///
    /// The normal is the generalized cross product of `v_i - v_0`, so its direction encodes the
    /// winding of `vertices`. A degenerate vertex set yields a zero normal, and every point then
    /// has signed distance `0`.
    pub fn through(points: &[[f64; D]], vertices: &[VertexIdx; D]) -> Self {
        let p0 = &points[vertices[0]];
        let rows: Vec<[f64; D]> = vertices[1..]
            .iter()
            .map(|&v_idx| sub(&points[v_idx], p0))
            .collect();

        let raw = hyperplane_normal(&rows);
        let len = norm(&raw);
        let normal = if len > 0.0 { raw.map(|x| x / len) } else { raw };

        Self {
            normal,
            offset: -dot(&normal, p0),
        }
    }

    #[inline]
    pub fn signed_distance(&self, p: &[f64; D]) -> f64 {
        dot(&self.normal, p) + self.offset
    }
}

/// A hull facet in the arena.
///
/// Ridge `k` is the facet without `vertices[k]`, and `neighbors[k]` is the facet across it.
#[derive(Debug, Clone)]
pub(crate) struct Facet<const D: usize> {
    pub vertices: [VertexIdx; D],
    pub neighbors: [Option<FacetIdx>; D],
    pub plane: Plane<D>,
    pub alive: bool,
    /// Apex stamp of the last horizon search that tested this facet.
    pub visit: usize,
    pub visible: bool,
}

impl<const D: usize> Facet<D> {
    /// Creates a facet facing away from `interior`.
    ///
    /// If the given winding faces inwards, the first two vertices (and their ridges) are swapped.
    pub fn new(
        mut vertices: [VertexIdx; D],
        mut neighbors: [Option<FacetIdx>; D],
        points: &[[f64; D]],
        interior: &[f64; D],
    ) -> Self {
        let mut plane = Plane::through(points, &vertices);

        if plane.signed_distance(interior) > 0.0 {
            vertices.swap(0, 1);
            neighbors.swap(0, 1);
            plane = Plane::through(points, &vertices);
        }

        Self {
            vertices,
            neighbors,
            plane,
            alive: true,
            visit: 0,
            visible: false,
        }
    }

    /// Sorted vertex indices of ridge `slot`, padded with `usize::MAX` in the last position.
    pub fn ridge_key(&self, slot: usize) -> [VertexIdx; D] {
        let mut key = self.vertices;
        key[slot] = usize::MAX;
        key.sort_unstable();
        key
    }

    pub fn slot_of(&self, v_idx: VertexIdx) -> Option<usize> {
        self.vertices.iter().position(|&v| v == v_idx)
    }

    pub fn neighbor_slot(&self, facet: FacetIdx) -> Option<usize> {
        self.neighbors.iter().position(|&n| n == Some(facet))
    }
}
