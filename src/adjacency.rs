//! Face and edge incidence of a tetrahedralization.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::GeometryError,
    utils::types::{EdgeKey, FaceKey, TetIdx, Tetrahedron},
};

/// For each face within a tetrahedron, the positions of its vertices.
const FACE_SUBINDICES: [[usize; 3]; 4] = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];

/// For each edge within a tetrahedron, the positions of its vertices.
const EDGE_SUBINDICES: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// Canonical key of a face, the ascending vertex indices.
pub fn face_key(tet: &Tetrahedron, face: usize) -> FaceKey {
    let mut key = FACE_SUBINDICES[face].map(|i| tet[i]);
    key.sort_unstable();
    key
}

/// Canonical key of an edge, the ascending vertex indices.
pub fn edge_key(tet: &Tetrahedron, edge: usize) -> EdgeKey {
    let [i, j] = EDGE_SUBINDICES[edge];
    let (a, b) = (tet[i], tet[j]);
    if a < b { [a, b] } else { [b, a] }
}

/// Maps every face and every edge of a tetrahedralization to the tetrahedra containing it.
///
/// Incident tetrahedra are listed in ascending index order. Keys iterate in ascending order, so
/// everything derived from the index is deterministic.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    faces: BTreeMap<FaceKey, Vec<TetIdx>>,
    edges: BTreeMap<EdgeKey, Vec<TetIdx>>,
}

impl AdjacencyIndex {
    /// Builds the index.
    ///
    /// ## Errors
    /// Returns an internal-consistency error if a face is shared by more than two tetrahedra,
    /// which no valid tetrahedralization has.
    pub fn build(tets: &[Tetrahedron]) -> Result<Self, GeometryError> {
        let mut faces: BTreeMap<FaceKey, Vec<TetIdx>> = BTreeMap::new();
        let mut edges: BTreeMap<EdgeKey, Vec<TetIdx>> = BTreeMap::new();

        for (tet_idx, tet) in tets.iter().enumerate() {
            for face in 0..4 {
                faces.entry(face_key(tet, face)).or_default().push(tet_idx);
            }
            for edge in 0..6 {
                edges.entry(edge_key(tet, edge)).or_default().push(tet_idx);
            }
        }

        if let Some((key, incident)) = faces
            .iter()
            .find(|(_, incident)| incident.is_empty() || incident.len() > 2)
        {
            #[cfg(feature = "logging")]
            log::error!("Face {key:?} is shared by tetrahedra {incident:?}");

            return Err(GeometryError::NonManifoldFace {
                key: *key,
                count: incident.len(),
            });
        }

        Ok(Self { faces, edges })
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// All faces with their one or two tetrahedra.
    pub fn faces(&self) -> impl Iterator<Item = (&FaceKey, &[TetIdx])> + '_ {
        self.faces.iter().map(|(key, tets)| (key, tets.as_slice()))
    }

    /// All edges with the tetrahedra around them.
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &[TetIdx])> + '_ {
        self.edges.iter().map(|(key, tets)| (key, tets.as_slice()))
    }

    /// Faces shared by two tetrahedra.
    pub fn interior_faces(&self) -> impl Iterator<Item = (&FaceKey, [TetIdx; 2])> + '_ {
        self.faces().filter_map(|(key, tets)| match *tets {
            [a, b] => Some((key, [a, b])),
            _ => None,
        })
    }

    /// Faces on the boundary of the tetrahedralization's hull.
    pub fn boundary_faces(&self) -> impl Iterator<Item = (&FaceKey, TetIdx)> + '_ {
        self.faces().filter_map(|(key, tets)| match *tets {
            [a] => Some((key, a)),
            _ => None,
        })
    }

    /// The tetrahedra sharing `key`, in any vertex order.
    pub fn tets_sharing_face(&self, key: &FaceKey) -> &[TetIdx] {
        let mut key = *key;
        key.sort_unstable();
        self.faces.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// The tetrahedra around `key`, in any vertex order.
    pub fn tets_around_edge(&self, key: &EdgeKey) -> &[TetIdx] {
        let mut key = *key;
        key.sort_unstable();
        self.edges.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// The unique Delaunay edges, ascending.
    pub fn delaunay_edges(&self) -> BTreeSet<EdgeKey> {
        self.edges.keys().copied().collect()
    }
}

/// The unique edges of `tets` as ascending index pairs.
///
/// ```
/// use voronoi3d::adjacency::delaunay_edges;
///
/// let edges = delaunay_edges(&[[0, 1, 2, 3], [1, 2, 3, 4]]);
/// assert_eq!(edges.len(), 9);
/// assert!(edges.contains(&[1, 4]));
/// assert!(!edges.contains(&[0, 4]));
/// ```
pub fn delaunay_edges(tets: &[Tetrahedron]) -> BTreeSet<EdgeKey> {
    tets.iter()
        .flat_map(|tet| (0..6).map(move |edge| edge_key(tet, edge)))
        .collect()
}
