//! The Voronoi diagram as the dual of a Delaunay tetrahedralization.
//!
//! Every tetrahedron contributes a dual vertex, every interior face a Voronoi edge between the
//! dual vertices of its two tetrahedra, and every Delaunay edge with at least three tetrahedra
//! around it a Voronoi face.

use core::{fmt, str::FromStr};

use nalgebra::Vector3;

use crate::{
    adjacency::AdjacencyIndex,
    error::{CenterWarning, GeometryError},
    periodic::Space,
    utils::{
        linalg::{LinearSolve, centroid, norm_squared, solve_3x3},
        types::{Edge3, EdgeKey, FaceKey, TetIdx, Tetrahedron, Vertex3},
    },
};

/// Largest accepted spread of the squared distances from a circumcenter to its four corners.
pub const VERIFICATION_TOLERANCE: f64 = 1e-5;

/// Which point of a tetrahedron becomes its dual vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum CenterType {
    /// The center of the circumsphere, the true Voronoi vertex.
    #[default]
    Circumcenter,
    /// The mean of the corners. Always inside the tetrahedron, never absent.
    Barycenter,
}

impl FromStr for CenterType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "circumcenter" => Ok(Self::Circumcenter),
            "barycenter" => Ok(Self::Barycenter),
            _ => Err(anyhow::Error::msg(format!("Unknown center type: {s}"))),
        }
    }
}

impl fmt::Display for CenterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circumcenter => write!(f, "circumcenter"),
            Self::Barycenter => write!(f, "barycenter"),
        }
    }
}

/// The dual vertex of one tetrahedron: a position, or absent for a flat tetrahedron, with an
/// optional diagnostic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualVertex {
    position: Option<Vertex3>,
    warning: Option<CenterWarning>,
}

impl DualVertex {
    const fn present(position: Vertex3) -> Self {
        Self {
            position: Some(position),
            warning: None,
        }
    }

    const fn absent(warning: CenterWarning) -> Self {
        Self {
            position: None,
            warning: Some(warning),
        }
    }

    pub const fn position(&self) -> Option<Vertex3> {
        self.position
    }

    pub const fn warning(&self) -> Option<CenterWarning> {
        self.warning
    }

    pub const fn is_absent(&self) -> bool {
        self.position.is_none()
    }
}

/// Circumcenter of `corners`, solved relative to the first corner.
///
/// Absent if the tetrahedron is flat. A center whose distances to the corners disagree by more
/// than [`VERIFICATION_TOLERANCE`] is kept but carries a warning.
pub fn circumcenter<S: Space>(tet_idx: TetIdx, corners: &[Vertex3; 4], space: &S) -> DualVertex {
    let p0 = &corners[0];
    let rows: [Vertex3; 3] = core::array::from_fn(|i| space.difference(p0, &corners[i + 1]));
    let b = rows.map(|row| 0.5 * norm_squared(&row));

    let x = match solve_3x3(&rows, &b) {
        LinearSolve::Unique(x) => x,
        LinearSolve::Singular { determinant } => {
            #[cfg(feature = "logging")]
            log::debug!("Tetrahedron {tet_idx} is flat, no circumcenter");

            return DualVertex::absent(CenterWarning::SingularMatrix {
                tet: tet_idx,
                determinant,
            });
        }
    };

    // squared distances in the frame of the first corner, where it sits at the origin
    let mut min = norm_squared(&x);
    let mut max = min;
    for row in &rows {
        let to_corner: Vertex3 = core::array::from_fn(|i| x[i] - row[i]);
        let d = norm_squared(&to_corner);
        min = min.min(d);
        max = max.max(d);
    }

    let mut vertex = DualVertex::present(space.translate(p0, &x));

    let max_deviation = max - min;
    if max_deviation > VERIFICATION_TOLERANCE {
        #[cfg(feature = "logging")]
        log::warn!(
            "Circumcenter verification failed for tetrahedron {tet_idx}, max squared distance difference {max_deviation:e}"
        );

        vertex.warning = Some(CenterWarning::VerificationFailed {
            tet: tet_idx,
            max_deviation,
        });
    }

    vertex
}

/// Mean of `corners`, averaged over the differences to the first corner.
pub fn barycenter<S: Space>(corners: &[Vertex3; 4], space: &S) -> DualVertex {
    let p0 = &corners[0];
    let offset = centroid(corners.iter().map(|corner| space.difference(p0, corner)));

    DualVertex::present(space.translate(p0, &offset))
}

/// The dual vertex of every tetrahedron, in tetrahedron order.
pub fn dual_vertices<S: Space>(
    tets: &[Tetrahedron],
    points: &[Vertex3],
    center_type: CenterType,
    space: &S,
) -> Vec<DualVertex> {
    let vertices: Vec<DualVertex> = tets
        .iter()
        .enumerate()
        .map(|(tet_idx, tet)| {
            let corners = tet.map(|v_idx| points[v_idx]);
            match center_type {
                CenterType::Circumcenter => circumcenter(tet_idx, &corners, space),
                CenterType::Barycenter => barycenter(&corners, space),
            }
        })
        .collect();

    #[cfg(feature = "logging")]
    {
        let num_warnings = vertices.iter().filter(|v| v.warning().is_some()).count();
        if num_warnings > 0 {
            log::warn!("{num_warnings} of {} dual vertices carry a warning", vertices.len());
        }
    }

    vertices
}

/// The angle of each position around `axis`.
///
/// Positions are measured relative to their centroid, projected onto the plane orthogonal to
/// `axis`. The 0° direction is the projection of the first position, the 90° direction is
/// `axis × 0°`. Angles are in `(-π, π]`, the first position is at `0`.
fn angles_around_axis<S: Space>(positions: &[Vertex3], axis: &Vertex3, space: &S) -> Vec<f64> {
    let Some(origin) = positions.first() else {
        return Vec::new();
    };

    let mean_offset = centroid(positions.iter().map(|p| space.difference(origin, p)));
    let center = space.translate(origin, &mean_offset);

    let axis = Vector3::from(*axis)
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(Vector3::zeros);
    let relative: Vec<Vector3<f64>> = positions
        .iter()
        .map(|p| {
            let r = Vector3::from(space.difference(&center, p));
            r - axis * r.dot(&axis)
        })
        .collect();

    let u = relative[0]
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(Vector3::zeros);
    let v = axis.cross(&u);

    relative.iter().map(|r| r.dot(&v).atan2(r.dot(&u))).collect()
}

/// The order of `positions` counter-clockwise around `axis`, seen from its tip.
///
/// Positions at equal angles keep their relative order.
pub fn sort_around_axis<S: Space>(positions: &[Vertex3], axis: &Vertex3, space: &S) -> Vec<usize> {
    let angles = angles_around_axis(positions, axis, space);

    let mut order: Vec<usize> = (0..positions.len()).collect();
    order.sort_by(|&a, &b| angles[a].total_cmp(&angles[b]));
    order
}

/// A Voronoi edge, dual to an interior Delaunay face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoronoiEdge {
    /// Indices into [`VoronoiDiagram::vertices`].
    pub vertices: [usize; 2],
    pub face: FaceKey,
}

/// A Voronoi face, dual to a Delaunay edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoronoiFace {
    /// Indices into [`VoronoiDiagram::vertices`], in cyclic order around the Delaunay edge.
    pub vertices: Vec<usize>,
    pub edge: EdgeKey,
}

/// Vertices, edges and faces of a Voronoi diagram.
///
/// Absent dual vertices are dropped, and so is everything that would reference them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoronoiDiagram {
    vertices: Vec<Vertex3>,
    vertex_tets: Vec<TetIdx>,
    edges: Vec<VoronoiEdge>,
    faces: Vec<VoronoiFace>,
}

impl VoronoiDiagram {
    /// Builds the diagram from an adjacency index and the dual vertex of every tetrahedron.
    pub fn from_adjacency<S: Space>(
        index: &AdjacencyIndex,
        dual: &[DualVertex],
        points: &[Vertex3],
        space: &S,
    ) -> Self {
        let mut vertices = Vec::with_capacity(dual.len());
        let mut vertex_tets = Vec::with_capacity(dual.len());
        let remap: Vec<Option<usize>> = dual
            .iter()
            .enumerate()
            .map(|(tet_idx, dual_vertex)| {
                dual_vertex.position().map(|position| {
                    vertices.push(position);
                    vertex_tets.push(tet_idx);
                    vertices.len() - 1
                })
            })
            .collect();

        let edges = index
            .interior_faces()
            .filter_map(|(face, [a, b])| {
                Some(VoronoiEdge {
                    vertices: [remap[a]?, remap[b]?],
                    face: *face,
                })
            })
            .collect();

        let faces = index
            .edges()
            .filter(|(_, tets)| tets.len() >= 3)
            .filter_map(|(edge, tets)| {
                let ring: Vec<usize> = tets.iter().filter_map(|&tet_idx| remap[tet_idx]).collect();
                if ring.len() < 3 {
                    return None;
                }

                let positions: Vec<Vertex3> = ring.iter().map(|&v| vertices[v]).collect();
                let axis = space.difference(&points[edge[0]], &points[edge[1]]);
                let order = sort_around_axis(&positions, &axis, space);

                Some(VoronoiFace {
                    vertices: order.into_iter().map(|i| ring[i]).collect(),
                    edge: *edge,
                })
            })
            .collect();

        Self {
            vertices,
            vertex_tets,
            edges,
            faces,
        }
    }

    /// The surviving dual vertex positions.
    pub fn vertices(&self) -> &[Vertex3] {
        &self.vertices
    }

    /// The tetrahedron of each vertex.
    pub fn vertex_tets(&self) -> &[TetIdx] {
        &self.vertex_tets
    }

    pub fn edges(&self) -> &[VoronoiEdge] {
        &self.edges
    }

    pub fn faces(&self) -> &[VoronoiFace] {
        &self.faces
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// The edges as pairs of positions.
    pub fn edge_positions(&self) -> Vec<Edge3> {
        self.edges
            .iter()
            .map(|edge| edge.vertices.map(|v| self.vertices[v]))
            .collect()
    }

    /// The faces as cyclic sequences of positions.
    pub fn face_positions(&self) -> Vec<Vec<Vertex3>> {
        self.faces
            .iter()
            .map(|face| face.vertices.iter().map(|&v| self.vertices[v]).collect())
            .collect()
    }
}

impl fmt::Display for VoronoiDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Voronoi diagram with {} vertices, {} edges and {} faces",
            self.num_vertices(),
            self.num_edges(),
            self.num_faces()
        )
    }
}

/// Builds the Voronoi diagram of `tets` from their dual vertices.
///
/// ## Errors
/// Fails if `tets` share a face between more than two tetrahedra.
pub fn voronoi_dual<S: Space>(
    tets: &[Tetrahedron],
    dual: &[DualVertex],
    points: &[Vertex3],
    space: &S,
) -> Result<VoronoiDiagram, GeometryError> {
    let index = AdjacencyIndex::build(tets)?;
    Ok(VoronoiDiagram::from_adjacency(&index, dual, points, space))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hull::DEFAULT_EPSILON,
        lift::delaunay_tetrahedra,
        periodic::{Euclidean, PeriodicBox},
        utils::linalg::{norm, sub},
    };
    use core::f64::consts::TAU;
    use voronoi3d_test_utils::sample_vertices_3d;

    #[test]
    fn test_circumcenter_is_equidistant() {
        let points = sample_vertices_3d(400, None);

        for chunk in points.chunks_exact(4) {
            let corners = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let vertex = circumcenter(0, &corners, &Euclidean);

            let Some(center) = vertex.position() else {
                continue;
            };
            // random tetrahedra can be slivers with huge circumspheres
            if norm(&center) > 10.0 {
                continue;
            }

            let d = corners.map(|c| norm_squared(&sub(&c, &center)));
            for i in 1..4 {
                assert!((d[0] - d[i]).abs() < 1e-5, "{d:?}");
            }
            assert_eq!(vertex.warning(), None);
        }
    }

    #[test]
    fn test_flat_tetrahedron_is_absent() {
        let corners = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        let vertex = circumcenter(3, &corners, &Euclidean);

        assert!(vertex.is_absent());
        assert!(matches!(
            vertex.warning(),
            Some(CenterWarning::SingularMatrix { tet: 3, .. })
        ));

        // the barycenter is never absent
        assert_eq!(
            barycenter(&corners, &Euclidean).position(),
            Some([0.5, 0.5, 0.0])
        );
    }

    #[test]
    fn test_barycenter_is_mean() {
        let corners = [[1.0, 2.0, 3.0], [-1.0, 0.0, 5.0], [4.0, 4.0, -2.0], [0.0, 2.0, 2.0]];
        let center = barycenter(&corners, &Euclidean).position().unwrap();

        assert!((center[0] - 1.0).abs() < 1e-12);
        assert!((center[1] - 2.0).abs() < 1e-12);
        assert!((center[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_periodic_circumcenter_across_boundary() {
        let periodic_box = PeriodicBox::cube(0.0, 1.0).unwrap();
        // the unit corner tetrahedron at the origin, with one corner wrapped across x = 1
        let corners = [[0.95, 0.0, 0.0], [0.05, 0.0, 0.0], [0.95, 0.1, 0.0], [0.95, 0.0, 0.1]];
        let center = circumcenter(0, &corners, &periodic_box).position().unwrap();

        assert!((center[0] - 1.0).abs() < 1e-12);
        assert!((center[1] - 0.05).abs() < 1e-12);
        assert!((center[2] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_sort_around_axis() {
        let n = 7;
        let ring: Vec<Vertex3> = (0..n)
            .map(|i| {
                let angle = TAU * i as f64 / n as f64;
                [angle.cos(), angle.sin(), 0.3]
            })
            .collect();
        // shuffled, starting at position 3
        let shuffled: Vec<Vertex3> = [3, 0, 5, 1, 6, 2, 4].iter().map(|&i| ring[i]).collect();

        let order = sort_around_axis(&shuffled, &[0.0, 0.0, 1.0], &Euclidean);
        let sorted: Vec<Vertex3> = order.iter().map(|&i| shuffled[i]).collect();

        // counter-clockwise around +z, ring[0] lies opposite of the first position at -6π/7
        assert_eq!(sorted, ring);
    }

    #[test]
    fn test_face_angles_cover_full_turn() {
        let points = sample_vertices_3d(200, None);
        let tets = delaunay_tetrahedra(&points, DEFAULT_EPSILON).unwrap();
        let dual = dual_vertices(&tets, &points, CenterType::Circumcenter, &Euclidean);
        let diagram = voronoi_dual(&tets, &dual, &points, &Euclidean).unwrap();

        assert!(diagram.num_faces() > 0);

        for face in diagram.faces() {
            assert!(face.vertices.len() >= 3);

            let positions: Vec<Vertex3> =
                face.vertices.iter().map(|&v| diagram.vertices()[v]).collect();
            let axis = sub(&points[face.edge[1]], &points[face.edge[0]]);
            // measured from the first vertex of the sorted face, turned into [0, 2π)
            let angles: Vec<f64> = angles_around_axis(&positions, &axis, &Euclidean)
                .into_iter()
                .map(|a| if a < -1e-12 { a + TAU } else { a.max(0.0) })
                .collect();

            let mut total = 0.0;
            for pair in angles.windows(2) {
                assert!(pair[1] - pair[0] >= 0.0, "{angles:?}");
                total += pair[1] - pair[0];
            }
            total += TAU - angles[angles.len() - 1];

            assert!(angles[0] < 1e-9);
            assert!((total - TAU).abs() < 1e-9);
        }
    }

    /// Angles around the centroid in the plane orthogonal to `axis`, in a fixed basis of that plane.
    fn plane_angles(positions: &[Vertex3], axis: &Vertex3) -> Vec<f64> {
        let axis = Vector3::from(*axis).normalize();
        let helper = if axis.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = axis.cross(&helper).normalize();
        let v = axis.cross(&u);

        let center = Vector3::from(centroid(positions.iter().copied()));
        positions
            .iter()
            .map(|p| {
                let r = Vector3::from(*p) - center;
                r.dot(&v).atan2(r.dot(&u))
            })
            .collect()
    }

    #[test]
    fn test_faces_turn_once_around_edge() {
        for center_type in [CenterType::Barycenter, CenterType::Circumcenter] {
            let points = sample_vertices_3d(300, None);
            let tets = delaunay_tetrahedra(&points, DEFAULT_EPSILON).unwrap();
            let dual = dual_vertices(&tets, &points, center_type, &Euclidean);
            let diagram = voronoi_dual(&tets, &dual, &points, &Euclidean).unwrap();

            for face in diagram.faces() {
                let positions: Vec<Vertex3> =
                    face.vertices.iter().map(|&v| diagram.vertices()[v]).collect();
                let axis = sub(&points[face.edge[1]], &points[face.edge[0]]);
                let angles = plane_angles(&positions, &axis);

                // counter-clockwise steps, cyclically, add up to exactly one turn
                let total: f64 = (0..angles.len())
                    .map(|i| {
                        let step = (angles[(i + 1) % angles.len()] - angles[i]).rem_euclid(TAU);
                        if step > TAU - 1e-9 { 0.0 } else { step }
                    })
                    .sum();
                assert!((total - TAU).abs() < 1e-6, "{center_type}: {angles:?}");
            }
        }
    }

    #[test]
    fn test_edges_need_both_vertices() {
        // two tetrahedra sharing the face (1, 2, 3), the second one flat
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.5, 0.5, 0.0],
        ];
        let tets = [[0, 1, 2, 3], [4, 1, 2, 3]];

        let dual = dual_vertices(&tets, &points, CenterType::Circumcenter, &Euclidean);
        assert!(!dual[0].is_absent());
        assert!(dual[1].is_absent());

        let diagram = voronoi_dual(&tets, &dual, &points, &Euclidean).unwrap();
        assert_eq!(diagram.num_vertices(), 1);
        assert_eq!(diagram.vertex_tets(), &[0]);
        assert_eq!(diagram.num_edges(), 0);

        let dual = dual_vertices(&tets, &points, CenterType::Barycenter, &Euclidean);
        let diagram = voronoi_dual(&tets, &dual, &points, &Euclidean).unwrap();
        assert_eq!(diagram.num_edges(), 1);
        assert_eq!(diagram.edges()[0].face, [1, 2, 3]);
        assert_eq!(diagram.edge_positions().len(), 1);
    }

    #[test]
    fn test_center_type_from_str() {
        assert_eq!("Barycenter".parse::<CenterType>().unwrap(), CenterType::Barycenter);
        assert_eq!("circumcenter".parse::<CenterType>().unwrap(), CenterType::Circumcenter);
        assert!("incenter".parse::<CenterType>().is_err());
        assert_eq!(CenterType::default().to_string(), "circumcenter");
    }
}
