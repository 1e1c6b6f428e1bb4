use crate::{
    adjacency::AdjacencyIndex,
    error::{CenterWarning, GeometryError},
    hull::DEFAULT_EPSILON,
    lift::DelaunayLift,
    periodic::{Euclidean, PeriodicBox},
    predicates::{in_circumsphere, orient_3d},
    utils::{
        linalg::{norm_squared, orientation_3d},
        types::{EdgeKey, TetIdx, Tetrahedron, Tetrahedron3, Vertex3},
    },
    voronoi::{CenterType, DualVertex, VoronoiDiagram, dual_vertices},
};
use anyhow::{Context, Result as HowResult};
#[cfg(feature = "logging")]
use log::error;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// How a [`Tetrahedralization`] is built.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Options {
    /// Which point of each tetrahedron becomes its dual vertex.
    pub center_type: CenterType,
    /// Makes the point set periodic in this box. The Delaunay tetrahedra are computed with 26
    /// images of every point in place, and dual vertices use minimum-image differences.
    pub periodic: Option<PeriodicBox>,
    /// Visibility tolerance of the hull, [`DEFAULT_EPSILON`] if `None`.
    ///
    /// Points closer than this to the circumsphere of a tetrahedron may end up on either side of
    /// it, so a large epsilon trades exactness for robustness on near-cospherical input.
    pub epsilon: Option<f64>,
}

impl Options {
    pub const fn with_center_type(mut self, center_type: CenterType) -> Self {
        self.center_type = center_type;
        self
    }

    pub const fn with_periodic(mut self, periodic_box: PeriodicBox) -> Self {
        self.periodic = Some(periodic_box);
        self
    }

    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon.unwrap_or(DEFAULT_EPSILON)
    }
}

/// Counts of a [`Tetrahedralization`] and its Voronoi diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub point_count: usize,
    pub tetrahedra_count: usize,
    pub voronoi_vertex_count: usize,
    pub voronoi_edge_count: usize,
    /// Number of distinct triangular faces of the tetrahedra.
    pub face_count: usize,
}

/// A 3D Delaunay tetrahedralization with one dual vertex per tetrahedron.
///
/// ```
/// use voronoi3d::{Tetrahedralization, tetrahedralization::Options};
///
/// let points = [
///     [0.0, 0.0, -2.0],
///     [-0.5, 1.0, 0.5],
///     [0.0, 2.5, 2.5],
///     [2.0, 3.0, 5.0],
///     [4.0, 2.5, 9.5],
///     [1.0, 1.5, 6.5],
///     [4.5, 0.5, 5.0],
///     [2.5, -0.5, 2.0],
///     [1.5, 1.5, 3.0],
///     [3.0, 1.0, 4.0],
/// ];
///
/// let tetrahedralization = Tetrahedralization::build(&points, Options::default()).unwrap();
/// assert!(tetrahedralization.is_sound());
/// assert_eq!(tetrahedralization.dual_vertices().len(), tetrahedralization.num_tets());
///
/// let voronoi = tetrahedralization.voronoi();
/// assert!(voronoi.faces().iter().all(|face| face.vertices.len() >= 3));
/// ```
#[derive(Debug, Clone)]
pub struct Tetrahedralization {
    options: Options,
    vertices: Vec<Vertex3>,
    tets: Vec<Tetrahedron>,
    dual: Vec<DualVertex>,
    adjacency: AdjacencyIndex,

    #[cfg(feature = "timing")]
    time_hull: u128,
    #[cfg(feature = "timing")]
    time_adjacency: u128,
    #[cfg(feature = "timing")]
    time_dual: u128,
}

/// Build a [`Tetrahedralization`] from points, optionally with epsilon, a periodic box or a center
/// type. Evaluates to the `anyhow::Result` of [`Tetrahedralization::build`].
///
/// ## Example
/// ```
/// # use voronoi3d::{tetrahedralization, periodic::PeriodicBox, voronoi::CenterType};
/// let points = [[0.0, 9.9, 4.2], [6.9, 12.3, 3.8], [5.2, 3.33, 1.92], [1.0, 2.0, 8.5]];
///
/// tetrahedralization!(&points).unwrap();
/// // with epsilon
/// tetrahedralization!(&points, epsilon = 1e-9).unwrap();
/// // with barycenters as dual vertices
/// tetrahedralization!(&points, center = CenterType::Barycenter).unwrap();
/// // in a periodic box
/// tetrahedralization!(&points, periodic = PeriodicBox::cube(0.0, 20.0).unwrap()).unwrap();
/// ```
#[macro_export]
macro_rules! tetrahedralization {
    ($points:expr) => {{
        $crate::Tetrahedralization::build($points, $crate::tetrahedralization::Options::default())
    }};
    ($points:expr, epsilon = $epsilon:expr) => {{
        let options = $crate::tetrahedralization::Options::default().with_epsilon($epsilon);
        $crate::Tetrahedralization::build($points, options)
    }};
    ($points:expr, periodic = $periodic:expr) => {{
        let options = $crate::tetrahedralization::Options::default().with_periodic($periodic);
        $crate::Tetrahedralization::build($points, options)
    }};
    ($points:expr, center = $center:expr) => {{
        let options = $crate::tetrahedralization::Options::default().with_center_type($center);
        $crate::Tetrahedralization::build($points, options)
    }};
}

impl Tetrahedralization {
    /// Computes the Delaunay tetrahedra of `points` and their dual vertices.
    ///
    /// Tetrahedra index into `points` and are positively oriented. With a periodic box, only
    /// tetrahedra between the original points are kept.
    ///
    /// ## Errors
    /// Fails with a [`GeometryError`] (wrapped with context, recoverable via `downcast_ref`) if the
    /// input is degenerate, i.e. fewer than 4 points, all points coplanar, a non-finite coordinate
    /// or an invalid periodic box, or if a computed structure is inconsistent.
    pub fn build(points: &[Vertex3], options: Options) -> HowResult<Self> {
        if let Some(idx) = points.iter().position(|p| !norm_squared(p).is_finite()) {
            return Err(GeometryError::NonFinitePoint { idx }).context("Invalid input point");
        }
        let epsilon = options.epsilon();
        anyhow::ensure!(
            epsilon.is_finite() && epsilon >= 0.0,
            "Epsilon must be finite and non-negative, got {epsilon}"
        );

        #[cfg(feature = "timing")]
        let now = std::time::Instant::now();

        let tets = match &options.periodic {
            Some(periodic_box) => {
                periodic_box.validate().context("Invalid periodic box")?;
                let ghosted = periodic_box.ghost_points(points);

                #[cfg(feature = "logging")]
                log::debug!(
                    "Ghosted {} points into {} periodic images",
                    points.len(),
                    ghosted.len()
                );

                DelaunayLift::new(&ghosted, points.len()).tetrahedralize(&ghosted, epsilon)
            }
            None => DelaunayLift::new(points, points.len()).tetrahedralize(points, epsilon),
        }
        .context("Failed to compute the Delaunay tetrahedra")?;

        #[cfg(feature = "timing")]
        let time_hull = now.elapsed().as_micros();
        #[cfg(feature = "log_timing")]
        log::trace!("Delaunay tetrahedra computed in {time_hull} μs");

        #[cfg(feature = "timing")]
        let now = std::time::Instant::now();

        let adjacency = AdjacencyIndex::build(&tets).context("Tetrahedra do not form a manifold")?;

        #[cfg(feature = "timing")]
        let time_adjacency = now.elapsed().as_micros();
        #[cfg(feature = "log_timing")]
        log::trace!("Adjacency computed in {time_adjacency} μs");

        #[cfg(feature = "timing")]
        let now = std::time::Instant::now();

        let dual = match &options.periodic {
            Some(periodic_box) => dual_vertices(&tets, points, options.center_type, periodic_box),
            None => dual_vertices(&tets, points, options.center_type, &Euclidean),
        };

        #[cfg(feature = "timing")]
        let time_dual = now.elapsed().as_micros();
        #[cfg(feature = "log_timing")]
        log::trace!("Dual vertices computed in {time_dual} μs");

        #[cfg(feature = "logging")]
        log::debug!(
            "Tetrahedralized {} points into {} tetrahedra",
            points.len(),
            tets.len()
        );

        Ok(Self {
            options,
            vertices: points.to_vec(),
            tets,
            dual,
            adjacency,
            #[cfg(feature = "timing")]
            time_hull,
            #[cfg(feature = "timing")]
            time_adjacency,
            #[cfg(feature = "timing")]
            time_dual,
        })
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub fn num_tets(&self) -> usize {
        self.tets.len()
    }

    /// The tetrahedra as indices into [`Self::vertices`].
    pub fn tets(&self) -> &[Tetrahedron] {
        &self.tets
    }

    /// Get the tetrahedra of the tetrahedralization as `Tetrahedron3`, i.e `[[f64; 3]; 4]`.
    pub fn tets_as_vertices(&self) -> Vec<Tetrahedron3> {
        self.tets
            .iter()
            .map(|tet| tet.map(|v_idx| self.vertices[v_idx]))
            .collect()
    }

    pub fn vertices(&self) -> &[Vertex3] {
        &self.vertices
    }

    /// The dual vertex of every tetrahedron, in tetrahedron order.
    pub fn dual_vertices(&self) -> &[DualVertex] {
        &self.dual
    }

    /// Diagnostics of the dual vertices that are absent or imprecise.
    pub fn warnings(&self) -> impl Iterator<Item = CenterWarning> + '_ {
        self.dual.iter().filter_map(DualVertex::warning)
    }

    pub const fn adjacency(&self) -> &AdjacencyIndex {
        &self.adjacency
    }

    /// The unique Delaunay edges as ascending index pairs.
    pub fn delaunay_edges(&self) -> BTreeSet<EdgeKey> {
        self.adjacency.delaunay_edges()
    }

    /// The Voronoi diagram dual to the tetrahedra.
    pub fn voronoi(&self) -> VoronoiDiagram {
        #[cfg(feature = "log_timing")]
        let now = std::time::Instant::now();

        let diagram = match &self.options.periodic {
            Some(periodic_box) => {
                VoronoiDiagram::from_adjacency(&self.adjacency, &self.dual, &self.vertices, periodic_box)
            }
            None => VoronoiDiagram::from_adjacency(&self.adjacency, &self.dual, &self.vertices, &Euclidean),
        };

        #[cfg(feature = "log_timing")]
        log::trace!("Voronoi diagram computed in {} μs", now.elapsed().as_micros());

        diagram
    }

    pub fn stats(&self) -> Stats {
        let voronoi = self.voronoi();

        Stats {
            point_count: self.vertices.len(),
            tetrahedra_count: self.tets.len(),
            voronoi_vertex_count: voronoi.num_vertices(),
            voronoi_edge_count: voronoi.num_edges(),
            face_count: self.adjacency.num_faces(),
        }
    }

    /// Total volume of the tetrahedra.
    pub fn volume(&self) -> f64 {
        self.tets
            .iter()
            .map(|&[a, b, c, d]| {
                let [a, b, c, d] = [a, b, c, d].map(|v_idx| &self.vertices[v_idx]);
                orientation_3d(a, b, c, d) / 6.0
            })
            .sum()
    }

    #[cfg(feature = "timing")]
    pub const fn time_hull(&self) -> u128 {
        self.time_hull
    }

    #[cfg(feature = "timing")]
    pub const fn time_adjacency(&self) -> u128 {
        self.time_adjacency
    }

    #[cfg(feature = "timing")]
    pub const fn time_dual(&self) -> u128 {
        self.time_dual
    }

    fn is_tet_flat(&self, tet_idx: TetIdx) -> bool {
        let [a, b, c, d] = self.tets[tet_idx].map(|v_idx| &self.vertices[v_idx]);
        orient_3d(a, b, c, d) == 0.0
    }

    /// Whether tetrahedron `tet_idx` is flat or has a point strictly inside its circumsphere.
    fn is_tet_violated(&self, tet_idx: TetIdx) -> bool {
        if self.is_tet_flat(tet_idx) {
            #[cfg(feature = "logging")]
            error!("Flat tetrahedron {tet_idx}: {:?}", self.tets[tet_idx]);
            return true;
        }

        let tet = &self.tets[tet_idx];
        let corners = tet.map(|v_idx| self.vertices[v_idx]);

        // NOTE: skip the corners themselves, SOS may count a point on the sphere as inside
        let violation = (0..self.vertices.len())
            .filter(|v_idx| !tet.contains(v_idx))
            .find(|&v_idx| in_circumsphere(&corners, &self.vertices[v_idx]));

        #[cfg(feature = "logging")]
        if let Some(v_idx) = violation {
            error!("Non Delaunay tetrahedron {tet_idx}: {tet:?} contains vertex {v_idx}");
        }

        violation.is_some()
    }

    /// Checks the empty circumsphere property with exact predicates.
    ///
    /// Returns whether all tetrahedra are Delaunay, and the fraction of those that are. In the
    /// periodic case only the original points are tested.
    pub fn is_delaunay(&self) -> (bool, f64) {
        if self.tets.is_empty() {
            return (true, 1.0);
        }

        let num_violated_tets = (0..self.tets.len())
            .filter(|&tet_idx| self.is_tet_violated(tet_idx))
            .count();

        (
            num_violated_tets == 0,
            1.0 - num_violated_tets as f64 / self.tets.len() as f64,
        )
    }

    /// Checks the empty circumsphere property in parallel using [`rayon`]s.
    ///
    /// Returns the fraction of Delaunay tetrahedra, see [`Self::is_delaunay`].
    #[must_use]
    pub fn par_is_delaunay(&self) -> f64 {
        if self.tets.is_empty() {
            return 1.0;
        }

        let num_violated_tets: f64 = (0..self.tets.len())
            .into_par_iter()
            .map(|tet_idx| if self.is_tet_violated(tet_idx) { 1.0 } else { 0.0 })
            .sum();

        1.0 - num_violated_tets / self.tets.len() as f64
    }

    /// Whether every tetrahedron has four distinct, valid, positively oriented vertices and every
    /// face is shared by at most two tetrahedra.
    #[cfg_attr(not(feature = "logging"), allow(unused_variables))]
    pub fn is_sound(&self) -> bool {
        let num_vertices = self.vertices.len();

        for (tet_idx, tet) in self.tets.iter().enumerate() {
            let distinct = (0..4).all(|i| (i + 1..4).all(|j| tet[i] != tet[j]));
            if !distinct || tet.iter().any(|&v_idx| v_idx >= num_vertices) {
                #[cfg(feature = "logging")]
                error!("Tetrahedron {tet_idx} has invalid vertices {tet:?}");
                return false;
            }

            let [a, b, c, d] = tet.map(|v_idx| &self.vertices[v_idx]);
            if orientation_3d(a, b, c, d) < 0.0 {
                #[cfg(feature = "logging")]
                error!("Tetrahedron {tet_idx} is negatively oriented: {tet:?}");
                return false;
            }
        }

        match AdjacencyIndex::build(&self.tets) {
            Ok(_) => true,
            #[allow(unused)]
            Err(e) => {
                #[cfg(feature = "logging")]
                error!("Tetrahedralization is not sound: {e}");
                false
            }
        }
    }
}

impl core::fmt::Display for Tetrahedralization {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "Tetrahedralization with {} vertices and {} tets",
            self.vertices.len(),
            self.tets.len()
        )
    }
}

#[cfg(test)]
mod pre_test {
    #[cfg(not(feature = "logging"))]
    #[test]
    fn logging_enabled() {
        panic!("\x1b[1;31;7m tests must be run with logging enabled, try `--features logging` \x1b[0m")
    }
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;
    use crate::{
        hull::{ConvexHull, Plane},
        lift::lift_point,
    };
    use voronoi3d_test_utils::{sample_clustered_vertices_3d, sample_vertices_3d, unit_cube_corners};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn exact() -> Options {
        Options::default().with_epsilon(1e-10)
    }

    fn verify_tetrahedralization(tetrahedralization: &Tetrahedralization) {
        let (delaunay, fraction) = tetrahedralization.is_delaunay();
        assert!(delaunay);
        assert_eq!(fraction, 1.0);
        assert!(tetrahedralization.is_sound());
    }

    const NUM_VERTICES_LIST: [usize; 6] = [4, 5, 10, 50, 100, 500];

    #[test]
    fn test_single_tetrahedron() {
        init_logger();
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

        let tetrahedralization = tetrahedralization!(&points).unwrap();
        assert_eq!(tetrahedralization.num_tets(), 1);
        verify_tetrahedralization(&tetrahedralization);

        let voronoi = tetrahedralization.voronoi();
        assert_eq!(voronoi.num_vertices(), 1);
        assert_eq!(voronoi.num_edges(), 0);
        assert_eq!(voronoi.num_faces(), 0);

        let center = voronoi.vertices()[0];
        assert!(center.iter().all(|x| (x - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_cube() {
        init_logger();
        let tetrahedralization = tetrahedralization!(&unit_cube_corners()).unwrap();

        let num_tets = tetrahedralization.num_tets();
        assert!(num_tets == 5 || num_tets == 6, "Expected 5 or 6 tetrahedra, got {num_tets}");
        assert!((tetrahedralization.volume() - 1.0).abs() < 1e-9);
        assert!(tetrahedralization.is_sound());

        // all corners are cospherical, every circumcenter is the center of the cube
        for dual in tetrahedralization.dual_vertices() {
            let center = dual.position().unwrap();
            assert!(center.iter().all(|x| (x - 0.5).abs() < 1e-9));
        }

        let stats = tetrahedralization.stats();
        assert_eq!(stats.point_count, 8);
        assert_eq!(stats.tetrahedra_count, num_tets);
        assert_eq!(stats.voronoi_vertex_count, num_tets);
        assert_eq!(stats.face_count, tetrahedralization.adjacency().num_faces());
        // 12 boundary faces from the 6 squares, each interior face shared by two tetrahedra
        assert_eq!(stats.voronoi_edge_count, (4 * num_tets - 12) / 2);
    }

    #[test]
    fn test_cospherical() {
        init_logger();
        let octahedron = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];

        let tetrahedralization = tetrahedralization!(&octahedron).unwrap();
        assert_eq!(tetrahedralization.num_tets(), 4);
        assert!((tetrahedralization.volume() - 4.0 / 3.0).abs() < 1e-9);
        assert!(tetrahedralization.is_sound());

        for dual in tetrahedralization.dual_vertices() {
            let center = dual.position().unwrap();
            assert!(norm_squared(&center) < 1e-18);
        }

        // the diagonal all four tetrahedra share yields the only face
        let voronoi = tetrahedralization.voronoi();
        assert_eq!(voronoi.num_edges(), 4);
        assert_eq!(voronoi.num_faces(), 1);
        assert_eq!(voronoi.faces()[0].vertices.len(), 4);
    }

    #[test]
    fn test_coplanar() {
        init_logger();
        let points = [
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.5, 0.25, 1.0],
        ];

        let err = tetrahedralization!(&points).unwrap_err();
        let geometry_error = err.downcast_ref::<GeometryError>().unwrap();
        assert!(geometry_error.is_degenerate_input());

        let err = tetrahedralization!(&points[..2]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<GeometryError>(),
            Some(&GeometryError::TooFewPoints { needed: 4, given: 2 })
        );
    }

    #[test]
    fn test_non_finite() {
        init_logger();
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, f64::NAN, 0.0],
            [0.0, 0.0, 1.0],
            [1e200, 0.0, 0.0],
        ];

        let err = tetrahedralization!(&points).unwrap_err();
        assert_eq!(
            err.downcast_ref::<GeometryError>(),
            Some(&GeometryError::NonFinitePoint { idx: 2 })
        );
    }

    #[test]
    fn test_periodic_single_point() {
        init_logger();
        let periodic_box = PeriodicBox::cube(-1.0, 1.0).unwrap();

        let tetrahedralization = tetrahedralization!(&[[0.0, 0.0, 0.0]], periodic = periodic_box).unwrap();
        assert_eq!(tetrahedralization.num_tets(), 0);
        assert_eq!(tetrahedralization.vertices().len(), 1);
        assert_eq!(tetrahedralization.voronoi().num_vertices(), 0);
        assert_eq!(tetrahedralization.is_delaunay(), (true, 1.0));
    }

    #[test]
    fn test_periodic() {
        init_logger();
        let periodic_box = PeriodicBox::cube(0.0, 1.0).unwrap();
        let points = sample_vertices_3d(30, Some(0.0..=1.0));

        let tetrahedralization =
            Tetrahedralization::build(&points, exact().with_periodic(periodic_box)).unwrap();

        assert!(tetrahedralization.num_tets() > 0);
        assert!(tetrahedralization.tets().iter().flatten().all(|&v_idx| v_idx < 30));
        // the tetrahedra are Delaunay among all images, so among the originals as well
        verify_tetrahedralization(&tetrahedralization);
    }

    #[test]
    fn test_invalid_periodic_box() {
        init_logger();
        let points = sample_vertices_3d(10, Some(0.0..=1.0));
        let inverted = PeriodicBox {
            min: [1.0; 3],
            max: [0.0, 1.0, 1.0],
        };
        let options = Options {
            periodic: Some(inverted),
            ..Options::default()
        };

        let err = Tetrahedralization::build(&points, options).unwrap_err();
        assert_eq!(
            err.downcast_ref::<GeometryError>(),
            Some(&GeometryError::InvalidPeriodicBox {
                min: [1.0; 3],
                max: [0.0, 1.0, 1.0],
            })
        );
    }

    #[test]
    fn test_delaunay_3d() {
        init_logger();
        for n in NUM_VERTICES_LIST {
            let points = sample_vertices_3d(n, None);

            let tetrahedralization = Tetrahedralization::build(&points, exact()).unwrap();
            verify_tetrahedralization(&tetrahedralization);
            assert_eq!(tetrahedralization.par_is_delaunay(), 1.0);
        }
    }

    #[test]
    fn test_clustered() {
        init_logger();
        let points = sample_clustered_vertices_3d(300, [2.0, -1.0, 5.0], None);

        let tetrahedralization = Tetrahedralization::build(&points, exact()).unwrap();
        verify_tetrahedralization(&tetrahedralization);
    }

    /// Sound, fills the convex hull of `points`, and empty circumspheres up to `epsilon` in the
    /// lift.
    fn verify_default_epsilon(tetrahedralization: &Tetrahedralization, points: &[Vertex3]) {
        assert!(tetrahedralization.is_sound());
        assert_eq!(tetrahedralization.dual_vertices().len(), tetrahedralization.num_tets());

        let hull = ConvexHull::build(points, DEFAULT_EPSILON).unwrap();
        let interior = *hull.interior_point();
        let hull_volume: f64 = hull
            .simplices()
            .iter()
            .map(|&[a, b, c]| orientation_3d(&interior, &points[a], &points[b], &points[c]).abs() / 6.0)
            .sum();
        assert!((tetrahedralization.volume() - hull_volume).abs() < 1e-3 * hull_volume.max(1.0));

        for tet in tetrahedralization.tets() {
            let lifted = tet.map(|v_idx| lift_point(&points[v_idx]));
            let plane = Plane::through(&lifted, &[0, 1, 2, 3]);
            // positive below the lifted tetrahedron, that is inside its circumsphere
            let below = if plane.normal[3] < 0.0 { 1.0 } else { -1.0 };

            for (v_idx, p) in points.iter().enumerate() {
                let depth = below * plane.signed_distance(&lift_point(p));
                assert!(
                    tet.contains(&v_idx) || depth <= DEFAULT_EPSILON + 1e-9,
                    "{tet:?} contains {v_idx} at depth {depth:e}"
                );
            }
        }
    }

    #[test]
    fn test_default_epsilon() {
        init_logger();
        for _ in 0..5 {
            let uniform = sample_vertices_3d(1000, None);
            let tetrahedralization = tetrahedralization!(&uniform).unwrap();
            verify_default_epsilon(&tetrahedralization, &uniform);

            let wide = sample_vertices_3d(2000, Some(-5.0..=5.0));
            let tetrahedralization = tetrahedralization!(&wide).unwrap();
            verify_default_epsilon(&tetrahedralization, &wide);

            let clustered = sample_clustered_vertices_3d(500, [0.0; 3], None);
            let tetrahedralization = tetrahedralization!(&clustered).unwrap();
            verify_default_epsilon(&tetrahedralization, &clustered);
        }
    }

    #[test]
    fn test_barycenters() {
        init_logger();
        let points = sample_vertices_3d(50, None);

        let tetrahedralization = tetrahedralization!(&points, center = CenterType::Barycenter).unwrap();
        assert_eq!(tetrahedralization.warnings().count(), 0);

        for (tet, dual) in tetrahedralization
            .tets_as_vertices()
            .iter()
            .zip(tetrahedralization.dual_vertices())
        {
            let center = dual.position().unwrap();
            for axis in 0..3 {
                let mean = tet.iter().map(|v| v[axis]).sum::<f64>() / 4.0;
                assert!((center[axis] - mean).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_voronoi_faces() {
        init_logger();
        let points = sample_vertices_3d(100, None);

        let tetrahedralization = Tetrahedralization::build(&points, exact()).unwrap();
        let voronoi = tetrahedralization.voronoi();

        assert_eq!(voronoi.num_vertices(), tetrahedralization.num_tets());
        let num_interior_faces = tetrahedralization.adjacency().interior_faces().count();
        assert_eq!(voronoi.num_edges(), num_interior_faces);
        assert!(voronoi.faces().iter().all(|face| face.vertices.len() >= 3));
        assert!(voronoi.num_faces() <= tetrahedralization.delaunay_edges().len());
        assert_eq!(voronoi.face_positions().len(), voronoi.num_faces());
    }

    #[test]
    #[ignore]
    // only run this test isolated, as test concurrency can mess up par_iter
    fn test_parallel_delaunay() {
        let points = sample_vertices_3d(2000, None);
        let tetrahedralization = Tetrahedralization::build(&points, exact()).unwrap();

        let now = std::time::Instant::now();
        let (_, fraction) = tetrahedralization.is_delaunay();
        let elapsed = now.elapsed().as_millis();

        let now = std::time::Instant::now();
        let par_fraction = tetrahedralization.par_is_delaunay();
        let elapsed_p = now.elapsed().as_millis();

        assert_eq!(fraction, par_fraction);
        assert!(elapsed_p < elapsed)
    }
}
