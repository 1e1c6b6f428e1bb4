//! Delaunay tetrahedra as the lower hull of the points lifted onto a paraboloid in 4D.

use crate::{
    error::GeometryError,
    hull::{ConvexHull, seed_simplex},
    node::VertexNode,
    predicates::orient_3d,
    utils::{
        linalg::{centroid, norm_squared, orientation_3d},
        types::{Tetrahedron, Vertex3, Vertex4},
    },
};

/// Lifts `p` onto the paraboloid `w = x² + y² + z²`.
#[inline]
pub fn lift_point(p: &Vertex3) -> Vertex4 {
    [p[0], p[1], p[2], norm_squared(p)]
}

/// The lifted point set of a tetrahedralization.
///
/// The lifted array holds the `num_casual` input points, then `num_ghosts` periodic images, then
/// the ceiling apex. The apex sits above the centroid of the points, higher than every lifted
/// point, which keeps the 4D hull full-dimensional even for cospherical input without changing
/// its lower facets.
#[derive(Debug, Clone)]
pub struct DelaunayLift {
    lifted: Vec<Vertex4>,
    num_casual: usize,
    num_ghosts: usize,
}

impl DelaunayLift {
    /// Lifts `points`, of which the first `num_casual` are input points and the rest ghosts.
    pub fn new(points: &[Vertex3], num_casual: usize) -> Self {
        debug_assert!(num_casual <= points.len());

        let mut lifted: Vec<Vertex4> = Vec::with_capacity(points.len() + 1);
        lifted.extend(points.iter().map(lift_point));

        let center = centroid(points.iter().copied());
        let mut extent: f64 = 0.0;
        for axis in 0..3 {
            let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
            extent = extent.max(hi - lo);
        }
        let max_height = lifted.iter().map(|p| p[3]).fold(0.0, f64::max);

        lifted.push([
            center[0],
            center[1],
            center[2],
            max_height + extent.powi(2).max(1.0),
        ]);

        Self {
            lifted,
            num_casual,
            num_ghosts: points.len() - num_casual,
        }
    }

    pub fn node(&self, idx: usize) -> VertexNode {
        VertexNode::classify(idx, self.num_casual, self.num_ghosts)
    }

    /// The lifted points, ceiling apex last.
    pub fn lifted_points(&self) -> &[Vertex4] {
        &self.lifted
    }

    /// Computes the Delaunay tetrahedra between the input points.
    ///
    /// Tetrahedra with a ghost vertex are discarded, as are the flat ones lifted from vertical
    /// facets over coplanar hull faces. Every returned tetrahedron is positively oriented.
    ///
    /// ## Errors
    /// Fails with a degenerate-input error if there are fewer than 4 points or all of them are
    /// coplanar.
    pub fn tetrahedralize(
        &self,
        points: &[Vertex3],
        epsilon: f64,
    ) -> Result<Vec<Tetrahedron>, GeometryError> {
        let num_points = self.num_casual + self.num_ghosts;
        if num_points < 4 {
            return Err(GeometryError::TooFewPoints {
                needed: 4,
                given: num_points,
            });
        }

        if num_points == 4 {
            seed_simplex(&points[..4], epsilon)?;
            return Ok(vec![oriented(points, [0, 1, 2, 3])]);
        }

        let mut hull = ConvexHull::build(&self.lifted, epsilon)?;
        #[cfg(feature = "logging")]
        let num_facets = hull.num_facets();

        hull.retain(|facet| {
            facet.is_lower() && facet.nodes().iter().all(|&idx| !self.node(idx).is_conceptual())
        });

        #[cfg(feature = "logging")]
        log::debug!(
            "Lower hull: kept {} of {} facets",
            hull.num_facets(),
            num_facets
        );

        Ok(hull
            .facets()
            .map(|facet| facet.nodes())
            .filter(|nodes| nodes.iter().all(|&idx| self.node(idx).is_casual()))
            .filter(|&[a, b, c, d]| orient_3d(&points[a], &points[b], &points[c], &points[d]) != 0.0)
            .map(|nodes| oriented(points, nodes))
            .collect())
    }
}

/// Swaps the last two vertices of a negatively oriented tetrahedron.
fn oriented(points: &[Vertex3], tet: Tetrahedron) -> Tetrahedron {
    let [a, b, c, d] = tet;
    if orientation_3d(&points[a], &points[b], &points[c], &points[d]) < 0.0 {
        [a, b, d, c]
    } else {
        tet
    }
}

/// Delaunay tetrahedra of `points`, see [`DelaunayLift::tetrahedralize`].
pub fn delaunay_tetrahedra(
    points: &[Vertex3],
    epsilon: f64,
) -> Result<Vec<Tetrahedron>, GeometryError> {
    DelaunayLift::new(points, points.len()).tetrahedralize(points, epsilon)
}
