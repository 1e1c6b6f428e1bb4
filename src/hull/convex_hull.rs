use std::collections::{HashMap, VecDeque};

use crate::{
    error::GeometryError,
    utils::{
        linalg::{centroid, dot, norm, sub},
        types::{FacetIdx, VertexIdx},
    },
};

use super::{
    facet::Facet, facet_iterator::FacetIterator, outside_set::OutsideSets,
    ridge_iterator::RidgeIterator,
};

type Result<T> = core::result::Result<T, GeometryError>;

/// A ridge between a visible facet and a facet that stays.
#[derive(Debug, Clone, Copy)]
struct HorizonRidge {
    inner: FacetIdx,
    slot: usize,
    outer: FacetIdx,
}

/// Convex hull of a point set in `D` dimensions, built with quickhull.
///
/// Facets live in an arena and are addressed by index. Facets removed during construction stay in
/// the arena as tombstones, so indices are stable but not dense.
///
/// The hull only stores indices, the points stay with the caller.
///
/// ```
/// use voronoi3d::hull::ConvexHull;
///
/// let points = [
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [0.0, 0.0, 1.0],
///     [0.1, 0.1, 0.1], // inside
/// ];
///
/// let hull = ConvexHull::build(&points, 1e-4).unwrap();
/// assert_eq!(hull.num_facets(), 4);
/// assert!(hull.is_closed());
/// ```
#[derive(Debug, Clone)]
pub struct ConvexHull<const D: usize> {
    pub(crate) facets: Vec<Facet<D>>,
    interior: [f64; D],
    epsilon: f64,
    num_points: usize,
}

impl<const D: usize> ConvexHull<D> {
    /// Computes the hull of `points`.
    ///
    /// A point counts as outside a facet only if its signed distance exceeds `epsilon`.
    ///
    /// ## Errors
    /// Returns a degenerate-input error if there are fewer than `D + 1` points, or if all of them
    /// lie within `epsilon` of a common hyperplane. Returns an internal-consistency error if the
    /// resulting hull is not a closed manifold.
    pub fn build(points: &[[f64; D]], epsilon: f64) -> Result<Self> {
        let seed = seed_simplex(points, epsilon)?;

        let mut hull = Self {
            facets: Vec::with_capacity(4 * points.len()),
            interior: centroid(seed.iter().map(|&v_idx| points[v_idx])),
            epsilon,
            num_points: points.len(),
        };
        let mut outside = OutsideSets::new(points.len());

        hull.insert_seed(points, &seed)?;

        let mut in_seed = vec![false; points.len()];
        for &v_idx in &seed {
            in_seed[v_idx] = true;
        }

        let seed_facets: Vec<FacetIdx> = (0..hull.facets.len()).collect();
        for v_idx in (0..points.len()).filter(|&v_idx| !in_seed[v_idx]) {
            hull.assign(points, v_idx, &seed_facets, &mut outside);
        }

        let mut queue: VecDeque<FacetIdx> = seed_facets
            .into_iter()
            .filter(|&f_idx| !outside.is_empty(f_idx))
            .collect();

        let bound = points.len();
        let mut iterations = 0;

        while let Some(f_idx) = queue.pop_front() {
            if !hull.facets[f_idx].alive {
                continue;
            }
            let Some(apex) = outside.farthest(f_idx) else {
                continue;
            };

            iterations += 1;
            if iterations > bound {
                return Err(GeometryError::IterationBoundExceeded { bound });
            }

            outside.remove(apex.point);

            let (visible, horizon) = hull.find_horizon(points, f_idx, apex.point)?;
            let cone = hull.build_cone(points, apex.point, &horizon)?;

            let mut orphans = Vec::new();
            for &v_f_idx in &visible {
                hull.facets[v_f_idx].alive = false;
                orphans.extend(outside.take_all(v_f_idx));
            }

            for orphan in orphans {
                hull.assign(points, orphan.point, &cone, &mut outside);
            }

            queue.extend(cone.into_iter().filter(|&f_idx| !outside.is_empty(f_idx)));
        }

        #[cfg(feature = "logging")]
        log::debug!(
            "Convex hull in {}D: {} facets from {} points in {} iterations",
            D,
            hull.num_facets(),
            points.len(),
            iterations
        );

        hull.check_closed()?;

        Ok(hull)
    }

    /// Inserts the `D + 1` facets of the seed simplex and links them.
    fn insert_seed(&mut self, points: &[[f64; D]], seed: &[VertexIdx]) -> Result<()> {
        let mut pending = HashMap::with_capacity(seed.len() * D);

        for skip in 0..seed.len() {
            let mut vertices = [0; D];
            for (slot, &v_idx) in seed.iter().filter(|&&v| v != seed[skip]).enumerate() {
                vertices[slot] = v_idx;
            }

            let f_idx = self.facets.len();
            self.facets
                .push(Facet::new(vertices, [None; D], points, &self.interior));

            for slot in 0..D {
                self.link(&mut pending, f_idx, slot);
            }
        }

        match pending.into_values().next() {
            Some((facet, ridge)) => Err(GeometryError::OpenHull { facet, ridge }),
            None => Ok(()),
        }
    }

    /// Links ridge `slot` of `f_idx` with the pending ridge of the same vertices, or leaves it
    /// pending.
    fn link(
        &mut self,
        pending: &mut HashMap<[VertexIdx; D], (FacetIdx, usize)>,
        f_idx: FacetIdx,
        slot: usize,
    ) {
        let key = self.facets[f_idx].ridge_key(slot);

        match pending.remove(&key) {
            Some((other, other_slot)) => {
                self.facets[f_idx].neighbors[slot] = Some(other);
                self.facets[other].neighbors[other_slot] = Some(f_idx);
            }
            None => {
                pending.insert(key, (f_idx, slot));
            }
        }
    }

    /// Assigns `v_idx` to the first of `candidates` it lies outside of.
    fn assign(
        &self,
        points: &[[f64; D]],
        v_idx: VertexIdx,
        candidates: &[FacetIdx],
        outside: &mut OutsideSets,
    ) {
        debug_assert!(outside.owner(v_idx).is_none());

        let p = &points[v_idx];
        for &f_idx in candidates {
            let distance = self.facets[f_idx].plane.signed_distance(p);
            if distance > self.epsilon {
                outside.insert(f_idx, v_idx, distance);
                return;
            }
        }
    }

    /// Collects the facets visible from `apex`, starting at the visible facet `start`, and the
    /// horizon ridges around them.
    fn find_horizon(
        &mut self,
        points: &[[f64; D]],
        start: FacetIdx,
        apex: VertexIdx,
    ) -> Result<(Vec<FacetIdx>, Vec<HorizonRidge>)> {
        // every point becomes the apex at most once
        let stamp = apex + 1;
        let p = &points[apex];

        self.facets[start].visit = stamp;
        self.facets[start].visible = true;

        let mut stack = vec![start];
        let mut visible = Vec::new();
        let mut horizon = Vec::new();

        while let Some(f_idx) = stack.pop() {
            visible.push(f_idx);

            for slot in 0..D {
                let n_idx = self.facets[f_idx].neighbors[slot].ok_or(GeometryError::OpenHull {
                    facet: f_idx,
                    ridge: slot,
                })?;

                let neighbor = &mut self.facets[n_idx];
                if neighbor.visit != stamp {
                    neighbor.visit = stamp;
                    // strict sign, epsilon only governs the outside sets
                    neighbor.visible = neighbor.plane.signed_distance(p) > 0.0;
                    if neighbor.visible {
                        stack.push(n_idx);
                    }
                }

                if !neighbor.visible {
                    horizon.push(HorizonRidge {
                        inner: f_idx,
                        slot,
                        outer: n_idx,
                    });
                }
            }
        }

        Ok((visible, horizon))
    }

    /// Connects every horizon ridge with `apex`. Returns the new facets in creation order.
    fn build_cone(
        &mut self,
        points: &[[f64; D]],
        apex: VertexIdx,
        horizon: &[HorizonRidge],
    ) -> Result<Vec<FacetIdx>> {
        let mut pending = HashMap::with_capacity(horizon.len() * D);
        let mut cone = Vec::with_capacity(horizon.len());

        for ridge in horizon {
            let mut vertices = self.facets[ridge.inner].vertices;
            vertices[ridge.slot] = apex;
            let mut neighbors = [None; D];
            neighbors[ridge.slot] = Some(ridge.outer);

            let f_idx = self.facets.len();
            let facet = Facet::new(vertices, neighbors, points, &self.interior);
            let apex_slot = facet.slot_of(apex);
            self.facets.push(facet);

            let outer = &mut self.facets[ridge.outer];
            let back = outer
                .neighbor_slot(ridge.inner)
                .ok_or(GeometryError::OpenHull {
                    facet: ridge.inner,
                    ridge: ridge.slot,
                })?;
            outer.neighbors[back] = Some(f_idx);

            for slot in (0..D).filter(|&slot| Some(slot) != apex_slot) {
                self.link(&mut pending, f_idx, slot);
            }

            cone.push(f_idx);
        }

        match pending.into_values().next() {
            Some((facet, ridge)) => Err(GeometryError::OpenHull { facet, ridge }),
            None => Ok(cone),
        }
    }

    fn check_closed(&self) -> Result<()> {
        for facet in self.facets() {
            for ridge in facet.ridges() {
                if ridge.neighbor().is_none() || !ridge.is_sound() {
                    return Err(GeometryError::OpenHull {
                        facet: facet.idx(),
                        ridge: ridge.slot(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Drops every facet for which `keep` returns `false` and severs the links pointing at them.
    ///
    /// The ridges along the cut become boundary ridges without neighbor.
    pub fn retain(&mut self, mut keep: impl FnMut(&FacetIterator<'_, D>) -> bool) {
        let dropped: Vec<FacetIdx> = self
            .facets()
            .filter(|facet| !keep(facet))
            .map(|facet| facet.idx())
            .collect();

        for &f_idx in &dropped {
            self.facets[f_idx].alive = false;
        }

        for f_idx in 0..self.facets.len() {
            if !self.facets[f_idx].alive {
                continue;
            }
            for slot in 0..D {
                if let Some(n_idx) = self.facets[f_idx].neighbors[slot] {
                    if !self.facets[n_idx].alive {
                        self.facets[f_idx].neighbors[slot] = None;
                    }
                }
            }
        }
    }

    /// Gets a facet by arena index, `None` for tombstones and out-of-range indices.
    pub fn get_facet(&self, f_idx: FacetIdx) -> Option<FacetIterator<'_, D>> {
        self.facets
            .get(f_idx)
            .filter(|facet| facet.alive)
            .map(|_| FacetIterator::new(self, f_idx))
    }

    /// Iterates over the live facets in arena order.
    pub fn facets(&self) -> impl Iterator<Item = FacetIterator<'_, D>> + '_ {
        (0..self.facets.len()).filter_map(|f_idx| self.get_facet(f_idx))
    }

    /// Iterates over all ridges of the live facets. Every interior ridge is visited twice.
    pub fn ridges(&self) -> impl Iterator<Item = RidgeIterator<'_, D>> + '_ {
        self.facets().flat_map(|facet| facet.ridges())
    }

    /// The vertex indices of every live facet, outward winding.
    pub fn simplices(&self) -> Vec<[VertexIdx; D]> {
        self.facets().map(|facet| facet.nodes()).collect()
    }

    pub fn num_facets(&self) -> usize {
        self.facets.iter().filter(|facet| facet.alive).count()
    }

    pub const fn num_points(&self) -> usize {
        self.num_points
    }

    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// A point strictly inside the hull, the centroid of the seed simplex.
    pub const fn interior_point(&self) -> &[f64; D] {
        &self.interior
    }

    /// Every live ridge links to a live facet that links back across the same ridge.
    pub fn is_sound(&self) -> bool {
        self.ridges()
            .all(|ridge| ridge.neighbor().is_none() || ridge.is_sound())
    }

    /// Sound, and no ridge without neighbor.
    pub fn is_closed(&self) -> bool {
        self.check_closed().is_ok()
    }
}

/// Picks `D + 1` affinely independent points.
///
/// The first two are the lexicographic minimum and maximum. Each further point is the one farthest
/// from the affine span of the points picked so far.
pub(crate) fn seed_simplex<const D: usize>(
    points: &[[f64; D]],
    epsilon: f64,
) -> Result<Vec<VertexIdx>> {
    if points.len() < D + 1 {
        return Err(GeometryError::TooFewPoints {
            needed: D + 1,
            given: points.len(),
        });
    }

    let lex_cmp = |a: &[f64; D], b: &[f64; D]| {
        a.iter()
            .zip(b)
            .map(|(x, y)| x.partial_cmp(y).unwrap_or(core::cmp::Ordering::Equal))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(core::cmp::Ordering::Equal)
    };

    let (mut min, mut max) = (0, 0);
    for (v_idx, p) in points.iter().enumerate().skip(1) {
        if lex_cmp(p, &points[min]).is_lt() {
            min = v_idx;
        }
        if lex_cmp(p, &points[max]).is_ge() {
            max = v_idx;
        }
    }

    let origin = points[min];
    let first = sub(&points[max], &origin);
    let len = norm(&first);
    if min == max || len <= epsilon {
        return Err(GeometryError::AffinelyDependent {
            rank: 0,
            dimension: D,
        });
    }

    let mut seed = vec![min, max];
    let mut basis = vec![first.map(|x| x / len)];

    while seed.len() < D + 1 {
        let mut best: Option<(VertexIdx, [f64; D], f64)> = None;

        for (v_idx, p) in points.iter().enumerate() {
            let mut residual = sub(p, &origin);
            for e in &basis {
                let along = dot(&residual, e);
                for (r, x) in residual.iter_mut().zip(e) {
                    *r -= along * x;
                }
            }

            let distance = norm(&residual);
            if best.is_none_or(|(_, _, best_distance)| distance >= best_distance) {
                best = Some((v_idx, residual, distance));
            }
        }

        match best {
            Some((v_idx, residual, distance)) if distance > epsilon => {
                seed.push(v_idx);
                basis.push(residual.map(|x| x / distance));
            }
            _ => {
                return Err(GeometryError::AffinelyDependent {
                    rank: basis.len(),
                    dimension: D,
                });
            }
        }
    }

    #[cfg(feature = "logging")]
    log::trace!("Seed simplex: {seed:?}");

    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hull::DEFAULT_EPSILON;
    use voronoi3d_test_utils::{sample_clustered_vertices_3d, sample_vertices_3d};

    const NUM_VERTICES_LIST: [usize; 5] = [4, 5, 10, 100, 1000];

    /// Every input point lies on or inside every facet.
    fn verify_hull<const D: usize>(hull: &ConvexHull<D>, points: &[[f64; D]]) {
        assert!(hull.is_closed());
        assert!(hull.is_sound());

        for facet in hull.facets() {
            assert!(facet.plane().signed_distance(hull.interior_point()) < 0.0);
            for p in points {
                assert!(facet.plane().signed_distance(p) <= hull.epsilon() + 1e-9);
            }
        }
    }

    #[test]
    fn test_seed_simplex_tie_breaks() {
        let points = [
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];

        let seed = seed_simplex(&points, 1e-4).unwrap();
        assert_eq!(&seed[..2], &[0, 3]);
        assert_eq!(seed.len(), 4);
    }

    #[test]
    fn test_degenerate_input() {
        let coplanar = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        assert!(matches!(
            ConvexHull::build(&coplanar, 1e-4),
            Err(GeometryError::AffinelyDependent { rank: 2, dimension: 3 })
        ));

        let same = [[2.0, 2.0]; 3];
        assert!(matches!(
            ConvexHull::build(&same, 1e-4),
            Err(GeometryError::AffinelyDependent { rank: 0, .. })
        ));

        let few = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!(matches!(
            ConvexHull::build(&few, 1e-4),
            Err(GeometryError::TooFewPoints { needed: 4, given: 3 })
        ));
    }

    #[test]
    fn test_square_2d() {
        let points = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 0.5]];
        let hull = ConvexHull::build(&points, 1e-4).unwrap();

        assert_eq!(hull.num_facets(), 4);
        verify_hull(&hull, &points);
    }

    #[test]
    fn test_cube_3d() {
        let points = voronoi3d_test_utils::unit_cube_corners();
        let hull = ConvexHull::build(&points, 1e-4).unwrap();

        // two triangles per square face
        assert_eq!(hull.num_facets(), 12);
        verify_hull(&hull, &points);
    }

    #[test]
    fn test_random_3d() {
        for n in NUM_VERTICES_LIST {
            let points = sample_vertices_3d(n, None);
            let hull = ConvexHull::build(&points, 1e-4).unwrap();

            verify_hull(&hull, &points);
            // Euler characteristic of a triangulated sphere
            let v = hull
                .simplices()
                .iter()
                .flatten()
                .collect::<std::collections::HashSet<_>>()
                .len();
            assert_eq!(v + hull.num_facets() - hull.ridges().count() / 2, 2);
        }
    }

    #[test]
    fn test_random_4d() {
        for n in NUM_VERTICES_LIST.map(|n| n + 1) {
            let points: Vec<[f64; 4]> = sample_vertices_3d(n, None)
                .into_iter()
                .zip(sample_vertices_3d(n, None))
                .map(|(a, b)| [a[0], a[1], a[2], b[0]])
                .collect();

            let hull = ConvexHull::build(&points, 1e-4).unwrap();
            verify_hull(&hull, &points);
        }
    }

    #[test]
    fn test_default_epsilon_contains_points() {
        for _ in 0..10 {
            let uniform = sample_vertices_3d(2000, None);
            verify_hull(&ConvexHull::build(&uniform, DEFAULT_EPSILON).unwrap(), &uniform);

            let clustered = sample_clustered_vertices_3d(1000, [0.0; 3], None);
            verify_hull(&ConvexHull::build(&clustered, DEFAULT_EPSILON).unwrap(), &clustered);

            // lifted onto the paraboloid, most points are hull vertices
            let lifted: Vec<[f64; 4]> = sample_vertices_3d(1001, None)
                .into_iter()
                .map(|[x, y, z]| [x, y, z, x * x + y * y + z * z])
                .collect();
            verify_hull(&ConvexHull::build(&lifted, DEFAULT_EPSILON).unwrap(), &lifted);
        }
    }

    #[test]
    fn test_unlinked_horizon_ridge() {
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
        ];
        let mut hull = ConvexHull::build(&points[..4], 1e-4).unwrap();

        let outer = hull.facets[0].neighbors[1].unwrap();
        for link in &mut hull.facets[outer].neighbors {
            if *link == Some(0) {
                *link = None;
            }
        }

        let ridge = HorizonRidge {
            inner: 0,
            slot: 1,
            outer,
        };
        assert_eq!(
            hull.build_cone(&points, 4, &[ridge]),
            Err(GeometryError::OpenHull { facet: 0, ridge: 1 })
        );
    }

    #[test]
    fn test_retain_severs_links() {
        let points = voronoi3d_test_utils::unit_cube_corners();
        let mut hull = ConvexHull::build(&points, 1e-4).unwrap();

        // keep the bottom square
        hull.retain(|facet| facet.plane().normal[2] < -0.5);

        assert_eq!(hull.num_facets(), 2);
        assert!(hull.is_sound());
        assert!(!hull.is_closed());
        assert_eq!(
            hull.ridges().filter(|ridge| ridge.neighbor().is_none()).count(),
            4
        );
    }
}
