//! Incremental convex hull in `D` dimensions.

pub use convex_hull::ConvexHull;
pub use facet::Plane;
pub use facet_iterator::FacetIterator;
pub use ridge_iterator::RidgeIterator;

pub(crate) use convex_hull::seed_simplex;

mod convex_hull;
mod facet;
mod facet_iterator;
mod outside_set;
mod ridge_iterator;

/// Default signed-distance tolerance for outside-set membership.
pub const DEFAULT_EPSILON: f64 = 1e-4;
