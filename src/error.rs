//! Errors and non-fatal diagnostics of the geometric pipeline.

use crate::utils::types::{FaceKey, TetIdx};

/// Error of the hull, lift and adjacency stages.
///
/// `DegenerateInput` variants describe inputs that admit no full-dimensional result and are the
/// caller's to handle. `InternalConsistency` variants indicate a broken invariant of a computed
/// structure and should never surface for valid input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("degenerate input: {needed} points are required, got {given}")]
    TooFewPoints { needed: usize, given: usize },

    #[error("degenerate input: points span only {rank} of {dimension} dimensions")]
    AffinelyDependent { rank: usize, dimension: usize },

    #[error("degenerate input: point {idx} is not finite or too large to lift")]
    NonFinitePoint { idx: usize },

    #[error("degenerate input: invalid periodic box, min {min:?} is not below max {max:?}")]
    InvalidPeriodicBox { min: [f64; 3], max: [f64; 3] },

    #[error("internal consistency: ridge {ridge} of facet {facet} has no matching neighbor")]
    OpenHull { facet: usize, ridge: usize },

    #[error("internal consistency: face {key:?} is shared by {count} tetrahedra")]
    NonManifoldFace { key: FaceKey, count: usize },

    #[error("internal consistency: hull did not converge within {bound} iterations")]
    IterationBoundExceeded { bound: usize },
}

impl GeometryError {
    /// Whether the error stems from the input rather than from the algorithm.
    pub const fn is_degenerate_input(&self) -> bool {
        matches!(
            self,
            Self::TooFewPoints { .. }
                | Self::AffinelyDependent { .. }
                | Self::NonFinitePoint { .. }
                | Self::InvalidPeriodicBox { .. }
        )
    }

    pub const fn is_internal_consistency(&self) -> bool {
        !self.is_degenerate_input()
    }
}

/// A data-quality diagnostic of a single dual vertex. The build keeps going.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CenterWarning {
    #[error("tetrahedron {tet} is flat (determinant {determinant:e}), its dual vertex is absent")]
    SingularMatrix { tet: TetIdx, determinant: f64 },

    #[error("circumcenter of tetrahedron {tet} is off by {max_deviation:e} in squared distance")]
    VerificationFailed { tet: TetIdx, max_deviation: f64 },
}

impl CenterWarning {
    pub const fn tet(&self) -> TetIdx {
        match self {
            Self::SingularMatrix { tet, .. } | Self::VerificationFailed { tet, .. } => *tet,
        }
    }
}

