//! Small dense linear algebra over fixed-size `[f64; D]` vectors.
//!
//! The hull only ever needs determinants of at most `D x D` matrices with `D <= 4`, so a
//! cofactor expansion with closed forms for the small cases is fast enough and keeps the
//! arithmetic identical for every facet.

use nalgebra::{DMatrix, Matrix3, Vector3};

use super::types::Vertex3;

/// Below this absolute determinant a 3x3 system is treated as singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Outcome of solving a 3x3 linear system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinearSolve {
    Unique(Vertex3),
    Singular { determinant: f64 },
}

#[inline]
pub fn sub<const D: usize>(a: &[f64; D], b: &[f64; D]) -> [f64; D] {
    core::array::from_fn(|i| a[i] - b[i])
}

#[inline]
pub fn dot<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
pub fn norm_squared<const D: usize>(a: &[f64; D]) -> f64 {
    dot(a, a)
}

#[inline]
pub fn norm<const D: usize>(a: &[f64; D]) -> f64 {
    norm_squared(a).sqrt()
}

/// Coordinate-wise mean of `points`, or the origin for an empty slice.
pub fn centroid<const D: usize>(points: impl IntoIterator<Item = [f64; D]>) -> [f64; D] {
    let mut sum = [0.0; D];
    let mut count = 0usize;
    for p in points {
        for (s, x) in sum.iter_mut().zip(p) {
            *s += x;
        }
        count += 1;
    }

    if count > 0 {
        sum.map(|s| s / count as f64)
    } else {
        sum
    }
}

/// Determinant by cofactor expansion along the first row.
///
/// Matrices up to 3x3 use closed forms, larger ones recurse on their minors.
pub fn determinant(m: &DMatrix<f64>) -> f64 {
    debug_assert_eq!(m.nrows(), m.ncols());

    match m.nrows() {
        0 => 1.0,
        1 => m[(0, 0)],
        2 => m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
        3 => {
            m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
                - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
                + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
        }
        n => (0..n)
            .map(|j| {
                let minor = m.clone().remove_row(0).remove_column(j);
                let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                sign * m[(0, j)] * determinant(&minor)
            })
            .sum(),
    }
}

/// Generalized cross product of `D - 1` vectors in `D` dimensions.
///
/// The result is orthogonal to every row. Its `j`-th component is the signed minor obtained by
/// deleting column `j`, so swapping two rows flips the result.
pub fn hyperplane_normal<const D: usize>(rows: &[[f64; D]]) -> [f64; D] {
    debug_assert_eq!(rows.len() + 1, D);

    let m = DMatrix::from_fn(rows.len(), D, |i, j| rows[i][j]);

    core::array::from_fn(|j| {
        let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
        sign * determinant(&m.clone().remove_column(j))
    })
}

/// Signed volume scaled by six of the tetrahedron `a, b, c, d`.
pub fn orientation_3d(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> f64 {
    let [u, v, w] = [sub(b, a), sub(c, a), sub(d, a)];
    Matrix3::new(u[0], u[1], u[2], v[0], v[1], v[2], w[0], w[1], w[2]).determinant()
}

/// Solves `A x = b` where `rows` are the rows of `A`.
pub fn solve_3x3(rows: &[Vertex3; 3], b: &Vertex3) -> LinearSolve {
    let a = Matrix3::from_fn(|i, j| rows[i][j]);
    let determinant = a.determinant();

    if determinant.abs() < SINGULAR_TOLERANCE {
        return LinearSolve::Singular { determinant };
    }

    match a.try_inverse() {
        Some(inverse) => {
            let x = inverse * Vector3::from(*b);
            LinearSolve::Unique([x.x, x.y, x.z])
        }
        None => LinearSolve::Singular { determinant },
    }
}
