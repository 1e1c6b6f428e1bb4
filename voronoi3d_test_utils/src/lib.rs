//! utils for voronoi3d tests and fuzzing
#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::all, clippy::missing_const_for_fn)]

use rand::{distr::Uniform, prelude::Distribution};
use rand_distr::Normal;
use std::ops::RangeInclusive;

pub type Vertex3 = [f64; 3];

/// Samples `n` vertices in 3D space from the [Uniform] distribution.
///
/// If no range is specified, the unit-cube centered around the origin is used, `[-0.5, 0.5]`.
pub fn sample_vertices_3d(n: usize, range: Option<RangeInclusive<f64>>) -> Vec<Vertex3> {
    let mut rng = rand::rng();
    let range = range.unwrap_or(-0.5..=0.5);
    let uniform = Uniform::try_from(range).expect("Expected range with a greater start then end");

    let mut vertices: Vec<Vertex3> = Vec::with_capacity(n);
    for _ in 0..n {
        let x = uniform.sample(&mut rng);
        let y = uniform.sample(&mut rng);
        let z = uniform.sample(&mut rng);

        vertices.push([x, y, z]);
    }

    vertices
}

/// Samples `n` vertices clustered around `center`, each coordinate drawn from a [Normal]
/// distribution.
///
/// The default spread is `σ = 0.1`.
pub fn sample_clustered_vertices_3d(n: usize, center: Vertex3, std_dev: Option<f64>) -> Vec<Vertex3> {
    let mut rng = rand::rng();
    let std_dev = std_dev.unwrap_or(0.1);

    let normals = center.map(|mean| Normal::new(mean, std_dev).unwrap());

    (0..n)
        .map(|_| normals.map(|normal| normal.sample(&mut rng)))
        .collect()
}

/// The eight corners of the axis-aligned unit cube `[0, 1]^3`.
pub const fn unit_cube_corners() -> [Vertex3; 8] {
    [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
    ]
}
