//! # voronoi3d
//!
//! 3D Delaunay tetrahedralization and its dual Voronoi diagram, computed as the lower convex hull
//! of the points lifted onto a paraboloid in 4D. Optionally periodic in an axis-aligned box.
#![forbid(unsafe_code)]
#![deny(unused, clippy::incompatible_msrv)]
#![warn(clippy::all, clippy::missing_const_for_fn)]

pub use error::{CenterWarning, GeometryError};
pub use node::VertexNode;
pub use periodic::PeriodicBox;
pub use tetrahedralization::{Options, Tetrahedralization};
pub use voronoi::{CenterType, VoronoiDiagram};

pub mod adjacency;
pub mod error;
pub mod hull;
pub mod lift;
pub mod node;
pub mod periodic;
mod predicates;
pub mod tetrahedralization;
mod utils;
pub mod voronoi;
#[cfg(feature = "wasm")]
mod wasm;
