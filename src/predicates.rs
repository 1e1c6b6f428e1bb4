//! Exact geometric predicates for validating a tetrahedralization.
//!
//! With feature `geogram` (default): uses [geogram_predicates] (FFI to C++ geogram).
//!
//! With feature `wasm`: uses pure-Rust [robust].
//!
//! Both return signs in the convention of Shewchuk's predicates: `orient_3d(a, b, c, d)` is
//! positive if `d` lies below the plane through `a, b, c` (counter-clockwise seen from above), and
//! `in_sphere_3d_SOS` is positive if `p` lies inside the circumsphere of such a positively oriented
//! tetrahedron.

#![allow(non_snake_case)] // match geogram_predicates API (in_sphere_3d_SOS)

use crate::utils::types::Vertex3;

// Exactly one of geogram or wasm must be enabled.
#[cfg(not(any(feature = "geogram", feature = "wasm")))]
compile_error!(
    "Exactly one of features 'geogram' or 'wasm' must be enabled. Use default (geogram) or --no-default-features --features 'std,wasm' for WASM."
);

#[cfg(all(feature = "geogram", feature = "wasm"))]
compile_error!(
    "Features 'geogram' and 'wasm' are mutually exclusive. For WASM use --no-default-features --features 'std,wasm'."
);

/// Normalize predicate result to sign: -1.0, 0.0, or 1.0 so that `==` compares signs.
#[inline]
fn sign_f64(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(all(feature = "geogram", not(feature = "wasm")))]
mod imp {
    use super::*;
    use geogram_predicates as gp;

    // geogram counts orientation the other way round
    #[inline]
    pub fn orient_3d(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> f64 {
        -sign_f64(f64::from(gp::orient_3d(a, b, c, d)))
    }

    #[inline]
    pub fn in_sphere_3d_SOS(
        a: &Vertex3,
        b: &Vertex3,
        c: &Vertex3,
        d: &Vertex3,
        p: &Vertex3,
    ) -> f64 {
        -sign_f64(f64::from(gp::in_sphere_3d_SOS(a, b, c, d, p)))
    }
}

#[cfg(all(feature = "wasm", not(feature = "geogram")))]
mod imp {
    use super::*;
    use robust::{Coord3D, insphere, orient3d};

    #[inline]
    fn coord3(p: &Vertex3) -> Coord3D<f64> {
        Coord3D {
            x: p[0],
            y: p[1],
            z: p[2],
        }
    }

    #[inline]
    pub fn orient_3d(a: &Vertex3, b: &Vertex3, c: &Vertex3, d: &Vertex3) -> f64 {
        sign_f64(orient3d(coord3(a), coord3(b), coord3(c), coord3(d)))
    }

    #[inline]
    pub fn in_sphere_3d_SOS(
        a: &Vertex3,
        b: &Vertex3,
        c: &Vertex3,
        d: &Vertex3,
        p: &Vertex3,
    ) -> f64 {
        sign_f64(insphere(
            coord3(a),
            coord3(b),
            coord3(c),
            coord3(d),
            coord3(p),
        ))
    }
}

pub use imp::{in_sphere_3d_SOS, orient_3d};

/// Whether `p` lies strictly inside the circumsphere of `tet`, in any vertex order.
///
/// Flat tetrahedra have no circumsphere and contain nothing.
pub fn in_circumsphere(tet: &[Vertex3; 4], p: &Vertex3) -> bool {
    let [a, b, c, d] = tet;
    match orient_3d(a, b, c, d) {
        o if o > 0.0 => in_sphere_3d_SOS(a, b, c, d, p) > 0.0,
        o if o < 0.0 => in_sphere_3d_SOS(a, b, d, c, p) > 0.0,
        _ => false,
    }
}
