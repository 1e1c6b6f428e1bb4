//! WASM bindings for 3D Delaunay tetrahedralization and its Voronoi diagram.
//!
//! Provides a single function `tetrahedralize` that takes flat point coordinates, an optional
//! center type and an optional periodic box, and returns typed arrays ready for rendering.

use crate::{
    periodic::PeriodicBox,
    tetrahedralization::{Options, Tetrahedralization},
    voronoi::CenterType,
};
use wasm_bindgen::prelude::*;

/// 3D Delaunay tetrahedralization with its Voronoi diagram.
///
/// # Arguments
/// * `points` - Flat array of 3D coordinates: [x1, y1, z1, x2, y2, z2, ...]
/// * `center_type` - `"circumcenter"` (default) or `"barycenter"`, pass `null` or omit for the
///   default.
/// * `periodic` - Optional periodic box as `[min_x, min_y, min_z, max_x, max_y, max_z]`.
///
/// # Returns
/// A JavaScript object with:
/// * `tetrahedra` - `Uint32Array` of point indices, 4 per tetrahedron
/// * `vertices` - `Float64Array` of Voronoi vertex coordinates, 3 per vertex
/// * `voronoiEdges` - `Uint32Array` of Voronoi vertex indices, 2 per edge
/// * `voronoiFaces` - Array of `Uint32Array`, the Voronoi vertex indices of each face in order
#[wasm_bindgen(js_name = tetrahedralize)]
pub fn tetrahedralize(
    points: &[f64],
    center_type: Option<String>,
    periodic: Option<Vec<f64>>,
) -> Result<JsValue, JsValue> {
    let points = parse_points(points)?;

    let mut options = Options::default();
    if let Some(center_type) = center_type {
        let center_type: CenterType = center_type
            .parse()
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        options = options.with_center_type(center_type);
    }
    if let Some(periodic) = periodic {
        options = options.with_periodic(parse_periodic_box(&periodic)?);
    }

    let tetrahedralization = Tetrahedralization::build(&points, options)
        .map_err(|e| JsValue::from_str(&format!("tetrahedralize failed: {e:#}")))?;
    let voronoi = tetrahedralization.voronoi();

    let tets = to_u32(tetrahedralization.tets().iter().flatten().copied())?;
    let vertices: Vec<f64> = voronoi.vertices().iter().flatten().copied().collect();
    let edges = to_u32(voronoi.edges().iter().flat_map(|edge| edge.vertices))?;

    let faces_js = js_sys::Array::new();
    for face in voronoi.faces() {
        let face = to_u32(face.vertices.iter().copied())?;
        faces_js.push(&js_sys::Uint32Array::from(face.as_slice()));
    }

    let result = js_sys::Object::new();
    js_sys::Reflect::set(
        &result,
        &"tetrahedra".into(),
        &js_sys::Uint32Array::from(tets.as_slice()),
    )?;
    js_sys::Reflect::set(
        &result,
        &"vertices".into(),
        &js_sys::Float64Array::from(vertices.as_slice()),
    )?;
    js_sys::Reflect::set(
        &result,
        &"voronoiEdges".into(),
        &js_sys::Uint32Array::from(edges.as_slice()),
    )?;
    js_sys::Reflect::set(&result, &"voronoiFaces".into(), &faces_js)?;
    Ok(result.into())
}

fn parse_points(flat: &[f64]) -> Result<Vec<[f64; 3]>, JsValue> {
    if flat.len() % 3 != 0 {
        return Err(JsValue::from_str(
            "Points must have a length divisible by 3 (triples of x, y, z)",
        ));
    }
    Ok(flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

fn parse_periodic_box(flat: &[f64]) -> Result<PeriodicBox, JsValue> {
    match *flat {
        [min_x, min_y, min_z, max_x, max_y, max_z] => {
            PeriodicBox::new([min_x, min_y, min_z], [max_x, max_y, max_z])
                .map_err(|e| JsValue::from_str(&format!("{e}")))
        }
        _ => Err(JsValue::from_str(
            "Periodic box must be [min_x, min_y, min_z, max_x, max_y, max_z]",
        )),
    }
}

/// Indices cross the JS boundary as `u32`.
fn to_u32(indices: impl Iterator<Item = usize>) -> Result<Vec<u32>, JsValue> {
    indices
        .map(|idx| u32::try_from(idx).map_err(|_| JsValue::from_str("Index exceeds u32 range")))
        .collect()
}
