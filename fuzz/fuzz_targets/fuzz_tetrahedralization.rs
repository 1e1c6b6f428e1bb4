#![no_main]

use libfuzzer_sys::fuzz_target;
use voronoi3d::{Options, Tetrahedralization};

fuzz_target!(|data: (Vec<[f64; 3]>, Options)| {
    let (points, options) = data;

    if let Ok(tetrahedralization) = Tetrahedralization::build(&points, options) {
        assert!(tetrahedralization.is_sound());

        let voronoi = tetrahedralization.voronoi();
        assert!(voronoi.faces().iter().all(|face| face.vertices.len() >= 3));
    }
});
