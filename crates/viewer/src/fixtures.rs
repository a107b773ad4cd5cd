//! Factory functions for creating test geometry.
//!
//! Also used by the binary for its demo scene.

use shared::PolyData;

/// Unit right triangle in the z=0 plane, counter-clockwise (normal +Z)
pub fn triangle() -> PolyData {
    PolyData::mesh(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![vec![0, 1, 2]],
    )
}

/// Square `[0, size] x [0, size]` in the z=0 plane as a single quad
pub fn square(size: f64) -> PolyData {
    PolyData::mesh(
        vec![
            [0.0, 0.0, 0.0],
            [size, 0.0, 0.0],
            [size, size, 0.0],
            [0.0, size, 0.0],
        ],
        vec![vec![0, 1, 2, 3]],
    )
}

/// Axis-aligned cube centered at the origin, quads wound outward
pub fn cube(size: f64) -> PolyData {
    let h = size * 0.5;
    PolyData::mesh(
        vec![
            [-h, -h, -h],
            [h, -h, -h],
            [h, h, -h],
            [-h, h, -h],
            [-h, -h, h],
            [h, -h, h],
            [h, h, h],
            [-h, h, h],
        ],
        vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![2, 3, 7, 6],
            vec![1, 2, 6, 5],
            vec![3, 0, 4, 7],
        ],
    )
}

/// Cube translated so that it floats half-submerged around z=0
pub fn floating_box(length: f64, width: f64, height: f64) -> PolyData {
    let mut pd = cube(1.0);
    for p in &mut pd.points {
        p[0] *= length;
        p[1] *= width;
        p[2] *= height;
    }
    pd
}

/// Line cell with three endpoint indices
pub fn malformed_line() -> PolyData {
    PolyData {
        points: vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
        lines: vec![vec![0, 1, 2]],
        ..Default::default()
    }
}
