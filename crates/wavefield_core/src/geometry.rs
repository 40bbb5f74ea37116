//! Base-mesh normals for lighting.

use nalgebra::{Point3, Vector3};

/// Area-weighted vertex normals: each triangle adds its unnormalized face
/// normal to its three vertices, then every sum is normalized. Vertices with
/// no (or only degenerate) incident triangles get a zero normal.
pub fn vertex_normals(positions: &[Point3<f64>], triangles: &[[u32; 3]]) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); positions.len()];
    for &[a, b, c] in triangles {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let pa = positions[a];
        let pb = positions[b];
        let pc = positions[c];
        let face = (pc - pb).cross(&(pa - pb));
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros))
        .collect()
}

/// Flattens normals into a `3N` buffer for a vertex attribute.
pub fn flatten(normals: &[Vector3<f64>]) -> Vec<f32> {
    normals
        .iter()
        .flat_map(|n| [n.x as f32, n.y as f32, n.z as f32])
        .collect()
}
