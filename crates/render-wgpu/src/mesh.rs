use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};
use thiserror::Error;

/// Geometry that cannot be drawn with 16-bit indices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("sphere with {rings} rings and {segments} segments needs {vertices} vertices, above the 16-bit index limit")]
    TooManyVertices {
        rings: u32,
        segments: u32,
        vertices: usize,
    },
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Two overlapping triangles in the z = 0 plane.
#[rustfmt::skip]
pub const TRIANGLE_PAIR: [[f32; 3]; 6] = [
    [-0.6,  0.5, 0.0],
    [ 0.0,  0.7, 0.0],
    [ 0.7, -0.2, 0.0],
    [-0.5, -0.3, 0.0],
    [-0.3,  0.6, 0.0],
    [ 0.8,  0.4, 0.0],
];

/// Unit-radius UV sphere, counter-clockwise when seen from outside.
///
/// At least 2 rings and 3 segments are generated. Fails when the vertex
/// count does not fit `u16` indices.
pub fn uv_sphere(rings: u32, segments: u32) -> Result<(Vec<Vertex>, Vec<u16>), MeshError> {
    let rings = rings.max(2);
    let segments = segments.max(3);
    let vertex_count = (rings as usize + 1).saturating_mul(segments as usize + 1);
    if vertex_count > u16::MAX as usize + 1 {
        return Err(MeshError::TooManyVertices {
            rings,
            segments,
            vertices: vertex_count,
        });
    }

    let mut vertices = Vec::with_capacity(vertex_count);
    for i in 0..=rings {
        let v = i as f32 / rings as f32;
        let theta = v * PI;
        for j in 0..=segments {
            let u = j as f32 / segments as f32;
            let phi = u * TAU;
            vertices.push(Vertex {
                position: [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()],
                uv: [u, v],
            });
        }
    }

    // Every index is below `vertex_count`, checked above.
    let stride = segments + 1;
    let mut indices = Vec::with_capacity(rings as usize * segments as usize * 6);
    for i in 0..rings {
        for j in 0..segments {
            let a = (i * stride + j) as u16;
            let b = ((i + 1) * stride + j) as u16;
            let c = b + 1;
            let d = a + 1;
            indices.extend_from_slice(&[a, c, b, a, d, c]);
        }
    }
    Ok((vertices, indices))
}
