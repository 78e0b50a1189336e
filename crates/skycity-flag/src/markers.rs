//! Debug markers: a small octahedron at every flag control point

use skycity_core::{MeshData, Vec3, Vertex};

const FALLBACK_NORMAL: Vec3 = Vec3::UP;

/// Octahedron corner indices per face, wound outward.
const FACES: [[usize; 3]; 8] = [
    [0, 2, 1],
    [0, 3, 2],
    [0, 4, 3],
    [0, 1, 4],
    [5, 1, 2],
    [5, 2, 3],
    [5, 3, 4],
    [5, 4, 1],
];

pub const VERTICES_PER_MARKER: usize = FACES.len() * 3;

/// Flat-shaded marker triangles, three unshared vertices per face.
pub fn marker_vertices(points: &[Vec3], size: f32, color: Vec3) -> Vec<Vertex> {
    let h = size * 0.5;
    let corners = [
        Vec3::new(0.0, h, 0.0),
        Vec3::new(h, 0.0, 0.0),
        Vec3::new(0.0, 0.0, h),
        Vec3::new(-h, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -h),
        Vec3::new(0.0, -h, 0.0),
    ];
    let color = [color.x, color.y, color.z, 1.0];

    let mut vertices = Vec::with_capacity(points.len() * VERTICES_PER_MARKER);
    for &center in points {
        for face in &FACES {
            let p = face.map(|c| center + corners[c]);
            let normal = face_normal(p[0], p[1], p[2]);
            for position in p {
                vertices.push(Vertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: [0.0, 0.0],
                    color,
                });
            }
        }
    }
    vertices
}

/// Marker mesh with sequential indices, for initial upload.
pub fn marker_mesh(points: &[Vec3], size: f32, color: Vec3) -> MeshData {
    let vertices = marker_vertices(points, size, color);
    let indices = (0..vertices.len() as u32).collect();
    MeshData { vertices, indices }
}

fn face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    let n = (p1 - p0).cross(&(p2 - p0));
    let len = n.length();
    if !len.is_finite() || len < 1e-4 {
        FALLBACK_NORMAL
    } else {
        n / len
    }
}
