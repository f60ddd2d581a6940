//! Extracts the point-list primitives of an in-memory scene.

use cloudingest::mesh::{has_point_cloud, load_point_cloud_from_meshes, MODE_POINTS, MODE_TRIANGLES};
use cloudingest::{MeshPrimitive, PointCloud};

fn main() {
    tracing_subscriber::fmt::init();

    // Mesh 0: a single triangle. Mesh 1: a four-point list with linear colors.
    let meshes = vec![
        vec![MeshPrimitive {
            mode: MODE_TRIANGLES,
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            ..MeshPrimitive::default()
        }],
        vec![MeshPrimitive {
            mode: MODE_POINTS,
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            colors: vec![[0.2, 0.2, 0.2, 1.0]; 4],
            indices: vec![0, 1, 2, 3],
            ..MeshPrimitive::default()
        }],
    ];

    for mesh in 0..meshes.len() {
        println!("mesh {mesh}: point cloud = {}", has_point_cloud(meshes.as_slice(), mesh));
    }

    let cloud: PointCloud = load_point_cloud_from_meshes(meshes.as_slice(), &[0, 1]);
    println!("Extracted {} points", cloud.len());
    for p in cloud.iter_points() {
        println!("  {:?} color={:?}", p.position, p.color);
    }
}
