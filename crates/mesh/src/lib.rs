#![forbid(unsafe_code)]

pub mod adapter;
pub mod color;
pub mod primitive;

pub use adapter::{
    has_point_cloud, load_point_cloud_from_mesh, load_point_cloud_from_meshes,
    load_points_from_mesh, load_points_from_meshes, points_from_primitive,
};
pub use color::{linear_to_srgb8, linear_to_srgb_channel};
pub use primitive::{MeshError, MeshPrimitive, PrimitiveProvider, MODE_POINTS, MODE_TRIANGLES};
