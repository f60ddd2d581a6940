use cloudingest_core::{Point, PointSink};
use tracing::{debug, warn};

use crate::color::linear_to_srgb8;
use crate::primitive::{MeshError, MeshPrimitive, PrimitiveProvider, MODE_POINTS};

/// Whether any primitive of the mesh is a point list.
pub fn has_point_cloud<P>(provider: &P, mesh: usize) -> bool
where
    P: PrimitiveProvider + ?Sized,
{
    provider
        .primitive_modes(mesh)
        .is_some_and(|modes| modes.contains(&MODE_POINTS))
}

/// Appends one point per index of a point-list primitive.
///
/// Other topologies contribute nothing.
pub fn points_from_primitive(primitive: &MeshPrimitive, out: &mut Vec<Point>) {
    if !primitive.is_point_list() {
        return;
    }
    out.reserve(primitive.indices.len());
    for &index in &primitive.indices {
        let i = index as usize;
        let mut point = Point::default();
        if let Some(p) = primitive.positions.get(i) {
            point.position = p.map(f64::from);
        }
        if let Some(c) = primitive.colors.get(i) {
            point.color = linear_to_srgb8(*c);
        }
        if let Some(n) = primitive.normals.get(i) {
            point.normal = *n;
        }
        out.push(point);
    }
}

fn collect_points(primitives: &[MeshPrimitive], out: &mut Vec<Point>) {
    for primitive in primitives {
        points_from_primitive(primitive, out);
    }
}

pub fn load_points_from_mesh<P>(provider: &P, mesh: usize) -> Result<Vec<Point>, MeshError>
where
    P: PrimitiveProvider + ?Sized,
{
    let primitives = provider.load_primitives(mesh)?;
    let mut points = Vec::new();
    collect_points(&primitives, &mut points);
    debug!(mesh, primitives = primitives.len(), points = points.len(), "extracted mesh points");
    Ok(points)
}

/// Concatenates the point primitives of several meshes in the given order.
///
/// Meshes that cannot be loaded are skipped.
pub fn load_points_from_meshes<P>(provider: &P, meshes: &[usize]) -> Vec<Point>
where
    P: PrimitiveProvider + ?Sized,
{
    let mut points = Vec::new();
    for &mesh in meshes {
        match provider.load_primitives(mesh) {
            Ok(primitives) => collect_points(&primitives, &mut points),
            Err(err) => warn!(mesh, %err, "skipping mesh"),
        }
    }
    debug!(meshes = meshes.len(), points = points.len(), "extracted mesh points");
    points
}

pub fn load_point_cloud_from_mesh<S, P>(provider: &P, mesh: usize) -> Result<S, MeshError>
where
    S: PointSink,
    P: PrimitiveProvider + ?Sized,
{
    load_points_from_mesh(provider, mesh).map(S::from_points)
}

pub fn load_point_cloud_from_meshes<S, P>(provider: &P, meshes: &[usize]) -> S
where
    S: PointSink,
    P: PrimitiveProvider + ?Sized,
{
    S::from_points(load_points_from_meshes(provider, meshes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::MODE_TRIANGLES;
    use cloudingest_core::PointCloud;

    fn point_list(indices: Vec<u32>) -> MeshPrimitive {
        MeshPrimitive {
            mode: MODE_POINTS,
            positions: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            colors: vec![[1.0, 0.0, 0.0, 1.0]],
            normals: vec![],
            indices,
        }
    }

    fn triangles() -> MeshPrimitive {
        MeshPrimitive {
            mode: MODE_TRIANGLES,
            positions: vec![[0.0; 3]; 3],
            indices: vec![0, 1, 2],
            ..MeshPrimitive::default()
        }
    }

    #[test]
    fn point_list_emits_one_point_per_index() {
        let mut out = Vec::new();
        points_from_primitive(&point_list(vec![0, 0, 1]), &mut out);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(out[1].position, [1.0, 2.0, 3.0]);
        assert_eq!(out[2].position, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn short_attribute_arrays_leave_defaults() {
        let mut out = Vec::new();
        points_from_primitive(&point_list(vec![0, 1, 7]), &mut out);
        assert_eq!(out[0].color, [255, 0, 0, 255]);
        assert_eq!(out[1].color, Point::default().color);
        assert_eq!(out[2], Point::default());
        assert!(out.iter().all(|p| p.normal == [0.0; 3]));
    }

    #[test]
    fn other_topologies_contribute_nothing() {
        let mut out = Vec::new();
        points_from_primitive(&triangles(), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn has_point_cloud_checks_modes() {
        let meshes = vec![vec![triangles()], vec![triangles(), point_list(vec![0])]];
        assert!(!has_point_cloud(meshes.as_slice(), 0));
        assert!(has_point_cloud(meshes.as_slice(), 1));
        assert!(!has_point_cloud(meshes.as_slice(), 2));
    }

    #[test]
    fn single_mesh_missing_is_error() {
        let meshes: Vec<Vec<MeshPrimitive>> = vec![];
        assert_eq!(
            load_points_from_mesh(meshes.as_slice(), 3),
            Err(MeshError::MissingMesh(3))
        );
    }

    #[test]
    fn meshes_concatenate_in_order_and_skip_missing() {
        let mut second = point_list(vec![1]);
        second.positions = vec![[0.0; 3], [9.0, 9.0, 9.0]];
        let meshes = vec![vec![point_list(vec![0]), triangles()], vec![second]];
        let points = load_points_from_meshes(meshes.as_slice(), &[0, 5, 1, 0]);
        let xs: Vec<f64> = points.iter().map(|p| p.position[0]).collect();
        assert_eq!(xs, vec![1.0, 9.0, 1.0]);
    }

    #[test]
    fn builds_sink() {
        let meshes = vec![vec![point_list(vec![1, 0])]];
        let cloud: PointCloud = load_point_cloud_from_mesh(meshes.as_slice(), 0).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.x, vec![4.0, 1.0]);
        let all: PointCloud = load_point_cloud_from_meshes(meshes.as_slice(), &[0, 0]);
        assert_eq!(all.len(), 4);
    }
}
