//! End-to-end loading through the facade.

use cloudingest::mesh::{MODE_POINTS, MODE_TRIANGLES};
use cloudingest::{load_file, AsciiColumns, FileOptions, MeshPrimitive, Point, PointCloud};
use std::io::Write;

#[test]
fn xyz_file_through_load_file() {
    let mut tmp = tempfile::Builder::new().suffix(".xyz").tempfile().unwrap();
    writeln!(tmp, "// exported scan").unwrap();
    writeln!(tmp, "0.5 1.5 2.5 0.0 1.0 0.5").unwrap();
    writeln!(tmp, "3.0 4.0 5.0 1.0 1.0 1.0").unwrap();
    tmp.flush().unwrap();

    let options = FileOptions {
        columns: AsciiColumns {
            lines_to_skip: 1,
            float_colors: true,
            ..AsciiColumns::default()
        },
        ..FileOptions::default()
    };
    let cloud: PointCloud = load_file(tmp.path(), &options).unwrap();
    assert_eq!(cloud.len(), 2);
    assert_eq!(cloud.point(0).position, [0.5, 1.5, 2.5]);
    assert_eq!(cloud.point(0).color, [0, 255, 128, 255]);
    assert_eq!(cloud.point(1).color, [255, 255, 255, 255]);

    let (lo, hi) = cloud.bounds().unwrap();
    assert_eq!(lo, [0.5, 1.5, 2.5]);
    assert_eq!(hi, [3.0, 4.0, 5.0]);
}

#[test]
fn pcd_file_through_load_file() {
    let tmp = tempfile::Builder::new().suffix(".pcd").tempfile().unwrap();
    let points = vec![Point::new([1.0, 1.0, 1.0]), Point::new([2.0, 2.0, 2.0])];
    cloudingest::io::write_pcd(tmp.path(), &points, cloudingest::PcdDataKind::BinaryCompressed)
        .unwrap();

    let loaded: Vec<Point> = load_file(tmp.path(), &FileOptions::default()).unwrap();
    assert_eq!(loaded, points);
}

#[test]
fn invalid_skip_yields_no_result() {
    let mut tmp = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(tmp, "1 2 3").unwrap();
    tmp.flush().unwrap();

    let options = FileOptions {
        columns: AsciiColumns {
            lines_to_skip: 2,
            ..AsciiColumns::default()
        },
        ..FileOptions::default()
    };
    assert!(load_file::<PointCloud>(tmp.path(), &options).is_err());
}

#[test]
fn mesh_points_feed_the_same_sink() {
    let meshes = vec![
        vec![MeshPrimitive {
            mode: MODE_TRIANGLES,
            positions: vec![[0.0; 3]; 3],
            indices: vec![0, 1, 2],
            ..MeshPrimitive::default()
        }],
        vec![MeshPrimitive {
            mode: MODE_POINTS,
            positions: vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 2],
            indices: vec![0, 0, 1],
            ..MeshPrimitive::default()
        }],
    ];

    assert!(!cloudingest::mesh::has_point_cloud(meshes.as_slice(), 0));
    let cloud: PointCloud =
        cloudingest::mesh::load_point_cloud_from_meshes(meshes.as_slice(), &[0, 1]);
    assert_eq!(cloud.len(), 3);
    assert_eq!(cloud.x, vec![1.0, 1.0, 0.0]);
    assert_eq!(cloud.normals.nz, vec![1.0; 3]);
}
