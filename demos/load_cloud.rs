//! Loads a `.pcd` or text point cloud and prints a short summary.
//!
//! ```text
//! RUST_LOG=debug cargo run --example load_cloud -- scan.pcd
//! ```

use cloudingest::{load_file, FileOptions, PointCloud};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: load_cloud <file.pcd|file.xyz>");
        std::process::exit(2);
    };

    let cloud: PointCloud = match load_file(&path, &FileOptions::default()) {
        Ok(cloud) => cloud,
        Err(err) => {
            eprintln!("failed to load {path}: {err}");
            std::process::exit(1);
        }
    };

    println!("Loaded {} points from {}", cloud.len(), path);
    if let Some((lo, hi)) = cloud.bounds() {
        println!("Bounding box: min={lo:?}, max={hi:?}");
    }
    if let Some(first) = cloud.iter_points().next() {
        println!("First point: {first:?}");
    };
}
