//! Point-cloud ingestion.
//!
//! Normalizes text point clouds (XYZ-style), PCD files and point-list mesh
//! primitives into a flat sequence of [`Point`] records and hands them to a
//! [`PointSink`].

#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;
use tracing::debug;

pub use cloudingest_core::{Point, PointCloud, PointSink};
pub use cloudingest_io::{
    AsciiColumns, AsciiHooks, ColumnRange, LoadError, LzfError, PcdDataKind, PcdOptions,
    Viewpoint,
};
pub use cloudingest_mesh::{MeshError, MeshPrimitive, PrimitiveProvider};

pub mod io {
    pub use cloudingest_io::*;
}

pub mod mesh {
    pub use cloudingest_mesh::*;
}

/// On-disk encodings recognized by [`load_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCloudFormat {
    Pcd,
    Ascii,
}

impl PointCloudFormat {
    /// Picks a format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pcd" => Some(Self::Pcd),
            "xyz" | "txt" | "asc" | "pts" => Some(Self::Ascii),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub columns: AsciiColumns,
    pub pcd: PcdOptions,
}

/// Reads a point cloud file and builds the requested sink.
pub fn load_file<S: PointSink>(
    path: impl AsRef<Path>,
    options: &FileOptions,
) -> Result<S, LoadError> {
    let path = path.as_ref();
    let format = PointCloudFormat::from_path(path).ok_or_else(|| {
        LoadError::InvalidConfig(format!("unrecognized point cloud extension: {}", path.display()))
    })?;
    let raw = fs::read(path)?;
    debug!(path = %path.display(), ?format, bytes = raw.len(), "loading point cloud");

    let points = match format {
        PointCloudFormat::Pcd => cloudingest_io::parse_pcd(&raw, &options.pcd)?,
        PointCloudFormat::Ascii => cloudingest_io::parse_ascii(&raw, &options.columns)?,
    };
    Ok(S::from_points(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        let format = |p: &str| PointCloudFormat::from_path(Path::new(p));
        assert_eq!(format("a/b.PCD"), Some(PointCloudFormat::Pcd));
        assert_eq!(format("scan.xyz"), Some(PointCloudFormat::Ascii));
        assert_eq!(format("scan.las"), None);
        assert_eq!(format("noext"), None);
    }

    #[test]
    fn comma_separated_files_are_rejected() {
        assert_eq!(PointCloudFormat::from_path(Path::new("scan.csv")), None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.csv");
        fs::write(&path, "1.5,2.5,3.5,255,0,0\n").unwrap();
        let result = load_file::<Vec<Point>>(&path, &FileOptions::default());
        assert!(matches!(result, Err(LoadError::InvalidConfig(_))));
    }

    #[test]
    fn unknown_extension_is_invalid_config() {
        let result = load_file::<PointCloud>("cloud.ply", &FileOptions::default());
        assert!(matches!(result, Err(LoadError::InvalidConfig(_))));
    }
}
