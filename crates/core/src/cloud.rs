use crate::{Point, PointSink};

/// Structure-of-arrays point container.
///
/// This is the reference [`PointSink`]: it splits the incoming records into
/// per-attribute columns. Colors and normals are always present, one entry
/// per point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub colors: Colors,
    pub normals: Normals,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normals {
    pub nx: Vec<f32>,
    pub ny: Vec<f32>,
    pub nz: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
    pub a: Vec<u8>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: Colors::default(),
            normals: Normals::default(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
            colors: Colors {
                r: Vec::with_capacity(n),
                g: Vec::with_capacity(n),
                b: Vec::with_capacity(n),
                a: Vec::with_capacity(n),
            },
            normals: Normals {
                nx: Vec::with_capacity(n),
                ny: Vec::with_capacity(n),
                nz: Vec::with_capacity(n),
            },
        }
    }

    pub fn push(&mut self, p: &Point) {
        self.x.push(p.position[0]);
        self.y.push(p.position[1]);
        self.z.push(p.position[2]);
        self.colors.r.push(p.color[0]);
        self.colors.g.push(p.color[1]);
        self.colors.b.push(p.color[2]);
        self.colors.a.push(p.color[3]);
        self.normals.nx.push(p.normal[0]);
        self.normals.ny.push(p.normal[1]);
        self.normals.nz.push(p.normal[2]);
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Per-axis `(min, max)` over points whose coordinates are all finite.
    /// `None` when no such point exists.
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        self.iter_positions()
            .filter(|p| p.iter().all(|v| v.is_finite()))
            .fold(None, |acc, p| {
                let (mut lo, mut hi) = acc.unwrap_or((p, p));
                for axis in 0..3 {
                    lo[axis] = lo[axis].min(p[axis]);
                    hi[axis] = hi[axis].max(p[axis]);
                }
                Some((lo, hi))
            })
    }

    /// Reassembles the record at `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn point(&self, i: usize) -> Point {
        Point {
            position: [self.x[i], self.y[i], self.z[i]],
            color: [
                self.colors.r[i],
                self.colors.g[i],
                self.colors.b[i],
                self.colors.a[i],
            ],
            normal: [self.normals.nx[i], self.normals.ny[i], self.normals.nz[i]],
        }
    }

    pub fn iter_positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    pub fn iter_points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len()).map(move |i| self.point(i))
    }

    pub fn to_points(&self) -> Vec<Point> {
        self.iter_points().collect()
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl PointSink for PointCloud {
    fn from_points(points: Vec<Point>) -> Self {
        let mut cloud = Self::with_capacity(points.len());
        for p in &points {
            cloud.push(p);
        }
        cloud
    }
}
