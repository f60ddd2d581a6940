/// A single normalized point as produced by every parser in the workspace.
///
/// Positions are kept in double precision so georeferenced ASCII exports
/// survive intact; colors are 8-bit RGBA and normals single precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: [f64; 3],
    pub color: [u8; 4],
    pub normal: [f32; 3],
}

impl Point {
    pub fn new(position: [f64; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_normal(mut self, normal: [f32; 3]) -> Self {
        self.normal = normal;
        self
    }
}

impl Default for Point {
    /// Origin, black, fully opaque, zero normal.
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            color: [0, 0, 0, 255],
            normal: [0.0; 3],
        }
    }
}
