use serde::{Deserialize, Serialize};

/// Column mapping for whitespace-delimited text point clouds.
///
/// Indices are zero-based field positions within a line. A negative index, or
/// one past the end of a particular line, leaves that attribute at its
/// default for that line only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsciiColumns {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub r: i32,
    pub g: i32,
    pub b: i32,
    pub nx: i32,
    pub ny: i32,
    pub nz: i32,
    pub a: i32,
    /// Non-blank lines dropped from the start of the file.
    pub lines_to_skip: i32,
    /// Color columns hold 0-1 floats rather than 0-255 integers.
    pub float_colors: bool,
    /// Run the two-pass parse that feeds per-column min/max to the numeric
    /// hook.
    pub compute_min_max: bool,
}

impl Default for AsciiColumns {
    fn default() -> Self {
        Self {
            x: 0,
            y: 1,
            z: 2,
            r: 3,
            g: 4,
            b: 5,
            nx: 6,
            ny: 7,
            nz: 8,
            a: 9,
            lines_to_skip: 0,
            float_colors: false,
            compute_min_max: false,
        }
    }
}

impl AsciiColumns {
    /// Positions only; every other attribute disabled.
    pub fn xyz() -> Self {
        Self {
            r: -1,
            g: -1,
            b: -1,
            nx: -1,
            ny: -1,
            nz: -1,
            a: -1,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AsciiColumns;

    #[test]
    fn defaults_are_sequential() {
        let c = AsciiColumns::default();
        let idx = [c.x, c.y, c.z, c.r, c.g, c.b, c.nx, c.ny, c.nz, c.a];
        assert_eq!(idx, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(c.lines_to_skip, 0);
        assert!(!c.float_colors);
        assert!(!c.compute_min_max);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: AsciiColumns =
            serde_json::from_str(r#"{ "z": 10, "lines_to_skip": 2, "float_colors": true }"#)
                .unwrap();
        assert_eq!(c.z, 10);
        assert_eq!(c.x, 0);
        assert_eq!(c.a, 9);
        assert_eq!(c.lines_to_skip, 2);
        assert!(c.float_colors);
    }
}
