use crate::Point;

pub trait HasPosition {
    fn position(&self) -> [f64; 3];
}

pub trait HasColor {
    fn color(&self) -> [u8; 4];
}

pub trait HasNormal {
    fn normal(&self) -> [f32; 3];
}

impl HasPosition for Point {
    fn position(&self) -> [f64; 3] {
        self.position
    }
}

impl HasColor for Point {
    fn color(&self) -> [u8; 4] {
        self.color
    }
}

impl HasNormal for Point {
    fn normal(&self) -> [f32; 3] {
        self.normal
    }
}

/// Downstream consumer of a finished point sequence.
///
/// Parsers hand over the whole ordered sequence at once; the sink owns it from
/// then on and builds whatever internal representation it needs.
pub trait PointSink: Sized {
    fn from_points(points: Vec<Point>) -> Self;
}

impl PointSink for Vec<Point> {
    fn from_points(points: Vec<Point>) -> Self {
        points
    }
}
