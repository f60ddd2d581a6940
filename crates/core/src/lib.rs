#![forbid(unsafe_code)]

pub mod cloud;
pub mod point;
pub mod traits;

pub use cloud::{Colors, Normals, PointCloud};
pub use point::Point;
pub use traits::{HasColor, HasNormal, HasPosition, PointSink};
