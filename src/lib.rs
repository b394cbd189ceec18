//! Bounding volumes, frustums and the intersection tests used for culling.

#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(clippy::cast_lossless)]

pub mod geometry;
pub mod intersection;
pub mod num;

pub use intersection::IntersectionResult;
