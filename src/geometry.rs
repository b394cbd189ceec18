//! Geometrical objects.

mod axis_aligned_box;
mod bounding_volume;
mod frustum;
mod plane;
mod projection;
mod sphere;

pub use axis_aligned_box::AxisAlignedBox;
pub use bounding_volume::BoundingVolume;
pub use frustum::{Frustum, FrustumCoherency, FrustumPlane, INLINE_PLANE_COUNT};
pub use plane::Plane;
pub use projection::{OrthographicTransform, PerspectiveTransform};
pub use sphere::Sphere;
