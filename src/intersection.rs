//! Intersection tests between bounding volumes, spheres and frustums.
//!
//! All tests are conservative: [`IntersectionResult::Outside`] is only
//! returned when the tested volume provably lies fully outside, while
//! [`IntersectionResult::Intersecting`] may be returned for volumes that are
//! actually outside but lie close to an edge or corner of the frustum.

use crate::{
    geometry::{BoundingVolume, Frustum, FrustumCoherency, Sphere},
    num::Float,
};
use num_traits::Signed;

/// How a tested volume is positioned relative to another volume or region.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntersectionResult {
    /// The volume lies fully outside.
    Outside,
    /// The volume lies fully inside.
    Inside,
    /// The volume may lie partially inside.
    Intersecting,
}

impl IntersectionResult {
    /// Whether any part of the volume may lie inside.
    #[inline]
    pub fn is_visible(self) -> bool {
        self != Self::Outside
    }
}

/// Determines how the box of the given bounding volume is positioned relative
/// to the given frustum.
///
/// Each plane is tested with the box center and the extent of the box along
/// the plane normal. A box fully in the negative halfspace of any plane is
/// outside. A frustum with no planes contains everything.
pub fn bounding_volume_frustum<F: Float>(
    volume: &BoundingVolume<F>,
    frustum: &Frustum<F>,
) -> IntersectionResult {
    let mut result = IntersectionResult::Inside;

    for plane in frustum.planes() {
        let distance = plane.compute_signed_distance(volume.center());
        let projected_radius = plane.compute_projected_radius(volume.half_extents());

        if distance + projected_radius < F::ZERO {
            return IntersectionResult::Outside;
        }
        if distance - projected_radius < F::ZERO {
            result = IntersectionResult::Intersecting;
        }
    }

    result
}

/// Like [`bounding_volume_frustum`], but exploits coherence between
/// successive tests to skip planes.
///
/// Testing starts at the plane that last rejected a volume, since nearby or
/// slowly moving objects tend to be rejected by the same plane. Planes whose
/// bit is cleared in the plane mask are skipped.
///
/// If the volume is outside, the rejecting plane is recorded and the mask is
/// left as it was. Otherwise the mask is replaced by the set of planes the
/// box straddles. Volumes enclosed by the tested one can never cross the
/// other planes, so the updated state can be passed on when testing them.
/// When moving on to an unrelated volume, restore the mask with
/// [`FrustumCoherency::with_restored_mask`] first.
pub fn bounding_volume_frustum_coherent<F: Float>(
    volume: &BoundingVolume<F>,
    frustum: &Frustum<F>,
    coherency: &mut FrustumCoherency,
) -> IntersectionResult {
    let plane_count = frustum.count();
    let first_plane_idx = (coherency.last_outside_plane() as usize)
        .checked_rem(plane_count)
        .unwrap_or(0);

    let mut result = IntersectionResult::Inside;
    let mut straddled_plane_mask = 0;

    for offset in 0..plane_count {
        let plane_idx = (first_plane_idx + offset) % plane_count;

        if !coherency.plane_is_enabled(plane_idx) {
            continue;
        }

        let plane = frustum.plane(plane_idx);
        let distance = plane.compute_signed_distance(volume.center());
        let projected_radius = plane.compute_projected_radius(volume.half_extents());

        if distance + projected_radius < F::ZERO {
            coherency.record_outside_plane(plane_idx);
            return IntersectionResult::Outside;
        }
        if distance - projected_radius < F::ZERO {
            if plane_idx < FrustumCoherency::MAX_MASKED_PLANES {
                straddled_plane_mask |= 1 << plane_idx;
            }
            result = IntersectionResult::Intersecting;
        }
    }

    coherency.set_plane_mask(straddled_plane_mask);

    result
}

/// Determines whether two bounding volumes can overlap.
///
/// The volumes are outside each other if their spheres are disjoint or their
/// boxes are separated along a coordinate axis. Volumes that touch count as
/// intersecting. Containment is not detected, so
/// [`IntersectionResult::Inside`] is never returned.
pub fn bounding_volumes<F: Float>(
    volume_1: &BoundingVolume<F>,
    volume_2: &BoundingVolume<F>,
) -> IntersectionResult {
    let displacement = volume_2.center() - volume_1.center();
    let radius_sum = volume_1.radius() + volume_2.radius();

    if displacement.norm_squared() > radius_sum * radius_sum {
        return IntersectionResult::Outside;
    }

    let extent_sum = volume_1.half_extents() + volume_2.half_extents();
    if displacement
        .iter()
        .zip(extent_sum.iter())
        .any(|(distance, extent)| <F as Signed>::abs(distance) > *extent)
    {
        return IntersectionResult::Outside;
    }

    IntersectionResult::Intersecting
}

/// Determines how the given sphere is positioned relative to the given
/// frustum, assuming the frustum planes have unit normals.
pub fn bounding_sphere_frustum<F: Float>(
    sphere: &Sphere<F>,
    frustum: &Frustum<F>,
) -> IntersectionResult {
    let radius = sphere.radius();
    let mut result = IntersectionResult::Inside;

    for plane in frustum.planes() {
        let distance = plane.compute_signed_distance(sphere.center());

        if distance < -radius {
            return IntersectionResult::Outside;
        }
        if distance < radius {
            result = IntersectionResult::Intersecting;
        }
    }

    result
}
