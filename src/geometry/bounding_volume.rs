//! Combined bounding sphere and axis-aligned box.

use crate::{
    geometry::{AxisAlignedBox, Sphere},
    num::Float,
};
use nalgebra::{Matrix4, Point3, Similarity3, UnitQuaternion, Vector3, Vector4};

/// A bounding volume made up of a bounding sphere and the half extents of an
/// axis-aligned box sharing its center with the sphere.
///
/// Besides the current sphere and half extents, the volume keeps a rest pose,
/// which is what the volume looked like in the local space of the object it
/// bounds. The `update_from_*` transform methods always derive the current
/// pose from the rest pose, so repeatedly updating a volume with per-frame
/// world transforms does not accumulate error.
///
/// The null volume, created by [`Self::null`] or [`Self::nullify`], bounds
/// nothing and is ignored when merging. A volume around a single point has
/// zero radius but is not null.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingVolume<F: Float> {
    sphere: Sphere<F>,
    half_extents: Vector3<F>,
    rest_sphere: Sphere<F>,
    rest_half_extents: Vector3<F>,
    is_null: bool,
}

impl<F: Float> BoundingVolume<F> {
    /// Creates a new bounding volume for the box with the given center and
    /// half extents. The sphere is the one passing through the corners of the
    /// box.
    pub fn from_box(center: Point3<F>, half_extents: Vector3<F>) -> Self {
        Self::from_sphere_and_half_extents(
            Sphere::enclosing_box(center, &half_extents),
            half_extents,
        )
    }

    /// Creates a new bounding volume for the given axis-aligned box.
    pub fn from_axis_aligned_box(aabb: &AxisAlignedBox<F>) -> Self {
        Self::from_box(aabb.center(), aabb.half_size())
    }

    /// Creates a new bounding volume with the given center, box half extents
    /// and sphere radius. The radius is used as is, even if the sphere does
    /// not enclose the box.
    pub fn new(center: Point3<F>, half_extents: Vector3<F>, radius: F) -> Self {
        Self::from_sphere_and_half_extents(Sphere::new(center, radius), half_extents)
    }

    /// Creates a new bounding volume with the given bounding sphere and box
    /// half extents.
    pub fn from_sphere_and_half_extents(sphere: Sphere<F>, half_extents: Vector3<F>) -> Self {
        debug_assert!(
            half_extents.iter().all(|&extent| extent >= F::ZERO),
            "Bounding volume half extents must be non-negative"
        );
        Self {
            sphere,
            half_extents,
            rest_sphere: sphere,
            rest_half_extents: half_extents,
            is_null: false,
        }
    }

    /// Creates the null bounding volume, which bounds nothing. It is placed
    /// at the origin with zero radius and extents.
    pub fn null() -> Self {
        Self {
            is_null: true,
            ..Self::from_sphere_and_half_extents(Sphere::zero(), Vector3::zeros())
        }
    }

    /// Resets the volume to the null volume.
    pub fn nullify(&mut self) {
        *self = Self::null();
    }

    /// Whether this is the null volume. Transform updates keep a null volume
    /// null, while a refit to points or a merge with a non-null volume makes
    /// it non-null.
    pub fn is_empty(&self) -> bool {
        self.is_null
    }

    /// Returns the center of the volume.
    #[inline]
    pub fn center(&self) -> &Point3<F> {
        self.sphere.center()
    }

    /// Returns the half extents of the box along each axis.
    #[inline]
    pub fn half_extents(&self) -> &Vector3<F> {
        &self.half_extents
    }

    /// Returns the radius of the bounding sphere.
    #[inline]
    pub fn radius(&self) -> F {
        self.sphere.radius()
    }

    /// Returns the radius replicated into all four lanes of a vector.
    #[inline]
    pub fn vradius(&self) -> Vector4<F> {
        Vector4::repeat(self.radius())
    }

    /// Returns the bounding sphere.
    #[inline]
    pub fn sphere(&self) -> &Sphere<F> {
        &self.sphere
    }

    /// Returns the bounding sphere in the rest pose.
    #[inline]
    pub fn rest_sphere(&self) -> &Sphere<F> {
        &self.rest_sphere
    }

    /// Returns the box half extents in the rest pose.
    #[inline]
    pub fn rest_half_extents(&self) -> &Vector3<F> {
        &self.rest_half_extents
    }

    /// Computes the axis-aligned box of the current pose.
    pub fn compute_aabb(&self) -> AxisAlignedBox<F> {
        AxisAlignedBox::from_center_and_half_extents(self.center(), self.half_extents())
    }

    /// Sets the current pose to the rest pose transformed with the given
    /// affine transformation matrix.
    ///
    /// The sphere radius is scaled by the largest basis vector length of the
    /// matrix and the box becomes the axis-aligned box enclosing the
    /// transformed rest box.
    pub fn update_from_matrix(&mut self, transform: &Matrix4<F>) {
        self.sphere = Sphere::new(
            transform.transform_point(self.rest_sphere.center()),
            self.rest_sphere.radius() * compute_max_scale(transform),
        );
        self.half_extents = transform_half_extents(transform, &self.rest_half_extents);
    }

    /// Sets the current pose to the rest pose scaled uniformly, then rotated
    /// and then translated.
    pub fn update_from_scale_rotation_translation(
        &mut self,
        scale: F,
        rotation: &UnitQuaternion<F>,
        translation: &Vector3<F>,
    ) {
        let abs_scale = <F as num_traits::Signed>::abs(&scale);
        self.sphere = Sphere::new(
            rotation.transform_point(self.rest_sphere.center()) * scale + translation,
            self.rest_sphere.radius() * abs_scale,
        );
        self.half_extents =
            rotation.to_rotation_matrix().matrix().abs() * self.rest_half_extents * abs_scale;
    }

    /// Sets the current pose to the rest pose transformed with the given
    /// similarity transform.
    pub fn update_from_similarity(&mut self, transform: &Similarity3<F>) {
        self.update_from_scale_rotation_translation(
            transform.scaling(),
            &transform.isometry.rotation,
            &transform.isometry.translation.vector,
        );
    }

    /// Grows the volume to contain all the given points and makes the result
    /// the new rest pose. The sphere is re-derived from the grown box.
    ///
    /// The box of the null volume is not included, so the points alone
    /// determine the result. An empty point slice leaves the volume unchanged.
    pub fn update_from_points(&mut self, points: &[Point3<F>]) {
        if points.is_empty() {
            return;
        }

        let initial_aabb = if self.is_empty() {
            AxisAlignedBox::invalid()
        } else {
            self.compute_aabb()
        };

        let aabb = initial_aabb.appended_points(points);

        log::trace!(
            "Refitted bounding volume to {} points, new half extents {:?}",
            points.len(),
            aabb.half_size()
        );

        *self = Self::from_axis_aligned_box(&aabb);
    }

    /// Grows the volume to contain the given volume and makes the result the
    /// new rest pose.
    ///
    /// The box becomes the union of the two boxes. The sphere is centered on
    /// the new box center with the smallest radius containing both spheres
    /// about that center. This is generally larger than the tightest sphere
    /// enclosing both, but never smaller than half the sum of the two radii and
    /// the distance between the centers.
    ///
    /// Merging with the null volume leaves this volume unchanged, and merging
    /// into the null volume copies the other volume.
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }

        let aabb = self.compute_aabb().appended_box(&other.compute_aabb());
        let center = aabb.center();

        let radius = (nalgebra::distance(&center, self.center()) + self.radius())
            .max(nalgebra::distance(&center, other.center()) + other.radius());

        *self = Self::new(center, aabb.half_size(), radius);
    }
}

impl<F: Float> Default for BoundingVolume<F> {
    fn default() -> Self {
        Self::null()
    }
}

/// Computes the largest length of the basis vectors in the upper-left 3x3
/// block of the given matrix.
pub(super) fn compute_max_scale<F: Float>(transform: &Matrix4<F>) -> F {
    transform
        .fixed_view::<3, 3>(0, 0)
        .column_iter()
        .map(|basis_vector| basis_vector.norm_squared())
        .fold(F::ZERO, |max, norm_squared| max.max(norm_squared))
        .sqrt()
}

/// Computes the half extents of the axis-aligned box enclosing a box with the
/// given half extents after transforming it with the given matrix.
pub(super) fn transform_half_extents<F: Float>(
    transform: &Matrix4<F>,
    half_extents: &Vector3<F>,
) -> Vector3<F> {
    transform.fixed_view::<3, 3>(0, 0).abs() * half_extents
}
