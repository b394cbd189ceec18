//! Representation of spheres.

use crate::num::Float;
use nalgebra::{self as na, Point3, Vector3};

/// A sphere represented by the center point and the radius.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere<F: Float> {
    center: Point3<F>,
    radius: F,
}

impl<F: Float> Sphere<F> {
    /// Creates a new sphere with the given center and radius.
    ///
    /// # Panics
    /// In debug builds, if `radius` is negative.
    #[inline]
    pub fn new(center: Point3<F>, radius: F) -> Self {
        debug_assert!(radius >= F::ZERO, "Sphere radius must be non-negative");
        Self { center, radius }
    }

    /// Creates the sphere passing through all corners of the box with the
    /// given center and half extents.
    pub fn enclosing_box(center: Point3<F>, half_extents: &Vector3<F>) -> Self {
        Self::new(center, half_extents.norm())
    }

    /// Creates the degenerate sphere with zero radius centered at the origin.
    #[inline]
    pub fn zero() -> Self {
        Self::new(Point3::origin(), F::ZERO)
    }

    /// Returns the center point of the sphere.
    #[inline]
    pub fn center(&self) -> &Point3<F> {
        &self.center
    }

    /// Returns the radius of the sphere.
    #[inline]
    pub fn radius(&self) -> F {
        self.radius
    }

    /// Returns the square of the radius of the sphere.
    #[inline]
    pub fn radius_squared(&self) -> F {
        self.radius * self.radius
    }

    /// Returns a sphere with the same center and the radius multiplied by the
    /// given non-negative factor.
    #[inline]
    pub fn scaled_radius(&self, scale: F) -> Self {
        Self::new(self.center, self.radius * scale)
    }

    /// Whether the given sphere is fully inside this sphere. A sphere is
    /// considered to enclose itself.
    pub fn encloses_sphere(&self, sphere: &Self) -> bool {
        sphere.radius() + na::distance(self.center(), sphere.center()) <= self.radius()
    }

    /// Whether the given point is inside this sphere. A point exactly on the
    /// surface of the sphere is considered inside.
    pub fn contains_point(&self, point: &Point3<F>) -> bool {
        na::distance_squared(self.center(), point) <= self.radius_squared()
    }
}
