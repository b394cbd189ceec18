//! Representation of axis-aligned boxes.

use super::bounding_volume::transform_half_extents;
use crate::num::Float;
use approx::AbsDiffEq;
use na::point;
use nalgebra::{self as na, Matrix4, Point3, Vector3};

use Corner::{Lower, Upper};

/// A box with orientation aligned with the coordinate system axes. The width,
/// height and depth axes are aligned with the x-, y- and z-axis respectively.
///
/// A box is only valid if no component of the lower corner exceeds the
/// corresponding component of the upper corner. Invalid boxes are still
/// representable, the most useful one being [`Self::invalid`], which acts as
/// the starting point when accumulating a box from points.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisAlignedBox<F: Float> {
    corners: [Point3<F>; 2],
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Corner {
    Lower = 0,
    Upper = 1,
}

const ALL_CORNER_COMPONENTS: [[Corner; 3]; 8] = [
    [Lower, Lower, Lower],
    [Lower, Lower, Upper],
    [Lower, Upper, Lower],
    [Lower, Upper, Upper],
    [Upper, Lower, Lower],
    [Upper, Lower, Upper],
    [Upper, Upper, Lower],
    [Upper, Upper, Upper],
];

impl<F: Float> AxisAlignedBox<F> {
    /// Creates a new box with the given lower and upper corner points.
    #[inline]
    pub fn new(lower_corner: Point3<F>, upper_corner: Point3<F>) -> Self {
        Self {
            corners: [lower_corner, upper_corner],
        }
    }

    /// Creates a new box with the given center and half extents along each
    /// axis.
    #[inline]
    pub fn from_center_and_half_extents(center: &Point3<F>, half_extents: &Vector3<F>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Creates a box with the lower corner at positive infinity and the upper
    /// corner at negative infinity. Appending a point or valid box to it
    /// gives exactly that point or box.
    #[inline]
    pub fn invalid() -> Self {
        Self::new(
            Point3::from(Vector3::repeat(F::INFINITY)),
            Point3::from(Vector3::repeat(F::NEG_INFINITY)),
        )
    }

    /// Creates the axis-aligned bounding box for the set of points in the given
    /// slice.
    ///
    /// # Panics
    /// If the point slice is empty.
    pub fn aabb_for_points(points: &[Point3<F>]) -> Self {
        assert!(
            !points.is_empty(),
            "Tried to create AABB for empty point slice"
        );
        Self::invalid().appended_points(points)
    }

    /// Creates the axis-aligned box bounding both the given axis-aligned boxes.
    pub fn aabb_from_pair(aabb_1: &Self, aabb_2: &Self) -> Self {
        Self::new(
            aabb_1.lower_corner().inf(aabb_2.lower_corner()),
            aabb_1.upper_corner().sup(aabb_2.upper_corner()),
        )
    }

    /// Returns a reference to the lower corner of the box.
    #[inline]
    pub fn lower_corner(&self) -> &Point3<F> {
        &self.corners[0]
    }

    /// Returns a reference to the upper corner of the box.
    #[inline]
    pub fn upper_corner(&self) -> &Point3<F> {
        &self.corners[1]
    }

    /// Whether no component of the lower corner exceeds the corresponding
    /// component of the upper corner.
    pub fn is_valid(&self) -> bool {
        (self.upper_corner() - self.lower_corner())
            .iter()
            .all(|&diff| diff >= F::ZERO)
    }

    /// Calculates and returns the center point of the box.
    #[inline]
    pub fn center(&self) -> Point3<F> {
        na::center(self.lower_corner(), self.upper_corner())
    }

    /// Returns the extents of the box along each axis.
    #[inline]
    pub fn size(&self) -> Vector3<F> {
        self.upper_corner() - self.lower_corner()
    }

    /// Returns half the extents of the box along each axis.
    #[inline]
    pub fn half_size(&self) -> Vector3<F> {
        self.size() * F::ONE_HALF
    }

    /// Returns the box corner with the given index. The corners are ordered
    /// from smaller to larger coordinates, with the z-component varying
    /// fastest.
    ///
    /// # Panics
    /// If the given index exceeds 7.
    pub fn corner(&self, corner_idx: usize) -> Point3<F> {
        let corner_components = &ALL_CORNER_COMPONENTS[corner_idx];
        point![
            self.corners[corner_components[0] as usize].x,
            self.corners[corner_components[1] as usize].y,
            self.corners[corner_components[2] as usize].z
        ]
    }

    /// Whether the given point is inside the box. Points on the boundary are
    /// considered inside.
    pub fn contains_point(&self, point: &Point3<F>) -> bool {
        (0..3).all(|dim| {
            point[dim] >= self.lower_corner()[dim] && point[dim] <= self.upper_corner()[dim]
        })
    }

    /// Whether the given box is fully inside this box.
    pub fn contains_box(&self, other: &Self) -> bool {
        self.contains_point(other.lower_corner()) && self.contains_point(other.upper_corner())
    }

    /// Returns the smallest box containing both this box and the given point.
    #[inline]
    pub fn appended_point(&self, point: &Point3<F>) -> Self {
        Self::new(
            self.lower_corner().inf(point),
            self.upper_corner().sup(point),
        )
    }

    /// Returns the smallest box containing both this box and all the given
    /// points.
    pub fn appended_points(&self, points: &[Point3<F>]) -> Self {
        points
            .iter()
            .fold(*self, |aabb, point| aabb.appended_point(point))
    }

    /// Returns the smallest box containing both this and the given box.
    #[inline]
    pub fn appended_box(&self, other: &Self) -> Self {
        Self::aabb_from_pair(self, other)
    }

    /// Computes the axis-aligned box enclosing this box after it has been
    /// transformed with the given affine transformation matrix.
    pub fn transformed(&self, transform: &Matrix4<F>) -> Self {
        let center = transform.transform_point(&self.center());
        let half_extents = transform_half_extents(transform, &self.half_size());
        Self::from_center_and_half_extents(&center, &half_extents)
    }
}

impl<F: Float + AbsDiffEq> AbsDiffEq for AxisAlignedBox<F>
where
    F::Epsilon: Copy,
{
    type Epsilon = F::Epsilon;

    fn default_epsilon() -> F::Epsilon {
        F::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: F::Epsilon) -> bool {
        Point3::abs_diff_eq(self.lower_corner(), other.lower_corner(), epsilon)
            && Point3::abs_diff_eq(self.upper_corner(), other.upper_corner(), epsilon)
    }
}
