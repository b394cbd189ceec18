//! Representation of planes.

use crate::num::Float;
use approx::AbsDiffEq;
use nalgebra::{Point3, UnitVector3, Vector3, Vector4};

/// A plane in 3D, represented by a normal vector `n` and a displacement `d`.
/// The plane consists of the points `p` satisfying `n.dot(p) + d = 0`.
///
/// The displacement can be determined from the normal and any point `p` lying
/// on the plane as `d = -n.dot(p)`.
///
/// The normal is not required to have unit length. When it does, the value
/// returned by [`Self::compute_signed_distance`] is the actual distance from
/// the plane, otherwise it is the distance scaled by the length of the normal.
///
/// The plane divides space into two halfspaces, the positive and negative
/// halfspace. The positive one is defined as the halfspace the normal is
/// pointing into.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane<F: Float> {
    normal: Vector3<F>,
    displacement: F,
}

impl<F: Float> Plane<F> {
    /// Creates a new plane defined by the given normal vector and
    /// displacement.
    #[inline]
    pub const fn new(normal: Vector3<F>, displacement: F) -> Self {
        Self {
            normal,
            displacement,
        }
    }

    /// Creates a new plane from the four coefficients of the plane equation
    /// `a*x + b*y + c*z + d = 0`.
    #[inline]
    pub fn from_coefficients(a: F, b: F, c: F, d: F) -> Self {
        Self::new(Vector3::new(a, b, c), d)
    }

    /// Creates a new plane from the packed coefficient vector `(a, b, c, d)`.
    #[inline]
    pub fn from_coefficient_vector(coefficients: &Vector4<F>) -> Self {
        Self::new(coefficients.xyz(), coefficients.w)
    }

    /// Creates a new plane defined by the given unit normal vector and point
    /// in the plane.
    pub fn from_normal_and_point(
        unit_normal: &UnitVector3<F>,
        point_in_plane: &Point3<F>,
    ) -> Self {
        Self::new(
            unit_normal.into_inner(),
            -unit_normal.dot(&point_in_plane.coords),
        )
    }

    /// Returns the normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> &Vector3<F> {
        &self.normal
    }

    /// Returns the displacement of the plane.
    #[inline]
    pub fn displacement(&self) -> F {
        self.displacement
    }

    /// Returns the coefficients `(a, b, c, d)` of the plane equation.
    #[inline]
    pub fn coefficients(&self) -> Vector4<F> {
        Vector4::new(
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.displacement,
        )
    }

    /// Returns a plane with the same normal but the given displacement.
    #[inline]
    pub fn with_displacement(&self, displacement: F) -> Self {
        Self::new(self.normal, displacement)
    }

    /// Returns the plane scaled so that its normal has unit length.
    ///
    /// The normal must be non-zero. Otherwise the result consists of NaNs
    /// (and debug builds panic).
    pub fn normalized(&self) -> Self {
        let norm = self.normal.norm();
        debug_assert!(norm > F::ZERO, "Tried to normalize plane with zero normal");
        let inverse_norm = F::ONE / norm;
        Self::new(self.normal * inverse_norm, self.displacement * inverse_norm)
    }

    /// Computes the signed distance from the plane to the given point. If the
    /// signed distance is negative, the point lies in the negative halfspace
    /// of the plane.
    #[inline]
    pub fn compute_signed_distance(&self, point: &Point3<F>) -> F {
        self.normal.dot(&point.coords) + self.displacement
    }

    /// Computes the dot product of the plane normal with the given vector,
    /// ignoring the displacement.
    #[inline]
    pub fn dot_with_normal(&self, vector: &Vector3<F>) -> F {
        self.normal.dot(vector)
    }

    /// Returns the normal vector with the absolute value taken of each
    /// component.
    #[inline]
    pub fn abs_normal(&self) -> Vector3<F> {
        self.normal.abs()
    }

    /// Computes the largest distance along the plane normal from the center of
    /// a box with the given half extents to any of its corners.
    #[inline]
    pub fn compute_projected_radius(&self, half_extents: &Vector3<F>) -> F {
        self.abs_normal().dot(half_extents)
    }

    /// Whether the given point is strictly in the positive halfspace of the
    /// plane.
    #[inline]
    pub fn point_lies_in_positive_halfspace(&self, point: &Point3<F>) -> bool {
        self.compute_signed_distance(point) > F::ZERO
    }

    /// Whether the given point is strictly in the negative halfspace of the
    /// plane.
    #[inline]
    pub fn point_lies_in_negative_halfspace(&self, point: &Point3<F>) -> bool {
        self.compute_signed_distance(point) < F::ZERO
    }
}

impl<F: Float> Default for Plane<F> {
    fn default() -> Self {
        Self::new(Vector3::zeros(), F::ZERO)
    }
}

impl<F> AbsDiffEq for Plane<F>
where
    F: Float + AbsDiffEq,
    F::Epsilon: Copy,
{
    type Epsilon = F::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        F::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.normal.abs_diff_eq(&other.normal, epsilon)
            && self.displacement.abs_diff_eq(&other.displacement, epsilon)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{point, vector};

    #[test]
    fn creating_plane_through_origin_gives_zero_displacement() {
        let plane = Plane::from_normal_and_point(
            &UnitVector3::new_normalize(vector![1.2, -0.1, 2.7]),
            &Point3::origin(),
        );
        assert_abs_diff_eq!(plane.displacement(), 0.0);
    }

    #[test]
    fn signed_distance_is_correct() {
        let plane = Plane::from_normal_and_point(&Vector3::y_axis(), &point![1.0, 2.0, 0.0]);
        assert_abs_diff_eq!(
            plane.compute_signed_distance(&point![-1.2, 0.0, 42.4]),
            -2.0
        );
        assert_abs_diff_eq!(
            plane.compute_signed_distance(&point![-2.1, 10.0, 4.42]),
            8.0
        );

        let plane = Plane::from_normal_and_point(
            &UnitVector3::new_normalize(vector![1.0, 0.0, 1.0]),
            &Point3::origin(),
        );
        assert_abs_diff_eq!(
            plane.compute_signed_distance(&point![8.0, 0.0, 8.0]),
            std::f64::consts::SQRT_2 * 8.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(plane.compute_signed_distance(&point![0.0, 8.0, 0.0]), 0.0);
    }

    #[test]
    fn signed_distance_with_unnormalized_normal_is_plain_dot_product() {
        let plane = Plane::from_coefficients(-1.0, 1.0, -1.0, 10.0);
        assert_abs_diff_eq!(plane.compute_signed_distance(&point![1.0, 1.0, 1.0]), 9.0);
        assert_abs_diff_eq!(plane.dot_with_normal(&vector![-2.0, 3.0, -5.0]), 10.0);
    }

    #[test]
    fn abs_normal_takes_absolute_value_of_each_component() {
        let plane = Plane::from_coefficients(-1.0, 1.0, -1.0, 10.0);
        assert_eq!(plane.abs_normal(), vector![1.0, 1.0, 1.0]);
        assert_eq!(plane.normal(), &vector![-1.0, 1.0, -1.0]);
    }

    #[test]
    fn normalizing_plane_gives_unit_normal_and_scaled_displacement() {
        let plane = Plane::from_coefficients(0.0, 3.0, 4.0, 10.0).normalized();
        assert_abs_diff_eq!(plane.normal().norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(plane.normal(), &vector![0.0, 0.6, 0.8], epsilon = 1e-12);
        assert_abs_diff_eq!(plane.displacement(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn normalizing_preserves_halfspace_of_points() {
        let plane = Plane::from_coefficients(2.0, -4.0, 1.0, 3.0);
        let normalized = plane.normalized();
        for point in [
            point![1.0, 2.0, 3.0],
            point![-5.0, 0.5, 1.0],
            point![0.0, 10.0, -2.0],
        ] {
            assert_eq!(
                plane.point_lies_in_positive_halfspace(&point),
                normalized.point_lies_in_positive_halfspace(&point)
            );
        }
    }

    #[test]
    fn coefficients_pack_normal_and_displacement() {
        let plane = Plane::from_coefficients(1.0, 2.0, 3.0, 4.0);
        let coefficients = plane.coefficients();
        assert_eq!(coefficients, Vector4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(Plane::from_coefficient_vector(&coefficients), plane);
    }

    #[test]
    fn replacing_displacement_keeps_normal() {
        let plane = Plane::from_coefficients(0.0, 0.0, -1.0, 1000.0).with_displacement(900.0);
        assert_eq!(plane.normal(), &vector![0.0, 0.0, -1.0]);
        assert_abs_diff_eq!(plane.displacement(), 900.0);
        let beyond = point![0.0, 0.0, 950.0];
        let within = point![0.0, 0.0, 850.0];
        assert!(plane.point_lies_in_negative_halfspace(&beyond));
        assert!(plane.point_lies_in_positive_halfspace(&within));
    }

    #[test]
    fn projected_radius_of_box_is_abs_normal_dot_half_extents() {
        let plane = Plane::from_coefficients(-1.0, 0.0, 1.0, 0.0);
        assert_abs_diff_eq!(plane.compute_projected_radius(&vector![1.0, 5.0, 2.0]), 3.0);
    }
}
