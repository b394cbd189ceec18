//! Projection transformations.

use crate::num::Float;
use approx::assert_abs_diff_ne;
use nalgebra::{Matrix4, Point3, Projective3};

/// A perspective transformation that maps points in a view frustum pointing
/// along the positive z-axis into the box spanning from -1 to 1 in x and y and
/// from 0 to 1 in z in clip space.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PerspectiveTransform<F: Float> {
    matrix: Matrix4<F>,
}

/// An orthographic transformation that maps points in an axis-aligned box
/// centered on the z-axis into the box spanning from -1 to 1 in x and y and
/// from 0 to 1 in z in clip space. The near face of the box lies at the
/// smaller z-coordinate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrthographicTransform<F: Float> {
    matrix: Matrix4<F>,
}

impl<F: Float> PerspectiveTransform<F> {
    /// Creates a new perspective transformation.
    ///
    /// # Note
    /// `aspect_ratio` is the ratio of width to height of the view plane, and
    /// `vertical_field_of_view` is given in radians.
    ///
    /// # Panics
    /// If `aspect_ratio` or `vertical_field_of_view` is zero, or if the near
    /// and far distance are equal.
    pub fn new(
        aspect_ratio: F,
        vertical_field_of_view: F,
        near_distance: F,
        far_distance: F,
    ) -> Self {
        assert_abs_diff_ne!(aspect_ratio, F::ZERO);
        assert_abs_diff_ne!(vertical_field_of_view, F::ZERO);
        assert_abs_diff_ne!(far_distance - near_distance, F::ZERO);

        let y_scale = F::ONE / (vertical_field_of_view * F::ONE_HALF).tan();
        let x_scale = y_scale / aspect_ratio;
        let depth_scale = far_distance / (far_distance - near_distance);

        let mut matrix = Matrix4::zeros();
        matrix.m11 = x_scale;
        matrix.m22 = y_scale;
        matrix.m33 = depth_scale;
        matrix.m34 = -depth_scale * near_distance;
        matrix.m43 = F::ONE;

        Self { matrix }
    }

    /// Returns the matrix of the transformation.
    pub fn matrix(&self) -> &Matrix4<F> {
        &self.matrix
    }

    /// Returns the perspective transformation as a [`Projective3`].
    pub fn to_projective(self) -> Projective3<F> {
        Projective3::from_matrix_unchecked(self.matrix)
    }

    /// Returns the ratio of width to height of the view frustum.
    pub fn aspect_ratio(&self) -> F {
        self.matrix.m22 / self.matrix.m11
    }

    /// Returns the vertical field of view angle in radians.
    pub fn vertical_field_of_view(&self) -> F {
        F::TWO * (F::ONE / self.matrix.m22).atan()
    }

    /// Returns the near distance of the view frustum.
    pub fn near_distance(&self) -> F {
        -self.matrix.m34 / self.matrix.m33
    }

    /// Returns the far distance of the view frustum.
    pub fn far_distance(&self) -> F {
        self.matrix.m34 / (F::ONE - self.matrix.m33)
    }

    /// Projects the given point, including the perspective division.
    pub fn transform_point(&self, point: &Point3<F>) -> Point3<F> {
        self.matrix.transform_point(point)
    }
}

impl<F: Float> OrthographicTransform<F> {
    /// Creates a new orthographic transformation for a view box with the given
    /// width and height, spanning the given range of z-coordinates.
    ///
    /// # Panics
    /// If `width` or `height` is zero, or if the near and far distance are
    /// equal.
    pub fn new(width: F, height: F, near_distance: F, far_distance: F) -> Self {
        assert_abs_diff_ne!(width, F::ZERO);
        assert_abs_diff_ne!(height, F::ZERO);
        assert_abs_diff_ne!(far_distance - near_distance, F::ZERO);

        let inverse_depth = F::ONE / (far_distance - near_distance);

        let mut matrix = Matrix4::identity();
        matrix.m11 = F::TWO / width;
        matrix.m22 = F::TWO / height;
        matrix.m33 = inverse_depth;
        matrix.m34 = -near_distance * inverse_depth;

        Self { matrix }
    }

    /// Returns the matrix of the transformation.
    pub fn matrix(&self) -> &Matrix4<F> {
        &self.matrix
    }

    /// Returns the orthographic transformation as a [`Projective3`].
    pub fn to_projective(self) -> Projective3<F> {
        Projective3::from_matrix_unchecked(self.matrix)
    }

    /// Returns the width of the view box.
    pub fn width(&self) -> F {
        F::TWO / self.matrix.m11
    }

    /// Returns the height of the view box.
    pub fn height(&self) -> F {
        F::TWO / self.matrix.m22
    }

    /// Returns the near distance of the view box.
    pub fn near_distance(&self) -> F {
        -self.matrix.m34 / self.matrix.m33
    }

    /// Returns the far distance of the view box.
    pub fn far_distance(&self) -> F {
        (F::ONE - self.matrix.m34) / self.matrix.m33
    }

    /// Projects the given point.
    pub fn transform_point(&self, point: &Point3<F>) -> Point3<F> {
        self.matrix.transform_point(point)
    }
}
