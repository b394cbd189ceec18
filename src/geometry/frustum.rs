//! Representation of frustums.

use crate::{geometry::Plane, num::Float};
use anyhow::{Result, bail};
use approx::AbsDiffEq;
use nalgebra::{Matrix4, Point3, Projective3, Vector4};
use std::ops::Index;
use tinyvec::{ArrayVec, TinyVec};

/// Number of planes a [`Frustum`] can hold without allocating.
pub const INLINE_PLANE_COUNT: usize = 6;

/// A convex region bounded by a list of planes. The planes are oriented so
/// that their positive halfspaces contain the inside of the frustum.
///
/// Frustums created from a projection transform have six planes, ordered as
/// the variants of [`FrustumPlane`]. Arbitrary plane lists can also be used,
/// for example to cull against a frustum with extra clipping planes. Up to
/// [`INLINE_PLANE_COUNT`] planes are stored inline, longer lists are stored on
/// the heap.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Frustum<F: Float> {
    planes: TinyVec<[Plane<F>; INLINE_PLANE_COUNT]>,
}

/// The role of each of the six planes of a frustum created from a projection
/// transform. The enum value is the index of the plane in the frustum.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrustumPlane {
    Near = 0,
    Far = 1,
    Left = 2,
    Right = 3,
    Top = 4,
    Bottom = 5,
}

/// State carried between coherent frustum tests, see
/// [`bounding_volume_frustum_coherent`](crate::intersection::bounding_volume_frustum_coherent).
///
/// Bit `i` of the plane mask is set if plane `i` still has to be tested. The
/// mask only has room for [`MAX_MASKED_PLANES`](Self::MAX_MASKED_PLANES)
/// planes, planes beyond that are always tested. The last outside plane is
/// the index of the plane that most recently rejected a volume, and is tested
/// first.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrustumCoherency {
    plane_mask: u32,
    last_outside_plane: u32,
}

impl<F: Float> Frustum<F> {
    /// Creates a frustum with no planes. Every volume is inside it.
    pub fn empty() -> Self {
        Self {
            planes: TinyVec::new(),
        }
    }

    /// Creates a frustum bounded by the given planes. The planes are used as
    /// given, so they should have unit normals pointing into the frustum.
    pub fn from_planes(planes: &[Plane<F>]) -> Self {
        if planes.len() > INLINE_PLANE_COUNT {
            log::trace!("Storing {} frustum planes on the heap", planes.len());
        }
        Self {
            planes: TinyVec::from(planes),
        }
    }

    /// Creates a frustum bounded by the given planes after checking that
    /// every plane has a finite, non-zero normal and a finite displacement.
    ///
    /// # Errors
    /// Returns an error if any of the planes is invalid.
    pub fn try_from_planes(planes: &[Plane<F>]) -> Result<Self> {
        for (idx, plane) in planes.iter().enumerate() {
            let normal = plane.normal();
            if !normal.iter().all(|component| component.is_finite())
                || !plane.displacement().is_finite()
            {
                log::debug!("Rejected frustum plane {idx}: {plane:?}");
                bail!("Frustum plane {idx} has non-finite coefficients");
            }
            if normal.norm_squared() <= F::ZERO {
                log::debug!("Rejected frustum plane {idx}: {plane:?}");
                bail!("Frustum plane {idx} has a zero normal");
            }
        }
        Ok(Self::from_planes(planes))
    }

    /// Creates the frustum representing the clip space of the given
    /// transform, i.e. the region mapped into `[-1, 1]` in x and y and `[0, 1]`
    /// in z.
    ///
    /// This function uses the method of Gribb and Hartmann (2001)
    /// "Fast Extraction of Viewing Frustum Planes from the
    /// World-View-Projection Matrix".
    pub fn from_transform_matrix(transform_matrix: &Matrix4<F>) -> Self {
        let mut frustum = Self::empty();
        frustum.set_from_transform_matrix(transform_matrix);
        frustum
    }

    /// Creates the frustum representing the clip space of the given
    /// transform. See [`Self::from_transform_matrix`].
    pub fn from_transform(transform: &Projective3<F>) -> Self {
        Self::from_transform_matrix(transform.matrix())
    }

    /// Replaces the planes of this frustum with the six planes of the clip
    /// space of the given transform. See [`Self::from_transform_matrix`].
    pub fn set_from_transform_matrix(&mut self, transform_matrix: &Matrix4<F>) {
        let planes = Self::planes_from_transform_matrix(transform_matrix);
        self.planes = TinyVec::Inline(ArrayVec::from(planes));
    }

    /// Returns the number of planes.
    #[inline]
    pub fn count(&self) -> usize {
        self.planes.len()
    }

    /// Whether the frustum has no planes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Whether the planes are stored inline rather than on the heap.
    #[inline]
    pub fn is_stored_inline(&self) -> bool {
        self.planes.is_inline()
    }

    /// Returns all the planes.
    #[inline]
    pub fn planes(&self) -> &[Plane<F>] {
        &self.planes
    }

    /// Returns the plane with the given index.
    ///
    /// # Panics
    /// If the index is out of bounds.
    #[inline]
    pub fn plane(&self, idx: usize) -> &Plane<F> {
        &self.planes[idx]
    }

    /// Returns the plane with the given role. Only meaningful for frustums
    /// created from a transform.
    ///
    /// # Panics
    /// If the frustum has fewer than six planes.
    #[inline]
    pub fn plane_of_kind(&self, kind: FrustumPlane) -> &Plane<F> {
        self.plane(kind as usize)
    }

    /// Replaces the plane with the given index.
    ///
    /// # Panics
    /// If the index is out of bounds.
    pub fn set_plane(&mut self, idx: usize, plane: Plane<F>) {
        self.planes[idx] = plane;
    }

    /// Whether the given point is strictly inside all the planes.
    pub fn contains_point(&self, point: &Point3<F>) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.point_lies_in_positive_halfspace(point))
    }

    /// Returns the coherency state to start from when testing volumes against
    /// this frustum, with all planes enabled.
    pub fn default_coherency(&self) -> FrustumCoherency {
        FrustumCoherency::for_plane_count(self.count())
    }

    fn planes_from_transform_matrix(m: &Matrix4<F>) -> [Plane<F>; 6] {
        let row_0: Vector4<F> = m.row(0).transpose();
        let row_1: Vector4<F> = m.row(1).transpose();
        let row_2: Vector4<F> = m.row(2).transpose();
        let row_3: Vector4<F> = m.row(3).transpose();

        [
            Plane::from_coefficient_vector(&row_2).normalized(),
            Plane::from_coefficient_vector(&(row_3 - row_2)).normalized(),
            Plane::from_coefficient_vector(&(row_3 + row_0)).normalized(),
            Plane::from_coefficient_vector(&(row_3 - row_0)).normalized(),
            Plane::from_coefficient_vector(&(row_3 - row_1)).normalized(),
            Plane::from_coefficient_vector(&(row_3 + row_1)).normalized(),
        ]
    }
}

impl<F: Float> Default for Frustum<F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F: Float> Index<usize> for Frustum<F> {
    type Output = Plane<F>;

    fn index(&self, idx: usize) -> &Self::Output {
        self.plane(idx)
    }
}

impl<F: Float + AbsDiffEq> AbsDiffEq for Frustum<F>
where
    F::Epsilon: Copy,
{
    type Epsilon = F::Epsilon;

    fn default_epsilon() -> F::Epsilon {
        F::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: F::Epsilon) -> bool {
        self.count() == other.count()
            && self
                .planes()
                .iter()
                .zip(other.planes())
                .all(|(plane, other_plane)| plane.abs_diff_eq(other_plane, epsilon))
    }
}

impl FrustumPlane {
    /// All plane roles, in index order.
    pub const ALL: [Self; 6] = [
        Self::Near,
        Self::Far,
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
    ];
}

impl FrustumCoherency {
    /// Number of planes that can be masked out.
    pub const MAX_MASKED_PLANES: usize = 32;

    /// Creates a coherency state with the given mask and last outside plane.
    pub const fn new(plane_mask: u32, last_outside_plane: u32) -> Self {
        Self {
            plane_mask,
            last_outside_plane,
        }
    }

    /// Creates the initial coherency state for a frustum with the given
    /// number of planes: every plane enabled, starting from the first.
    pub const fn for_plane_count(plane_count: usize) -> Self {
        Self::new(Self::full_mask(plane_count), 0)
    }

    /// Returns the plane mask.
    #[inline]
    pub const fn plane_mask(&self) -> u32 {
        self.plane_mask
    }

    /// Returns the index of the plane that most recently rejected a volume.
    #[inline]
    pub const fn last_outside_plane(&self) -> u32 {
        self.last_outside_plane
    }

    /// Returns this state with every plane of a frustum with the given number
    /// of planes enabled again, keeping the last outside plane.
    ///
    /// The mask produced by a test is only valid for volumes enclosed by the
    /// tested volume. Before testing an unrelated volume, such as the same
    /// object in the next frame after it has moved, the mask must be
    /// restored.
    #[inline]
    pub const fn with_restored_mask(&self, plane_count: usize) -> Self {
        Self::new(Self::full_mask(plane_count), self.last_outside_plane)
    }

    /// Whether the plane with the given index should be tested.
    #[inline]
    pub const fn plane_is_enabled(&self, plane_idx: usize) -> bool {
        plane_idx >= Self::MAX_MASKED_PLANES || (self.plane_mask >> plane_idx) & 1 != 0
    }

    pub(crate) fn record_outside_plane(&mut self, plane_idx: usize) {
        self.last_outside_plane = plane_idx as u32;
    }

    pub(crate) fn set_plane_mask(&mut self, plane_mask: u32) {
        self.plane_mask = plane_mask;
    }

    const fn full_mask(plane_count: usize) -> u32 {
        if plane_count >= Self::MAX_MASKED_PLANES {
            u32::MAX
        } else {
            (1 << plane_count) - 1
        }
    }
}

impl Default for FrustumCoherency {
    fn default() -> Self {
        Self::for_plane_count(INLINE_PLANE_COUNT)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{OrthographicTransform, PerspectiveTransform};
    use approx::assert_abs_diff_eq;
    use nalgebra::{Similarity3, point, vector};
    use proptest::prelude::*;

    fn orthographic_frustum() -> Frustum<f64> {
        Frustum::from_transform_matrix(
            OrthographicTransform::new(100.0, 90.0, 1.0, 1000.0).matrix(),
        )
    }

    fn extra_planes() -> [Plane<f64>; 2] {
        [
            Plane::from_coefficients(0.0, 0.0, -1.0, 900.0),
            Plane::from_coefficients(0.0, 0.0, 1.0, -10.0),
        ]
    }

    fn eight_plane_frustum() -> Frustum<f64> {
        let mut planes = orthographic_frustum().planes().to_vec();
        planes.extend_from_slice(&extra_planes());
        Frustum::from_planes(&planes)
    }

    #[test]
    fn creating_empty_frustum_works() {
        let frustum = Frustum::<f64>::empty();
        assert_eq!(frustum.count(), 0);
        assert!(frustum.is_empty());
        assert!(frustum.is_stored_inline());
        assert!(frustum.contains_point(&point![1e9, -1e9, 0.0]));
        assert_eq!(frustum, Frustum::default());
    }

    #[test]
    fn orthographic_frustum_planes_have_correct_distances_from_origin() {
        let frustum = orthographic_frustum();
        let origin = Point3::origin();
        assert_eq!(frustum.count(), 6);
        assert!(frustum.is_stored_inline());

        let expected_distances = [-1.0, 1000.0, 50.0, 50.0, 45.0, 45.0];
        for (kind, expected_distance) in FrustumPlane::ALL.into_iter().zip(expected_distances) {
            assert_abs_diff_eq!(
                frustum.plane_of_kind(kind).compute_signed_distance(&origin),
                expected_distance,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn orthographic_frustum_planes_have_correct_normals() {
        let frustum = orthographic_frustum();
        let expected_normals = [
            vector![0.0, 0.0, 1.0],
            vector![0.0, 0.0, -1.0],
            vector![1.0, 0.0, 0.0],
            vector![-1.0, 0.0, 0.0],
            vector![0.0, -1.0, 0.0],
            vector![0.0, 1.0, 0.0],
        ];
        for (idx, expected_normal) in expected_normals.iter().enumerate() {
            assert_abs_diff_eq!(frustum[idx].normal(), expected_normal, epsilon = 1e-12);
        }
    }

    #[test]
    fn extracted_planes_have_unit_normals() {
        let frustum = Frustum::from_transform(
            &PerspectiveTransform::new(1.3, 1.1, 0.5, 200.0).to_projective(),
        );
        for plane in frustum.planes() {
            assert_abs_diff_eq!(plane.normal().norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn perspective_frustum_contains_points_in_view_volume_only() {
        let frustum = Frustum::from_transform_matrix(
            PerspectiveTransform::new(1.0, std::f64::consts::FRAC_PI_2, 1.0, 100.0).matrix(),
        );
        assert!(frustum.contains_point(&point![0.0, 0.0, 50.0]));
        assert!(frustum.contains_point(&point![9.0, -9.0, 10.0]));
        assert!(!frustum.contains_point(&point![11.0, 0.0, 10.0]));
        assert!(!frustum.contains_point(&point![0.0, 0.0, 0.5]));
        assert!(!frustum.contains_point(&point![0.0, 0.0, 101.0]));
        assert!(!frustum.contains_point(&point![0.0, 0.0, -50.0]));
    }

    #[test]
    fn frustum_of_composed_transform_is_moved_with_view() {
        let view = Similarity3::new(vector![0.0, 0.0, -20.0], vector![0.0, 0.0, 0.0], 1.0);
        let projection = OrthographicTransform::new(10.0, 10.0, 1.0, 10.0);
        let frustum =
            Frustum::from_transform_matrix(&(projection.matrix() * view.to_homogeneous()));
        assert!(frustum.contains_point(&point![0.0, 0.0, 25.0]));
        assert!(!frustum.contains_point(&point![0.0, 0.0, 5.0]));
    }

    #[test]
    fn frustum_with_more_than_six_planes_is_stored_on_heap() {
        let frustum = eight_plane_frustum();
        assert_eq!(frustum.count(), 8);
        assert!(!frustum.is_stored_inline());
        assert_eq!(frustum[6], extra_planes()[0]);
        assert_eq!(frustum[7], extra_planes()[1]);
        assert_eq!(frustum.planes()[..6], orthographic_frustum().planes()[..]);
    }

    #[test]
    fn frustum_with_at_most_six_planes_is_stored_inline() {
        let planes = orthographic_frustum().planes().to_vec();
        for count in 0..=6 {
            let frustum = Frustum::from_planes(&planes[..count]);
            assert_eq!(frustum.count(), count);
            assert!(frustum.is_stored_inline());
        }
    }

    #[test]
    fn cloned_frustum_is_independent_of_original() {
        for original in [orthographic_frustum(), eight_plane_frustum()] {
            let mut clone = original.clone();
            assert_eq!(clone, original);
            assert_eq!(clone.is_stored_inline(), original.is_stored_inline());

            let replacement = Plane::from_coefficients(1.0, 0.0, 0.0, 7.0);
            clone.set_plane(1, replacement);
            assert_eq!(clone[1], replacement);
            assert_ne!(original[1], replacement);
        }
    }

    #[test]
    fn moved_and_reassigned_frustums_keep_their_planes() {
        let heap_frustum = eight_plane_frustum();
        let moved = heap_frustum;
        assert_eq!(moved.count(), 8);

        let mut frustum = moved.clone();
        assert!(!frustum.is_stored_inline());

        frustum = orthographic_frustum();
        assert_eq!(frustum.count(), 6);
        assert!(frustum.is_stored_inline());

        frustum = moved;
        assert_eq!(frustum, eight_plane_frustum());
    }

    #[test]
    fn setting_heap_frustum_from_transform_stores_planes_inline() {
        let mut frustum = eight_plane_frustum();
        frustum.set_from_transform_matrix(
            OrthographicTransform::new(100.0, 90.0, 1.0, 1000.0).matrix(),
        );
        assert!(frustum.is_stored_inline());
        assert_abs_diff_eq!(frustum, orthographic_frustum());
    }

    #[test]
    #[should_panic]
    fn accessing_plane_out_of_bounds_fails() {
        let frustum = orthographic_frustum();
        let _ = frustum[6];
    }

    #[test]
    fn creating_frustum_from_valid_planes_succeeds() {
        let planes = eight_plane_frustum().planes().to_vec();
        let frustum = Frustum::try_from_planes(&planes).unwrap();
        assert_eq!(frustum, eight_plane_frustum());
    }

    #[test]
    fn creating_frustum_from_invalid_planes_fails() {
        let zero_normal = [Plane::from_coefficients(0.0, 0.0, 0.0, 1.0)];
        let nan_normal = [
            Plane::from_coefficients(1.0, 0.0, 0.0, 1.0),
            Plane::from_coefficients(f64::NAN, 0.0, 1.0, 1.0),
        ];
        let infinite_displacement = [Plane::from_coefficients(1.0, 0.0, 0.0, f64::INFINITY)];

        assert!(Frustum::try_from_planes(&zero_normal).is_err());
        assert!(Frustum::try_from_planes(&nan_normal).is_err());
        assert!(Frustum::try_from_planes(&infinite_displacement).is_err());
    }

    #[test]
    fn default_coherency_enables_all_planes() {
        let coherency = orthographic_frustum().default_coherency();
        assert_eq!(coherency.plane_mask(), 0b11_1111);
        let coherency = eight_plane_frustum().default_coherency();
        assert_eq!(coherency.plane_mask(), 0xff);
        let coherency = Frustum::<f64>::empty().default_coherency();
        assert_eq!(coherency.plane_mask(), 0);
        assert_eq!(FrustumCoherency::for_plane_count(32).plane_mask(), u32::MAX);
        assert_eq!(FrustumCoherency::for_plane_count(40).plane_mask(), u32::MAX);
        assert_eq!(FrustumCoherency::default().last_outside_plane(), 0);
    }

    #[test]
    fn planes_beyond_mask_capacity_are_always_enabled() {
        let coherency = FrustumCoherency::new(0, 0);
        assert!(!coherency.plane_is_enabled(0));
        assert!(!coherency.plane_is_enabled(31));
        assert!(coherency.plane_is_enabled(32));
        assert!(coherency.plane_is_enabled(100));
    }

    #[test]
    fn restoring_mask_keeps_last_outside_plane() {
        let coherency = FrustumCoherency::new(0b100, 3).with_restored_mask(8);
        assert_eq!(coherency.plane_mask(), 0xff);
        assert_eq!(coherency.last_outside_plane(), 3);
    }

    prop_compose! {
        fn point_strategy(max_abs_coord: f64)(
            x in -max_abs_coord..max_abs_coord,
            y in -max_abs_coord..max_abs_coord,
            z in -max_abs_coord..max_abs_coord,
        ) -> Point3<f64> {
            point![x, y, z]
        }
    }

    proptest! {
        #[test]
        fn frustum_contains_point_iff_projected_point_is_in_clip_volume(
            point in point_strategy(2e2),
        ) {
            let projection = PerspectiveTransform::new(1.4, 1.0, 1.0, 150.0);
            let frustum = Frustum::from_transform_matrix(projection.matrix());

            let clip = projection.matrix() * point.to_homogeneous();
            let margin = 1e-9 * (1.0 + clip.w.abs());
            let in_clip_volume = clip.w > 0.0
                && clip.x.abs() < clip.w - margin
                && clip.y.abs() < clip.w - margin
                && clip.z > margin
                && clip.z < clip.w - margin;
            let outside_clip_volume = clip.w <= 0.0
                || clip.x.abs() > clip.w + margin
                || clip.y.abs() > clip.w + margin
                || clip.z < -margin
                || clip.z > clip.w + margin;

            if in_clip_volume {
                prop_assert!(frustum.contains_point(&point));
            } else if outside_clip_volume {
                prop_assert!(!frustum.contains_point(&point));
            }
        }
    }
}
