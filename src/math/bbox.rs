//! Oriented boxes stored as 4x4 transforms.
//!
//! A box is the image of the unit cube `[-1, 1]^3` under an affine matrix:
//! the translation column is the center, the linear columns are the
//! half-extent axes. The all-zero matrix is reserved as the "no box" value.
//!
//! `dimensions` and `start_pos` project the box onto the voxel grid and are
//! only meaningful for axis-aligned boxes.

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec3, Mat4, Vec3};
use super::aabb::Aabb;
use super::bounds::VoxelBounds;

/// Slack for point containment tests in unit-cube space.
const CONTAINS_EPSILON: f32 = 1e-4;

/// Oriented bounding box in 4x4 matrix form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Box4 {
    pub mat: Mat4,
}

impl Box4 {
    /// The "no box" sentinel.
    pub const NULL: Box4 = Box4 { mat: Mat4::ZERO };

    /// Box equal to the unit cube `[-1, 1]^3`.
    pub const UNIT: Box4 = Box4 { mat: Mat4::IDENTITY };

    pub fn from_mat(mat: Mat4) -> Self {
        Self { mat }
    }

    /// Axis-aligned box spanning `min..max`.
    pub fn from_bounds(min: Vec3, max: Vec3) -> Self {
        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5;
        Self {
            mat: Mat4::from_translation(center) * Mat4::from_scale(half),
        }
    }

    /// Axis-aligned box covering every voxel of `bounds`. Empty bounds give
    /// the null box.
    pub fn from_voxel_bounds(bounds: &VoxelBounds) -> Self {
        if bounds.is_empty() {
            return Self::NULL;
        }
        Self::from_bounds(bounds.min_f32(), bounds.max_f32())
    }

    /// Box centred on `center` with the given half extents.
    pub fn from_center_half_extent(center: Vec3, half: Vec3) -> Self {
        Self {
            mat: Mat4::from_translation(center) * Mat4::from_scale(half),
        }
    }

    pub fn is_null(&self) -> bool {
        self.mat.w_axis.w == 0.0
    }

    pub fn center(&self) -> Vec3 {
        self.mat.w_axis.truncate()
    }

    /// Length of each half-extent axis.
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(
            self.mat.x_axis.truncate().length(),
            self.mat.y_axis.truncate().length(),
            self.mat.z_axis.truncate().length(),
        )
    }

    /// Full size along each box axis.
    pub fn size(&self) -> Vec3 {
        self.half_extents() * 2.0
    }

    /// The eight corners in world space.
    pub fn vertices(&self) -> [Vec3; 8] {
        let mut out = [Vec3::ZERO; 8];
        for (i, v) in out.iter_mut().enumerate() {
            let local = Vec3::new(
                if i & 1 != 0 { 1.0 } else { -1.0 },
                if i & 2 != 0 { 1.0 } else { -1.0 },
                if i & 4 != 0 { 1.0 } else { -1.0 },
            );
            *v = self.mat.transform_point3(local);
        }
        out
    }

    /// World-space AABB of the (possibly rotated) box, or `None` for null.
    pub fn aabb(&self) -> Option<Aabb> {
        if self.is_null() {
            return None;
        }
        Aabb::from_points(&self.vertices())
    }

    /// Voxels overlapped by the box, rounded outward. Empty for null.
    pub fn covering_voxels(&self) -> VoxelBounds {
        self.aabb().map(|a| a.covering_voxels()).unwrap_or(VoxelBounds::EMPTY)
    }

    /// Voxel range of a grid-aligned box, corners rounded. Empty for null.
    pub fn voxel_bounds(&self) -> VoxelBounds {
        self.aabb().map(|a| a.rounded_voxels()).unwrap_or(VoxelBounds::EMPTY)
    }

    /// Apply `mat` on top of this box.
    pub fn transformed(&self, mat: &Mat4) -> Box4 {
        if self.is_null() {
            return *self;
        }
        Box4 { mat: *mat * self.mat }
    }

    /// World point to unit-cube space. `None` for null or flat boxes.
    pub fn to_local(&self, p: Vec3) -> Option<Vec3> {
        if self.is_null() || self.mat.determinant().abs() < f32::EPSILON {
            return None;
        }
        Some(self.mat.inverse().transform_point3(p))
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.to_local(p)
            .map(|l| l.abs().max_element() <= 1.0 + CONTAINS_EPSILON)
            .unwrap_or(false)
    }

    /// Voxel-grid extent of an axis-aligned box; zero for the null box.
    pub fn dimensions(&self) -> IVec3 {
        if self.is_null() {
            return IVec3::ZERO;
        }
        (self.axis_half_extents() * 2.0).round().as_ivec3()
    }

    /// Minimum voxel corner of an axis-aligned box; zero for the null box.
    pub fn start_pos(&self) -> IVec3 {
        if self.is_null() {
            return IVec3::ZERO;
        }
        (self.center() - self.axis_half_extents()).round().as_ivec3()
    }

    fn axis_half_extents(&self) -> Vec3 {
        Vec3::new(self.mat.x_axis.x, self.mat.y_axis.y, self.mat.z_axis.z).abs()
    }
}

impl Default for Box4 {
    fn default() -> Self {
        Self::NULL
    }
}
