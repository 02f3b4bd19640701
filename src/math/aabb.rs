//! Axis-aligned bounding box

use crate::core::types::Vec3;
use super::bounds::VoxelBounds;

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest AABB containing every point. Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut result = Aabb::new(*first, *first);
        for p in rest {
            result.expand(*p);
        }
        Some(result)
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Expand AABB to include point
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Every voxel whose cell overlaps this box (floor of min, ceil of max).
    /// Conservative: used to bound shape rasterization.
    pub fn covering_voxels(&self) -> VoxelBounds {
        VoxelBounds::new(self.min.floor().as_ivec3(), self.max.ceil().as_ivec3())
    }

    /// Voxel range of a grid-aligned box. Corners are rounded so float noise
    /// on an integer box does not add or drop a voxel layer.
    pub fn rounded_voxels(&self) -> VoxelBounds {
        VoxelBounds::new(self.min.round().as_ivec3(), self.max.round().as_ivec3())
    }
}
