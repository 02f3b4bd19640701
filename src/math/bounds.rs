//! Integer voxel-space bounds

use crate::core::types::{IVec3, Vec3};

/// Half-open integer box: `min` inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoxelBounds {
    pub min: IVec3,
    pub max: IVec3,
}

impl VoxelBounds {
    /// Bounds containing no voxel.
    pub const EMPTY: VoxelBounds = VoxelBounds {
        min: IVec3::ZERO,
        max: IVec3::ZERO,
    };

    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    /// Bounds of `size` voxels starting at `start`.
    pub fn from_start_size(start: IVec3, size: IVec3) -> Self {
        Self { min: start, max: start + size }
    }

    /// True when no voxel lies inside.
    pub fn is_empty(&self) -> bool {
        self.max.cmple(self.min).any()
    }

    /// Extent along each axis (zero for empty axes).
    pub fn size(&self) -> IVec3 {
        (self.max - self.min).max(IVec3::ZERO)
    }

    /// Number of voxels inside.
    pub fn voxel_count(&self) -> u64 {
        let s = self.size();
        s.x as u64 * s.y as u64 * s.z as u64
    }

    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min).all() && p.cmplt(self.max).all()
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_bounds(&self, other: &VoxelBounds) -> bool {
        other.is_empty()
            || (other.min.cmpge(self.min).all() && other.max.cmple(self.max).all())
    }

    pub fn intersects(&self, other: &VoxelBounds) -> bool {
        !self.intersection(other).is_empty()
    }

    pub fn intersection(&self, other: &VoxelBounds) -> VoxelBounds {
        VoxelBounds {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Smallest bounds containing both. Empty inputs are ignored.
    pub fn union(&self, other: &VoxelBounds) -> VoxelBounds {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        VoxelBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow by `n` voxels on every side.
    pub fn expanded(&self, n: i32) -> VoxelBounds {
        VoxelBounds {
            min: self.min - IVec3::splat(n),
            max: self.max + IVec3::splat(n),
        }
    }

    /// Grow to include a single voxel.
    pub fn include(&mut self, p: IVec3) {
        if self.is_empty() {
            *self = VoxelBounds::new(p, p + IVec3::ONE);
        } else {
            self.min = self.min.min(p);
            self.max = self.max.max(p + IVec3::ONE);
        }
    }

    pub fn min_f32(&self) -> Vec3 {
        self.min.as_vec3()
    }

    pub fn max_f32(&self) -> Vec3 {
        self.max.as_vec3()
    }

    /// Every voxel position inside, x fastest then y then z.
    pub fn iter(&self) -> impl Iterator<Item = IVec3> + use<> {
        let b = *self;
        let empty = b.is_empty();
        (b.min.z..b.max.z)
            .flat_map(move |z| (b.min.y..b.max.y).map(move |y| (y, z)))
            .flat_map(move |(y, z)| (b.min.x..b.max.x).map(move |x| IVec3::new(x, y, z)))
            .filter(move |_| !empty)
    }
}

impl Default for VoxelBounds {
    fn default() -> Self {
        Self::EMPTY
    }
}
