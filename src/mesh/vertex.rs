//! Render vertex layout and mesh effect flags

use std::ops::BitOr;

use bytemuck::{Pod, Zeroable};
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::voxel::block::BLOCK_SIZE;

const _: () = assert!(BLOCK_SIZE <= 16, "pos_data packs local coordinates in 4 bits");

/// Per-vertex data for tile rendering (must match shader layout exactly).
///
/// Positions are tile-local in subdivision units; direction bytes are snorm8.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct VoxelVertex {
    /// Tile-local position (6 bytes, offset 0)
    pub pos: [i16; 3],
    /// Local voxel x | y << 4 | z << 8 | face << 12 (2 bytes, offset 6)
    pub pos_data: u16,
    /// Surface normal (4 bytes, offset 8)
    pub normal: [i8; 4],
    /// Surface u axis (4 bytes, offset 12)
    pub tangent: [i8; 4],
    /// Occupancy gradient, a smoothed normal (4 bytes, offset 16)
    pub gradient: [i8; 4],
    /// RGBA (4 bytes, offset 20)
    pub color: [u8; 4],
    /// Face-local texture coordinate (2 bytes, offset 24)
    pub uv: [u8; 2],
    /// Ambient occlusion lookup coordinate (2 bytes, offset 26)
    pub occlusion_uv: [u8; 2],
    /// Bump lookup coordinate (2 bytes, offset 28)
    pub bump_uv: [u8; 2],
    /// Padding to 32 bytes (2 bytes, offset 30)
    pub _pad: [u8; 2],
}

impl VoxelVertex {
    /// Normal as a float unit vector
    pub fn normal_f32(&self) -> Vec3 {
        unsnorm(self.normal)
    }
}

/// Pack a local voxel position and face index
pub fn pack_pos_data(local: IVec3, face: usize) -> u16 {
    let l = local.clamp(IVec3::ZERO, IVec3::splat(BLOCK_SIZE - 1));
    (l.x as u16) | (l.y as u16) << 4 | (l.z as u16) << 8 | ((face as u16) & 0xf) << 12
}

/// Encode a direction as snorm8 (w = 0)
pub fn snorm(v: Vec3) -> [i8; 4] {
    let v = v.normalize_or_zero() * 127.0;
    [v.x.round() as i8, v.y.round() as i8, v.z.round() as i8, 0]
}

/// Decode a snorm8 direction, renormalized
pub fn unsnorm(v: [i8; 4]) -> Vec3 {
    Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32).normalize_or_zero()
}

/// Mesh generation flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshEffects(pub u32);

impl MeshEffects {
    pub const NONE: MeshEffects = MeshEffects(0);
    /// Smooth triangle surface instead of voxel quads
    pub const MARCHING: MeshEffects = MeshEffects(1);
    /// Flat per-triangle normals (smooth surface only)
    pub const FLAT: MeshEffects = MeshEffects(2);
    /// Skip ambient occlusion; every corner fully lit
    pub const NO_OCCLUSION: MeshEffects = MeshEffects(4);

    pub const fn contains(self, other: MeshEffects) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MeshEffects {
    type Output = MeshEffects;

    fn bitor(self, rhs: MeshEffects) -> MeshEffects {
        MeshEffects(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<VoxelVertex>(), 32);
    }

    #[test]
    fn test_pack_pos_data() {
        let packed = pack_pos_data(IVec3::new(1, 2, 3), 5);
        assert_eq!(packed & 0xf, 1);
        assert_eq!((packed >> 4) & 0xf, 2);
        assert_eq!((packed >> 8) & 0xf, 3);
        assert_eq!(packed >> 12, 5);
        // Out-of-tile positions are clamped
        assert_eq!(pack_pos_data(IVec3::splat(-1), 0), 0);
    }

    #[test]
    fn test_snorm() {
        assert_eq!(snorm(Vec3::X), [127, 0, 0, 0]);
        assert_eq!(snorm(-Vec3::Z), [0, 0, -127, 0]);
        assert!((unsnorm(snorm(Vec3::new(1.0, 1.0, 0.0))) - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 0.01);
    }

    #[test]
    fn test_effects() {
        let e = MeshEffects::MARCHING | MeshEffects::FLAT;
        assert!(e.contains(MeshEffects::FLAT));
        assert!(!e.contains(MeshEffects::NO_OCCLUSION));
        assert_eq!(serde_json::to_string(&e).unwrap(), "3");
    }
}
