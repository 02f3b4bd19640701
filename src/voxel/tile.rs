//! Tile coordinates: one key per BLOCK_SIZE^3 region of voxel space

use crate::core::types::IVec3;
use crate::math::VoxelBounds;
use super::block::BLOCK_SIZE;

/// Largest voxel coordinate magnitude the engine addresses. Keeps every
/// coordinate exactly representable as `f32`.
pub const MAX_VOXEL_COORD: i32 = 1 << 24;

/// Integer coordinate identifying a tile in the sparse grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilePos {
    pub z: i32,
    pub y: i32,
    pub x: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Tile containing a voxel position
    pub fn from_voxel(pos: IVec3) -> Self {
        let t = pos.div_euclid(IVec3::splat(BLOCK_SIZE));
        Self::new(t.x, t.y, t.z)
    }

    /// Voxel position of the tile's minimum corner
    pub fn origin(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * BLOCK_SIZE
    }

    /// Voxel range covered by the tile
    pub fn bounds(&self) -> VoxelBounds {
        let origin = self.origin();
        VoxelBounds::new(origin, origin + IVec3::splat(BLOCK_SIZE))
    }

    pub fn offset(&self, d: IVec3) -> Self {
        Self::new(self.x + d.x, self.y + d.y, self.z + d.z)
    }

    /// Every tile overlapping `bounds`
    pub fn covering(bounds: &VoxelBounds) -> impl Iterator<Item = TilePos> + use<> {
        let (lo, hi) = if bounds.is_empty() {
            (TilePos::new(0, 0, 0), TilePos::new(-1, -1, -1))
        } else {
            (
                TilePos::from_voxel(bounds.min),
                TilePos::from_voxel(bounds.max - IVec3::ONE),
            )
        };
        (lo.z..=hi.z)
            .flat_map(move |z| (lo.y..=hi.y).map(move |y| (y, z)))
            .flat_map(move |(y, z)| (lo.x..=hi.x).map(move |x| TilePos::new(x, y, z)))
    }
}

/// Position of a voxel inside its tile (each component in 0..BLOCK_SIZE)
pub fn local_pos(pos: IVec3) -> IVec3 {
    pos.rem_euclid(IVec3::splat(BLOCK_SIZE))
}

/// Whether a voxel position is inside the addressable range
pub fn in_range(pos: IVec3) -> bool {
    pos.cmpgt(IVec3::splat(-MAX_VOXEL_COORD)).all() && pos.cmplt(IVec3::splat(MAX_VOXEL_COORD)).all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_voxel() {
        let bs = BLOCK_SIZE;
        assert_eq!(TilePos::from_voxel(IVec3::ZERO), TilePos::new(0, 0, 0));
        assert_eq!(TilePos::from_voxel(IVec3::new(bs, 0, bs - 1)), TilePos::new(1, 0, 0));
        assert_eq!(TilePos::from_voxel(IVec3::new(-1, -bs, -bs - 1)), TilePos::new(-1, -1, -2));
    }

    #[test]
    fn test_local_and_origin_round_trip() {
        for p in [IVec3::new(5, -3, 40), IVec3::new(-17, 0, 15), IVec3::splat(-1)] {
            let tile = TilePos::from_voxel(p);
            let local = local_pos(p);
            assert!(local.cmpge(IVec3::ZERO).all() && local.cmplt(IVec3::splat(BLOCK_SIZE)).all());
            assert_eq!(tile.origin() + local, p);
            assert!(tile.bounds().contains(p));
        }
    }

    #[test]
    fn test_covering() {
        let bs = BLOCK_SIZE;
        let b = VoxelBounds::new(IVec3::new(-1, 0, 0), IVec3::new(bs + 1, 1, 1));
        let tiles: Vec<_> = TilePos::covering(&b).collect();
        assert_eq!(tiles, vec![TilePos::new(-1, 0, 0), TilePos::new(0, 0, 0), TilePos::new(1, 0, 0)]);
        assert_eq!(TilePos::covering(&VoxelBounds::EMPTY).count(), 0);
    }

    #[test]
    fn test_in_range() {
        assert!(in_range(IVec3::new(0, -5, 1000)));
        assert!(!in_range(IVec3::new(MAX_VOXEL_COORD, 0, 0)));
        assert!(!in_range(IVec3::new(0, i32::MIN, 0)));
    }
}
