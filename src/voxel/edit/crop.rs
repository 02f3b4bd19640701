//! Cropping a volume to a box

use crate::math::{Box4, VoxelBounds};
use crate::voxel::block::block_local;
use crate::voxel::voxel::Voxel;
use crate::voxel::volume::Volume;

impl Volume {
    /// Remove every voxel outside the axis-aligned projection of `bbox`.
    /// A null box leaves the volume untouched.
    pub fn crop(&mut self, bbox: &Box4) {
        if bbox.is_null() {
            log::debug!("crop with null box ignored");
            return;
        }
        self.crop_bounds(&bbox.voxel_bounds());
    }

    /// Remove every voxel outside `bounds`. Tiles entirely outside are
    /// dropped without touching their data.
    pub fn crop_bounds(&mut self, bounds: &VoxelBounds) {
        let mut dropped = 0;
        let mut trimmed = Vec::new();
        for tile in self.sorted_tiles() {
            let tile_bounds = tile.bounds();
            if !tile_bounds.intersects(bounds) {
                self.remove_tile(tile);
                dropped += 1;
                continue;
            }
            if bounds.contains_bounds(&tile_bounds) {
                continue;
            }
            let origin = tile.origin();
            let outside = |i: usize| !bounds.contains(origin + block_local(i));
            let needs_trim = self.block(tile).is_some_and(|b| {
                b.voxels().iter().enumerate().any(|(i, v)| !v.is_empty() && outside(i))
            });
            if !needs_trim {
                continue;
            }
            let block = self.block_mut(tile);
            for (i, v) in block.voxels_mut().iter_mut().enumerate() {
                if outside(i) {
                    *v = Voxel::EMPTY;
                }
            }
            trimmed.push(tile);
        }
        self.reclaim_tiles(trimmed);
        log::debug!("crop: {} tiles dropped", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{IVec3, Vec3};

    fn filled(size: i32) -> Volume {
        VoxelBounds::new(IVec3::splat(-size), IVec3::splat(size))
            .iter()
            .map(|p| (p, Voxel::rgb(10, 20, 30)))
            .collect()
    }

    #[test]
    fn test_crop_result_inside_box() {
        let mut v = filled(20);
        let bbox = Box4::from_bounds(Vec3::new(-3.0, 0.0, 1.0), Vec3::new(5.0, 2.0, 18.0));
        v.crop(&bbox);
        let exact = v.get_box(true);
        assert_eq!(exact.start_pos(), IVec3::new(-3, 0, 1));
        assert_eq!(exact.dimensions(), IVec3::new(8, 2, 17));
        assert!(bbox.voxel_bounds().contains_bounds(&v.bounds(true)));
        assert_eq!(v.voxel_count(), 8 * 2 * 17);
    }

    #[test]
    fn test_crop_drops_outside_tiles() {
        let mut v = filled(40);
        let before = v.tile_count();
        v.crop(&Box4::from_bounds(Vec3::ZERO, Vec3::splat(4.0)));
        assert!(before > 1);
        assert_eq!(v.tile_count(), 1);
    }

    #[test]
    fn test_crop_null_is_noop() {
        let mut v = filled(4);
        let before = v.voxel_count();
        v.crop(&Box4::NULL);
        assert_eq!(v.voxel_count(), before);
    }

    #[test]
    fn test_crop_to_empty_bounds_clears() {
        let mut v = filled(4);
        v.crop_bounds(&VoxelBounds::EMPTY);
        assert!(v.is_empty());
        assert_eq!(v.tile_count(), 0);
    }
}
