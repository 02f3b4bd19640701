//! Bulk writes from a dense RGBA buffer

use bytemuck::cast_slice;
use glam::IVec3;

use crate::math::VoxelBounds;
use crate::voxel::tile::{in_range, TilePos};
use crate::voxel::voxel::Voxel;
use crate::voxel::volume::Volume;

impl Volume {
    /// Overwrite the `size` region at `origin` with voxels from `data`
    /// (RGBA bytes, x fastest then y then z). Bypasses blending: transparent
    /// source voxels clear the destination.
    ///
    /// A buffer shorter than the region writes the complete voxels it holds.
    pub fn blit(&mut self, data: &[u8], origin: IVec3, size: IVec3) {
        let region = VoxelBounds::from_start_size(origin, size);
        if region.is_empty() {
            return;
        }
        let expected = region.voxel_count() as usize;
        let voxels: &[Voxel] = cast_slice(&data[..data.len() / 4 * 4]);
        if voxels.len() < expected {
            log::warn!(
                "blit buffer holds {} of {} voxels; writing what is there",
                voxels.len(),
                expected
            );
        }

        let index = |p: IVec3| {
            let r = p - origin;
            ((r.z as usize * size.y as usize) + r.y as usize) * size.x as usize + r.x as usize
        };

        let mut written = 0;
        for tile in TilePos::covering(&region) {
            let tile_origin = tile.origin();
            let area = tile.bounds().intersection(&region);
            let present = self.handle(tile).is_some();
            let writes: Vec<(IVec3, Voxel)> = area
                .iter()
                .filter(|p| in_range(*p))
                .filter_map(|p| voxels.get(index(p)).map(|v| (p - tile_origin, *v)))
                .map(|(local, v)| (local, if v.is_empty() { Voxel::EMPTY } else { v }))
                .collect();
            if !present && writes.iter().all(|(_, v)| v.is_empty()) {
                continue;
            }
            written += writes.len();
            let block = self.block_mut(tile);
            for (local, voxel) in writes {
                block.set(local, voxel);
            }
        }
        log::debug!("blit: {} voxels written", written);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: i32, h: i32, d: i32) -> Vec<u8> {
        let mut data = Vec::new();
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    data.extend_from_slice(&[x as u8, y as u8, z as u8, 255]);
                }
            }
        }
        data
    }

    #[test]
    fn test_blit_layout() {
        let mut v = Volume::new();
        let origin = IVec3::new(-5, 10, 3);
        v.blit(&gradient(20, 3, 2), origin, IVec3::new(20, 3, 2));
        assert_eq!(v.voxel_count(), 120);
        assert_eq!(v.get(origin + IVec3::new(7, 2, 1)), Voxel::new(7, 2, 1, 255));
        assert_eq!(v.bounds(true), VoxelBounds::from_start_size(origin, IVec3::new(20, 3, 2)));
    }

    #[test]
    fn test_blit_replaces() {
        let mut v = Volume::new();
        v.set(IVec3::ZERO, Voxel::rgb(9, 9, 9));
        let data = [0u8; 8];
        v.blit(&data, IVec3::ZERO, IVec3::new(2, 1, 1));
        assert!(v.get(IVec3::ZERO).is_empty());
    }

    #[test]
    fn test_transparent_blit_allocates_nothing() {
        let mut v = Volume::new();
        v.blit(&[0u8; 4 * 27], IVec3::splat(100), IVec3::splat(3));
        assert_eq!(v.tile_count(), 0);
    }

    #[test]
    fn test_short_buffer() {
        let mut v = Volume::new();
        let mut data = gradient(4, 1, 1);
        data.truncate(10);
        v.blit(&data, IVec3::ZERO, IVec3::new(4, 1, 1));
        assert_eq!(v.voxel_count(), 2);
    }
}
