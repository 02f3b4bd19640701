//! Global alpha adjustment

use crate::voxel::voxel::Voxel;
use crate::voxel::volume::Volume;

fn shifted(v: Voxel, delta: i32) -> Voxel {
    let a = (v.a as i32 + delta).clamp(0, 255) as u8;
    if a == 0 { Voxel::EMPTY } else { v.with_alpha(a) }
}

impl Volume {
    /// Add `delta` to the alpha of every present voxel, clamped to 0..=255.
    /// Voxels reaching zero are removed; absent voxels stay absent.
    pub fn shift_alpha(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        for tile in self.sorted_tiles() {
            let changes = self.block(tile).is_some_and(|b| {
                b.voxels().iter().any(|v| !v.is_empty() && shifted(*v, delta) != *v)
            });
            if !changes {
                continue;
            }
            let block = self.block_mut(tile);
            for v in block.voxels_mut().iter_mut().filter(|v| !v.is_empty()) {
                *v = shifted(*v, delta);
            }
        }
        if delta < 0 {
            self.remove_empty_tiles();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    #[test]
    fn test_shift_alpha() {
        let mut v = Volume::new();
        v.set(IVec3::ZERO, Voxel::new(1, 2, 3, 100));
        v.set(IVec3::new(40, 0, 0), Voxel::new(1, 2, 3, 20));

        v.shift_alpha(200);
        assert_eq!(v.get(IVec3::ZERO).a, 255);

        v.shift_alpha(-50);
        assert_eq!(v.get(IVec3::ZERO), Voxel::new(1, 2, 3, 205));
        assert_eq!(v.get(IVec3::new(40, 0, 0)).a, 170);

        v.shift_alpha(-180);
        assert_eq!(v.voxel_count(), 1);
        assert_eq!(v.tile_count(), 1);
        // Absent voxels are never created
        assert!(v.get(IVec3::ONE).is_empty());
    }
}
