//! Moving a volume's content through an affine transform

use glam::{I64Vec3, IVec3, Mat4, Vec4};

use crate::math::{Box4, VoxelBounds};
use crate::voxel::block::BLOCK_SIZE;
use crate::voxel::iter::{Accessor, IterMode};
use crate::voxel::tile::{TilePos, MAX_VOXEL_COORD};
use crate::voxel::volume::Volume;

const EPSILON: f32 = 1e-5;

/// Every addressable voxel position
const ADDRESSABLE: VoxelBounds = VoxelBounds {
    min: IVec3::splat(1 - MAX_VOXEL_COORD),
    max: IVec3::splat(MAX_VOXEL_COORD),
};

/// `pos + offset`, or `None` when the sum leaves the addressable range.
fn shifted(pos: IVec3, offset: IVec3) -> Option<IVec3> {
    let p = pos.as_i64vec3() + offset.as_i64vec3();
    let limit = I64Vec3::splat(MAX_VOXEL_COORD as i64);
    (p.cmpgt(-limit).all() && p.cmplt(limit).all()).then(|| p.as_ivec3())
}

/// Integer offset if `mat` is a pure translation by whole voxels.
fn integer_translation(mat: &Mat4) -> Option<IVec3> {
    let linear_is_identity = mat.x_axis.abs_diff_eq(Vec4::X, EPSILON)
        && mat.y_axis.abs_diff_eq(Vec4::Y, EPSILON)
        && mat.z_axis.abs_diff_eq(Vec4::Z, EPSILON)
        && (mat.w_axis.w - 1.0).abs() < EPSILON;
    let t = mat.w_axis.truncate();
    let whole = (t - t.round()).abs().max_element() < EPSILON;
    (linear_is_identity && whole).then(|| t.round().as_ivec3())
}

impl Volume {
    /// Apply `mat` to every voxel position.
    ///
    /// Destination voxels are resampled nearest-voxel: each destination voxel
    /// center is mapped through the inverse transform and takes the source
    /// voxel containing that point. Whole-voxel translations move voxels
    /// exactly, and offsets that are multiples of the tile size only re-key
    /// tiles. Singular matrices are ignored.
    pub fn transform(&mut self, mat: &Mat4) {
        if mat.determinant().abs() < EPSILON || !mat.is_finite() {
            log::warn!("ignoring singular move matrix");
            return;
        }
        if let Some(offset) = integer_translation(mat) {
            self.translate(offset);
            return;
        }

        let src_bounds = self.bounds(true);
        if src_bounds.is_empty() {
            return;
        }
        let inverse = mat.inverse();
        let region = Box4::from_voxel_bounds(&src_bounds)
            .transformed(mat)
            .covering_voxels()
            .intersection(&ADDRESSABLE);

        let mut out = Volume::new();
        let mut acc = Accessor::new();
        for tile in TilePos::covering(&region) {
            let area = tile.bounds().intersection(&region);
            let origin = tile.origin();
            let mut writes = Vec::new();
            for pos in area.iter() {
                let src = inverse.transform_point3(pos.as_vec3() + 0.5).floor().as_ivec3();
                if !src_bounds.contains(src) {
                    continue;
                }
                let voxel = self.get_at(src, &mut acc);
                if !voxel.is_empty() {
                    writes.push((pos - origin, voxel));
                }
            }
            if writes.is_empty() {
                continue;
            }
            let block = out.block_mut(tile);
            for (local, voxel) in writes {
                block.set(local, voxel);
            }
        }
        log::debug!("move: {} -> {} tiles", self.tile_count(), out.tile_count());
        self.replace_tiles(out);
    }

    /// Shift every voxel by a whole-voxel offset.
    ///
    /// Voxels pushed out of the addressable range are dropped.
    pub fn translate(&mut self, offset: IVec3) {
        if offset == IVec3::ZERO {
            return;
        }
        let mut out = Volume::new();
        let mut spilled = Vec::new();
        if offset % BLOCK_SIZE == IVec3::ZERO {
            // Tiles landing fully in range are re-keyed, edge tiles go voxel by voxel
            for (tile, handle) in self.tiles() {
                let origin = tile.origin();
                let last = origin + IVec3::splat(BLOCK_SIZE - 1);
                match (shifted(origin, offset), shifted(last, offset)) {
                    (Some(dest), Some(_)) => {
                        out.insert_tile(TilePos::from_voxel(dest), handle.clone());
                    }
                    _ => spilled.push(tile.bounds()),
                }
            }
        } else {
            spilled.push(self.bounds(false));
        }

        let mut dropped = 0usize;
        for region in spilled {
            for (pos, voxel) in self.iter(IterMode::SKIP_EMPTY).within(region).colored() {
                match shifted(pos, offset) {
                    Some(dest) => out.set(dest, voxel),
                    None => dropped += 1,
                }
            }
        }
        if dropped > 0 {
            log::warn!("translate by {offset}: {dropped} voxels left the addressable range");
        }
        self.replace_tiles(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use crate::voxel::voxel::Voxel;

    const RED: Voxel = Voxel::rgb(255, 0, 0);

    fn bar() -> Volume {
        (0..4).map(|x| (IVec3::new(x, 0, 0), RED)).collect()
    }

    #[test]
    fn test_integer_translation() {
        let mut v = bar();
        v.transform(&Mat4::from_translation(Vec3::new(3.0, -2.0, 1.0)));
        assert_eq!(v.bounds(true).min, IVec3::new(3, -2, 1));
        assert_eq!(v.voxel_count(), 4);
        assert!(v.get(IVec3::ZERO).is_empty());
    }

    #[test]
    fn test_tile_aligned_translation_shares_blocks() {
        let original = bar();
        let mut moved = original.copy();
        moved.translate(IVec3::new(BLOCK_SIZE, 0, -2 * BLOCK_SIZE));
        let old = original.handle(TilePos::new(0, 0, 0)).unwrap();
        let new = moved.handle(TilePos::new(1, 0, -2)).unwrap();
        assert!(old.ptr_eq(new));
        assert_eq!(moved.get(IVec3::new(BLOCK_SIZE + 3, 0, -2 * BLOCK_SIZE)), RED);
    }

    #[test]
    fn test_translation_past_range_empties() {
        let mut v = bar();
        v.translate(IVec3::new(i32::MAX, 0, 0));
        assert!(v.is_empty());

        let mut v: Volume = [(IVec3::new(-1, 0, 0), RED)].into_iter().collect();
        v.translate(IVec3::new(i32::MIN, 0, 0));
        assert_eq!(v.iter(IterMode::SKIP_EMPTY).count(), 0);

        let mut v = bar();
        v.transform(&Mat4::from_translation(Vec3::new(3.0e9, 0.0, 0.0)));
        assert!(v.is_empty());
    }

    #[test]
    fn test_translation_clips_at_range_edge() {
        let mut v = bar();
        v.translate(IVec3::new(MAX_VOXEL_COORD - 2, 0, 0));
        assert_eq!(v.voxel_count(), 2);
        assert_eq!(v.get(IVec3::new(MAX_VOXEL_COORD - 1, 0, 0)), RED);

        // Tile-aligned offset landing on the lowest tile, whose first voxel is out of range
        let mut v = bar();
        v.translate(IVec3::new(-MAX_VOXEL_COORD, 0, 0));
        assert_eq!(v.voxel_count(), 3);
        assert_eq!(v.get(IVec3::new(1 - MAX_VOXEL_COORD, 0, 0)), RED);
        assert_eq!(v.bounds(true).min.x, 1 - MAX_VOXEL_COORD);
    }

    #[test]
    fn test_far_rotation_is_clipped() {
        let mut v = bar();
        let far = Mat4::from_rotation_translation(
            glam::Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(1.0e12, 0.0, 0.0),
        );
        v.transform(&far);
        assert!(v.is_empty());
    }

    #[test]
    fn test_rotation_resamples() {
        let mut v = bar();
        // Quarter turn around z: +x maps to +y
        v.transform(&Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert_eq!(v.voxel_count(), 4);
        let b = v.bounds(true);
        assert_eq!(b.size(), IVec3::new(1, 4, 1));
        assert_eq!(b.min, IVec3::new(-1, 0, 0));
    }

    #[test]
    fn test_scale_up() {
        let mut v: Volume = [(IVec3::ZERO, RED)].into_iter().collect();
        v.transform(&Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(v.voxel_count(), 8);
        assert_eq!(v.bounds(true).size(), IVec3::splat(2));
    }

    #[test]
    fn test_singular_is_ignored() {
        let mut v = bar();
        v.transform(&Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)));
        assert_eq!(v, bar());
    }
}
