//! Merging one volume into another

use crate::voxel::blend::BlendMode;
use crate::voxel::block::block_local;
use crate::voxel::voxel::Voxel;
use crate::voxel::volume::Volume;

impl Volume {
    /// Blend every voxel present in `other` into `self` at the same position.
    ///
    /// `color` replaces the RGB of `other`'s voxels (alpha is kept). Intersect
    /// modes also clear voxels of `self` that `other` does not cover.
    /// `other` is never modified.
    pub fn merge(&mut self, other: &Volume, mode: BlendMode, color: Option<Voxel>) {
        let outside = mode.affects_outside_source();
        let shareable = color.is_none()
            && matches!(mode, BlendMode::Over | BlendMode::Max | BlendMode::Replace);
        let mut shared = 0;
        let mut touched = Vec::new();

        if outside {
            for tile in self.sorted_tiles() {
                if other.handle(tile).is_none() {
                    self.remove_tile(tile);
                }
            }
        }

        for tile in other.sorted_tiles() {
            let Some(src) = other.handle(tile) else {
                continue;
            };
            if !outside && src.is_empty() {
                continue;
            }
            let present = self.handle(tile);
            let absent = present.is_none();
            let same = present.is_some_and(|d| d.ptr_eq(src));
            if absent && shareable {
                self.insert_tile(tile, src.clone());
                shared += 1;
                continue;
            }
            if (absent && !mode.creates_voxels()) || (same && shareable) {
                continue;
            }

            let mut writes = Vec::new();
            let dst = self.block(tile);
            for (i, s) in src.voxels().iter().enumerate() {
                if s.is_empty() && !outside {
                    continue;
                }
                let s = match color {
                    Some(c) => s.with_rgb_of(c),
                    None => *s,
                };
                let d = dst.map_or(Voxel::EMPTY, |b| b.voxels()[i]);
                let mut out = mode.apply(d, s);
                if out.is_empty() {
                    out = Voxel::EMPTY;
                }
                if out != d {
                    writes.push((i, out));
                }
            }
            if writes.is_empty() {
                continue;
            }
            let block = self.block_mut(tile);
            for (i, voxel) in writes {
                block.set(block_local(i), voxel);
            }
            touched.push(tile);
        }

        if mode.is_subtractive() {
            self.reclaim_tiles(touched);
        }
        log::debug!("merge {:?}: {} tiles shared", mode, shared);
    }
}
