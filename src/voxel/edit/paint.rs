//! Painting placed shapes into a volume

use glam::IVec3;

use crate::math::{Box4, VoxelBounds};
use crate::voxel::brush::{ColorBlend, Painter};
use crate::voxel::iter::Accessor;
use crate::voxel::tile::{in_range, local_pos, TilePos};
use crate::voxel::voxel::Voxel;
use crate::voxel::volume::Volume;

impl Volume {
    /// Paint `painter.shape`, placed by `placement`, into the volume.
    ///
    /// Only voxels inside the shape's bounding box (and the painter's clip box)
    /// are visited; symmetric images are painted in the same pass, each voxel
    /// taking the highest coverage among them. Intersect modes also clear
    /// everything outside the shape. Returns the number of voxels changed.
    pub fn op(&mut self, painter: &Painter, placement: &Box4) -> usize {
        let rasters = painter.rasterizers(placement);
        let shape_region = rasters
            .iter()
            .fold(VoxelBounds::EMPTY, |acc, r| acc.union(&r.bounds()));
        let mode = painter.mode;
        let outside = mode.affects_outside_source();
        let clip = painter.clip.filter(|c| !c.is_null());

        let region = match (outside, &clip) {
            (true, Some(clip)) => clip.covering_voxels(),
            (true, None) => {
                self.crop_bounds(&shape_region);
                shape_region
            }
            (false, _) => shape_region,
        };
        if region.is_empty() {
            return 0;
        }

        let inherit = painter.color_blend != ColorBlend::User;
        let floor_z = if inherit { self.bounds(false).min.z } else { 0 };
        let mut acc = Accessor::new();
        let mut changed = 0;
        let mut touched = Vec::new();

        for tile in TilePos::covering(&region) {
            if self.handle(tile).is_none() && !mode.creates_voxels() {
                continue;
            }
            let origin = tile.origin();
            let area = tile.bounds().intersection(&region);
            let mut writes = Vec::new();
            let block = self.block(tile);
            for pos in area.iter() {
                let coverage = rasters.iter().map(|r| r.coverage(pos)).fold(0.0, f32::max);
                if coverage <= 0.0 {
                    if !outside {
                        continue;
                    }
                    if clip.is_some_and(|c| !c.contains_point(pos.as_vec3() + 0.5)) {
                        continue;
                    }
                }
                let dst = block.map_or(Voxel::EMPTY, |b| b.get(pos - origin));
                if outside && dst.is_empty() {
                    continue;
                }
                let inherited = if inherit { self.color_below(pos, floor_z, &mut acc) } else { None };
                let src = painter.source_voxel(pos, coverage, inherited);
                let mut out = mode.apply(dst, src);
                if out.is_empty() {
                    out = Voxel::EMPTY;
                }
                if out != dst {
                    writes.push((pos - origin, out));
                }
            }
            if writes.is_empty() {
                continue;
            }
            changed += writes.len();
            // Drop the cached handle so the block below is not shared
            acc.reset();
            let block = self.block_mut(tile);
            for (local, voxel) in writes {
                block.set(local, voxel);
            }
            touched.push(tile);
        }

        if mode.is_subtractive() {
            self.reclaim_tiles(touched);
        }
        log::debug!("op {:?}/{:?}: {} voxels changed", mode, painter.shape, changed);
        changed
    }

    /// First present voxel straight below `pos`, scanning down to `floor_z`.
    /// Absent tiles are skipped whole.
    pub fn color_below(&self, pos: IVec3, floor_z: i32, acc: &mut Accessor) -> Option<Voxel> {
        if !in_range(pos) {
            return None;
        }
        let mut z = pos.z - 1;
        while z >= floor_z {
            let column = IVec3::new(pos.x, pos.y, z);
            let tile = TilePos::from_voxel(column);
            let base = tile.origin().z;
            if let Some(block) = acc.block(self, tile) {
                let local = local_pos(column);
                let lowest = floor_z.max(base) - base;
                let found = (lowest..=local.z)
                    .rev()
                    .map(|lz| block.get(IVec3::new(local.x, local.y, lz)))
                    .find(|v| !v.is_empty());
                if found.is_some() {
                    return found;
                }
            }
            z = base - 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use crate::voxel::blend::BlendMode;
    use crate::voxel::block::Block;
    use crate::voxel::brush::{Shape, Symmetry};

    const RED: Voxel = Voxel::rgb(255, 0, 0);
    const BLUE: Voxel = Voxel::rgb(0, 0, 255);

    fn cube(min: Vec3, max: Vec3) -> Box4 {
        Box4::from_bounds(min, max)
    }

    #[test]
    fn test_paint_cube() {
        let mut v = Volume::new();
        let painter = Painter::new(BlendMode::Over, Shape::Cube, RED);
        let n = v.op(&painter, &cube(Vec3::ZERO, Vec3::splat(3.0)));
        assert_eq!(n, 27);
        assert_eq!(v.get(IVec3::new(2, 2, 2)), RED);
        assert!(v.get(IVec3::new(3, 0, 0)).is_empty());
        assert_eq!(v.bounds(true), VoxelBounds::new(IVec3::ZERO, IVec3::splat(3)));

        // Painting the same thing again changes nothing
        assert_eq!(v.op(&painter, &cube(Vec3::ZERO, Vec3::splat(3.0))), 0);
    }

    #[test]
    fn test_sub_removes_and_reclaims() {
        let mut v = Volume::new();
        let b = cube(Vec3::ZERO, Vec3::splat(2.0));
        v.op(&Painter::new(BlendMode::Over, Shape::Cube, RED), &b);
        v.op(&Painter::new(BlendMode::Sub, Shape::Cube, Voxel::WHITE), &b);
        assert!(v.is_empty());
        assert_eq!(v.tile_count(), 0);
    }

    #[test]
    fn test_sub_on_empty_volume_allocates_nothing() {
        let mut v = Volume::new();
        let painter = Painter::new(BlendMode::Sub, Shape::Sphere, Voxel::WHITE);
        assert_eq!(v.op(&painter, &cube(Vec3::ZERO, Vec3::splat(40.0))), 0);
        assert_eq!(v.tile_count(), 0);
    }

    #[test]
    fn test_intersect_clears_outside_shape() {
        let mut v = Volume::new();
        v.op(&Painter::new(BlendMode::Over, Shape::Cube, RED), &cube(Vec3::ZERO, Vec3::splat(40.0)));
        v.op(
            &Painter::new(BlendMode::Intersect, Shape::Cube, Voxel::WHITE),
            &cube(Vec3::splat(2.0), Vec3::splat(4.0)),
        );
        assert_eq!(v.voxel_count(), 8);
        assert_eq!(v.get(IVec3::splat(3)), RED);
        assert_eq!(v.tile_count(), 1);
    }

    #[test]
    fn test_clip_box() {
        let mut v = Volume::new();
        let painter = Painter::new(BlendMode::Over, Shape::Cube, RED)
            .with_clip(cube(Vec3::ZERO, Vec3::new(1.0, 4.0, 4.0)));
        assert_eq!(v.op(&painter, &cube(Vec3::ZERO, Vec3::splat(4.0))), 16);
        assert!(v.iter(crate::voxel::iter::IterMode::SKIP_EMPTY).all(|p| p.x == 0));
    }

    #[test]
    fn test_symmetry_paints_mirror() {
        let mut v = Volume::new();
        let painter = Painter::new(BlendMode::Over, Shape::Cube, RED)
            .with_symmetry(Symmetry::X, Vec3::new(10.0, 0.0, 0.0));
        v.op(&painter, &cube(Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0)));
        assert_eq!(v.get(IVec3::new(2, 0, 0)), RED);
        assert_eq!(v.get(IVec3::new(17, 0, 0)), RED);
        assert_eq!(v.voxel_count(), 2);
    }

    #[test]
    fn test_inherited_color() {
        let mut v = Volume::new();
        v.set(IVec3::new(0, 0, 0), BLUE);
        let painter = Painter::new(BlendMode::Over, Shape::Cube, RED)
            .with_color_blend(ColorBlend::Inherited);
        v.op(&painter, &cube(Vec3::new(0.0, 0.0, 3.0), Vec3::new(2.0, 1.0, 4.0)));
        // Column above the blue voxel inherits blue, the other keeps the user color
        assert_eq!(v.get(IVec3::new(0, 0, 3)), BLUE);
        assert_eq!(v.get(IVec3::new(1, 0, 3)), RED);
    }

    #[test]
    fn test_inherited_paint_does_not_copy_blocks() {
        let mut v = Volume::new();
        v.set(IVec3::new(0, 0, 0), BLUE);
        let tile = TilePos::new(0, 0, 0);
        let before = v.block(tile).unwrap() as *const Block;
        let painter = Painter::new(BlendMode::Over, Shape::Cube, RED)
            .with_color_blend(ColorBlend::Inherited);
        v.op(&painter, &cube(Vec3::new(0.0, 0.0, 3.0), Vec3::new(2.0, 1.0, 4.0)));
        assert!(std::ptr::eq(before, v.block(tile).unwrap()));
        assert_eq!(v.handle(tile).unwrap().ref_count(), 1);
        assert_eq!(v.get(IVec3::new(0, 0, 3)), BLUE);
    }

    #[test]
    fn test_color_below_skips_absent_tiles() {
        let mut v = Volume::new();
        v.set(IVec3::new(0, 0, 0), BLUE);
        v.set(IVec3::new(5, 0, 100), RED);
        let mut acc = Accessor::new();
        assert_eq!(v.color_below(IVec3::new(0, 0, 200), 0, &mut acc), Some(BLUE));
        assert_eq!(v.color_below(IVec3::new(0, 0, 200), 1, &mut acc), None);
        assert_eq!(v.color_below(IVec3::new(5, 0, 200), 0, &mut acc), Some(RED));
        assert_eq!(v.color_below(IVec3::new(5, 0, 100), 0, &mut acc), None);

        let painter = Painter::new(BlendMode::Over, Shape::Cube, RED)
            .with_color_blend(ColorBlend::Inherited);
        v.op(&painter, &cube(Vec3::new(0.0, 0.0, 200.0), Vec3::new(1.0, 1.0, 201.0)));
        assert_eq!(v.get(IVec3::new(0, 0, 200)), BLUE);
    }

    #[test]
    fn test_midpoint_and_add_inherited() {
        let placement = cube(Vec3::new(0.0, 0.0, 3.0), Vec3::new(2.0, 1.0, 4.0));
        let mut base = Volume::new();
        base.set(IVec3::new(0, 0, 0), BLUE);

        let mut v = base.clone();
        let painter = Painter::new(BlendMode::Over, Shape::Cube, RED)
            .with_color_blend(ColorBlend::MidpointInherited);
        v.op(&painter, &placement);
        assert_eq!(v.get(IVec3::new(0, 0, 3)), Voxel::rgb(127, 0, 127));
        assert_eq!(v.get(IVec3::new(1, 0, 3)), RED);

        let mut v = base.clone();
        let painter = Painter::new(BlendMode::Over, Shape::Cube, Voxel::rgb(200, 10, 10))
            .with_color_blend(ColorBlend::AddInherited);
        v.op(&painter, &placement);
        assert_eq!(v.get(IVec3::new(0, 0, 3)), Voxel::rgb(200, 10, 255));
        assert_eq!(v.get(IVec3::new(1, 0, 3)), Voxel::rgb(200, 10, 10));
    }

    #[test]
    fn test_smoothness_softens_edges() {
        let mut v = Volume::new();
        let painter = Painter::new(BlendMode::Over, Shape::Sphere, RED).with_smoothness(3.0);
        let b = Box4::from_center_half_extent(Vec3::splat(8.0), Vec3::splat(6.0));
        v.op(&painter, &b);
        assert_eq!(v.get(IVec3::splat(8)).a, 255);
        let edge = v.get(IVec3::new(13, 8, 8));
        assert!(edge.a > 0 && edge.a < 255, "{edge:?}");
    }
}
