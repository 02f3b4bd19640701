//! Shape rasterization: turns a placed shape into per-voxel coverage

use glam::{IVec3, Mat4};

use crate::math::{Box4, VoxelBounds};
use super::shape::Shape;

/// Coverage for a signed distance `d` (voxel units) with the given soft band.
///
/// Voxels with `d > 0` are outside. With a band, coverage ramps from 1/255 at
/// the surface to 1 at depth `smoothness`.
pub fn edge_coverage(d: f32, smoothness: f32) -> f32 {
    if d > 0.0 || d.is_nan() {
        0.0
    } else if smoothness <= 0.0 {
        1.0
    } else {
        (-d / smoothness).clamp(1.0 / 255.0, 1.0)
    }
}

/// A shape placed in voxel space, ready to be sampled at voxel centers.
#[derive(Clone, Debug)]
pub struct Rasterizer {
    shape: Shape,
    inverse: Mat4,
    min_half_extent: f32,
    smoothness: f32,
    clip: Option<Box4>,
    bounds: VoxelBounds,
}

impl Rasterizer {
    /// `None` when the placement is null or degenerate.
    pub fn new(shape: Shape, placement: &Box4, smoothness: f32, clip: Option<&Box4>) -> Option<Self> {
        if placement.is_null() || placement.mat.determinant().abs() < 1e-12 {
            log::trace!("skipping degenerate shape placement");
            return None;
        }
        let clip = clip.filter(|c| !c.is_null()).copied();
        let mut bounds = placement.covering_voxels();
        if let Some(clip) = &clip {
            bounds = bounds.intersection(&clip.covering_voxels());
        }
        Some(Self {
            shape,
            inverse: placement.mat.inverse(),
            min_half_extent: placement.half_extents().min_element(),
            smoothness: smoothness.max(0.0),
            clip,
            bounds,
        })
    }

    /// Voxels that may receive non-zero coverage
    pub fn bounds(&self) -> VoxelBounds {
        self.bounds
    }

    /// Coverage (0..=1) of the voxel at `pos`, sampled at its center.
    pub fn coverage(&self, pos: IVec3) -> f32 {
        if !self.bounds.contains(pos) {
            return 0.0;
        }
        let center = pos.as_vec3() + 0.5;
        if let Some(clip) = &self.clip {
            if !clip.contains_point(center) {
                return 0.0;
            }
        }
        let d = self.shape.world_sdf(&self.inverse, self.min_half_extent, center);
        edge_coverage(d, self.smoothness)
    }

    /// Every covered voxel with its coverage
    pub fn voxels(&self) -> impl Iterator<Item = (IVec3, f32)> + '_ {
        self.bounds
            .iter()
            .map(|pos| (pos, self.coverage(pos)))
            .filter(|(_, c)| *c > 0.0)
    }
}
