//! Column height queries

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::math::VoxelBounds;
use crate::voxel::volume::Volume;

/// Top occupied voxel per (x, y) column of a box.
///
/// `heights[y * dims.x + x]` is the z offset from `start.z` of the highest
/// present voxel in column `(start.x + x, start.y + y)`, or -1 when the
/// column is empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightMap {
    pub start: IVec3,
    pub dims: IVec3,
    pub heights: Vec<i32>,
}

impl HeightMap {
    /// Map with every column empty
    pub fn new(start: IVec3, dims: IVec3) -> Self {
        let dims = dims.max(IVec3::ZERO);
        Self {
            start,
            dims,
            heights: vec![-1; dims.x as usize * dims.y as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (rx, ry) = (x - self.start.x, y - self.start.y);
        if rx < 0 || ry < 0 || rx >= self.dims.x || ry >= self.dims.y {
            return None;
        }
        Some(ry as usize * self.dims.x as usize + rx as usize)
    }

    /// Height of the column at absolute `(x, y)`; `None` outside the map.
    pub fn get(&self, x: i32, y: i32) -> Option<i32> {
        self.index(x, y).map(|i| self.heights[i])
    }

    /// Absolute z of the top voxel at `(x, y)`, if any.
    pub fn top_z(&self, x: i32, y: i32) -> Option<i32> {
        self.get(x, y).filter(|h| *h >= 0).map(|h| h + self.start.z)
    }
}

impl Volume {
    /// Column heights over the volume's tile box.
    pub fn heights(&self) -> HeightMap {
        let bbox = self.get_box(false);
        self.heights_in_box(bbox.dimensions(), bbox.start_pos())
    }

    /// Column heights over the box of `dims` voxels at `start`.
    ///
    /// Only stored tiles overlapping the box are scanned, each column from
    /// the top down.
    pub fn heights_in_box(&self, dims: IVec3, start: IVec3) -> HeightMap {
        let mut map = HeightMap::new(start, dims);
        let region = VoxelBounds::from_start_size(start, dims);
        if region.is_empty() {
            return map;
        }
        for (tile, handle) in self.tiles() {
            let area = tile.bounds().intersection(&region);
            if area.is_empty() || handle.is_empty() {
                continue;
            }
            let origin = tile.origin();
            for y in area.min.y..area.max.y {
                for x in area.min.x..area.max.x {
                    let top = (area.min.z..area.max.z)
                        .rev()
                        .find(|z| !handle.get(IVec3::new(x, y, *z) - origin).is_empty());
                    let (Some(z), Some(i)) = (top, map.index(x, y)) else {
                        continue;
                    };
                    map.heights[i] = map.heights[i].max(z - start.z);
                }
            }
        }
        map
    }
}
