//! Extruding a plane slice through a box

use glam::{IVec3, Mat4};

use crate::math::Box4;
use crate::voxel::iter::Accessor;
use crate::voxel::volume::Volume;

impl Volume {
    /// Extend the voxels lying on `plane` along its normal through `bbox`.
    ///
    /// The plane's z column is its normal; the dominant axis of that normal is
    /// the extrusion axis and the voxel layer containing the plane origin is
    /// the source slice. For each column of `bbox`, the slice voxel is copied
    /// forward until an occupied voxel or the box edge is reached.
    /// Returns the number of voxels written.
    pub fn extrude(&mut self, plane: &Mat4, bbox: &Box4) -> usize {
        let normal = plane.z_axis.truncate();
        let region = bbox.voxel_bounds();
        if region.is_empty() || normal.length_squared() < 1e-12 {
            return 0;
        }
        let n = normal.abs();
        let axis = if n.x >= n.y && n.x >= n.z {
            0
        } else if n.y >= n.z {
            1
        } else {
            2
        };
        let step = if normal[axis] >= 0.0 { 1 } else { -1 };
        let layer = plane.w_axis[axis].floor() as i32;
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);

        let mut acc = Accessor::new();
        let mut written = 0;
        for a in region.min[u]..region.max[u] {
            for b in region.min[v]..region.max[v] {
                let mut pos = IVec3::ZERO;
                pos[u] = a;
                pos[v] = b;
                pos[axis] = layer;
                let source = self.get_at(pos, &mut acc);
                if source.is_empty() {
                    continue;
                }
                loop {
                    pos[axis] += step;
                    if !region.contains(pos) || !self.get_at(pos, &mut acc).is_empty() {
                        break;
                    }
                    self.set_at(pos, source, &mut acc);
                    written += 1;
                }
            }
        }
        log::debug!("extrude: {} voxels written", written);
        written
    }
}
