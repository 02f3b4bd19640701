//! Visible voxel faces and quad vertex assembly

use glam::IVec3;

use super::neighborhood::Neighborhood;
use super::occlusion::{bump_mask, bump_uv, corner_gradient, face_ao, occlusion_uv, FULL_LIGHT};
use super::vertex::{pack_pos_data, snorm, VoxelVertex};
use crate::voxel::block::BLOCK_SIZE;
use crate::voxel::voxel::Voxel;

/// One of the six axis directions with its in-plane axes.
///
/// `u × v = normal`, so corners walked `0, u, u+v, v` wind counter-clockwise
/// seen from outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceDir {
    pub normal: IVec3,
    pub u: IVec3,
    pub v: IVec3,
    /// Axis index of the normal
    pub axis: usize,
    pub u_axis: usize,
    pub v_axis: usize,
}

const fn dir(normal: IVec3, axis: usize, u_axis: usize, v_axis: usize) -> FaceDir {
    const AXES: [IVec3; 3] = [IVec3::X, IVec3::Y, IVec3::Z];
    FaceDir {
        normal,
        u: AXES[u_axis],
        v: AXES[v_axis],
        axis,
        u_axis,
        v_axis,
    }
}

/// +X, -X, +Y, -Y, +Z, -Z
pub const FACES: [FaceDir; 6] = [
    dir(IVec3::X, 0, 1, 2),
    dir(IVec3::NEG_X, 0, 2, 1),
    dir(IVec3::Y, 1, 2, 0),
    dir(IVec3::NEG_Y, 1, 0, 2),
    dir(IVec3::Z, 2, 0, 1),
    dir(IVec3::NEG_Z, 2, 1, 0),
];

/// Corner offsets in (u, v) units, in winding order
pub const CORNERS: [(i32, i32); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

impl FaceDir {
    /// Lattice point of corner `i` of the face of voxel `p`.
    pub fn corner(&self, p: IVec3, i: usize) -> IVec3 {
        let (cu, cv) = CORNERS[i];
        p + self.normal.max(IVec3::ZERO) + self.u * cu + self.v * cv
    }
}

/// A visible voxel face
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    /// Absolute voxel position
    pub pos: IVec3,
    /// Index into [`FACES`]
    pub dir: usize,
    pub color: Voxel,
    /// Per-corner occlusion level, 0 (dark) to 3 (lit)
    pub ao: [u8; 4],
}

impl Face {
    /// Whether the quad should be split along its 1-3 diagonal. The split
    /// runs between the brighter pair of opposite corners.
    pub fn flipped(&self) -> bool {
        self.ao[1] as u32 + self.ao[3] as u32 > self.ao[0] as u32 + self.ao[2] as u32
    }
}

/// Faces of the tile's voxels whose neighbor across the face is empty.
pub fn visible_faces(nb: &Neighborhood, occlusion: bool) -> Vec<Face> {
    let mut faces = Vec::new();
    if nb.solid_count() == 0 {
        return faces;
    }
    for z in 0..BLOCK_SIZE {
        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                let p = IVec3::new(x, y, z);
                let color = nb.get(p);
                if color.is_empty() {
                    continue;
                }
                for (d, face) in FACES.iter().enumerate() {
                    if nb.solid(p + face.normal) {
                        continue;
                    }
                    let ao = if occlusion { face_ao(nb, p, face) } else { [FULL_LIGHT; 4] };
                    faces.push(Face { pos: nb.origin() + p, dir: d, color, ao });
                }
            }
        }
    }
    faces
}

const UV: [[u8; 2]; 4] = [[0, 0], [255, 0], [255, 255], [0, 255]];

/// Four vertices per face, tile-local, one unit per voxel.
pub fn quad_vertices(nb: &Neighborhood, faces: &[Face]) -> Vec<VoxelVertex> {
    let mut out = Vec::with_capacity(faces.len() * 4);
    for f in faces {
        let face = &FACES[f.dir];
        let p = f.pos - nb.origin();
        let mask = bump_mask(nb, p, face);
        let order: [usize; 4] = if f.flipped() { [1, 2, 3, 0] } else { [0, 1, 2, 3] };
        for i in order {
            let corner = face.corner(p, i);
            out.push(VoxelVertex {
                pos: [corner.x as i16, corner.y as i16, corner.z as i16],
                pos_data: pack_pos_data(p, f.dir),
                normal: snorm(face.normal.as_vec3()),
                tangent: snorm(face.u.as_vec3()),
                gradient: snorm(corner_gradient(nb, corner, face.normal)),
                color: f.color.to_array(),
                uv: UV[i],
                occlusion_uv: occlusion_uv(f.ao, i),
                bump_uv: bump_uv(mask, i),
                _pad: [0; 2],
            });
        }
    }
    out
}
