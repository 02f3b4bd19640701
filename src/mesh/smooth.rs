//! Smooth surface extraction (surface nets over binary occupancy)
//!
//! Every cell whose eight corner voxels are mixed gets one vertex, placed at
//! the average of its crossing-edge midpoints. Each sign-changing voxel edge
//! owned by the tile emits one quad joining the four cells around it.

use glam::{IVec3, Vec3};

use super::neighborhood::Neighborhood;
use super::occlusion::{occlusion_uv, FULL_LIGHT};
use super::vertex::{pack_pos_data, snorm, MeshEffects, VoxelVertex};
use crate::voxel::block::BLOCK_SIZE;
use crate::voxel::voxel::Voxel;

/// Output units per voxel edge
pub const SMOOTH_SUBDIVIDE: i32 = 8;

/// Cells span -1..BLOCK_SIZE on each axis
const CELLS: i32 = BLOCK_SIZE + 1;

const AXES: [IVec3; 3] = [IVec3::X, IVec3::Y, IVec3::Z];

#[derive(Clone, Copy, Debug)]
struct CellVertex {
    /// Tile-local position in voxel units
    pos: Vec3,
    /// Outward occupancy gradient
    gradient: Vec3,
    color: Voxel,
    solid: u8,
}

fn corner_offset(i: usize) -> IVec3 {
    IVec3::new((i & 1) as i32, ((i >> 1) & 1) as i32, ((i >> 2) & 1) as i32)
}

fn cell_index(c: IVec3) -> Option<usize> {
    let q = c + IVec3::ONE;
    if q.cmplt(IVec3::ZERO).any() || q.cmpge(IVec3::splat(CELLS)).any() {
        return None;
    }
    Some(((q.z * CELLS + q.y) * CELLS + q.x) as usize)
}

fn cell_vertex(nb: &Neighborhood, c: IVec3) -> Option<CellVertex> {
    let corners: [Voxel; 8] = std::array::from_fn(|i| nb.get(c + corner_offset(i)));
    let solid = corners.iter().filter(|v| !v.is_empty()).count();
    if solid == 0 || solid == 8 {
        return None;
    }

    let mut sum = Vec3::ZERO;
    let mut crossings = 0;
    for (i, a) in corners.iter().enumerate() {
        for bit in [1, 2, 4] {
            if i & bit != 0 {
                continue;
            }
            if a.is_empty() != corners[i | bit].is_empty() {
                let mid = (corner_offset(i) + corner_offset(i | bit)).as_vec3() * 0.5;
                sum += mid;
                crossings += 1;
            }
        }
    }

    let mut gradient = Vec3::ZERO;
    let mut rgba = [0u32; 4];
    for (i, v) in corners.iter().enumerate().filter(|(_, v)| !v.is_empty()) {
        gradient -= corner_offset(i).as_vec3() - Vec3::splat(0.5);
        for (acc, ch) in rgba.iter_mut().zip(v.to_array()) {
            *acc += ch as u32;
        }
    }
    let n = solid as u32;
    let color = Voxel::new(
        ((rgba[0] + n / 2) / n) as u8,
        ((rgba[1] + n / 2) / n) as u8,
        ((rgba[2] + n / 2) / n) as u8,
        ((rgba[3] + n / 2) / n) as u8,
    );

    Some(CellVertex {
        pos: c.as_vec3() + Vec3::splat(0.5) + sum / crossings as f32,
        gradient,
        color,
        solid: solid as u8,
    })
}

/// Triangle vertices for the tile, in 1/[`SMOOTH_SUBDIVIDE`] voxel units.
pub fn smooth_vertices(nb: &Neighborhood, effects: MeshEffects) -> Vec<VoxelVertex> {
    let mut out = Vec::new();
    if !nb.any_solid() {
        return out;
    }

    let mut cells = vec![None; (CELLS * CELLS * CELLS) as usize];
    for z in -1..BLOCK_SIZE {
        for y in -1..BLOCK_SIZE {
            for x in -1..BLOCK_SIZE {
                let c = IVec3::new(x, y, z);
                if let Some(i) = cell_index(c) {
                    cells[i] = cell_vertex(nb, c);
                }
            }
        }
    }
    let cell = |c: IVec3| cell_index(c).and_then(|i| cells[i]);

    let flat = effects.contains(MeshEffects::FLAT);
    let occlusion = !effects.contains(MeshEffects::NO_OCCLUSION);

    for z in 0..BLOCK_SIZE {
        for y in 0..BLOCK_SIZE {
            for x in 0..BLOCK_SIZE {
                let a = IVec3::new(x, y, z);
                let inside = nb.solid(a);
                for k in 0..3 {
                    if inside == nb.solid(a + AXES[k]) {
                        continue;
                    }
                    let ei = AXES[(k + 1) % 3];
                    let ej = AXES[(k + 2) % 3];
                    let mut ring = [a, a - ei, a - ei - ej, a - ej];
                    if !inside {
                        ring.reverse();
                    }
                    let (Some(c0), Some(c1), Some(c2), Some(c3)) =
                        (cell(ring[0]), cell(ring[1]), cell(ring[2]), cell(ring[3]))
                    else {
                        continue;
                    };
                    let face = 2 * k + usize::from(!inside);
                    let tangent = snorm(ei.as_vec3());
                    for tri in [[c0, c1, c2], [c0, c2, c3]] {
                        let tri_normal =
                            (tri[1].pos - tri[0].pos).cross(tri[2].pos - tri[0].pos).normalize_or_zero();
                        for v in tri {
                            let normal = if flat || v.gradient.length_squared() < 1e-6 {
                                tri_normal
                            } else {
                                v.gradient
                            };
                            let level = if occlusion { FULL_LIGHT.min(8 - v.solid) } else { FULL_LIGHT };
                            let p = (v.pos * SMOOTH_SUBDIVIDE as f32).round();
                            out.push(VoxelVertex {
                                pos: [p.x as i16, p.y as i16, p.z as i16],
                                pos_data: pack_pos_data(a, face),
                                normal: snorm(normal),
                                tangent,
                                gradient: snorm(v.gradient),
                                color: v.color.to_array(),
                                uv: [0, 0],
                                occlusion_uv: occlusion_uv([level; 4], 0),
                                bump_uv: [0, 0],
                                _pad: [0; 2],
                            });
                        }
                    }
                }
            }
        }
    }
    out
}
