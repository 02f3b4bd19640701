//! Corner ambient occlusion, bump masks and lookup-texture coordinates

use glam::{IVec3, Vec3};

use super::faces::{FaceDir, CORNERS};
use super::neighborhood::Neighborhood;

/// Occlusion level of an unoccluded corner
pub const FULL_LIGHT: u8 = 3;

/// Occlusion texture: 16x16 tiles of 16 pixels
const OCCLUSION_TILE: u8 = 16;
/// Bump texture: 4x4 tiles of 64 pixels
const BUMP_TILE: u8 = 64;

/// In-plane step from a face center toward corner `i`
fn corner_steps(face: &FaceDir, i: usize) -> (IVec3, IVec3) {
    let (cu, cv) = CORNERS[i];
    let su = if cu == 1 { face.u } else { -face.u };
    let sv = if cv == 1 { face.v } else { -face.v };
    (su, sv)
}

/// Occlusion of each corner of the face of `p` pointing along `face`.
///
/// Samples the two edge neighbors and the diagonal in the layer in front of
/// the face. Two solid edges fully darken the corner.
pub fn face_ao(nb: &Neighborhood, p: IVec3, face: &FaceDir) -> [u8; 4] {
    let front = p + face.normal;
    let mut ao = [FULL_LIGHT; 4];
    for (i, level) in ao.iter_mut().enumerate() {
        let (su, sv) = corner_steps(face, i);
        let s1 = nb.solid(front + su);
        let s2 = nb.solid(front + sv);
        let c = nb.solid(front + su + sv);
        *level = if s1 && s2 { 0 } else { FULL_LIGHT - (s1 as u8 + s2 as u8 + c as u8) };
    }
    ao
}

/// Pack four 2-bit corner levels into one byte, corner 0 lowest
pub fn occlusion_mask(ao: [u8; 4]) -> u8 {
    ao.iter()
        .enumerate()
        .fold(0u8, |m, (i, a)| m | ((*a).min(FULL_LIGHT) << (i * 2)))
}

/// Texel of corner `i` inside the occlusion tile for `ao`
pub fn occlusion_uv(ao: [u8; 4], i: usize) -> [u8; 2] {
    let mask = occlusion_mask(ao);
    let base = [(mask % 16) * OCCLUSION_TILE, (mask / 16) * OCCLUSION_TILE];
    let (cu, cv) = CORNERS[i];
    [
        base[0] + cu as u8 * (OCCLUSION_TILE - 1),
        base[1] + cv as u8 * (OCCLUSION_TILE - 1),
    ]
}

/// Which in-plane neighbors (+u, -u, +v, -v) carry a visible face in the
/// same direction, so the bump texture can continue across them.
pub fn bump_mask(nb: &Neighborhood, p: IVec3, face: &FaceDir) -> u8 {
    let steps = [face.u, -face.u, face.v, -face.v];
    steps.iter().enumerate().fold(0u8, |m, (bit, d)| {
        let q = p + *d;
        if nb.solid(q) && !nb.solid(q + face.normal) {
            m | 1 << bit
        } else {
            m
        }
    })
}

/// Texel of corner `i` inside the bump tile for `mask`
pub fn bump_uv(mask: u8, i: usize) -> [u8; 2] {
    let mask = mask & 0xf;
    let base = [(mask % 4) * BUMP_TILE, (mask / 4) * BUMP_TILE];
    let (cu, cv) = CORNERS[i];
    [
        base[0] + cu as u8 * (BUMP_TILE - 1),
        base[1] + cv as u8 * (BUMP_TILE - 1),
    ]
}

/// Direction away from the solid cells around a lattice corner.
///
/// Falls back to `normal` when the surrounding occupancy is balanced.
pub fn corner_gradient(nb: &Neighborhood, corner: IVec3, normal: IVec3) -> Vec3 {
    let mut sum = Vec3::ZERO;
    for dz in -1..=0 {
        for dy in -1..=0 {
            for dx in -1..=0 {
                let cell = corner + IVec3::new(dx, dy, dz);
                if nb.solid(cell) {
                    sum += cell.as_vec3() + Vec3::splat(0.5) - corner.as_vec3();
                }
            }
        }
    }
    if sum.length_squared() < 1e-6 {
        normal.as_vec3()
    } else {
        -sum
    }
}
