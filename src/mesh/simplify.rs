//! Greedy coplanar face merging for export meshes

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::IVec3;

use super::faces::{Face, FACES};
use crate::voxel::voxel::Voxel;

/// Axis-aligned rectangle of merged voxel faces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quad {
    /// Lattice point of corner 0
    pub origin: IVec3,
    /// Index into [`FACES`]
    pub dir: usize,
    /// Extent along the face's u and v axes, in voxels
    pub width: i32,
    pub height: i32,
    pub color: Voxel,
}

impl Quad {
    /// Corners in winding order
    pub fn corners(&self) -> [IVec3; 4] {
        let face = &FACES[self.dir];
        let u = face.u * self.width;
        let v = face.v * self.height;
        [self.origin, self.origin + u, self.origin + u + v, self.origin + v]
    }
}

/// Per-channel color tolerance for a 0..=1 simplify factor
fn tolerance(simplify: f32) -> u8 {
    (simplify.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn similar(a: Voxel, b: Voxel, tol: u8) -> bool {
    a.rgb_distance(b).max(a.a.abs_diff(b.a)) <= tol
}

/// Merge coplanar, contiguous faces into rectangles.
///
/// `simplify == 0` keeps one quad per face. Above that, each rectangle grows
/// from its seed face first along u, then along v, accepting faces whose
/// color is within `simplify * 255` of the seed on every channel.
pub fn merge_faces(faces: &[Face], simplify: f32) -> Vec<Quad> {
    if simplify <= 0.0 || !simplify.is_finite() {
        return faces
            .iter()
            .map(|f| Quad {
                origin: FACES[f.dir].corner(f.pos, 0),
                dir: f.dir,
                width: 1,
                height: 1,
                color: f.color,
            })
            .collect();
    }
    let tol = tolerance(simplify);

    // (dir, layer) -> (u, v) -> color
    let mut planes: BTreeMap<(usize, i32), HashMap<(i32, i32), Voxel>> = BTreeMap::new();
    for f in faces {
        let face = &FACES[f.dir];
        planes
            .entry((f.dir, f.pos[face.axis]))
            .or_default()
            .insert((f.pos[face.u_axis], f.pos[face.v_axis]), f.color);
    }

    let mut quads = Vec::new();
    for ((dir, layer), cells) in &planes {
        let face = &FACES[*dir];
        let mut order: Vec<(i32, i32)> = cells.keys().copied().collect();
        order.sort_by_key(|&(u, v)| (v, u));
        let mut used: HashSet<(i32, i32)> = HashSet::with_capacity(order.len());

        let free = |used: &HashSet<(i32, i32)>, key: (i32, i32), seed: Voxel| {
            !used.contains(&key) && cells.get(&key).is_some_and(|c| similar(*c, seed, tol))
        };

        for &(u0, v0) in &order {
            if used.contains(&(u0, v0)) {
                continue;
            }
            let seed = cells[&(u0, v0)];
            let mut width = 1;
            while free(&used, (u0 + width, v0), seed) {
                width += 1;
            }
            let mut height = 1;
            while (0..width).all(|du| free(&used, (u0 + du, v0 + height), seed)) {
                height += 1;
            }
            for dv in 0..height {
                for du in 0..width {
                    used.insert((u0 + du, v0 + dv));
                }
            }

            let mut pos = IVec3::ZERO;
            pos[face.axis] = *layer;
            pos[face.u_axis] = u0;
            pos[face.v_axis] = v0;
            quads.push(Quad {
                origin: face.corner(pos, 0),
                dir: *dir,
                width,
                height,
                color: seed,
            });
        }
    }
    log::debug!("Merged {} faces into {} quads", faces.len(), quads.len());
    quads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::occlusion::FULL_LIGHT;

    fn face(pos: IVec3, dir: usize, color: Voxel) -> Face {
        Face { pos, dir, color, ao: [FULL_LIGHT; 4] }
    }

    #[test]
    fn test_zero_keeps_every_face() {
        let faces: Vec<Face> = (0..4).map(|x| face(IVec3::new(x, 0, 0), 4, Voxel::WHITE)).collect();
        let quads = merge_faces(&faces, 0.0);
        assert_eq!(quads.len(), 4);
        assert!(quads.iter().all(|q| q.width == 1 && q.height == 1));
    }

    #[test]
    fn test_merges_rectangle() {
        let mut faces = Vec::new();
        for y in 0..3 {
            for x in 0..4 {
                faces.push(face(IVec3::new(x, y, 7), 4, Voxel::WHITE));
            }
        }
        let quads = merge_faces(&faces, 0.5);
        assert_eq!(quads.len(), 1);
        let q = quads[0];
        assert_eq!((q.width, q.height), (4, 3));
        assert_eq!(q.corners(), [
            IVec3::new(0, 0, 8),
            IVec3::new(4, 0, 8),
            IVec3::new(4, 3, 8),
            IVec3::new(0, 3, 8),
        ]);
    }

    #[test]
    fn test_color_tolerance() {
        let faces = vec![
            face(IVec3::new(0, 0, 0), 4, Voxel::rgb(100, 100, 100)),
            face(IVec3::new(1, 0, 0), 4, Voxel::rgb(110, 100, 100)),
            face(IVec3::new(2, 0, 0), 4, Voxel::rgb(200, 100, 100)),
        ];
        // Tolerance 26 covers the first step only
        assert_eq!(merge_faces(&faces, 0.1).len(), 2);
        assert_eq!(merge_faces(&faces, 1.0).len(), 1);
    }

    #[test]
    fn test_planes_do_not_mix() {
        let faces = vec![
            face(IVec3::new(0, 0, 0), 4, Voxel::WHITE),
            face(IVec3::new(1, 0, 1), 4, Voxel::WHITE),
            face(IVec3::new(2, 0, 0), 5, Voxel::WHITE),
        ];
        assert_eq!(merge_faces(&faces, 1.0).len(), 3);
    }
}
