//! Consolidated float mesh of a whole volume for export

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::faces::{visible_faces, FACES};
use super::neighborhood::Neighborhood;
use super::simplify::merge_faces;
use super::tile::generate_all_vertices;
use super::vertex::MeshEffects;
use crate::voxel::palette::Palette;
use crate::voxel::voxel::Voxel;
use crate::voxel::volume::Volume;

/// Export vertex (48 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// World position in voxel units (12 bytes, offset 0)
    pub pos: [f32; 3],
    /// Unit normal (12 bytes, offset 12)
    pub normal: [f32; 3],
    /// RGBA in 0..1, white when a palette is used (16 bytes, offset 24)
    pub color: [f32; 4],
    /// Palette texture coordinate, zero without a palette (8 bytes, offset 40)
    pub texcoord: [f32; 2],
}

/// Indexed triangle list with shared vertices welded
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub pos_min: Vec3,
    pub pos_max: Vec3,
}

impl ExportMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Index of an identical vertex, or a new one
    fn weld(&mut self, lookup: &mut HashMap<[u32; 12], u32>, v: MeshVertex) -> u32 {
        let key: [u32; 12] = bytemuck::cast(v);
        *lookup.entry(key).or_insert_with(|| {
            self.vertices.push(v);
            (self.vertices.len() - 1) as u32
        })
    }

    fn update_bounds(&mut self) {
        let mut it = self.vertices.iter().map(|v| Vec3::from(v.pos));
        let Some(first) = it.next() else {
            return;
        };
        let (lo, hi) = it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        self.pos_min = lo;
        self.pos_max = hi;
    }
}

/// Color and texcoord channels of an exported voxel color
fn shade(color: Voxel, palette: Option<&Palette>) -> ([f32; 4], [f32; 2]) {
    match palette.and_then(|p| p.nearest(color).map(|i| p.texcoord(i))) {
        Some(uv) => ([1.0; 4], uv),
        None => (color.to_f32(), [0.0; 2]),
    }
}

/// Triangulated mesh of the whole volume.
///
/// Quad mode emits one rectangle per merged face group (see
/// [`merge_faces`]); smooth mode ignores `simplify`. A palette replaces vertex
/// colors with the texture coordinate of the nearest palette entry.
/// `parallel` meshes smooth-mode tiles on the rayon pool.
pub fn generate_mesh(
    volume: &Volume,
    effects: MeshEffects,
    palette: Option<&Palette>,
    simplify: f32,
    parallel: bool,
) -> ExportMesh {
    let mut mesh = ExportMesh::default();
    let mut lookup = HashMap::new();

    if effects.contains(MeshEffects::MARCHING) {
        for tile_mesh in generate_all_vertices(volume, effects, parallel) {
            let origin = tile_mesh.tile.origin().as_vec3();
            let scale = 1.0 / tile_mesh.subdivide as f32;
            for v in &tile_mesh.vertices {
                let local = Vec3::new(v.pos[0] as f32, v.pos[1] as f32, v.pos[2] as f32);
                let (color, texcoord) = shade(Voxel::from(v.color), palette);
                let index = mesh.weld(&mut lookup, MeshVertex {
                    pos: (origin + local * scale).to_array(),
                    normal: v.normal_f32().to_array(),
                    color,
                    texcoord,
                });
                mesh.indices.push(index);
            }
        }
    } else {
        let faces: Vec<_> = volume
            .sorted_tiles()
            .into_iter()
            .flat_map(|tile| visible_faces(&Neighborhood::gather(volume, tile), false))
            .collect();
        for quad in merge_faces(&faces, simplify) {
            let normal = FACES[quad.dir].normal.as_vec3().to_array();
            let (color, texcoord) = shade(quad.color, palette);
            let corners = quad.corners().map(|c| {
                mesh.weld(&mut lookup, MeshVertex {
                    pos: c.as_vec3().to_array(),
                    normal,
                    color,
                    texcoord,
                })
            });
            mesh.indices.extend_from_slice(&[
                corners[0], corners[1], corners[2],
                corners[0], corners[2], corners[3],
            ]);
        }
    }

    mesh.update_bounds();
    log::debug!(
        "Export mesh: {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    mesh
}
