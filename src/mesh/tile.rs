//! Per-tile render meshes

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::IVec3;
use rayon::prelude::*;

use super::faces::{quad_vertices, visible_faces};
use super::neighborhood::Neighborhood;
use super::smooth::{smooth_vertices, SMOOTH_SUBDIVIDE};
use super::vertex::{MeshEffects, VoxelVertex};
use crate::voxel::tile::TilePos;
use crate::voxel::volume::Volume;

/// Render vertices of one tile.
///
/// Quad meshes carry four vertices per face at one unit per voxel; smooth
/// meshes carry three per triangle at [`SMOOTH_SUBDIVIDE`] units per voxel.
/// Positions are relative to the tile origin.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMesh {
    pub tile: TilePos,
    /// Changes whenever any voxel the mesh depends on changes
    pub key: u64,
    pub vertices: Vec<VoxelVertex>,
    /// Vertices per face: 4 for quads, 3 for triangles
    pub face_size: usize,
    /// Position units per voxel edge
    pub subdivide: i32,
}

impl TileMesh {
    pub fn face_count(&self) -> usize {
        self.vertices.len() / self.face_size
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Triangle list indices into `vertices`
    pub fn indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.face_count() * 6);
        for f in 0..self.face_count() as u32 {
            if self.face_size == 4 {
                let b = f * 4;
                out.extend_from_slice(&[b, b + 1, b + 2, b, b + 2, b + 3]);
            } else {
                let b = f * 3;
                out.extend_from_slice(&[b, b + 1, b + 2]);
            }
        }
        out
    }
}

/// Key over the block ids of `tile` and its 26 neighbors
pub fn mesh_key(volume: &Volume, tile: TilePos, effects: MeshEffects) -> u64 {
    let mut hasher = DefaultHasher::new();
    effects.hash(&mut hasher);
    tile.hash(&mut hasher);
    for dz in -1..=1 {
        for dy in -1..=1 {
            for dx in -1..=1 {
                volume.tile_key(tile.offset(IVec3::new(dx, dy, dz))).hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

/// Tiles that may produce geometry, sorted.
///
/// Smooth surfaces also reach one cell into the lower neighbors of every
/// stored tile.
pub fn mesh_tiles(volume: &Volume, effects: MeshEffects) -> Vec<TilePos> {
    let mut tiles = volume.sorted_tiles();
    if effects.contains(MeshEffects::MARCHING) {
        let stored = tiles.clone();
        for t in stored {
            for d in [IVec3::NEG_X, IVec3::NEG_Y, IVec3::NEG_Z] {
                tiles.push(t.offset(d));
            }
        }
        tiles.sort();
        tiles.dedup();
    }
    tiles
}

/// Render vertices for one tile. Reads the tile and its one-voxel border.
pub fn generate_vertices(volume: &Volume, tile: TilePos, effects: MeshEffects) -> TileMesh {
    let nb = Neighborhood::gather(volume, tile);
    let (vertices, face_size, subdivide) = if effects.contains(MeshEffects::MARCHING) {
        (smooth_vertices(&nb, effects), 3, SMOOTH_SUBDIVIDE)
    } else {
        let occlusion = !effects.contains(MeshEffects::NO_OCCLUSION);
        (quad_vertices(&nb, &visible_faces(&nb, occlusion)), 4, 1)
    };
    log::trace!("Tile {:?}: {} vertices", tile, vertices.len());
    TileMesh {
        tile,
        key: mesh_key(volume, tile, effects),
        vertices,
        face_size,
        subdivide,
    }
}

/// Meshes for every tile with geometry, sorted by tile.
pub fn generate_all_vertices(volume: &Volume, effects: MeshEffects, parallel: bool) -> Vec<TileMesh> {
    let tiles = mesh_tiles(volume, effects);
    let start = std::time::Instant::now();
    let meshes: Vec<TileMesh> = if parallel {
        tiles
            .par_iter()
            .map(|&tile| generate_vertices(volume, tile, effects))
            .filter(|m| !m.is_empty())
            .collect()
    } else {
        tiles
            .iter()
            .map(|&tile| generate_vertices(volume, tile, effects))
            .filter(|m| !m.is_empty())
            .collect()
    };
    log::debug!(
        "Meshed {} of {} tiles ({} faces) in {:.1}ms",
        meshes.len(),
        tiles.len(),
        meshes.iter().map(TileMesh::face_count).sum::<usize>(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    meshes
}
