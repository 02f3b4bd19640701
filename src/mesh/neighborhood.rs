//! Padded voxel snapshot of one tile and its one-voxel border

use glam::IVec3;

use crate::voxel::block::BLOCK_SIZE;
use crate::voxel::iter::Accessor;
use crate::voxel::tile::TilePos;
use crate::voxel::voxel::Voxel;
use crate::voxel::volume::Volume;

/// Edge length of the padded grid
const PADDED: i32 = BLOCK_SIZE + 2;

/// Copy of a tile plus one voxel on every side, so face visibility,
/// occlusion and surface extraction never go back to the volume.
pub struct Neighborhood {
    origin: IVec3,
    voxels: Vec<Voxel>,
    solid: usize,
}

fn padded_index(p: IVec3) -> usize {
    let q = p + IVec3::ONE;
    ((q.z * PADDED + q.y) * PADDED + q.x) as usize
}

impl Neighborhood {
    /// Snapshot `tile` of `volume`. Local coordinates range over -1..=BLOCK_SIZE.
    pub fn gather(volume: &Volume, tile: TilePos) -> Self {
        let origin = tile.origin();
        let mut voxels = vec![Voxel::EMPTY; (PADDED * PADDED * PADDED) as usize];
        let block = volume.block(tile);
        let mut acc = Accessor::new();
        let mut solid = 0;
        for z in -1..=BLOCK_SIZE {
            for y in -1..=BLOCK_SIZE {
                for x in -1..=BLOCK_SIZE {
                    let p = IVec3::new(x, y, z);
                    let inner = p.cmpge(IVec3::ZERO).all() && p.cmplt(IVec3::splat(BLOCK_SIZE)).all();
                    let v = match block {
                        Some(b) if inner => b.get(p),
                        None if inner => Voxel::EMPTY,
                        _ => volume.get_at(origin + p, &mut acc),
                    };
                    if inner && !v.is_empty() {
                        solid += 1;
                    }
                    voxels[padded_index(p)] = v;
                }
            }
        }
        Self { origin, voxels, solid }
    }

    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    /// Voxel at a tile-local position; empty outside the padded range.
    #[inline]
    pub fn get(&self, local: IVec3) -> Voxel {
        if local.cmplt(IVec3::splat(-1)).any() || local.cmpgt(IVec3::splat(BLOCK_SIZE)).any() {
            return Voxel::EMPTY;
        }
        self.voxels[padded_index(local)]
    }

    #[inline]
    pub fn solid(&self, local: IVec3) -> bool {
        !self.get(local).is_empty()
    }

    /// Number of present voxels inside the tile itself
    pub fn solid_count(&self) -> usize {
        self.solid
    }

    /// Whether any voxel of the padded grid is present
    pub fn any_solid(&self) -> bool {
        self.voxels.iter().any(|v| !v.is_empty())
    }
}
