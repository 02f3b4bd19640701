//! Volume traversal.
//!
//! [`VolumeIter`] walks a volume tile by tile, yielding voxel positions (or
//! tile origins in [`IterMode::TILES`] mode). [`Accessor`] is the point-query
//! side: it caches the last tile looked up so column and row scans hit the
//! tile map once per tile instead of once per voxel.

use std::ops::BitOr;

use crate::core::types::IVec3;
use crate::math::VoxelBounds;
use super::block::{Block, BlockHandle};
use super::tile::TilePos;
use super::voxel::Voxel;
use super::volume::Volume;

/// Traversal mode flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct IterMode(u8);

impl IterMode {
    /// Visit individual voxels (the default when no flag is set)
    pub const VOXELS: IterMode = IterMode(1);
    /// Visit tile origins only
    pub const TILES: IterMode = IterMode(2);
    /// Skip transparent voxels and fully transparent tiles
    pub const SKIP_EMPTY: IterMode = IterMode(4);

    pub const fn contains(self, other: IterMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for IterMode {
    type Output = IterMode;

    fn bitor(self, rhs: IterMode) -> IterMode {
        IterMode(self.0 | rhs.0)
    }
}

/// Single-tile lookup cache for repeated `get_at` calls.
///
/// The cache is keyed on the volume identity and its generation counter, so
/// an accessor reused after a write or against another volume simply misses.
#[derive(Debug, Default)]
pub struct Accessor {
    volume: u64,
    generation: u64,
    cached: Option<(TilePos, Option<BlockHandle>)>,
}

impl Accessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the cached tile
    pub fn reset(&mut self) {
        self.cached = None;
    }

    /// Block at `tile` in `volume`, served from the cache when possible.
    pub fn block<'s>(&'s mut self, volume: &Volume, tile: TilePos) -> Option<&'s Block> {
        let hit = self.volume == volume.uid()
            && self.generation == volume.generation()
            && matches!(&self.cached, Some((t, _)) if *t == tile);
        if !hit {
            self.volume = volume.uid();
            self.generation = volume.generation();
            self.cached = Some((tile, volume.handle(tile).cloned()));
        }
        self.cached.as_ref().and_then(|(_, h)| h.as_deref())
    }
}

/// Resumable cursor over a volume.
///
/// Tiles are visited once each, in z-major sorted order; voxels inside a tile
/// are visited x fastest. Yields positions; use [`VolumeIter::colored`] to get
/// the voxel alongside.
pub struct VolumeIter<'a> {
    volume: &'a Volume,
    mode: IterMode,
    region: Option<VoxelBounds>,
    tiles: Vec<TilePos>,
    next_tile: usize,
    current: Option<(&'a Block, IVec3)>,
    /// Local voxel range still to visit in the current tile
    local: VoxelBounds,
    cursor: IVec3,
}

impl<'a> VolumeIter<'a> {
    pub fn new(volume: &'a Volume, mode: IterMode, region: Option<VoxelBounds>) -> Self {
        let tiles = volume
            .sorted_tiles()
            .into_iter()
            .filter(|t| region.is_none_or(|r| r.intersects(&t.bounds())))
            .collect();
        Self {
            volume,
            mode,
            region,
            tiles,
            next_tile: 0,
            current: None,
            local: VoxelBounds::EMPTY,
            cursor: IVec3::ZERO,
        }
    }

    /// Restrict the walk to `region`. Restarts the traversal.
    pub fn within(self, region: VoxelBounds) -> Self {
        Self::new(self.volume, self.mode, Some(region))
    }

    pub fn mode(&self) -> IterMode {
        self.mode
    }

    /// Yield `(position, voxel)` pairs instead of bare positions.
    pub fn colored(self) -> impl Iterator<Item = (IVec3, Voxel)> + 'a {
        let mut iter = self;
        std::iter::from_fn(move || iter.advance())
    }

    fn next_local(&mut self) -> Option<IVec3> {
        if self.cursor.z >= self.local.max.z {
            return None;
        }
        let out = self.cursor;
        self.cursor.x += 1;
        if self.cursor.x >= self.local.max.x {
            self.cursor.x = self.local.min.x;
            self.cursor.y += 1;
            if self.cursor.y >= self.local.max.y {
                self.cursor.y = self.local.min.y;
                self.cursor.z += 1;
            }
        }
        Some(out)
    }

    fn advance(&mut self) -> Option<(IVec3, Voxel)> {
        let skip_empty = self.mode.contains(IterMode::SKIP_EMPTY);
        loop {
            if let Some((block, origin)) = self.current {
                while let Some(local) = self.next_local() {
                    let voxel = block.get(local);
                    if skip_empty && voxel.is_empty() {
                        continue;
                    }
                    return Some((origin + local, voxel));
                }
                self.current = None;
            }

            let tile = *self.tiles.get(self.next_tile)?;
            self.next_tile += 1;
            let Some(block) = self.volume.block(tile) else {
                continue;
            };
            if skip_empty && block.is_empty() {
                continue;
            }
            if self.mode.contains(IterMode::TILES) {
                return Some((tile.origin(), Voxel::EMPTY));
            }

            let bounds = match self.region {
                Some(r) => tile.bounds().intersection(&r),
                None => tile.bounds(),
            };
            if bounds.is_empty() {
                continue;
            }
            let origin = tile.origin();
            self.local = VoxelBounds::new(bounds.min - origin, bounds.max - origin);
            self.cursor = self.local.min;
            self.current = Some((block, origin));
        }
    }
}

impl Iterator for VolumeIter<'_> {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        self.advance().map(|(pos, _)| pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::block::{BLOCK_SIZE, BLOCK_VOXELS};

    fn sample() -> Volume {
        let mut v = Volume::new();
        v.set(IVec3::new(1, 1, 1), Voxel::rgb(255, 0, 0));
        v.set(IVec3::new(-3, 0, 40), Voxel::rgb(0, 255, 0));
        v.set(IVec3::new(20, 0, 0), Voxel::rgb(0, 0, 255));
        v
    }

    #[test]
    fn test_skip_empty_visits_present_voxels() {
        let v = sample();
        let mut got: Vec<_> = v.iter(IterMode::VOXELS | IterMode::SKIP_EMPTY).collect();
        got.sort_by_key(|p| (p.z, p.y, p.x));
        assert_eq!(got, vec![IVec3::new(20, 0, 0), IVec3::new(1, 1, 1), IVec3::new(-3, 0, 40)]);
    }

    #[test]
    fn test_full_walk_covers_every_stored_voxel() {
        let v = sample();
        assert_eq!(v.iter(IterMode::VOXELS).count(), 3 * BLOCK_VOXELS);
    }

    #[test]
    fn test_tiles_mode() {
        let v = sample();
        let tiles: Vec<_> = v.iter(IterMode::TILES).collect();
        assert_eq!(tiles.len(), 3);
        assert!(tiles.contains(&IVec3::new(BLOCK_SIZE, 0, 0)));
        assert!(tiles.iter().all(|t| (*t % BLOCK_SIZE) == IVec3::ZERO));
    }

    #[test]
    fn test_skip_empty_tiles() {
        let mut v = sample();
        v.set(IVec3::new(20, 0, 0), Voxel::EMPTY);
        assert_eq!(v.iter(IterMode::TILES).count(), 3);
        assert_eq!(v.iter(IterMode::TILES | IterMode::SKIP_EMPTY).count(), 2);
    }

    #[test]
    fn test_within_region() {
        let v = sample();
        let region = VoxelBounds::new(IVec3::ZERO, IVec3::new(2, 2, 2));
        let all: Vec<_> = v.iter(IterMode::VOXELS).within(region).collect();
        assert_eq!(all.len(), 8);
        let colored: Vec<_> = v
            .iter_within(IterMode::SKIP_EMPTY, region)
            .colored()
            .collect();
        assert_eq!(colored, vec![(IVec3::new(1, 1, 1), Voxel::rgb(255, 0, 0))]);
    }

    #[test]
    fn test_accessor_caches_tile() {
        let v = sample();
        let mut acc = Accessor::new();
        assert!(acc.block(&v, TilePos::new(0, 0, 0)).is_some());
        assert!(acc.block(&v, TilePos::new(9, 9, 9)).is_none());
        let id = acc.block(&v, TilePos::new(0, 0, 0)).map(|b| b.id());
        assert_eq!(id, Some(v.tile_key(TilePos::new(0, 0, 0))));
    }
}
