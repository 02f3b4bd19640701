//! Sparse voxel volume.
//!
//! A volume maps tile positions to shared blocks. Voxels in tiles that are
//! not stored are transparent. Cloning a volume copies the tile map and
//! shares every block; blocks are duplicated lazily on first write.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::types::IVec3;
use crate::math::{Box4, VoxelBounds};
use super::block::{Block, BlockHandle, block_local};
use super::iter::{Accessor, IterMode, VolumeIter};
use super::tile::{in_range, local_pos, TilePos};
use super::voxel::Voxel;

static NEXT_VOLUME_UID: AtomicU64 = AtomicU64::new(1);

fn next_volume_uid() -> u64 {
    NEXT_VOLUME_UID.fetch_add(1, Ordering::Relaxed)
}

/// Sparse container of voxel tiles
pub struct Volume {
    /// Identity used to validate accessor caches
    uid: u64,
    /// Bumped on every structural or voxel change
    generation: u64,
    tiles: HashMap<TilePos, BlockHandle>,
}

impl Volume {
    /// Create a new empty volume
    pub fn new() -> Self {
        Self {
            uid: next_volume_uid(),
            generation: 0,
            tiles: HashMap::new(),
        }
    }

    /// Shallow copy sharing every block with `self`.
    pub fn copy(&self) -> Volume {
        log::trace!("volume copy: {} tiles shared", self.tiles.len());
        Self {
            uid: next_volume_uid(),
            generation: 0,
            tiles: self.tiles.clone(),
        }
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of stored tiles (empty ones included)
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// True when no voxel is present
    pub fn is_empty(&self) -> bool {
        self.tiles.values().all(|h| h.is_empty())
    }

    /// Drop every tile
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.generation += 1;
    }

    /// Accessor cache for repeated point queries
    pub fn accessor(&self) -> Accessor {
        Accessor::new()
    }

    /// Iterate with the given mode
    pub fn iter(&self, mode: IterMode) -> VolumeIter<'_> {
        VolumeIter::new(self, mode, None)
    }

    /// Iterate only inside `region`
    pub fn iter_within(&self, mode: IterMode, region: VoxelBounds) -> VolumeIter<'_> {
        VolumeIter::new(self, mode, Some(region))
    }

    // -- Block pool access ---------------------------------------------------

    /// Block stored at `tile`, if any
    pub fn block(&self, tile: TilePos) -> Option<&Block> {
        self.tiles.get(&tile).map(|h| h.block())
    }

    pub fn handle(&self, tile: TilePos) -> Option<&BlockHandle> {
        self.tiles.get(&tile)
    }

    /// Mutable block at `tile`. Allocates a transparent block when absent and
    /// duplicates a shared one.
    pub fn block_mut(&mut self, tile: TilePos) -> &mut Block {
        self.generation += 1;
        self.tiles
            .entry(tile)
            .or_insert_with(BlockHandle::empty)
            .make_mut()
    }

    /// Mutable block at `tile` only if one is already stored.
    pub fn existing_block_mut(&mut self, tile: TilePos) -> Option<&mut Block> {
        let handle = self.tiles.get_mut(&tile)?;
        self.generation += 1;
        Some(handle.make_mut())
    }

    /// Store a block handle at `tile`, sharing it. Returns the previous one.
    pub fn insert_tile(&mut self, tile: TilePos, handle: BlockHandle) -> Option<BlockHandle> {
        self.generation += 1;
        self.tiles.insert(tile, handle)
    }

    pub fn remove_tile(&mut self, tile: TilePos) -> Option<BlockHandle> {
        self.generation += 1;
        self.tiles.remove(&tile)
    }

    /// Stored tiles in unspecified order
    pub fn tiles(&self) -> impl Iterator<Item = (TilePos, &BlockHandle)> {
        self.tiles.iter().map(|(t, h)| (*t, h))
    }

    /// Stored tile positions, sorted z-major
    pub fn sorted_tiles(&self) -> Vec<TilePos> {
        let mut tiles: Vec<TilePos> = self.tiles.keys().copied().collect();
        tiles.sort_unstable();
        tiles
    }

    /// Drop tiles whose block is entirely transparent. Returns how many.
    pub fn remove_empty_tiles(&mut self) -> usize {
        let before = self.tiles.len();
        self.tiles.retain(|_, h| !h.is_empty());
        let removed = before - self.tiles.len();
        if removed > 0 {
            self.generation += 1;
            log::trace!("reclaimed {} empty tiles", removed);
        }
        removed
    }

    /// Reclaim only the listed tiles when they became empty.
    pub(crate) fn reclaim_tiles(&mut self, tiles: impl IntoIterator<Item = TilePos>) {
        for tile in tiles {
            if self.tiles.get(&tile).is_some_and(|h| h.is_empty()) {
                self.tiles.remove(&tile);
                self.generation += 1;
            }
        }
    }

    /// Take over the tiles of `other`, keeping this volume's identity.
    pub(crate) fn replace_tiles(&mut self, other: Volume) {
        self.tiles = other.tiles;
        self.generation += 1;
    }

    // -- Point access ----------------------------------------------------------

    /// Voxel at `pos`. Absent tiles and out-of-range positions read as empty.
    pub fn get(&self, pos: IVec3) -> Voxel {
        if !in_range(pos) {
            return Voxel::EMPTY;
        }
        self.block(TilePos::from_voxel(pos))
            .map(|b| b.get(local_pos(pos)))
            .unwrap_or(Voxel::EMPTY)
    }

    /// Voxel at `pos`, reusing the tile cached in `acc`.
    pub fn get_at(&self, pos: IVec3, acc: &mut Accessor) -> Voxel {
        if !in_range(pos) {
            return Voxel::EMPTY;
        }
        match acc.block(self, TilePos::from_voxel(pos)) {
            Some(block) => block.get(local_pos(pos)),
            None => Voxel::EMPTY,
        }
    }

    /// Write a voxel. Transparent writes never allocate a tile, unchanged
    /// writes never trigger a copy, and out-of-range positions are ignored.
    pub fn set(&mut self, pos: IVec3, voxel: Voxel) {
        if !in_range(pos) {
            return;
        }
        let voxel = if voxel.is_empty() { Voxel::EMPTY } else { voxel };
        let tile = TilePos::from_voxel(pos);
        let local = local_pos(pos);
        match self.tiles.get(&tile) {
            Some(h) if h.get(local) == voxel => return,
            None if voxel.is_empty() => return,
            _ => {}
        }
        self.block_mut(tile).set(local, voxel);
    }

    /// Write through an accessor. The accessor drops its cached tile first so
    /// it never holds a second reference to the block being written.
    pub fn set_at(&mut self, pos: IVec3, voxel: Voxel, acc: &mut Accessor) {
        acc.reset();
        self.set(pos, voxel);
    }

    // -- Bounds ------------------------------------------------------------------

    /// Voxel bounds of the volume. `exact` gives the tight bounds of present
    /// voxels, otherwise the union of non-empty tiles.
    pub fn bounds(&self, exact: bool) -> VoxelBounds {
        let mut bounds = VoxelBounds::EMPTY;
        for (tile, handle) in self.tiles() {
            if handle.is_empty() {
                continue;
            }
            if !exact {
                bounds = bounds.union(&tile.bounds());
                continue;
            }
            let mut local = VoxelBounds::EMPTY;
            for (i, v) in handle.voxels().iter().enumerate() {
                if !v.is_empty() {
                    local.include(block_local(i));
                }
            }
            let origin = tile.origin();
            bounds = bounds.union(&VoxelBounds::new(local.min + origin, local.max + origin));
        }
        bounds
    }

    /// Bounding box in 4x4 form; null when the volume is empty.
    pub fn get_box(&self, exact: bool) -> Box4 {
        Box4::from_voxel_bounds(&self.bounds(exact))
    }

    /// Size of the exact bounding box
    pub fn dimensions(&self) -> IVec3 {
        self.bounds(true).size()
    }

    /// Minimum corner of the exact bounding box (zero when empty)
    pub fn start_pos(&self) -> IVec3 {
        let bounds = self.bounds(true);
        if bounds.is_empty() { IVec3::ZERO } else { bounds.min }
    }

    // -- Identity ----------------------------------------------------------------

    /// Hash of the tile layout and block ids; changes whenever any voxel does.
    pub fn key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for tile in self.sorted_tiles() {
            tile.hash(&mut hasher);
            self.tiles[&tile].id().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Block id at `tile`, or 0 when absent
    pub fn tile_key(&self, tile: TilePos) -> u64 {
        self.block(tile).map(|b| b.id()).unwrap_or(0)
    }

    /// Voxel-by-voxel equality; empty stored tiles equal absent ones.
    pub fn structurally_eq(&self, other: &Volume) -> bool {
        let covered = |a: &Volume, b: &Volume| {
            a.tiles().all(|(tile, handle)| match b.handle(tile) {
                Some(other) => other.ptr_eq(handle) || other.block() == handle.block(),
                None => handle.is_empty(),
            })
        };
        covered(self, other) && covered(other, self)
    }

    /// Number of present voxels
    pub fn voxel_count(&self) -> usize {
        self.tiles.values().map(|h| h.occupied_count()).sum()
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Volume {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl PartialEq for Volume {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_eq(other)
    }
}

impl std::fmt::Debug for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("uid", &self.uid)
            .field("tiles", &self.tiles.len())
            .finish()
    }
}

/// Build a volume from `(position, voxel)` pairs.
impl FromIterator<(IVec3, Voxel)> for Volume {
    fn from_iter<I: IntoIterator<Item = (IVec3, Voxel)>>(iter: I) -> Self {
        let mut volume = Volume::new();
        for (pos, voxel) in iter {
            volume.set(pos, voxel);
        }
        volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::block::BLOCK_SIZE;
    use crate::voxel::tile::MAX_VOXEL_COORD;

    const RED: Voxel = Voxel::rgb(255, 0, 0);

    #[test]
    fn test_absent_reads_empty() {
        let volume = Volume::new();
        assert!(volume.get(IVec3::new(3, -40, 1000)).is_empty());
        let mut acc = volume.accessor();
        assert!(volume.get_at(IVec3::new(-7, 2, 9), &mut acc).is_empty());
        assert_eq!(volume.tile_count(), 0);
    }

    #[test]
    fn test_transparent_write_does_not_allocate() {
        let mut volume = Volume::new();
        volume.set(IVec3::new(1, 2, 3), Voxel::EMPTY);
        volume.set(IVec3::new(1, 2, 3), Voxel::new(9, 9, 9, 0));
        assert_eq!(volume.tile_count(), 0);
        assert!(volume.get(IVec3::new(1, 2, 3)).is_empty());
    }

    #[test]
    fn test_set_get() {
        let mut volume = Volume::new();
        let mut acc = volume.accessor();
        volume.set_at(IVec3::new(-1, 0, 17), RED, &mut acc);
        assert_eq!(volume.get_at(IVec3::new(-1, 0, 17), &mut acc), RED);
        assert_eq!(volume.get(IVec3::new(-1, 0, 17)), RED);
        assert_eq!(volume.tile_count(), 1);

        // Clearing keeps the tile but reads empty
        volume.set(IVec3::new(-1, 0, 17), Voxel::EMPTY);
        assert!(volume.get(IVec3::new(-1, 0, 17)).is_empty());
        assert_eq!(volume.remove_empty_tiles(), 1);
        assert_eq!(volume.tile_count(), 0);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut volume = Volume::new();
        let far = IVec3::new(MAX_VOXEL_COORD, 0, 0);
        volume.set(far, RED);
        assert_eq!(volume.tile_count(), 0);
        assert!(volume.get(far).is_empty());
        assert!(volume.get(IVec3::splat(i32::MIN)).is_empty());
    }

    #[test]
    fn test_copy_isolation() {
        let mut original = Volume::new();
        for x in 0..40 {
            original.set(IVec3::new(x, 1, 2), RED);
        }
        let mut copy = original.copy();
        assert_eq!(copy, original);
        assert!(copy.handle(TilePos::new(0, 0, 0)).unwrap().ptr_eq(original.handle(TilePos::new(0, 0, 0)).unwrap()));

        copy.set(IVec3::new(5, 1, 2), Voxel::rgb(0, 255, 0));
        copy.set(IVec3::new(100, 100, 100), RED);

        assert_eq!(original.get(IVec3::new(5, 1, 2)), RED);
        assert!(original.get(IVec3::new(100, 100, 100)).is_empty());
        assert_ne!(copy, original);
        // Untouched tiles are still shared
        assert!(copy.handle(TilePos::new(1, 0, 0)).unwrap().ptr_eq(original.handle(TilePos::new(1, 0, 0)).unwrap()));
    }

    #[test]
    fn test_accessor_sees_writes_from_other_paths() {
        let mut volume = Volume::new();
        volume.set(IVec3::ZERO, RED);
        let mut acc = volume.accessor();
        assert_eq!(volume.get_at(IVec3::ZERO, &mut acc), RED);

        volume.set(IVec3::ZERO, Voxel::rgb(0, 0, 255));
        assert_eq!(volume.get_at(IVec3::ZERO, &mut acc), Voxel::rgb(0, 0, 255));

        // Same accessor against another volume never returns stale data
        let other = Volume::new();
        assert!(other.get_at(IVec3::ZERO, &mut acc).is_empty());
    }

    #[test]
    fn test_bounds() {
        let mut volume = Volume::new();
        assert!(volume.get_box(true).is_null());
        assert_eq!(volume.dimensions(), IVec3::ZERO);

        volume.set(IVec3::new(2, 3, 5), RED);
        volume.set(IVec3::new(-4, 3, 6), RED);
        let exact = volume.bounds(true);
        assert_eq!(exact, VoxelBounds::new(IVec3::new(-4, 3, 5), IVec3::new(3, 4, 7)));
        assert_eq!(volume.dimensions(), IVec3::new(7, 1, 2));
        assert_eq!(volume.start_pos(), IVec3::new(-4, 3, 5));

        let loose = volume.bounds(false);
        assert_eq!(loose, VoxelBounds::new(IVec3::new(-BLOCK_SIZE, 0, 0), IVec3::splat(BLOCK_SIZE)));
        let b = volume.get_box(true);
        assert_eq!(b.dimensions(), IVec3::new(7, 1, 2));
        assert_eq!(b.start_pos(), IVec3::new(-4, 3, 5));
    }

    #[test]
    fn test_keys_track_changes() {
        let mut volume = Volume::new();
        volume.set(IVec3::ZERO, RED);
        let key = volume.key();
        let tile_key = volume.tile_key(TilePos::new(0, 0, 0));
        assert_eq!(volume.key(), key);

        volume.set(IVec3::ONE, RED);
        assert_ne!(volume.key(), key);
        assert_ne!(volume.tile_key(TilePos::new(0, 0, 0)), tile_key);
        assert_eq!(volume.tile_key(TilePos::new(5, 5, 5)), 0);
    }

    #[test]
    fn test_structural_eq_ignores_empty_tiles() {
        let mut a = Volume::new();
        let b = Volume::new();
        a.set(IVec3::ZERO, RED);
        a.set(IVec3::ZERO, Voxel::EMPTY);
        assert_eq!(a.tile_count(), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_iter_and_count() {
        let volume: Volume = (0..5).map(|i| (IVec3::new(i, 0, 0), RED)).collect();
        assert_eq!(volume.voxel_count(), 5);
        assert!(!volume.is_empty());
    }
}
