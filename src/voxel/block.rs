//! Fixed-size voxel blocks and their shared handles.
//!
//! A block is the unit of allocation and of copy-on-write sharing. Volumes
//! hold blocks through [`BlockHandle`]s; cloning a handle shares the block,
//! and the first mutable access through a shared handle duplicates it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::core::types::IVec3;
use super::voxel::Voxel;

/// Edge length of a block in voxels (power of two).
pub const BLOCK_SIZE: i32 = 16;

/// Voxels per block.
pub const BLOCK_VOXELS: usize = (BLOCK_SIZE * BLOCK_SIZE * BLOCK_SIZE) as usize;

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);
static LIVE_BLOCKS: AtomicUsize = AtomicUsize::new(0);

fn next_block_id() -> u64 {
    NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed)
}

/// Number of blocks currently allocated in the process.
pub fn live_blocks() -> usize {
    LIVE_BLOCKS.load(Ordering::Relaxed)
}

/// Index of a local position, x fastest then y then z.
#[inline]
pub fn block_index(local: IVec3) -> usize {
    debug_assert!(local.cmpge(IVec3::ZERO).all() && local.cmplt(IVec3::splat(BLOCK_SIZE)).all());
    ((local.z * BLOCK_SIZE + local.y) * BLOCK_SIZE + local.x) as usize
}

/// Local position of a block index.
#[inline]
pub fn block_local(index: usize) -> IVec3 {
    let i = index as i32;
    IVec3::new(i % BLOCK_SIZE, (i / BLOCK_SIZE) % BLOCK_SIZE, i / (BLOCK_SIZE * BLOCK_SIZE))
}

/// Dense BLOCK_SIZE^3 array of voxels.
pub struct Block {
    /// Changes on every mutation; used as a cache key by renderers.
    id: u64,
    voxels: Box<[Voxel]>,
}

impl Block {
    /// Fully transparent block
    pub fn new() -> Self {
        LIVE_BLOCKS.fetch_add(1, Ordering::Relaxed);
        Self {
            id: next_block_id(),
            voxels: vec![Voxel::EMPTY; BLOCK_VOXELS].into_boxed_slice(),
        }
    }

    /// Block with every voxel set to `voxel`
    pub fn filled(voxel: Voxel) -> Self {
        let mut block = Self::new();
        block.voxels.fill(voxel);
        block
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get voxel at local coordinates
    #[inline]
    pub fn get(&self, local: IVec3) -> Voxel {
        self.voxels[block_index(local)]
    }

    /// Set voxel at local coordinates
    #[inline]
    pub fn set(&mut self, local: IVec3, voxel: Voxel) {
        self.voxels[block_index(local)] = voxel;
    }

    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn voxels_mut(&mut self) -> &mut [Voxel] {
        &mut self.voxels
    }

    /// Check if every voxel is transparent
    pub fn is_empty(&self) -> bool {
        self.voxels.iter().all(|v| v.is_empty())
    }

    /// Count of non-transparent voxels
    pub fn occupied_count(&self) -> usize {
        self.voxels.iter().filter(|v| !v.is_empty()).count()
    }

    fn touch(&mut self) {
        self.id = next_block_id();
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Block {
    /// Duplicates the voxel data under a fresh id.
    fn clone(&self) -> Self {
        LIVE_BLOCKS.fetch_add(1, Ordering::Relaxed);
        Self {
            id: next_block_id(),
            voxels: self.voxels.clone(),
        }
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        LIVE_BLOCKS.fetch_sub(1, Ordering::Relaxed);
    }
}

impl PartialEq for Block {
    /// Content equality; ids are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.voxels == other.voxels
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id)
            .field("occupied", &self.occupied_count())
            .finish()
    }
}

/// Reference-counted, copy-on-write handle to a block.
#[derive(Clone, Debug)]
pub struct BlockHandle(Arc<Block>);

impl BlockHandle {
    pub fn new(block: Block) -> Self {
        Self(Arc::new(block))
    }

    /// Fresh transparent block
    pub fn empty() -> Self {
        Self::new(Block::new())
    }

    pub fn block(&self) -> &Block {
        &self.0
    }

    /// Mutable access. Duplicates the block first when it is shared, so
    /// writes are never visible through other handles.
    pub fn make_mut(&mut self) -> &mut Block {
        let block = Arc::make_mut(&mut self.0);
        block.touch();
        block
    }

    /// Number of handles sharing this block
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    pub fn is_shared(&self) -> bool {
        self.ref_count() > 1
    }

    /// Whether both handles point at the same block
    pub fn ptr_eq(&self, other: &BlockHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for BlockHandle {
    type Target = Block;

    fn deref(&self) -> &Block {
        &self.0
    }
}
