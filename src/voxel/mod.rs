//! Sparse voxel storage and editing

pub mod voxel;
pub mod block;
pub mod tile;
pub mod volume;
pub mod iter;
pub mod blend;
pub mod palette;
pub mod brush;
pub mod edit;

pub use voxel::Voxel;
pub use block::{Block, BlockHandle, BLOCK_SIZE, live_blocks};
pub use tile::{TilePos, MAX_VOXEL_COORD};
pub use volume::Volume;
pub use iter::{Accessor, IterMode, VolumeIter};
pub use blend::{combine, BlendMode};
pub use palette::Palette;
pub use brush::{ColorBlend, ColorNoise, Painter, Shape, Symmetry};
pub use edit::{HeightMap, SelectContext};
