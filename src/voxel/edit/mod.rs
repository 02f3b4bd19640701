//! Volume editing primitives.
//!
//! Each submodule adds one family of operations to [`Volume`](crate::voxel::Volume):
//! shape painting, merging, moving, bulk blits, cropping, extrusion,
//! flood-fill selection, height queries and alpha shifts.

pub mod paint;
pub mod merge;
pub mod transform;
pub mod blit;
pub mod crop;
pub mod extrude;
pub mod select;
pub mod heights;
pub mod alpha;

pub use heights::HeightMap;
pub use select::SelectContext;
