//! Voxcore - sparse voxel volume engine
//!
//! Copy-on-write block storage keyed by tile, iteration, blend algebra,
//! brush painting and volume editing, and mesh generation.

pub mod core;
pub mod config;
pub mod math;
pub mod voxel;
pub mod mesh;
