//! Mathematical utilities and data structures

pub mod aabb;
pub mod bounds;
pub mod bbox;

pub use aabb::Aabb;
pub use bounds::VoxelBounds;
pub use bbox::Box4;
