//! Painting brushes: shapes, the painter value, and shape rasterization

pub mod shape;
pub mod painter;
pub mod raster;

pub use shape::Shape;
pub use painter::{ColorBlend, ColorNoise, Painter, Symmetry};
pub use raster::Rasterizer;
