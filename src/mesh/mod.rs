//! Mesh generation
//!
//! Per-tile render buffers for incremental upload, and a consolidated float
//! mesh of a whole volume for export. Both only read the volume.

pub mod vertex;
pub mod neighborhood;
pub mod occlusion;
pub mod faces;
pub mod smooth;
pub mod tile;
pub mod simplify;
pub mod export;

pub use vertex::{MeshEffects, VoxelVertex};
pub use neighborhood::Neighborhood;
pub use faces::{Face, FaceDir, FACES};
pub use tile::{generate_all_vertices, generate_vertices, mesh_key, TileMesh};
pub use simplify::Quad;
pub use export::{generate_mesh, ExportMesh, MeshVertex};
