//! Rendering subsystem
//!
//! Everything between a snapshot of live commands and the triangle
//! batches handed to the host: tessellation, the mesh cache, LOD and
//! screen-space conversion, batch containers, and the per-frame
//! pipeline.

pub mod batch;
pub mod lod;
pub mod mesh_cache;
pub mod pipeline;
pub mod tessellation;

pub use batch::{BatchConsumer, ColorVertex, TexturedBatch, TexturedVertex, TriangleBatch};
pub use lod::{pixels_to_world_thickness, projected_pixel_radius, DetailLevel};
pub use mesh_cache::{MeshCache, MeshKey};
pub use pipeline::{FrameContext, ShapeRenderer, ShapeSubmitter};
pub use tessellation::UnitMesh;
