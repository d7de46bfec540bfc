//! # Draw Engine
//!
//! A dynamic vector-graphics command renderer: game logic on any thread
//! submits transient or persistent 3D drawing primitives (lines,
//! polylines, triangles, polygons, textured quads, wireframe stamps,
//! planes, spheres, boxes, cylinders), each with its own lifetime,
//! color, thickness and composable transform, optionally anchored to a
//! moving object; the render thread turns the live command set into
//! camera-relative, LOD-adjusted triangle batches every frame.
//!
//! ## Features
//!
//! - **Fire-and-forget submission**: non-blocking, validated at the API
//!   boundary, safe from any thread
//! - **Anchoring**: commands can follow host objects with sub-tick
//!   interpolation; a vanished object is a soft skip, never an error
//! - **Mesh caching**: curved primitives tessellate once per detail
//!   level and are reused by scale/translate
//! - **Screen-space LOD**: detail tiers and pixel-specified thickness
//!   derived from projected on-screen size every frame
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use draw_engine::prelude::*;
//!
//! struct NullSink;
//!
//! impl BatchConsumer for NullSink {
//!     fn draw_triangles(&mut self, _batch: &TriangleBatch) {}
//!     fn draw_textured(&mut self, _batch: &TexturedBatch) {}
//! }
//!
//! struct NoObjects;
//!
//! impl ObjectProvider for NoObjects {
//!     fn lookup(&self, _id: ObjectId) -> Option<ObjectState> {
//!         None
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut renderer = ShapeRenderer::new(RendererConfig::default());
//!     let submitter = renderer.submitter();
//!     submitter.draw_sphere(
//!         PointRef::Literal(Vec3::zeros()),
//!         1.0,
//!         16,
//!         20,
//!         Color::WHITE,
//!         Lifetime::Ticks(40),
//!         DrawTransform::identity(),
//!     )?;
//!
//!     let ctx = FrameContext::new(Vec3::new(0.0, 2.0, 8.0), 70.0, 1080, 0.0);
//!     renderer.render_frame(&ctx, &NoObjects, &mut NullSink);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod command;
pub mod config;
pub mod foundation;
pub mod render;

/// Common imports for renderer users
pub mod prelude {
    pub use crate::command::{
        anchor::{Attachment, ObjectId, ObjectProvider, ObjectState, PointRef},
        wireframe::{WireframeKey, WireframeShape},
        BoxExtent, CommandData, Lifetime, PolygonPoints, SubmitError, TextureId, Thickness,
    };
    pub use crate::config::{Config, ConfigError, LodConfig, RendererConfig};
    pub use crate::foundation::{
        color::Color,
        math::{DrawTransform, Quat, Rotation, Vec3},
    };
    pub use crate::render::{
        BatchConsumer, FrameContext, ShapeRenderer, ShapeSubmitter, TexturedBatch, TriangleBatch,
    };
}
