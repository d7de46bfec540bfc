//! Per-frame render pipeline
//!
//! [`ShapeRenderer`] is the owning subsystem handle: it holds the command
//! store, the mesh cache, the wireframe library and the configuration,
//! and turns the live command set into camera-relative triangle batches
//! once per displayed frame. Producers submit through cheap clonable
//! [`ShapeSubmitter`] handles from any thread.
//!
//! ## Per-frame algorithm
//!
//! 1. Snapshot the live commands.
//! 2. First pass: resolve anchors, transforms and LOD for every
//!    untextured command and emit its triangles, in snapshot order, into
//!    one shared batch; flush it.
//! 3. Second pass: group textured quads by texture and flush one batch
//!    per texture, so each texture is bound exactly once per frame.
//! 4. Age the commands that were live this frame and prune expired ones.
//!
//! No sorting by depth happens inside a batch; transparency order is the
//! producer's responsibility. No failure of one command (missing anchor,
//! degenerate geometry) ever aborts the rest of the frame.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::command::anchor::{ObjectProvider, PointRef};
use crate::command::store::{CommandSender, CommandStore};
use crate::command::wireframe::{WireframeKey, WireframeLibrary, WireframeShape};
use crate::command::{
    segment_limits, spread_colors, BoxExtent, CommandData, Lifetime, PolygonPoints, ShapeCommand,
    SubmitError, TextureId, Thickness,
};
use crate::config::{ConfigError, RendererConfig};
use crate::foundation::color::Color;
use crate::foundation::math::{DrawTransform, Vec3};
use crate::render::batch::{BatchConsumer, TexturedBatch, TriangleBatch};
use crate::render::lod::{self, DetailLevel};
use crate::render::mesh_cache::MeshCache;

/// Camera and timing state the host supplies every frame
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Camera position in world space
    pub camera_position: Vec3,

    /// Vertical field of view in degrees
    pub vertical_fov_degrees: f32,

    /// Viewport height in pixels
    pub viewport_height_px: u32,

    /// Sub-tick fraction in `0.0..=1.0` used to interpolate anchored
    /// object positions
    pub interpolation_alpha: f32,
}

impl FrameContext {
    /// Bundle the per-frame inputs
    pub fn new(
        camera_position: Vec3,
        vertical_fov_degrees: f32,
        viewport_height_px: u32,
        interpolation_alpha: f32,
    ) -> Self {
        Self {
            camera_position,
            vertical_fov_degrees,
            viewport_height_px,
            interpolation_alpha,
        }
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height_px as f32
    }
}

/// Clonable, thread-safe submission handle
///
/// One call per primitive kind, all fire-and-forget: a returned `Ok`
/// means the command was accepted into the store; the renderer never
/// reports anything further about it. Malformed parameters are rejected
/// here so the store only ever holds valid commands.
#[derive(Clone)]
pub struct ShapeSubmitter {
    sender: CommandSender,
}

impl ShapeSubmitter {
    fn push(
        &self,
        data: CommandData,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        self.sender.submit(ShapeCommand::new(data, lifetime, transform)?);
        Ok(())
    }

    /// Submit a line segment
    pub fn draw_line(
        &self,
        start: PointRef,
        end: PointRef,
        color: Color,
        thickness: Thickness,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        self.push(
            CommandData::Line {
                ends: [start, end],
                color,
                thickness,
            },
            lifetime,
            transform,
        )
    }

    /// Submit connected line segments sharing one style
    pub fn draw_polyline(
        &self,
        points: Vec<Vec3>,
        color: Color,
        thickness: Thickness,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        self.push(
            CommandData::Polyline {
                points,
                color,
                thickness,
            },
            lifetime,
            transform,
        )
    }

    /// Submit a filled triangle; `colors` is one color or three
    pub fn draw_triangle(
        &self,
        corners: [PointRef; 3],
        colors: &[Color],
        double_sided: bool,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        let colors = spread_colors::<3>("triangle", colors)?;
        self.push(
            CommandData::Triangle {
                corners,
                colors,
                double_sided,
            },
            lifetime,
            transform,
        )
    }

    /// Submit a filled polygon, rendered as a fan from its centroid
    pub fn draw_polygon(
        &self,
        points: PolygonPoints,
        color: Color,
        double_sided: bool,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        self.push(
            CommandData::Polygon {
                points,
                color,
                double_sided,
            },
            lifetime,
            transform,
        )
    }

    /// Submit a textured quad
    pub fn draw_textured_quad(
        &self,
        center: PointRef,
        width: f32,
        height: f32,
        texture: TextureId,
        tint: Color,
        camera_facing: bool,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        self.push(
            CommandData::TexturedQuad {
                center,
                width,
                height,
                texture,
                tint,
                camera_facing,
            },
            lifetime,
            transform,
        )
    }

    /// Stamp a registered wireframe shape
    pub fn draw_wireframe(
        &self,
        shape: WireframeKey,
        anchor: PointRef,
        color: Color,
        thickness: Thickness,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        self.push(
            CommandData::Wireframe {
                shape,
                anchor,
                color,
                thickness,
            },
            lifetime,
            transform,
        )
    }

    /// Submit a rectangular plane; `colors` is one color or four
    pub fn draw_plane_rect(
        &self,
        center: PointRef,
        normal: Vec3,
        width: f32,
        height: f32,
        colors: &[Color],
        double_sided: bool,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        let colors = spread_colors::<4>("plane rect", colors)?;
        self.push(
            CommandData::PlaneRect {
                center,
                normal,
                width,
                height,
                colors,
                double_sided,
            },
            lifetime,
            transform,
        )
    }

    /// Submit a solid sphere
    pub fn draw_sphere(
        &self,
        center: PointRef,
        radius: f32,
        lat_segments: u32,
        lon_segments: u32,
        color: Color,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        self.push(
            CommandData::Sphere {
                center,
                radius,
                lat_segments,
                lon_segments,
                color,
            },
            lifetime,
            transform,
        )
    }

    /// Submit a solid box between two corners
    pub fn draw_box(
        &self,
        extent: BoxExtent,
        color: Color,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        self.push(CommandData::Box { extent, color }, lifetime, transform)
    }

    /// Submit a solid cylinder along an arbitrary axis
    pub fn draw_cylinder(
        &self,
        base: PointRef,
        axis: Vec3,
        radius: f32,
        height: f32,
        radial_segments: u32,
        height_segments: u32,
        color: Color,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<(), SubmitError> {
        self.push(
            CommandData::Cylinder {
                base,
                axis,
                radius,
                height,
                radial_segments,
                height_segments,
                color,
            },
            lifetime,
            transform,
        )
    }
}

/// The command renderer subsystem
///
/// Owns all renderer state for one process; hosts hold this handle
/// rather than relying on ambient globals, and tear it down by dropping
/// it (or emptying it first with [`ShapeRenderer::clear_all`]).
pub struct ShapeRenderer {
    config: RendererConfig,
    store: CommandStore,
    mesh_cache: MeshCache,
    wireframes: WireframeLibrary,
    batch: TriangleBatch,
}

impl Default for ShapeRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl ShapeRenderer {
    /// Create a renderer with the given configuration
    pub fn new(config: RendererConfig) -> Self {
        let batch = TriangleBatch::with_capacity(config.batch_capacity);
        Self {
            config,
            store: CommandStore::new(),
            mesh_cache: MeshCache::new(),
            wireframes: WireframeLibrary::new(),
            batch,
        }
    }

    /// Create a new submission handle for producers
    pub fn submitter(&self) -> ShapeSubmitter {
        ShapeSubmitter {
            sender: self.store.sender(),
        }
    }

    /// Register a reusable wireframe shape
    pub fn register_wireframe(
        &mut self,
        shape: WireframeShape,
    ) -> Result<WireframeKey, SubmitError> {
        self.wireframes.register(shape)
    }

    /// Load wireframe shapes from a RON file
    pub fn load_wireframes(&mut self, path: &str) -> Result<Vec<WireframeKey>, ConfigError> {
        self.wireframes.load_ron_file(path)
    }

    /// Registered wireframe shapes
    pub fn wireframes(&self) -> &WireframeLibrary {
        &self.wireframes
    }

    /// Active configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Number of live commands, including queued submissions
    pub fn live_count(&mut self) -> usize {
        self.store.live_count()
    }

    /// Remove every live and queued command immediately
    pub fn clear_all(&mut self) {
        self.store.clear_all();
    }

    /// Prune commands whose age has reached their lifetime
    pub fn remove_expired(&mut self) {
        self.store.prune_expired();
    }

    /// Render one frame into the host's batch consumer
    ///
    /// Never panics on account of a bad command: anything that cannot
    /// resolve this frame contributes nothing and stays live for the
    /// next attempt.
    pub fn render_frame(
        &mut self,
        ctx: &FrameContext,
        provider: &dyn ObjectProvider,
        sink: &mut dyn BatchConsumer,
    ) {
        let Self {
            config,
            store,
            mesh_cache,
            wireframes,
            batch,
        } = self;

        let snapshot = store.snapshot_live();

        // First pass: everything untextured goes into one shared batch,
        // in snapshot order.
        batch.clear();
        let mut textured: BTreeMap<TextureId, Vec<Arc<ShapeCommand>>> = BTreeMap::new();
        for entry in &snapshot {
            if let CommandData::TexturedQuad { texture, .. } = &entry.command.data {
                textured
                    .entry(*texture)
                    .or_default()
                    .push(Arc::clone(&entry.command));
            } else {
                emit_solid(batch, config, mesh_cache, wireframes, ctx, provider, &entry.command);
            }
        }
        if !batch.is_empty() {
            sink.draw_triangles(batch);
        }

        // Second pass: one batch per texture so state changes once per
        // group. BTreeMap iteration keeps the flush order stable across
        // frames.
        for (texture, commands) in &textured {
            let mut group = TexturedBatch::new(*texture);
            for command in commands {
                emit_textured_quad(&mut group, ctx, provider, command);
            }
            if !group.is_empty() {
                sink.draw_textured(&group);
            }
        }

        store.age_live();
        store.prune_expired();
    }
}

/// Emit one untextured command into the shared batch
fn emit_solid(
    batch: &mut TriangleBatch,
    config: &RendererConfig,
    mesh_cache: &MeshCache,
    wireframes: &WireframeLibrary,
    ctx: &FrameContext,
    provider: &dyn ObjectProvider,
    command: &ShapeCommand,
) {
    let alpha = ctx.interpolation_alpha;
    let transform = &command.transform;

    match &command.data {
        CommandData::Line {
            ends,
            color,
            thickness,
        } => {
            let (Some(start), Some(end)) = (
                ends[0].resolve(provider, alpha, transform),
                ends[1].resolve(provider, alpha, transform),
            ) else {
                return;
            };
            emit_stroke(batch, ctx, start, end, color.to_rgba_f32(), *thickness);
        }

        CommandData::Polyline {
            points,
            color,
            thickness,
        } => {
            let rgba = color.to_rgba_f32();
            for pair in points.windows(2) {
                emit_stroke(
                    batch,
                    ctx,
                    transform.apply(pair[0]),
                    transform.apply(pair[1]),
                    rgba,
                    *thickness,
                );
            }
        }

        CommandData::Triangle {
            corners,
            colors,
            double_sided,
        } => {
            let (Some(a), Some(b), Some(c)) = (
                corners[0].resolve(provider, alpha, transform),
                corners[1].resolve(provider, alpha, transform),
                corners[2].resolve(provider, alpha, transform),
            ) else {
                return;
            };
            let rgba = [
                colors[0].to_rgba_f32(),
                colors[1].to_rgba_f32(),
                colors[2].to_rgba_f32(),
            ];
            emit_triangle(batch, ctx, [a, b, c], rgba, *double_sided);
        }

        CommandData::Polygon {
            points,
            color,
            double_sided,
        } => {
            let world: Option<Vec<Vec3>> = match points {
                PolygonPoints::Literal(points) => {
                    Some(points.iter().map(|p| transform.apply(*p)).collect())
                }
                PolygonPoints::Anchored { anchor, points } => anchor
                    .base_position(provider, alpha)
                    .map(|base| {
                        points
                            .iter()
                            .map(|p| base + transform.apply(anchor.offset + p))
                            .collect()
                    }),
            };
            let Some(world) = world else { return };
            if world.len() < 3 {
                return;
            }
            let centroid = world.iter().sum::<Vec3>() / world.len() as f32;
            let rgba = color.to_rgba_f32();
            for i in 0..world.len() {
                let next = (i + 1) % world.len();
                emit_triangle(
                    batch,
                    ctx,
                    [centroid, world[i], world[next]],
                    [rgba; 3],
                    *double_sided,
                );
            }
        }

        CommandData::Wireframe {
            shape,
            anchor,
            color,
            thickness,
        } => {
            let Some(shape) = wireframes.get(*shape) else {
                log::trace!("wireframe shape no longer registered, skipping stamp");
                return;
            };
            let Some(base) = anchor.base_position(provider, alpha) else {
                return;
            };
            let rgba = color.to_rgba_f32();
            for segment in &shape.segments {
                emit_stroke(
                    batch,
                    ctx,
                    base + transform.apply(segment[0]),
                    base + transform.apply(segment[1]),
                    rgba,
                    *thickness,
                );
            }
        }

        CommandData::PlaneRect {
            center,
            normal,
            width,
            height,
            colors,
            double_sided,
        } => {
            let Some(center) = center.resolve(provider, alpha, transform) else {
                return;
            };
            let normal = transform.apply_direction(*normal);
            if normal.norm_squared() <= f32::EPSILON {
                return;
            }
            let (right, up) = plane_basis(normal.normalize());
            let half_w = 0.5 * width * transform.scale;
            let half_h = 0.5 * height * transform.scale;
            let corners = [
                center - right * half_w - up * half_h,
                center + right * half_w - up * half_h,
                center + right * half_w + up * half_h,
                center - right * half_w + up * half_h,
            ];
            let rgba = [
                colors[0].to_rgba_f32(),
                colors[1].to_rgba_f32(),
                colors[2].to_rgba_f32(),
                colors[3].to_rgba_f32(),
            ];
            emit_triangle(
                batch,
                ctx,
                [corners[0], corners[1], corners[2]],
                [rgba[0], rgba[1], rgba[2]],
                *double_sided,
            );
            emit_triangle(
                batch,
                ctx,
                [corners[0], corners[2], corners[3]],
                [rgba[0], rgba[2], rgba[3]],
                *double_sided,
            );
        }

        CommandData::Sphere {
            center,
            radius,
            lat_segments,
            lon_segments,
            color,
        } => {
            let Some(center) = center.resolve(provider, alpha, transform) else {
                return;
            };
            let world_radius = radius * transform.scale;
            if world_radius <= 0.0 {
                return;
            }
            let distance = (center - ctx.camera_position).norm();
            let pixel_radius = lod::projected_pixel_radius(
                world_radius,
                distance,
                ctx.vertical_fov_degrees,
                ctx.viewport_height(),
            );
            let detail = DetailLevel::for_pixel_radius(pixel_radius, &config.lod);
            let lat = detail.scale_segments(*lat_segments, segment_limits::MIN_SPHERE_LAT, &config.lod);
            let lon = detail.scale_segments(*lon_segments, segment_limits::MIN_SPHERE_LON, &config.lod);
            let mesh = mesh_cache.unit_sphere(lat, lon);
            let rgba = color.to_rgba_f32();
            for triangle in mesh.vertices.chunks_exact(3) {
                let corners = [
                    center + transform.apply_direction(triangle[0] * *radius),
                    center + transform.apply_direction(triangle[1] * *radius),
                    center + transform.apply_direction(triangle[2] * *radius),
                ];
                emit_triangle(batch, ctx, corners, [rgba; 3], false);
            }
        }

        CommandData::Box { extent, color } => {
            let corners = match extent {
                BoxExtent::Literal { min, max } => {
                    box_corners(*min, *max).map(|p| transform.apply(p))
                }
                BoxExtent::Anchored { anchor, min, max } => {
                    let Some(base) = anchor.base_position(provider, alpha) else {
                        return;
                    };
                    box_corners(anchor.offset + min, anchor.offset + max)
                        .map(|p| base + transform.apply(p))
                }
            };
            let rgba = color.to_rgba_f32();
            for face in BOX_TRIANGLES {
                emit_triangle(
                    batch,
                    ctx,
                    [corners[face[0]], corners[face[1]], corners[face[2]]],
                    [rgba; 3],
                    false,
                );
            }
        }

        CommandData::Cylinder {
            base,
            axis,
            radius,
            height,
            radial_segments,
            height_segments,
            color,
        } => {
            let Some(base_center) = base.resolve(provider, alpha, transform) else {
                return;
            };
            if axis.norm_squared() <= f32::EPSILON {
                return;
            }
            let axis = axis.normalize();
            let (right, forward) = plane_basis(axis);
            let world_radius = radius * transform.scale;
            let shape_center =
                base_center + transform.apply_direction(axis * (height * 0.5));
            let distance = (shape_center - ctx.camera_position).norm();
            let pixel_radius = lod::projected_pixel_radius(
                world_radius.max(height * 0.5 * transform.scale),
                distance,
                ctx.vertical_fov_degrees,
                ctx.viewport_height(),
            );
            let detail = DetailLevel::for_pixel_radius(pixel_radius, &config.lod);
            let radial = detail.scale_segments(
                *radial_segments,
                segment_limits::MIN_CYLINDER_RADIAL,
                &config.lod,
            );
            let bands = detail.scale_segments(
                *height_segments,
                segment_limits::MIN_CYLINDER_HEIGHT,
                &config.lod,
            );
            let mesh = mesh_cache.unit_cylinder(radial, bands);
            let rgba = color.to_rgba_f32();
            let place = |unit: Vec3| {
                let local =
                    right * (unit.x * radius) + axis * (unit.y * height) + forward * (unit.z * radius);
                base_center + transform.apply_direction(local)
            };
            for triangle in mesh.vertices.chunks_exact(3) {
                emit_triangle(
                    batch,
                    ctx,
                    [place(triangle[0]), place(triangle[1]), place(triangle[2])],
                    [rgba; 3],
                    false,
                );
            }
        }

        // Textured quads are grouped and emitted in the second pass.
        CommandData::TexturedQuad { .. } => {}
    }
}

/// Emit one textured quad into its texture group
fn emit_textured_quad(
    group: &mut TexturedBatch,
    ctx: &FrameContext,
    provider: &dyn ObjectProvider,
    command: &ShapeCommand,
) {
    let CommandData::TexturedQuad {
        center,
        width,
        height,
        tint,
        camera_facing,
        ..
    } = &command.data
    else {
        return;
    };
    let transform = &command.transform;
    let Some(center) = center.resolve(provider, ctx.interpolation_alpha, transform) else {
        return;
    };

    // Corner offsets: camera-facing quads build a view-plane basis every
    // frame (the transform still scales them); fixed quads lie in the XZ
    // plane before their transform is applied.
    let offsets: [Vec3; 4] = if *camera_facing {
        let view = ctx.camera_position - center;
        let half_w = 0.5 * width * transform.scale;
        let half_h = 0.5 * height * transform.scale;
        let (right, up) = if view.norm_squared() <= f32::EPSILON {
            (Vec3::x(), Vec3::y())
        } else {
            let normal = view.normalize();
            plane_basis(normal)
        };
        [
            -right * half_w - up * half_h,
            right * half_w - up * half_h,
            right * half_w + up * half_h,
            -right * half_w + up * half_h,
        ]
    } else {
        let half_w = 0.5 * width;
        let half_h = 0.5 * height;
        [
            transform.apply_direction(Vec3::new(-half_w, 0.0, -half_h)),
            transform.apply_direction(Vec3::new(half_w, 0.0, -half_h)),
            transform.apply_direction(Vec3::new(half_w, 0.0, half_h)),
            transform.apply_direction(Vec3::new(-half_w, 0.0, half_h)),
        ]
    };

    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let rgba = tint.to_rgba_f32();
    for &index in &[0usize, 1, 2, 0, 2, 3] {
        group.push(
            center + offsets[index] - ctx.camera_position,
            uvs[index],
            rgba,
        );
    }
}

/// Emit a line segment as a camera-facing ribbon
fn emit_stroke(
    batch: &mut TriangleBatch,
    ctx: &FrameContext,
    start: Vec3,
    end: Vec3,
    rgba: [f32; 4],
    thickness: Thickness,
) {
    let dir = end - start;
    if dir.norm_squared() <= 1e-12 {
        return;
    }
    let midpoint = (start + end) * 0.5;
    let width = match thickness {
        Thickness::World(world) => world,
        Thickness::Pixels(pixels) => lod::pixels_to_world_thickness(
            pixels,
            (midpoint - ctx.camera_position).norm(),
            ctx.vertical_fov_degrees,
            ctx.viewport_height(),
        ),
    };
    if width <= 0.0 {
        return;
    }

    let view = midpoint - ctx.camera_position;
    let mut side = dir.cross(&view);
    if side.norm_squared() <= 1e-12 {
        // Segment points straight at the camera; any perpendicular works.
        side = dir.cross(&Vec3::y());
        if side.norm_squared() <= 1e-12 {
            side = dir.cross(&Vec3::x());
        }
    }
    let side = side.normalize() * (width * 0.5);

    emit_triangle(
        batch,
        ctx,
        [start - side, end - side, end + side],
        [rgba; 3],
        false,
    );
    emit_triangle(
        batch,
        ctx,
        [start - side, end + side, start + side],
        [rgba; 3],
        false,
    );
}

/// Push one triangle (and optionally its reverse winding) camera-relative
fn emit_triangle(
    batch: &mut TriangleBatch,
    ctx: &FrameContext,
    corners: [Vec3; 3],
    colors: [[f32; 4]; 3],
    double_sided: bool,
) {
    let camera = ctx.camera_position;
    batch.push_triangle(
        [
            corners[0] - camera,
            corners[1] - camera,
            corners[2] - camera,
        ],
        colors,
    );
    if double_sided {
        batch.push_triangle(
            [
                corners[0] - camera,
                corners[2] - camera,
                corners[1] - camera,
            ],
            [colors[0], colors[2], colors[1]],
        );
    }
}

/// Orthonormal basis perpendicular to a unit normal
fn plane_basis(normal: Vec3) -> (Vec3, Vec3) {
    let helper = if normal.y.abs() < 0.99 {
        Vec3::y()
    } else {
        Vec3::x()
    };
    let right = helper.cross(&normal).normalize();
    let up = normal.cross(&right);
    (right, up)
}

/// Corners of an axis-aligned box between two corner points
fn box_corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ]
}

/// Box faces as corner-index triples, two triangles per face
const BOX_TRIANGLES: [[usize; 3]; 12] = [
    [0, 3, 2], [0, 2, 1], // -Z
    [4, 5, 6], [4, 6, 7], // +Z
    [0, 4, 7], [0, 7, 3], // -X
    [1, 2, 6], [1, 6, 5], // +X
    [0, 1, 5], [0, 5, 4], // -Y
    [3, 7, 6], [3, 6, 2], // +Y
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::anchor::{Attachment, ObjectId, ObjectState};
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    struct MapProvider(HashMap<ObjectId, ObjectState>);

    impl MapProvider {
        fn empty() -> Self {
            Self(HashMap::new())
        }

        fn with_static(id: ObjectId, position: Vec3) -> Self {
            let mut map = HashMap::new();
            map.insert(
                id,
                ObjectState {
                    position,
                    prev_position: position,
                },
            );
            Self(map)
        }
    }

    impl ObjectProvider for MapProvider {
        fn lookup(&self, id: ObjectId) -> Option<ObjectState> {
            self.0.get(&id).copied()
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        triangle_vertices: Vec<crate::render::batch::ColorVertex>,
        triangle_flushes: usize,
        textured_flushes: Vec<(TextureId, usize)>,
    }

    impl BatchConsumer for CollectingSink {
        fn draw_triangles(&mut self, batch: &TriangleBatch) {
            self.triangle_flushes += 1;
            self.triangle_vertices.extend_from_slice(batch.vertices());
        }

        fn draw_textured(&mut self, batch: &TexturedBatch) {
            self.textured_flushes
                .push((batch.texture, batch.vertices().len()));
        }
    }

    fn frame(camera: Vec3) -> FrameContext {
        FrameContext::new(camera, 70.0, 1080, 0.0)
    }

    #[test]
    fn test_sphere_lod_downgrade_and_expiry() {
        let mut renderer = ShapeRenderer::default();
        let submitter = renderer.submitter();
        submitter
            .draw_sphere(
                PointRef::Literal(Vec3::zeros()),
                1.0,
                16,
                20,
                Color::WHITE,
                Lifetime::Ticks(10),
                DrawTransform::identity(),
            )
            .unwrap();

        // Distance 257 projects a unit radius to roughly 3 px, which is
        // below the 4 px break point: lowest tier, 16/4 x 20/4 segments.
        let ctx = frame(Vec3::new(0.0, 0.0, 257.0));
        let provider = MapProvider::empty();

        for frame_index in 1..=10 {
            let mut sink = CollectingSink::default();
            renderer.render_frame(&ctx, &provider, &mut sink);
            assert_eq!(
                sink.triangle_vertices.len(),
                4 * 5 * 6,
                "frame {frame_index}"
            );
        }

        // Frame 11: age reached the lifetime, nothing renders and the
        // store has pruned the command.
        let mut sink = CollectingSink::default();
        renderer.render_frame(&ctx, &provider, &mut sink);
        assert!(sink.triangle_vertices.is_empty());
        assert_eq!(renderer.live_count(), 0);
    }

    #[test]
    fn test_sphere_full_detail_up_close() {
        let mut renderer = ShapeRenderer::default();
        renderer
            .submitter()
            .draw_sphere(
                PointRef::Literal(Vec3::zeros()),
                1.0,
                16,
                20,
                Color::WHITE,
                Lifetime::Ticks(1),
                DrawTransform::identity(),
            )
            .unwrap();
        let mut sink = CollectingSink::default();
        renderer.render_frame(
            &frame(Vec3::new(0.0, 0.0, 5.0)),
            &MapProvider::empty(),
            &mut sink,
        );
        assert_eq!(sink.triangle_vertices.len(), 16 * 20 * 6);
    }

    #[test]
    fn test_missing_anchor_renders_nothing_but_stays_live() {
        let mut renderer = ShapeRenderer::default();
        let submitter = renderer.submitter();
        let ghost = PointRef::Anchored(Attachment::to_object(ObjectId(999)));
        for _ in 0..2 {
            submitter
                .draw_line(
                    ghost,
                    PointRef::Literal(Vec3::new(1.0, 0.0, 0.0)),
                    Color::WHITE,
                    Thickness::World(0.1),
                    Lifetime::Ticks(5),
                    DrawTransform::identity(),
                )
                .unwrap();
        }

        let ctx = frame(Vec3::new(0.0, 0.0, 10.0));
        let provider = MapProvider::empty();
        for _ in 0..5 {
            let mut sink = CollectingSink::default();
            renderer.render_frame(&ctx, &provider, &mut sink);
            assert!(sink.triangle_vertices.is_empty());
        }
        // Both commands aged out naturally rather than being dropped
        // early for failing to resolve.
        assert_eq!(renderer.live_count(), 0);
    }

    #[test]
    fn test_missing_anchor_remains_queryable_before_expiry() {
        let mut renderer = ShapeRenderer::default();
        let ghost = PointRef::Anchored(Attachment::to_object(ObjectId(999)));
        renderer
            .submitter()
            .draw_line(
                ghost,
                ghost,
                Color::WHITE,
                Thickness::World(0.1),
                Lifetime::Ticks(5),
                DrawTransform::identity(),
            )
            .unwrap();
        let mut sink = CollectingSink::default();
        renderer.render_frame(&frame(Vec3::zeros()), &MapProvider::empty(), &mut sink);
        assert_eq!(renderer.live_count(), 1);
    }

    #[test]
    fn test_wireframe_stamp_rotates_around_anchor() {
        let mut renderer = ShapeRenderer::default();
        let object_position = Vec3::new(10.0, 2.0, -3.0);
        let shape = renderer
            .register_wireframe(WireframeShape::new(
                "strut",
                vec![[Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0)]],
            ))
            .unwrap();
        renderer
            .submitter()
            .draw_wireframe(
                shape,
                PointRef::Anchored(Attachment::to_object(ObjectId(1))),
                Color::WHITE,
                Thickness::World(0.2),
                Lifetime::Ticks(1),
                DrawTransform::from_yaw_degrees(90.0),
            )
            .unwrap();

        // Camera at the origin keeps the camera-relative output equal to
        // world coordinates.
        let provider = MapProvider::with_static(ObjectId(1), object_position);
        let mut sink = CollectingSink::default();
        renderer.render_frame(&frame(Vec3::zeros()), &provider, &mut sink);

        let expected_a = object_position + Vec3::new(0.0, 0.0, -1.0);
        let expected_b = object_position + Vec3::new(0.0, 1.0, -1.0);

        // The ribbon's four distinct corners straddle each endpoint; a
        // corner pair averaging to the endpoint must exist for both.
        let corners: Vec<Vec3> = sink
            .triangle_vertices
            .iter()
            .map(|v| Vec3::new(v.position[0], v.position[1], v.position[2]))
            .collect();
        assert!(!corners.is_empty());
        for expected in [expected_a, expected_b] {
            let found = corners.iter().enumerate().any(|(i, a)| {
                corners[i + 1..]
                    .iter()
                    .any(|b| ((a + b) * 0.5 - expected).norm() < 1e-4)
            });
            assert!(found, "no corner pair brackets {expected:?}");
        }
    }

    #[test]
    fn test_textured_quads_group_by_texture_in_key_order() {
        let mut renderer = ShapeRenderer::default();
        let submitter = renderer.submitter();
        for texture in [TextureId(2), TextureId(1), TextureId(1)] {
            submitter
                .draw_textured_quad(
                    PointRef::Literal(Vec3::zeros()),
                    1.0,
                    1.0,
                    texture,
                    Color::WHITE,
                    true,
                    Lifetime::Ticks(1),
                    DrawTransform::identity(),
                )
                .unwrap();
        }
        let mut sink = CollectingSink::default();
        renderer.render_frame(
            &frame(Vec3::new(0.0, 0.0, 10.0)),
            &MapProvider::empty(),
            &mut sink,
        );
        // Texture 1 flushes first (two quads, 12 vertices), then texture
        // 2 (one quad, 6 vertices); each texture exactly once.
        assert_eq!(
            sink.textured_flushes,
            vec![(TextureId(1), 12), (TextureId(2), 6)]
        );
    }

    #[test]
    fn test_degenerate_line_skips_without_aborting_frame() {
        let mut renderer = ShapeRenderer::default();
        let submitter = renderer.submitter();
        let point = Vec3::new(1.0, 1.0, 1.0);
        submitter
            .draw_line(
                PointRef::Literal(point),
                PointRef::Literal(point),
                Color::WHITE,
                Thickness::World(0.1),
                Lifetime::Ticks(1),
                DrawTransform::identity(),
            )
            .unwrap();
        submitter
            .draw_triangle(
                [
                    PointRef::Literal(Vec3::zeros()),
                    PointRef::Literal(Vec3::x()),
                    PointRef::Literal(Vec3::y()),
                ],
                &[Color::WHITE],
                false,
                Lifetime::Ticks(1),
                DrawTransform::identity(),
            )
            .unwrap();

        let mut sink = CollectingSink::default();
        renderer.render_frame(
            &frame(Vec3::new(0.0, 0.0, 10.0)),
            &MapProvider::empty(),
            &mut sink,
        );
        // Only the triangle landed; the zero-length line was skipped.
        assert_eq!(sink.triangle_vertices.len(), 3);
        assert_eq!(sink.triangle_flushes, 1);
    }

    #[test]
    fn test_output_is_camera_relative() {
        let mut renderer = ShapeRenderer::default();
        renderer
            .submitter()
            .draw_triangle(
                [
                    PointRef::Literal(Vec3::new(100.0, 0.0, 0.0)),
                    PointRef::Literal(Vec3::new(101.0, 0.0, 0.0)),
                    PointRef::Literal(Vec3::new(100.0, 1.0, 0.0)),
                ],
                &[Color::WHITE],
                false,
                Lifetime::Ticks(1),
                DrawTransform::identity(),
            )
            .unwrap();
        let camera = Vec3::new(100.0, 0.0, 10.0);
        let mut sink = CollectingSink::default();
        renderer.render_frame(&frame(camera), &MapProvider::empty(), &mut sink);
        assert_relative_eq!(
            Vec3::from(sink.triangle_vertices[0].position),
            Vec3::new(0.0, 0.0, -10.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_double_sided_triangle_emits_both_windings() {
        let mut renderer = ShapeRenderer::default();
        renderer
            .submitter()
            .draw_triangle(
                [
                    PointRef::Literal(Vec3::zeros()),
                    PointRef::Literal(Vec3::x()),
                    PointRef::Literal(Vec3::y()),
                ],
                &[Color::WHITE],
                true,
                Lifetime::Ticks(1),
                DrawTransform::identity(),
            )
            .unwrap();
        let mut sink = CollectingSink::default();
        renderer.render_frame(
            &frame(Vec3::new(0.0, 0.0, 10.0)),
            &MapProvider::empty(),
            &mut sink,
        );
        assert_eq!(sink.triangle_vertices.len(), 6);
    }

    #[test]
    fn test_snapshot_order_is_preserved_in_batch() {
        let mut renderer = ShapeRenderer::default();
        let submitter = renderer.submitter();
        let red = Color::from_argb(0xFF, 0xFF, 0x00, 0x00);
        let blue = Color::from_argb(0xFF, 0x00, 0x00, 0xFF);
        for color in [red, blue] {
            submitter
                .draw_triangle(
                    [
                        PointRef::Literal(Vec3::zeros()),
                        PointRef::Literal(Vec3::x()),
                        PointRef::Literal(Vec3::y()),
                    ],
                    &[color],
                    false,
                    Lifetime::Ticks(1),
                    DrawTransform::identity(),
                )
                .unwrap();
        }
        let mut sink = CollectingSink::default();
        renderer.render_frame(
            &frame(Vec3::new(0.0, 0.0, 10.0)),
            &MapProvider::empty(),
            &mut sink,
        );
        assert_eq!(sink.triangle_vertices[0].color, red.to_rgba_f32());
        assert_eq!(sink.triangle_vertices[3].color, blue.to_rgba_f32());
    }

    #[test]
    fn test_persistent_command_survives_until_clear_all() {
        let mut renderer = ShapeRenderer::default();
        renderer
            .submitter()
            .draw_box(
                BoxExtent::Literal {
                    min: Vec3::new(-1.0, -1.0, -1.0),
                    max: Vec3::new(1.0, 1.0, 1.0),
                },
                Color::WHITE,
                Lifetime::Persistent,
                DrawTransform::identity(),
            )
            .unwrap();
        let ctx = frame(Vec3::new(0.0, 0.0, 10.0));
        let provider = MapProvider::empty();
        for _ in 0..100 {
            let mut sink = CollectingSink::default();
            renderer.render_frame(&ctx, &provider, &mut sink);
            assert_eq!(sink.triangle_vertices.len(), 36);
        }
        renderer.clear_all();
        let mut sink = CollectingSink::default();
        renderer.render_frame(&ctx, &provider, &mut sink);
        assert!(sink.triangle_vertices.is_empty());
    }

    #[test]
    fn test_pixel_thickness_widens_with_distance() {
        let width_at = |distance: f32| {
            let mut renderer = ShapeRenderer::default();
            renderer
                .submitter()
                .draw_line(
                    PointRef::Literal(Vec3::new(-1.0, 0.0, 0.0)),
                    PointRef::Literal(Vec3::new(1.0, 0.0, 0.0)),
                    Color::WHITE,
                    Thickness::Pixels(2.0),
                    Lifetime::Ticks(1),
                    DrawTransform::identity(),
                )
                .unwrap();
            let mut sink = CollectingSink::default();
            renderer.render_frame(
                &frame(Vec3::new(0.0, 0.0, distance)),
                &MapProvider::empty(),
                &mut sink,
            );
            // The first triangle is [start - side, end - side, end + side];
            // the last two corners are one ribbon width apart.
            let a = Vec3::from(sink.triangle_vertices[1].position);
            let b = Vec3::from(sink.triangle_vertices[2].position);
            (a - b).norm()
        };
        let near = width_at(10.0);
        let far = width_at(20.0);
        assert_relative_eq!(far, near * 2.0, epsilon = 1e-3);
    }
}
