//! Drawing command model
//!
//! Every submitted primitive becomes one immutable [`ShapeCommand`]: a
//! tagged variant describing the geometry plus the shared lifetime and
//! transform fields. Commands are logically events — there is no
//! update-in-place; changing an effect means submitting a new command.

pub mod anchor;
pub mod store;
pub mod wireframe;

use crate::foundation::color::Color;
use crate::foundation::math::{DrawTransform, Vec3};
use anchor::{Attachment, PointRef};
use wireframe::WireframeKey;

/// Errors reported to the caller for malformed submissions
///
/// These are the only errors this subsystem surfaces; everything that can
/// go wrong per frame (missing anchors, degenerate geometry) is recovered
/// by omission instead.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Lifetime of zero ticks would never render
    #[error("lifetime must be at least one tick, or persistent")]
    InvalidLifetime,

    /// A variant received fewer points than it can triangulate
    #[error("{kind} needs at least {expected} points, got {actual}")]
    TooFewPoints {
        /// Primitive kind being submitted
        kind: &'static str,
        /// Minimum point count for the kind
        expected: usize,
        /// Count actually supplied
        actual: usize,
    },

    /// A dimension (radius, width, height) must be strictly positive
    #[error("{kind} {dimension} must be positive, got {value}")]
    NonPositiveDimension {
        /// Primitive kind being submitted
        kind: &'static str,
        /// Which dimension was rejected
        dimension: &'static str,
        /// Offending value
        value: f32,
    },

    /// Segment counts below the tessellation minimums
    #[error("{kind} {axis} segment count {actual} is below the minimum {minimum}")]
    TooFewSegments {
        /// Primitive kind being submitted
        kind: &'static str,
        /// Which segment axis was rejected
        axis: &'static str,
        /// Count actually supplied
        actual: u32,
        /// Minimum accepted count
        minimum: u32,
    },

    /// A direction vector with no usable length
    #[error("{kind} {field} direction has zero length")]
    ZeroDirection {
        /// Primitive kind being submitted
        kind: &'static str,
        /// Which direction field was rejected
        field: &'static str,
    },

    /// Triangle-like variants take one color or one per vertex
    #[error("{kind} takes 1 or {per_vertex} colors, got {actual}")]
    ColorCountMismatch {
        /// Primitive kind being submitted
        kind: &'static str,
        /// Vertex count of the kind
        per_vertex: usize,
        /// Count actually supplied
        actual: usize,
    },

    /// A wireframe shape must contain at least one segment
    #[error("wireframe shape '{name}' has no segments")]
    EmptyWireframe {
        /// Name of the rejected shape
        name: String,
    },
}

/// How long a command stays live
///
/// An explicit sum type instead of a signed sentinel integer: a
/// persistent command is its own case, and a zero-tick lifetime is
/// rejected at construction so the store never holds a command that
/// could not render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Live for this many aged frames, then pruned
    Ticks(u32),

    /// Live until explicitly cleared
    Persistent,
}

impl Lifetime {
    /// Convert from the signed-tick convention used by producers
    ///
    /// Negative values mean persistent; zero is rejected.
    pub fn from_ticks(ticks: i32) -> Result<Self, SubmitError> {
        if ticks < 0 {
            Ok(Lifetime::Persistent)
        } else if ticks == 0 {
            Err(SubmitError::InvalidLifetime)
        } else {
            Ok(Lifetime::Ticks(ticks as u32))
        }
    }

    /// True once a command of this lifetime has aged out
    pub fn is_expired(self, age: u32) -> bool {
        match self {
            Lifetime::Ticks(ticks) => age >= ticks,
            Lifetime::Persistent => false,
        }
    }

    /// True when the command never expires on its own
    pub fn is_persistent(self) -> bool {
        matches!(self, Lifetime::Persistent)
    }
}

/// Stroke thickness for line-like primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Thickness {
    /// Thickness in world units
    World(f32),

    /// Thickness in screen pixels, converted to world units per frame
    /// from the viewing distance
    Pixels(f32),
}

/// Opaque reference to a host-managed texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Point list for a polygon: literal, or authored relative to one anchor
#[derive(Debug, Clone)]
pub enum PolygonPoints {
    /// Literal world-space points
    Literal(Vec<Vec3>),

    /// Points relative to a single anchored object
    Anchored {
        /// Anchor every point is relative to
        anchor: Attachment,
        /// Local-space points
        points: Vec<Vec3>,
    },
}

impl PolygonPoints {
    fn len(&self) -> usize {
        match self {
            PolygonPoints::Literal(points) => points.len(),
            PolygonPoints::Anchored { points, .. } => points.len(),
        }
    }
}

/// Box corners: literal min/max, or a min/max pair around one anchor
#[derive(Debug, Clone)]
pub enum BoxExtent {
    /// Literal world-space corners
    Literal {
        /// Minimum corner
        min: Vec3,
        /// Maximum corner
        max: Vec3,
    },

    /// Corner pair relative to an anchored object
    Anchored {
        /// Anchor both corners are relative to
        anchor: Attachment,
        /// Minimum corner, local to the anchor
        min: Vec3,
        /// Maximum corner, local to the anchor
        max: Vec3,
    },
}

/// Geometry payload, one variant per primitive kind
#[derive(Debug, Clone)]
pub enum CommandData {
    /// Line segment between two points
    Line {
        /// Endpoints, each literal or anchored independently
        ends: [PointRef; 2],
        /// Stroke color
        color: Color,
        /// Stroke thickness
        thickness: Thickness,
    },

    /// Connected line segments through literal points, sharing one style
    Polyline {
        /// Ordered points, at least two
        points: Vec<Vec3>,
        /// Stroke color
        color: Color,
        /// Stroke thickness
        thickness: Thickness,
    },

    /// Filled triangle with per-vertex color
    Triangle {
        /// Corners, each literal or anchored independently
        corners: [PointRef; 3],
        /// One color per corner
        colors: [Color; 3],
        /// Emit the reversed winding as well
        double_sided: bool,
    },

    /// Filled polygon rendered as a triangle fan from the centroid
    Polygon {
        /// Ordered outline points
        points: PolygonPoints,
        /// Uniform fill color
        color: Color,
        /// Emit the reversed winding as well
        double_sided: bool,
    },

    /// Textured quad, optionally turned to face the camera
    TexturedQuad {
        /// Quad center
        center: PointRef,
        /// Width in world units
        width: f32,
        /// Height in world units
        height: f32,
        /// Host texture to sample
        texture: TextureId,
        /// Tint multiplied into the texture
        tint: Color,
        /// Orient the quad towards the camera every frame
        camera_facing: bool,
    },

    /// Stamp of a reusable wireframe shape
    Wireframe {
        /// Registered shape to stamp
        shape: WireframeKey,
        /// Anchor the shape's local segments hang off
        anchor: PointRef,
        /// Stroke color
        color: Color,
        /// Stroke thickness
        thickness: Thickness,
    },

    /// Rectangular plane given by center, normal, and extents
    PlaneRect {
        /// Rectangle center
        center: PointRef,
        /// Plane normal; the rectangle lies perpendicular to it
        normal: Vec3,
        /// Width in world units
        width: f32,
        /// Height in world units
        height: f32,
        /// One color per corner
        colors: [Color; 4],
        /// Emit the reversed winding as well
        double_sided: bool,
    },

    /// Solid lat/lon sphere
    Sphere {
        /// Sphere center
        center: PointRef,
        /// Radius in world units
        radius: f32,
        /// Requested latitude bands, subject to LOD downgrade
        lat_segments: u32,
        /// Requested longitude slices, subject to LOD downgrade
        lon_segments: u32,
        /// Uniform color
        color: Color,
    },

    /// Solid axis-aligned box between two corners
    Box {
        /// Corner pair, literal or anchored
        extent: BoxExtent,
        /// Uniform color
        color: Color,
    },

    /// Solid cylinder along an arbitrary axis
    Cylinder {
        /// Center of the base cap
        base: PointRef,
        /// Axis direction from base to top
        axis: Vec3,
        /// Radius in world units
        radius: f32,
        /// Height along the axis in world units
        height: f32,
        /// Requested radial slices, subject to LOD downgrade
        radial_segments: u32,
        /// Requested height bands, subject to LOD downgrade
        height_segments: u32,
        /// Uniform color
        color: Color,
    },
}

impl CommandData {
    /// Primitive kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            CommandData::Line { .. } => "line",
            CommandData::Polyline { .. } => "polyline",
            CommandData::Triangle { .. } => "triangle",
            CommandData::Polygon { .. } => "polygon",
            CommandData::TexturedQuad { .. } => "textured quad",
            CommandData::Wireframe { .. } => "wireframe",
            CommandData::PlaneRect { .. } => "plane rect",
            CommandData::Sphere { .. } => "sphere",
            CommandData::Box { .. } => "box",
            CommandData::Cylinder { .. } => "cylinder",
        }
    }

    /// True for the variant rendered in the textured second pass
    pub fn is_textured(&self) -> bool {
        matches!(self, CommandData::TexturedQuad { .. })
    }
}

/// Tessellation minimums the LOD downgrade clamps to, and submission
/// validation rejects below
pub mod segment_limits {
    /// Minimum sphere latitude bands
    pub const MIN_SPHERE_LAT: u32 = 2;
    /// Minimum sphere longitude slices
    pub const MIN_SPHERE_LON: u32 = 3;
    /// Minimum cylinder radial slices
    pub const MIN_CYLINDER_RADIAL: u32 = 3;
    /// Minimum cylinder height bands
    pub const MIN_CYLINDER_HEIGHT: u32 = 1;
}

/// One immutable submitted drawing request
#[derive(Debug, Clone)]
pub struct ShapeCommand {
    /// Geometry and style payload
    pub data: CommandData,

    /// How long the command stays live
    pub lifetime: Lifetime,

    /// Affine transform applied to the command's geometry
    pub transform: DrawTransform,
}

impl ShapeCommand {
    /// Validate and construct a command
    ///
    /// The store never holds an invalid command: every structural rule is
    /// checked here, at the submission boundary. Geometry that is only
    /// degenerate in a view-dependent way (a zero-length line between two
    /// anchors that happen to coincide) is handled per frame instead.
    pub fn new(
        data: CommandData,
        lifetime: Lifetime,
        transform: DrawTransform,
    ) -> Result<Self, SubmitError> {
        if lifetime == Lifetime::Ticks(0) {
            return Err(SubmitError::InvalidLifetime);
        }
        Self::validate(&data)?;
        Ok(Self {
            data,
            lifetime,
            transform,
        })
    }

    fn validate(data: &CommandData) -> Result<(), SubmitError> {
        use segment_limits::*;

        let kind = data.kind();
        match data {
            CommandData::Line { .. } | CommandData::Triangle { .. } | CommandData::Wireframe { .. } => Ok(()),
            CommandData::Polyline { points, .. } => {
                if points.len() < 2 {
                    return Err(SubmitError::TooFewPoints {
                        kind,
                        expected: 2,
                        actual: points.len(),
                    });
                }
                Ok(())
            }
            CommandData::Polygon { points, .. } => {
                if points.len() < 3 {
                    return Err(SubmitError::TooFewPoints {
                        kind,
                        expected: 3,
                        actual: points.len(),
                    });
                }
                Ok(())
            }
            CommandData::TexturedQuad { width, height, .. } => {
                check_positive(kind, "width", *width)?;
                check_positive(kind, "height", *height)
            }
            CommandData::PlaneRect {
                normal,
                width,
                height,
                ..
            } => {
                check_positive(kind, "width", *width)?;
                check_positive(kind, "height", *height)?;
                if normal.norm_squared() <= f32::EPSILON {
                    return Err(SubmitError::ZeroDirection {
                        kind,
                        field: "normal",
                    });
                }
                Ok(())
            }
            CommandData::Sphere {
                radius,
                lat_segments,
                lon_segments,
                ..
            } => {
                check_positive(kind, "radius", *radius)?;
                check_segments(kind, "latitude", *lat_segments, MIN_SPHERE_LAT)?;
                check_segments(kind, "longitude", *lon_segments, MIN_SPHERE_LON)
            }
            CommandData::Box { .. } => Ok(()),
            CommandData::Cylinder {
                axis,
                radius,
                height,
                radial_segments,
                height_segments,
                ..
            } => {
                check_positive(kind, "radius", *radius)?;
                check_positive(kind, "height", *height)?;
                if axis.norm_squared() <= f32::EPSILON {
                    return Err(SubmitError::ZeroDirection { kind, field: "axis" });
                }
                check_segments(kind, "radial", *radial_segments, MIN_CYLINDER_RADIAL)?;
                check_segments(kind, "height", *height_segments, MIN_CYLINDER_HEIGHT)
            }
        }
    }
}

fn check_positive(kind: &'static str, dimension: &'static str, value: f32) -> Result<(), SubmitError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SubmitError::NonPositiveDimension {
            kind,
            dimension,
            value,
        })
    }
}

fn check_segments(
    kind: &'static str,
    axis: &'static str,
    actual: u32,
    minimum: u32,
) -> Result<(), SubmitError> {
    if actual >= minimum {
        Ok(())
    } else {
        Err(SubmitError::TooFewSegments {
            kind,
            axis,
            actual,
            minimum,
        })
    }
}

/// Expand a caller-supplied color slice into one color per vertex
///
/// Triangle-like variants accept exactly one color (replicated) or one
/// per vertex; anything else is a [`SubmitError::ColorCountMismatch`].
pub fn spread_colors<const N: usize>(
    kind: &'static str,
    colors: &[Color],
) -> Result<[Color; N], SubmitError> {
    match colors {
        [single] => Ok([*single; N]),
        exact if exact.len() == N => {
            let mut out = [Color::WHITE; N];
            out.copy_from_slice(exact);
            Ok(out)
        }
        other => Err(SubmitError::ColorCountMismatch {
            kind,
            per_vertex: N,
            actual: other.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_from_ticks() {
        assert_eq!(Lifetime::from_ticks(-1).unwrap(), Lifetime::Persistent);
        assert_eq!(Lifetime::from_ticks(10).unwrap(), Lifetime::Ticks(10));
        assert!(Lifetime::from_ticks(0).is_err());
    }

    #[test]
    fn test_lifetime_expiry_boundary() {
        let lifetime = Lifetime::Ticks(10);
        assert!(!lifetime.is_expired(9));
        assert!(lifetime.is_expired(10));
        assert!(lifetime.is_expired(11));
        assert!(!Lifetime::Persistent.is_expired(u32::MAX));
    }

    #[test]
    fn test_polyline_needs_two_points() {
        let data = CommandData::Polyline {
            points: vec![Vec3::zeros()],
            color: Color::WHITE,
            thickness: Thickness::World(0.1),
        };
        let result = ShapeCommand::new(data, Lifetime::Ticks(1), DrawTransform::identity());
        assert!(matches!(
            result,
            Err(SubmitError::TooFewPoints { expected: 2, .. })
        ));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let data = CommandData::Sphere {
            center: PointRef::Literal(Vec3::zeros()),
            radius: -1.0,
            lat_segments: 8,
            lon_segments: 8,
            color: Color::WHITE,
        };
        let result = ShapeCommand::new(data, Lifetime::Ticks(1), DrawTransform::identity());
        assert!(matches!(
            result,
            Err(SubmitError::NonPositiveDimension {
                dimension: "radius",
                ..
            })
        ));
    }

    #[test]
    fn test_cylinder_zero_axis_rejected() {
        let data = CommandData::Cylinder {
            base: PointRef::Literal(Vec3::zeros()),
            axis: Vec3::zeros(),
            radius: 1.0,
            height: 2.0,
            radial_segments: 8,
            height_segments: 1,
            color: Color::WHITE,
        };
        let result = ShapeCommand::new(data, Lifetime::Ticks(1), DrawTransform::identity());
        assert!(matches!(result, Err(SubmitError::ZeroDirection { .. })));
    }

    #[test]
    fn test_kind_names_and_textured_flag() {
        let quad = CommandData::TexturedQuad {
            center: PointRef::Literal(Vec3::zeros()),
            width: 1.0,
            height: 1.0,
            texture: TextureId(0),
            tint: Color::WHITE,
            camera_facing: true,
        };
        assert!(quad.is_textured());
        assert_eq!(quad.kind(), "textured quad");

        let line = CommandData::Line {
            ends: [PointRef::Literal(Vec3::zeros()); 2],
            color: Color::WHITE,
            thickness: Thickness::World(0.1),
        };
        assert!(!line.is_textured());
        assert_eq!(line.kind(), "line");
    }

    #[test]
    fn test_spread_colors_single_and_exact() {
        let single: [Color; 3] = spread_colors("triangle", &[Color::BLACK]).unwrap();
        assert_eq!(single, [Color::BLACK; 3]);

        let exact: [Color; 3] =
            spread_colors("triangle", &[Color::BLACK, Color::WHITE, Color::BLACK]).unwrap();
        assert_eq!(exact[1], Color::WHITE);

        let mismatch: Result<[Color; 3], _> = spread_colors("triangle", &[Color::BLACK; 2]);
        assert!(matches!(
            mismatch,
            Err(SubmitError::ColorCountMismatch { actual: 2, .. })
        ));
    }
}
