//! Anchor resolution against the host's dynamic-object provider
//!
//! Commands may reference a moving object instead of literal coordinates.
//! The reference is a lookup key, not an owning handle: it is resolved
//! fresh every frame, and a key whose object has gone away simply yields
//! no geometry for that frame.

use crate::foundation::math::{DrawTransform, Vec3};

/// Identifier of a dynamic object owned by the host world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Positional state the host reports for one dynamic object
#[derive(Debug, Clone, Copy)]
pub struct ObjectState {
    /// Position at the current simulation tick
    pub position: Vec3,

    /// Position at the previous simulation tick
    pub prev_position: Vec3,
}

/// Host-supplied lookup from object id to positional state
///
/// Returning `None` means the object does not exist this frame; the
/// renderer treats that as a soft skip, never an error.
pub trait ObjectProvider {
    /// Look up the state of one object, if it currently exists
    fn lookup(&self, id: ObjectId) -> Option<ObjectState>;
}

/// Reference to a dynamic object plus a local offset
#[derive(Debug, Clone, Copy)]
pub struct Attachment {
    /// Object the geometry follows
    pub object: ObjectId,

    /// Local offset added after the base position is resolved
    pub offset: Vec3,

    /// Interpolate between previous and current position by the frame's
    /// sub-tick fraction
    pub interpolate: bool,
}

impl Attachment {
    /// Create an attachment with no offset
    pub fn to_object(object: ObjectId) -> Self {
        Self {
            object,
            offset: Vec3::zeros(),
            interpolate: true,
        }
    }

    /// Create an attachment with a local offset
    pub fn with_offset(object: ObjectId, offset: Vec3) -> Self {
        Self {
            object,
            offset,
            interpolate: true,
        }
    }

    /// Resolve the base position of the anchored object, without the
    /// local offset
    ///
    /// Interpolates previous -> current by `alpha` when the attachment
    /// requests it. `None` when the host no longer knows the object.
    pub fn base_position(&self, provider: &dyn ObjectProvider, alpha: f32) -> Option<Vec3> {
        let Some(state) = provider.lookup(self.object) else {
            log::trace!("{} absent, skipping anchored geometry this frame", self.object);
            return None;
        };
        if self.interpolate {
            Some(state.prev_position + (state.position - state.prev_position) * alpha)
        } else {
            Some(state.position)
        }
    }
}

/// A point that is either literal world coordinates or anchored to a
/// dynamic object
///
/// Making the duality an explicit sum type keeps the two resolution
/// paths exhaustive instead of hiding one behind a nullable field.
#[derive(Debug, Clone, Copy)]
pub enum PointRef {
    /// Literal world-space coordinates
    Literal(Vec3),

    /// Position of a dynamic object plus local offset
    Anchored(Attachment),
}

impl PointRef {
    /// Resolve to world coordinates under a command transform
    ///
    /// Literal points run through the transform directly. For anchored
    /// points the transform applies to the local offset and the result is
    /// added to the resolved base position, so a rotating transform spins
    /// the geometry around its anchor rather than around the world origin.
    pub fn resolve(
        &self,
        provider: &dyn ObjectProvider,
        alpha: f32,
        transform: &DrawTransform,
    ) -> Option<Vec3> {
        match self {
            PointRef::Literal(point) => Some(transform.apply(*point)),
            PointRef::Anchored(attachment) => attachment
                .base_position(provider, alpha)
                .map(|base| base + transform.apply(attachment.offset)),
        }
    }

    /// Resolve the base position only, without offset or transform
    ///
    /// Used by variants whose geometry is authored relative to a single
    /// anchor (wireframe stamps, anchored polygons).
    pub fn base_position(&self, provider: &dyn ObjectProvider, alpha: f32) -> Option<Vec3> {
        match self {
            PointRef::Literal(point) => Some(*point),
            PointRef::Anchored(attachment) => attachment.base_position(provider, alpha),
        }
    }
}
