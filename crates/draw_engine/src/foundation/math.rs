//! Math utilities and types
//!
//! Provides fundamental math types for the command renderer, plus the
//! composable draw transform applied to every submitted primitive.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rotation component of a [`DrawTransform`]
///
/// A quaternion and Euler angles are mutually exclusive by construction;
/// producers pick one variant, so there is no precedence rule to apply at
/// render time.
#[derive(Debug, Clone, PartialEq)]
pub enum Rotation {
    /// No rotation
    None,

    /// Arbitrary rotation expressed as a unit quaternion
    Quaternion(Quat),

    /// Rotation expressed as yaw/pitch/roll in degrees
    ///
    /// Applied to a point in the fixed order yaw (about +Y), then pitch
    /// (about +X), then roll (about +Z). The order is load-bearing: these
    /// rotations do not commute, and every consumer of the renderer relies
    /// on this exact composition.
    Euler {
        /// Rotation about the up axis (+Y), degrees
        yaw: f32,
        /// Rotation about the right axis (+X), degrees
        pitch: f32,
        /// Rotation about the forward axis (+Z), degrees
        roll: f32,
    },
}

impl Rotation {
    /// Rotate a vector by this rotation
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        match self {
            Rotation::None => v,
            Rotation::Quaternion(q) => q * v,
            Rotation::Euler { yaw, pitch, roll } => {
                let yaw_q = Quat::from_axis_angle(&Vec3::y_axis(), yaw.to_radians());
                let pitch_q = Quat::from_axis_angle(&Vec3::x_axis(), pitch.to_radians());
                let roll_q = Quat::from_axis_angle(&Vec3::z_axis(), roll.to_radians());
                // Yaw is applied to the point first, then pitch, then roll.
                (roll_q * pitch_q * yaw_q) * v
            }
        }
    }

    /// True when this rotation leaves every vector unchanged
    pub fn is_none(&self) -> bool {
        matches!(self, Rotation::None)
    }
}

/// Composable affine transform carried by every render command
///
/// The composition order is fixed:
///
/// ```text
/// output = rotate(scale * (input - pivot)) + pivot + translation
/// ```
///
/// # Identity fast path
/// [`DrawTransform::is_identity`] is the sentinel check the render
/// pipeline uses to skip the arithmetic entirely for untransformed
/// commands. Hot loops map thousands of cached-mesh vertices per frame
/// through the same transform, so the skip is part of the contract, not
/// a nicety.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTransform {
    /// Translation added after rotation
    pub translation: Vec3,

    /// Pivot the scale/rotation happens around
    pub pivot: Vec3,

    /// Uniform scale factor
    pub scale: f32,

    /// Rotation applied after scaling
    pub rotation: Rotation,
}

impl Default for DrawTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            pivot: Vec3::zeros(),
            scale: 1.0,
            rotation: Rotation::None,
        }
    }
}

impl DrawTransform {
    /// Create the identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only a translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Create a transform with only a rotation
    pub fn from_rotation(rotation: Rotation) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform with only a uniform scale
    pub fn from_scale(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    /// Create a transform rotating by `yaw` degrees about the up axis
    pub fn from_yaw_degrees(yaw: f32) -> Self {
        Self::from_rotation(Rotation::Euler {
            yaw,
            pitch: 0.0,
            roll: 0.0,
        })
    }

    /// True when applying this transform is a no-op
    ///
    /// The pivot is ignored here: with unit scale and no rotation it
    /// cancels out of the composition.
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.rotation.is_none() && self.translation == Vec3::zeros()
    }

    /// Apply this transform to a point
    pub fn apply(&self, point: Vec3) -> Vec3 {
        if self.is_identity() {
            return point;
        }
        let scaled = (point - self.pivot) * self.scale;
        self.rotation.rotate(scaled) + self.pivot + self.translation
    }

    /// Apply only the scale and rotation to a direction vector
    ///
    /// Used for offsets that orbit a resolved anchor position and for
    /// unit-mesh vertices that are positioned relative to a primitive
    /// center; pivot and translation do not participate.
    pub fn apply_direction(&self, direction: Vec3) -> Vec3 {
        if self.is_identity() {
            return direction;
        }
        self.rotation.rotate(direction * self.scale)
    }
}
