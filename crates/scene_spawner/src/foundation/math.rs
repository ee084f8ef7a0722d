//! Math utilities and types
//!
//! Provides the vector, quaternion and placement types shared by every handle.

pub use nalgebra::{Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Placement of a spawned object: position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from all three components
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Return a copy with the fields present in `patch` replaced
    pub fn merged(&self, patch: &TransformPatch) -> Self {
        Self {
            position: patch.position.unwrap_or(self.position),
            rotation: patch.rotation.unwrap_or(self.rotation),
            scale: patch.scale.unwrap_or(self.scale),
        }
    }
}

/// Partial transform update; absent fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformPatch {
    /// New position, if any
    pub position: Option<Vec3>,
    /// New rotation, if any
    pub rotation: Option<Quat>,
    /// New scale, if any
    pub scale: Option<Vec3>,
}

impl TransformPatch {
    /// Empty patch (changes nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Builder pattern: Set rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Whether the patch carries no field at all
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }
}

impl From<Transform> for TransformPatch {
    fn from(transform: Transform) -> Self {
        Self {
            position: Some(transform.position),
            rotation: Some(transform.rotation),
            scale: Some(transform.scale),
        }
    }
}

/// Math utility functions
pub mod utils {
    use super::{Quat, Vec3};

    /// Rotation about the vertical (Y) axis, in radians
    pub fn yaw(angle: f32) -> Quat {
        Quat::from_axis_angle(&Vec3::y_axis(), angle)
    }

    /// Rotation about the X axis, in radians
    ///
    /// Actor facing angles are applied about this axis when an actor's
    /// placement is copied onto a mesh or group.
    pub fn about_x(angle: f32) -> Quat {
        Quat::from_axis_angle(&Vec3::x_axis(), angle)
    }

    /// Convert a 0..1 channel to a byte, saturating outside the range
    pub fn unit_to_byte(value: f32) -> u8 {
        // float-to-int `as` saturates
        (value * 255.0) as u8
    }
}
