//! Observed transform
//!
//! Holds a handle's placement and tells its single owner about every change.
//! The notification is the return value of each setter: `Some(full)` while an
//! owner is bound, `None` once it unbound itself during disposal. Owners push
//! the returned value into native memory exactly once per call.

use crate::foundation::math::{Quat, Transform, TransformPatch, Vec3};

/// Placement with an owner binding
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedTransform {
    current: Transform,
    bound: bool,
}

impl ObservedTransform {
    /// Create a transform bound to its (single) owner
    pub fn new(initial: Transform) -> Self {
        Self {
            current: initial,
            bound: true,
        }
    }

    /// Current placement
    pub fn get(&self) -> Transform {
        self.current
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.current.position
    }

    /// Current rotation
    pub fn rotation(&self) -> Quat {
        self.current.rotation
    }

    /// Current scale
    pub fn scale(&self) -> Vec3 {
        self.current.scale
    }

    /// Merge `patch` and return the full placement to push, if still bound
    pub fn apply(&mut self, patch: &TransformPatch) -> Option<Transform> {
        self.current = self.current.merged(patch);
        self.bound.then_some(self.current)
    }

    /// Set position only
    pub fn set_position(&mut self, position: Vec3) -> Option<Transform> {
        self.apply(&TransformPatch::new().with_position(position))
    }

    /// Set rotation only
    pub fn set_rotation(&mut self, rotation: Quat) -> Option<Transform> {
        self.apply(&TransformPatch::new().with_rotation(rotation))
    }

    /// Set scale only
    pub fn set_scale(&mut self, scale: Vec3) -> Option<Transform> {
        self.apply(&TransformPatch::new().with_scale(scale))
    }

    /// Whether an owner still receives updates
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Stop notifying the owner
    pub fn unbind(&mut self) {
        self.bound = false;
    }
}
