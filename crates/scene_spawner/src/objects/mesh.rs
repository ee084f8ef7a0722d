//! Mesh handle
//!
//! Owns one native background-object instance created from a `.mdl` path.
//! The renderer's culling data is only correct once the model resource is
//! resident, so a freshly created mesh stays `dirty` until the registry's
//! per-tick pass sees the ready load state and recomputes culling once.

use super::error::SpawnError;
use super::transform::ObservedTransform;
use crate::foundation::math::{Transform, TransformPatch};
use crate::host::{HostContext, MeshPtr};

/// Owning handle to a native mesh instance
#[derive(Debug)]
pub struct MeshHandle {
    ctx: HostContext,
    path: String,
    mesh: Option<MeshPtr>,
    transform: ObservedTransform,
    dirty: bool,
    alpha: u8,
    highlight: u8,
}

impl MeshHandle {
    /// Create the native mesh and apply `placement`
    ///
    /// A missing native entry point is returned as an error. Any other
    /// creation failure is logged and leaves the handle empty.
    pub fn new(ctx: &HostContext, path: &str, placement: Transform) -> Result<Self, SpawnError> {
        log::trace!("Creating mesh {path}");
        let mesh = SpawnError::from_creation(path, ctx.host().create_mesh(path))?;

        let mut handle = Self {
            ctx: ctx.clone(),
            path: path.to_string(),
            mesh,
            transform: ObservedTransform::new(placement),
            dirty: true,
            alpha: 0,
            highlight: 0,
        };

        handle.push_transform(placement);
        handle.fix_culling();
        Ok(handle)
    }

    /// Resource path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Native address, `None` once disposed or if creation failed
    pub fn native(&self) -> Option<MeshPtr> {
        self.mesh
    }

    /// Whether a native instance is held
    pub fn is_live(&self) -> bool {
        self.mesh.is_some()
    }

    /// Whether culling still waits for the model to load
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current placement
    pub fn transform(&self) -> &ObservedTransform {
        &self.transform
    }

    /// Last alpha written
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Last highlight written
    pub fn highlight(&self) -> u8 {
        self.highlight
    }

    /// Merge `patch` into the placement and push it
    pub fn set_transform(&mut self, patch: &TransformPatch) {
        if let Some(transform) = self.transform.apply(patch) {
            self.push_transform(transform);
        }
    }

    /// Fix culling once the model is resident
    ///
    /// Returns `true` when this call performed the fix. Calling it again after
    /// the mesh is clean does nothing.
    pub fn fix_culling(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        let Some(mesh) = self.mesh else {
            return false;
        };

        let sentinel = self.ctx.config().mesh.ready_load_state;
        if !self.ctx.host().mesh_load_state(mesh).is_ready(sentinel) {
            return false;
        }

        log::trace!("Fixing culling for mesh {}", self.path);
        self.ctx.host().update_mesh_culling(mesh);
        self.dirty = false;
        true
    }

    /// Set render alpha
    pub fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
        if let Some(mesh) = self.mesh {
            self.ctx.host().set_mesh_alpha(mesh, alpha);
            self.update_render();
        }
    }

    /// Set highlight color flags
    pub fn set_highlight(&mut self, color: u8) {
        self.highlight = color;
        if let Some(mesh) = self.mesh {
            self.ctx.host().set_mesh_highlight(mesh, color);
            self.update_render();
        }
    }

    /// Push pending render state to the engine
    pub fn update_render(&self) {
        if let Some(mesh) = self.mesh {
            log::trace!("Updating render state of mesh {}", self.path);
            self.ctx.host().update_mesh_render(mesh);
        }
    }

    /// Release the native instance
    ///
    /// Safe to call repeatedly; only the first call reaches the host.
    pub fn dispose(&mut self) {
        self.transform.unbind();
        self.dirty = false;

        let Some(mesh) = self.mesh.take() else {
            return;
        };
        log::debug!("Disposing mesh {} @ {mesh:?}", self.path);
        SpawnError::log_disposal(&self.path, self.ctx.host().destroy_mesh(mesh));
    }

    fn push_transform(&self, transform: Transform) {
        let Some(mesh) = self.mesh else {
            return;
        };
        self.ctx.host().set_mesh_transform(mesh, &transform);

        // Moving an already resident model invalidates its culling bounds
        let sentinel = self.ctx.config().mesh.ready_load_state;
        if self.ctx.host().mesh_load_state(mesh).is_ready(sentinel) {
            self.ctx.host().update_mesh_culling(mesh);
        }
    }
}

impl Drop for MeshHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
