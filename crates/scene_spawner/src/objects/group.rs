//! Group handle
//!
//! Owns one shared-group layout instance allocated from the engine's memory
//! space. Allocation and construction happen immediately; loading the `.sgb`
//! definition and wiring up its children is deferred to the next tick because
//! the layout subsystems it touches are only queryable after per-frame setup.
//! The registry schedules that step through its tick queue.

use super::error::SpawnError;
use super::transform::ObservedTransform;
use crate::foundation::math::{Transform, TransformPatch, Vec3};
use crate::host::{GraphicsPtr, GroupPtr, HostContext, InstanceKind, Rgba};

/// Owning handle to a native group instance
#[derive(Debug)]
pub struct GroupHandle {
    ctx: HostContext,
    path: String,
    group: Option<GroupPtr>,
    transform: ObservedTransform,
    collide: bool,
    populated: bool,
    alpha: u8,
    highlight: u8,
    stain: Option<Vec3>,
    hovered: bool,
}

impl GroupHandle {
    /// Allocate and construct the native group
    ///
    /// Children are not loaded yet; call [`populate`](Self::populate) on a
    /// later tick.
    pub fn new(ctx: &HostContext, path: &str, placement: Transform, collide: bool) -> Result<Self, SpawnError> {
        let host = ctx.host();
        let group = match SpawnError::from_creation(path, host.allocate_group())? {
            Some(group) => match SpawnError::from_creation(path, host.construct_group(group)) {
                Ok(Some(())) => Some(group),
                Ok(None) => {
                    host.free_group(group);
                    None
                }
                Err(error) => {
                    host.free_group(group);
                    return Err(error);
                }
            },
            None => None,
        };

        if let Some(group) = group {
            log::debug!("Allocated group {path} @ {group:?}");
        }

        Ok(Self {
            ctx: ctx.clone(),
            path: path.to_string(),
            group,
            transform: ObservedTransform::new(placement),
            collide,
            populated: false,
            alpha: 0,
            highlight: ctx.config().groups.default_highlight,
            stain: None,
            hovered: false,
        })
    }

    /// Resource path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Native address, `None` once disposed or if creation failed
    pub fn native(&self) -> Option<GroupPtr> {
        self.group
    }

    /// Whether a native instance is held
    pub fn is_live(&self) -> bool {
        self.group.is_some()
    }

    /// Whether the deferred load has run
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Whether the deferred load still has to run
    pub fn needs_population(&self) -> bool {
        self.group.is_some() && !self.populated
    }

    /// Current placement
    pub fn transform(&self) -> &ObservedTransform {
        &self.transform
    }

    /// Collider state
    pub fn collide(&self) -> bool {
        self.collide
    }

    /// Last alpha written
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Last highlight written
    pub fn highlight(&self) -> u8 {
        self.highlight
    }

    /// Last stain applied, as a 0..1 RGB color
    pub fn stain(&self) -> Option<Vec3> {
        self.stain
    }

    /// Hover flag kept for callers that drive highlight from picking
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Set the hover flag
    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Load the group's definition and attach its children
    ///
    /// Runs at most once. Does nothing if the handle was disposed before the
    /// scheduled tick arrived.
    pub fn populate(&mut self) -> Result<(), SpawnError> {
        let Some(group) = self.group else {
            log::debug!("Skipping population of disposed group {}", self.path);
            return Ok(());
        };
        if self.populated {
            return Ok(());
        }
        self.populated = true;

        let host = self.ctx.host();
        if SpawnError::from_creation(&self.path, host.load_group(group, &self.path))?.is_none() {
            return Ok(());
        }

        self.push_transform(self.transform.get());

        // Multi-child groups come out of the load with unparented children
        let children = host.group_children(group);
        if children.first() != children.last() {
            log::trace!("Fixing {} children of group {}", children.len(), self.path);
            SpawnError::from_creation(&self.path, host.fix_group_children(group))?;
        }
        self.push_highlight();

        log::debug!("Populated group {} with {} children", self.path, children.len());
        Ok(())
    }

    /// Merge `patch` into the placement and push it
    pub fn set_transform(&mut self, patch: &TransformPatch) {
        if let Some(transform) = self.transform.apply(patch) {
            self.push_transform(transform);
        }
    }

    /// Set render alpha on every child with graphics
    pub fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
        for (_, graphics) in self.child_graphics() {
            self.ctx.host().set_graphics_alpha(graphics, alpha);
        }
    }

    /// Set highlight flags on every background-part child with graphics
    pub fn set_highlight(&mut self, color: u8) {
        self.highlight = color;
        self.push_highlight();
    }

    /// Toggle the native collider
    pub fn set_collide(&mut self, collide: bool) {
        self.collide = collide;
        if let Some(group) = self.group {
            self.ctx.host().set_group_collider(group, collide);
        }
    }

    /// Dye the group with a 0..1 RGB color
    pub fn apply_stain(&mut self, color: Vec3) {
        self.stain = Some(color);
        if let Some(group) = self.group {
            self.ctx.host().apply_group_stain(group, Rgba::opaque(color));
        }
    }

    /// Default stain index of the group's definition, `0` when it has none
    pub fn stain_index(&self) -> u8 {
        self.group
            .and_then(|group| self.ctx.host().group_stain_index(group))
            .unwrap_or(0)
    }

    /// Tear down and free the native group
    ///
    /// Every step runs even if an earlier one failed; the pointer is nulled
    /// regardless. Later calls do nothing.
    pub fn dispose(&mut self) {
        self.transform.unbind();

        let Some(group) = self.group.take() else {
            return;
        };
        log::debug!("Disposing group {} @ {group:?}", self.path);

        let host = self.ctx.host();
        SpawnError::log_disposal(&self.path, host.deinit_group(group));
        SpawnError::log_disposal(&self.path, host.destruct_group(group));
        host.free_group(group);
    }

    fn push_transform(&self, transform: Transform) {
        let Some(group) = self.group else {
            return;
        };
        let host = self.ctx.host();
        host.set_group_transform(group, &transform);
        host.set_group_collider(group, self.collide);

        for (_, graphics) in self.child_graphics() {
            host.update_graphics_culling(graphics);
        }
    }

    fn push_highlight(&self) {
        for (kind, graphics) in self.child_graphics() {
            if kind == InstanceKind::BgPart {
                self.ctx.host().set_graphics_highlight(graphics, self.highlight);
            }
        }
    }

    /// Attached children whose graphics are streamed in
    fn child_graphics(&self) -> Vec<(InstanceKind, GraphicsPtr)> {
        let Some(group) = self.group else {
            return Vec::new();
        };
        let host = self.ctx.host();
        host.group_children(group)
            .into_iter()
            .flatten()
            .filter_map(|child| host.child_graphics(child).map(|graphics| (host.child_kind(child), graphics)))
            .collect()
    }
}

impl Drop for GroupHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
