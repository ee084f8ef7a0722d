//! Spawned objects
//!
//! A [`SpawnedObject`] is what the registry stores: a resource path, a display
//! name and at most one handle. The handle kind is picked from the path's
//! extension when the object is spawned.

use super::effect::EffectHandle;
use super::error::SpawnError;
use super::group::GroupHandle;
use super::mesh::MeshHandle;
use crate::core::config::SpawnerConfig;
use crate::foundation::math::{utils, Transform, TransformPatch, Vec3};
use crate::host::{ActorRef, HostContext};
use std::time::Duration;

/// Resource formats the spawner knows how to instantiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFormat {
    /// `.mdl` model
    Model,
    /// `.sgb` shared group
    SharedGroup,
    /// `.avfx` effect
    Effect,
}

impl ResourceFormat {
    /// Format for a path's extension
    ///
    /// The match is exact and case-sensitive, like the engine's own resource
    /// lookup.
    pub fn from_path(path: &str) -> Option<Self> {
        if path.ends_with(".mdl") {
            Some(Self::Model)
        } else if path.ends_with(".sgb") {
            Some(Self::SharedGroup)
        } else if path.ends_with(".avfx") {
            Some(Self::Effect)
        } else {
            None
        }
    }
}

/// Kind of a spawned object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Background mesh
    Mesh,
    /// Shared group layout
    Group,
    /// Free-standing effect
    StaticEffect,
    /// Effect between two actors
    ActorEffect,
    /// No handle could be built for the path
    Invalid,
}

/// Options for spawning on an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorSpawnOptions {
    /// Collider state for groups
    pub collide: bool,
    /// Effect lifetime; zero never expires
    pub duration: Duration,
    /// Whether an effect refreshes when it expires
    pub looping: bool,
}

impl Default for ActorSpawnOptions {
    fn default() -> Self {
        Self {
            collide: false,
            duration: Duration::from_secs(5),
            looping: false,
        }
    }
}

impl ActorSpawnOptions {
    /// Effect options with an explicit lifetime
    pub fn new(duration: Duration, looping: bool) -> Self {
        Self {
            duration,
            looping,
            ..Self::default()
        }
    }

    /// Options carrying the configured defaults
    pub fn from_config(config: &SpawnerConfig) -> Self {
        Self {
            collide: config.groups.collide_by_default,
            duration: config.effects.actor_duration(),
            looping: false,
        }
    }

    /// Builder pattern: Set collider state
    pub fn with_collide(mut self, collide: bool) -> Self {
        self.collide = collide;
        self
    }
}

/// One of the handle kinds
#[derive(Debug)]
pub enum ObjectHandle {
    /// Background mesh
    Mesh(MeshHandle),
    /// Shared group layout
    Group(GroupHandle),
    /// Static or actor effect
    Effect(EffectHandle),
}

impl ObjectHandle {
    /// Kind of the wrapped handle
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Mesh(_) => ObjectKind::Mesh,
            Self::Group(_) => ObjectKind::Group,
            Self::Effect(effect) if effect.is_actor() => ObjectKind::ActorEffect,
            Self::Effect(_) => ObjectKind::StaticEffect,
        }
    }

    /// Resource path
    pub fn path(&self) -> &str {
        match self {
            Self::Mesh(mesh) => mesh.path(),
            Self::Group(group) => group.path(),
            Self::Effect(effect) => effect.path(),
        }
    }

    /// Whether a native instance is held
    pub fn is_live(&self) -> bool {
        match self {
            Self::Mesh(mesh) => mesh.is_live(),
            Self::Group(group) => group.is_live(),
            Self::Effect(effect) => effect.is_live(),
        }
    }

    /// Native address of the held instance
    pub fn native_addr(&self) -> Option<usize> {
        match self {
            Self::Mesh(mesh) => mesh.native().map(|ptr| ptr.addr()),
            Self::Group(group) => group.native().map(|ptr| ptr.addr()),
            Self::Effect(effect) => effect.native().map(|ptr| ptr.addr()),
        }
    }

    /// Current placement; actor effects have none
    pub fn transform(&self) -> Option<Transform> {
        match self {
            Self::Mesh(mesh) => Some(mesh.transform().get()),
            Self::Group(group) => Some(group.transform().get()),
            Self::Effect(effect) => effect.transform().map(|transform| transform.get()),
        }
    }

    /// Merge `patch` into the placement; `false` if the handle cannot move
    pub fn set_transform(&mut self, patch: &TransformPatch) -> bool {
        match self {
            Self::Mesh(mesh) => {
                mesh.set_transform(patch);
                true
            }
            Self::Group(group) => {
                group.set_transform(patch);
                true
            }
            Self::Effect(effect) => effect.set_transform(patch),
        }
    }

    /// Release the native instance
    pub fn dispose(&mut self) {
        match self {
            Self::Mesh(mesh) => mesh.dispose(),
            Self::Group(group) => group.dispose(),
            Self::Effect(effect) => effect.dispose(),
        }
    }
}

impl From<MeshHandle> for ObjectHandle {
    fn from(handle: MeshHandle) -> Self {
        Self::Mesh(handle)
    }
}

impl From<GroupHandle> for ObjectHandle {
    fn from(handle: GroupHandle) -> Self {
        Self::Group(handle)
    }
}

impl From<EffectHandle> for ObjectHandle {
    fn from(handle: EffectHandle) -> Self {
        Self::Effect(handle)
    }
}

/// Object tracked by the registry
#[derive(Debug)]
pub struct SpawnedObject {
    path: String,
    name: String,
    handle: Option<ObjectHandle>,
}

impl SpawnedObject {
    /// Spawn a free-standing object
    ///
    /// Unknown extensions produce an [`ObjectKind::Invalid`] object; only a
    /// missing native entry point is returned as an error.
    pub fn spawn(ctx: &HostContext, path: &str, patch: &TransformPatch, collide: bool) -> Result<Self, SpawnError> {
        let Some(format) = ResourceFormat::from_path(path) else {
            return Ok(Self::unsupported(path));
        };

        let handle: ObjectHandle = match format {
            ResourceFormat::Model => MeshHandle::new(ctx, path, Transform::default().merged(patch))?.into(),
            ResourceFormat::SharedGroup => {
                GroupHandle::new(ctx, path, Transform::default().merged(patch), collide)?.into()
            }
            ResourceFormat::Effect => {
                let placement = Transform::new(Vec3::zeros(), utils::yaw(0.0), Vec3::new(1.0, 1.0, 1.0)).merged(patch);
                EffectHandle::new_static(ctx, path, placement, ctx.config().effects.static_refresh(), true)?.into()
            }
        };
        Ok(Self::from_handle(handle))
    }

    /// Spawn an object on an actor
    ///
    /// Meshes and groups take the actor's position and facing; effects travel
    /// from the actor to itself.
    pub fn spawn_on_actor(
        ctx: &HostContext,
        path: &str,
        target: ActorRef,
        options: ActorSpawnOptions,
    ) -> Result<Self, SpawnError> {
        let Some(format) = ResourceFormat::from_path(path) else {
            return Ok(Self::unsupported(path));
        };

        let placement = Transform::new(target.position, utils::about_x(target.rotation), Vec3::new(1.0, 1.0, 1.0));
        let handle: ObjectHandle = match format {
            ResourceFormat::Model => MeshHandle::new(ctx, path, placement)?.into(),
            ResourceFormat::SharedGroup => GroupHandle::new(ctx, path, placement, options.collide)?.into(),
            ResourceFormat::Effect => {
                EffectHandle::new_actor(ctx, path, target, target, options.duration, options.looping)?.into()
            }
        };
        Ok(Self::from_handle(handle))
    }

    /// Wrap a handle built elsewhere
    pub fn from_handle(handle: impl Into<ObjectHandle>) -> Self {
        let handle = handle.into();
        let path = handle.path().to_string();
        Self {
            name: path.clone(),
            path,
            handle: Some(handle),
        }
    }

    fn unsupported(path: &str) -> Self {
        log::error!("{}", SpawnError::UnsupportedFormat { path: path.to_string() });
        Self {
            path: path.to_string(),
            name: path.to_string(),
            handle: None,
        }
    }

    /// Resource path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Display name, the path unless changed
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Kind derived from the handle
    pub fn kind(&self) -> ObjectKind {
        self.handle.as_ref().map_or(ObjectKind::Invalid, ObjectHandle::kind)
    }

    /// Whether the object has a kind
    ///
    /// A kind-tagged object whose native creation failed is still valid; see
    /// [`is_live`](Self::is_live).
    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether a native instance is held
    pub fn is_live(&self) -> bool {
        self.handle.as_ref().map_or(false, ObjectHandle::is_live)
    }

    /// Wrapped handle
    pub fn handle(&self) -> Option<&ObjectHandle> {
        self.handle.as_ref()
    }

    /// Wrapped handle, mutably
    pub fn handle_mut(&mut self) -> Option<&mut ObjectHandle> {
        self.handle.as_mut()
    }

    /// Mesh handle, if this is a mesh
    pub fn mesh(&self) -> Option<&MeshHandle> {
        match &self.handle {
            Some(ObjectHandle::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    /// Mesh handle, mutably
    pub fn mesh_mut(&mut self) -> Option<&mut MeshHandle> {
        match &mut self.handle {
            Some(ObjectHandle::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    /// Group handle, if this is a group
    pub fn group(&self) -> Option<&GroupHandle> {
        match &self.handle {
            Some(ObjectHandle::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// Group handle, mutably
    pub fn group_mut(&mut self) -> Option<&mut GroupHandle> {
        match &mut self.handle {
            Some(ObjectHandle::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// Effect handle, if this is an effect
    pub fn effect(&self) -> Option<&EffectHandle> {
        match &self.handle {
            Some(ObjectHandle::Effect(effect)) => Some(effect),
            _ => None,
        }
    }

    /// Effect handle, mutably
    pub fn effect_mut(&mut self) -> Option<&mut EffectHandle> {
        match &mut self.handle {
            Some(ObjectHandle::Effect(effect)) => Some(effect),
            _ => None,
        }
    }

    /// Current placement
    pub fn transform(&self) -> Option<Transform> {
        self.handle.as_ref().and_then(ObjectHandle::transform)
    }

    /// Merge `patch` into the placement
    pub fn set_transform(&mut self, patch: &TransformPatch) -> bool {
        self.handle.as_mut().map_or(false, |handle| handle.set_transform(patch))
    }

    /// Whether a group still waits for its deferred load
    pub fn needs_population(&self) -> bool {
        self.group().map_or(false, GroupHandle::needs_population)
    }

    /// Run the deferred group load, if this is a group
    pub fn populate(&mut self) -> Result<(), SpawnError> {
        match self.group_mut() {
            Some(group) => group.populate(),
            None => Ok(()),
        }
    }

    /// Release the native instance, keeping the kind
    pub fn dispose(&mut self) {
        if let Some(handle) = &mut self.handle {
            handle.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostError;
    use crate::testing::{Fixture, HostCall};
    use approx::assert_relative_eq;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ResourceFormat::from_path("bg/a/rock.mdl"), Some(ResourceFormat::Model));
        assert_eq!(ResourceFormat::from_path("bg/a/house.sgb"), Some(ResourceFormat::SharedGroup));
        assert_eq!(ResourceFormat::from_path("vfx/glow.avfx"), Some(ResourceFormat::Effect));
        assert_eq!(ResourceFormat::from_path("bg/a/rock.MDL"), None);
        assert_eq!(ResourceFormat::from_path("chara/tex.tex"), None);
    }

    #[test]
    fn test_spawn_picks_kind() {
        let fx = Fixture::new();
        let patch = TransformPatch::new();

        let mesh = SpawnedObject::spawn(&fx.ctx, "bg/rock.mdl", &patch, false).expect("Should spawn");
        let group = SpawnedObject::spawn(&fx.ctx, "bg/house.sgb", &patch, true).expect("Should spawn");
        let effect = SpawnedObject::spawn(&fx.ctx, "vfx/glow.avfx", &patch, false).expect("Should spawn");
        let invalid = SpawnedObject::spawn(&fx.ctx, "ui/icon.tex", &patch, false).expect("Should not fail");

        assert_eq!(mesh.kind(), ObjectKind::Mesh);
        assert_eq!(group.kind(), ObjectKind::Group);
        assert_eq!(effect.kind(), ObjectKind::StaticEffect);
        assert_eq!(invalid.kind(), ObjectKind::Invalid);
        assert!(!invalid.is_valid());
        assert_eq!(mesh.name(), "bg/rock.mdl");
    }

    #[test]
    fn test_static_effect_loops_without_expiry_by_default() {
        let fx = Fixture::new();
        let object = SpawnedObject::spawn(&fx.ctx, "vfx/glow.avfx", &TransformPatch::new(), false).expect("Should spawn");
        let effect = object.effect().expect("Should be an effect");

        assert!(effect.looping());
        assert_eq!(effect.duration(), Duration::ZERO);
        assert!(effect.expires_at().is_none());
    }

    #[test]
    fn test_static_effect_loops_with_configured_period() {
        let fx = Fixture::with_config(SpawnerConfig::default().with_static_refresh_secs(5.0));
        let object = SpawnedObject::spawn(&fx.ctx, "vfx/glow.avfx", &TransformPatch::new(), false).expect("Should spawn");
        let effect = object.effect().expect("Should be an effect");

        assert!(effect.looping());
        assert_eq!(effect.duration(), Duration::from_secs(5));
        assert_eq!(effect.expires_at(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_actor_placement_for_meshes() {
        let fx = Fixture::new();
        let actor = ActorRef::new(0x77, Vec3::new(4.0, 5.0, 6.0), 1.0);
        let object = SpawnedObject::spawn_on_actor(&fx.ctx, "bg/rock.mdl", actor, ActorSpawnOptions::default())
            .expect("Should spawn");

        let transform = object.transform().expect("Meshes have a placement");
        assert_eq!(transform.position, Vec3::new(4.0, 5.0, 6.0));
        assert_relative_eq!(transform.rotation.angle(), 1.0, epsilon = 1e-5);
        assert_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_actor_effect_uses_options() {
        let fx = Fixture::new();
        let actor = ActorRef::new(0x77, Vec3::zeros(), 0.0);
        let options = ActorSpawnOptions::new(Duration::from_secs(3), false);
        let object = SpawnedObject::spawn_on_actor(&fx.ctx, "fx/hit.avfx", actor, options).expect("Should spawn");

        assert_eq!(object.kind(), ObjectKind::ActorEffect);
        assert!(object.transform().is_none());
        assert_eq!(object.effect().map(EffectHandle::duration), Some(Duration::from_secs(3)));
        assert_eq!(fx.host.count(|c| matches!(c, HostCall::CreateActorEffect(_, 0x77, 0x77, _))), 1);
    }

    #[test]
    fn test_actor_options_from_config() {
        let mut config = SpawnerConfig::default();
        config.groups.collide_by_default = true;
        config.effects.actor_duration_secs = 8.0;

        let options = ActorSpawnOptions::from_config(&config);
        assert!(options.collide);
        assert_eq!(options.duration, Duration::from_secs(8));
        assert!(!options.looping);
    }

    #[test]
    fn test_failed_creation_keeps_kind() {
        let fx = Fixture::new();
        fx.host.fail("create_mesh", HostError::NullInstance("BgObject.Create"));
        let object = SpawnedObject::spawn(&fx.ctx, "bg/rock.mdl", &TransformPatch::new(), false).expect("Should spawn");

        assert_eq!(object.kind(), ObjectKind::Mesh);
        assert!(object.is_valid());
        assert!(!object.is_live());
    }

    #[test]
    fn test_only_groups_need_population() {
        let fx = Fixture::new();
        let mesh = SpawnedObject::spawn(&fx.ctx, "bg/rock.mdl", &TransformPatch::new(), false).expect("Should spawn");
        let mut group = SpawnedObject::spawn(&fx.ctx, "bg/house.sgb", &TransformPatch::new(), false).expect("Should spawn");

        assert!(!mesh.needs_population());
        assert!(group.needs_population());
        group.populate().expect("Should populate");
        assert!(!group.needs_population());
    }
}
