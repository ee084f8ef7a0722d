//! Object Registry
//!
//! Owns every spawned object and keeps them alive until they are removed,
//! cleared or expire. The host drives it once per frame through
//! [`ObjectRegistry::on_frame_update`] (or [`ObjectRegistry::handle_signal`]),
//! which first runs deferred work queued before the tick and then walks the
//! objects:
//!
//! - dirty meshes get their culling fixed once the model is resident
//! - expired non-looping effects are disposed and dropped
//! - expired looping effects are refreshed in place
//!
//! Zone changes and logout wipe the registry, since every native object
//! belongs to the scene being torn down.

use super::effect::EffectHandle;
use super::error::SpawnError;
use super::remote::{RegistryRemote, RemoteCommand, TickTask};
use super::spawned::{ActorSpawnOptions, ObjectHandle, ObjectKind, SpawnedObject};
use crate::foundation::collections::{ObjectId, ObjectMap};
use crate::foundation::math::TransformPatch;
use crate::host::{ActorRef, HostContext, HostSignal, SignalToken};
use crate::scheduler::TickQueue;

/// Counters for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    /// Objects registered over the registry's lifetime
    pub total_spawned: u64,
    /// Objects removed explicitly, by clear or out of band
    pub total_removed: u64,
    /// Non-looping effects dropped on expiry
    pub total_expired: u64,
    /// Looping effect refreshes
    pub total_refreshed: u64,
    /// Objects currently registered
    pub current_objects: usize,
    /// Highest `current_objects` seen
    pub peak_objects: usize,
}

/// Owner of every spawned object
pub struct ObjectRegistry {
    ctx: HostContext,
    objects: ObjectMap<SpawnedObject>,
    order: Vec<ObjectId>,
    tasks: TickQueue<TickTask>,
    subscriptions: Vec<SignalToken>,
    disposed: bool,
    stats: RegistryStats,
}

impl ObjectRegistry {
    /// Create a registry and subscribe to the host's signals
    pub fn new(ctx: &HostContext) -> Self {
        let subscriptions = HostSignal::ALL
            .iter()
            .map(|&signal| ctx.signals().subscribe(signal))
            .collect();
        log::info!("Object registry created");

        Self {
            ctx: ctx.clone(),
            objects: ObjectMap::with_key(),
            order: Vec::new(),
            tasks: TickQueue::new(),
            subscriptions,
            disposed: false,
            stats: RegistryStats::default(),
        }
    }

    /// Spawn a free-standing object
    ///
    /// Groups are populated on the next tick.
    pub fn add(&mut self, path: &str, patch: &TransformPatch, collide: bool) -> Result<ObjectId, SpawnError> {
        let object = SpawnedObject::spawn(&self.ctx, path, patch, collide)?;
        self.register(object)
    }

    /// Spawn an object on an actor
    pub fn add_on_actor(
        &mut self,
        path: &str,
        target: ActorRef,
        options: ActorSpawnOptions,
    ) -> Result<ObjectId, SpawnError> {
        let object = SpawnedObject::spawn_on_actor(&self.ctx, path, target, options)?;
        self.register(object)
    }

    /// Take ownership of a handle built elsewhere
    pub fn adopt(&mut self, handle: impl Into<ObjectHandle>) -> ObjectId {
        self.insert(SpawnedObject::from_handle(handle))
    }

    fn register(&mut self, object: SpawnedObject) -> Result<ObjectId, SpawnError> {
        if !object.is_valid() {
            return Err(SpawnError::InvalidArgument(format!(
                "cannot spawn {}: unsupported resource format",
                object.path()
            )));
        }
        Ok(self.insert(object))
    }

    fn insert(&mut self, object: SpawnedObject) -> ObjectId {
        let needs_population = object.needs_population();
        let kind = object.kind();
        let path = object.path().to_string();

        let id = self.objects.insert(object);
        self.order.push(id);
        if needs_population {
            self.tasks.schedule(TickTask::PopulateGroup(id));
        }

        self.stats.total_spawned += 1;
        self.update_counts();
        log::info!("Spawned {kind:?} {path} as {id:?}");
        id
    }

    /// Object under `id`
    pub fn get(&self, id: ObjectId) -> Option<&SpawnedObject> {
        self.objects.get(id)
    }

    /// Object under `id`, mutably
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SpawnedObject> {
        self.objects.get_mut(id)
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ids in insertion order
    pub fn ids(&self) -> &[ObjectId] {
        &self.order
    }

    /// Objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SpawnedObject)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.objects.get(id).map(|object| (id, object)))
    }

    /// Get statistics
    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    /// Number of deferred tasks waiting for the next tick
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Whether [`dispose`](Self::dispose) has run
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Handle for queueing work from other threads
    pub fn remote(&self) -> RegistryRemote {
        RegistryRemote::new(self.tasks.sender())
    }

    /// Merge `patch` into an object's placement
    ///
    /// Actor effects cannot be moved; the call is logged and ignored.
    pub fn set_transform(&mut self, id: ObjectId, patch: &TransformPatch) -> Result<(), SpawnError> {
        let object = self.objects.get_mut(id).ok_or(SpawnError::UnknownObject(id))?;
        if object.kind() == ObjectKind::ActorEffect {
            log::warn!("Ignoring transform for actor effect {}", object.path());
            return Ok(());
        }
        object.set_transform(patch);
        Ok(())
    }

    /// Dispose and drop one object
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(mut object) = self.objects.remove(id) else {
            return false;
        };
        self.order.retain(|&other| other != id);
        object.dispose();

        self.stats.total_removed += 1;
        self.update_counts();
        log::debug!("Removed {id:?} ({})", object.path());
        true
    }

    /// Dispose and drop every object
    ///
    /// Effects stop looping before anything is torn down so none of them can
    /// refresh mid-clear.
    pub fn clear(&mut self) {
        for object in self.objects.values_mut() {
            if let Some(effect) = object.effect_mut() {
                effect.set_looping(false);
            }
        }

        let count = self.order.len();
        for id in std::mem::take(&mut self.order) {
            if let Some(mut object) = self.objects.remove(id) {
                object.dispose();
            }
        }
        self.objects.clear();

        if count > 0 {
            self.stats.total_removed += count as u64;
            log::info!("Cleared {count} objects");
        }
        self.update_counts();
    }

    /// One tick of maintenance
    ///
    /// Deferred tasks queued before this call run first, in order; anything
    /// they queue waits for the next tick.
    pub fn on_frame_update(&mut self) {
        if self.disposed {
            return;
        }

        for task in self.tasks.drain() {
            self.run_task(task);
        }

        let mut expired = Vec::new();
        for &id in self.order.iter().rev() {
            let Some(handle) = self.objects.get_mut(id).and_then(SpawnedObject::handle_mut) else {
                continue;
            };
            match handle {
                ObjectHandle::Mesh(mesh) if mesh.is_dirty() => {
                    mesh.fix_culling();
                }
                ObjectHandle::Effect(effect) => {
                    if !effect.looping() && effect.is_expired() {
                        expired.push(id);
                        continue;
                    }
                    match effect.check_for_refresh() {
                        Ok(true) => self.stats.total_refreshed += 1,
                        Ok(false) => {}
                        Err(error) => log::error!("Failed to refresh {}: {error}", effect.path()),
                    }
                }
                _ => {}
            }
        }

        for id in expired {
            if let Some(mut object) = self.objects.remove(id) {
                log::debug!("Effect {} expired", object.path());
                object.dispose();
                self.stats.total_expired += 1;
            }
            self.order.retain(|&other| other != id);
        }
        self.update_counts();
    }

    /// React to a host signal
    ///
    /// Signals the registry is not subscribed to are ignored, which includes
    /// everything after [`dispose`](Self::dispose).
    pub fn handle_signal(&mut self, signal: HostSignal) {
        if !self.subscriptions.iter().any(|token| token.signal == signal) {
            log::trace!("Ignoring unsubscribed signal {signal:?}");
            return;
        }
        match signal {
            HostSignal::FrameUpdate => self.on_frame_update(),
            HostSignal::ZoneChanged | HostSignal::Logout => {
                log::info!("{signal:?}: clearing spawned objects");
                self.clear();
            }
        }
    }

    /// The engine removed an effect instance on its own
    ///
    /// A looping effect is re-created; any other effect is dropped without
    /// touching the removed instance. Returns whether an effect matched.
    pub fn native_removed(&mut self, address: usize) -> bool {
        let matched = self.order.iter().copied().find(|&id| {
            self.objects
                .get(id)
                .and_then(SpawnedObject::effect)
                .and_then(EffectHandle::native)
                .map_or(false, |effect| effect.addr() == address)
        });
        let Some(id) = matched else {
            return false;
        };

        let Some(effect) = self.objects.get_mut(id).and_then(SpawnedObject::effect_mut) else {
            return false;
        };
        effect.forget_native();

        if effect.looping() {
            log::debug!("Effect {} was removed by the engine; refreshing", effect.path());
            match effect.refresh() {
                Ok(()) => self.stats.total_refreshed += 1,
                Err(error) => log::error!("Failed to refresh {}: {error}", effect.path()),
            }
        } else {
            log::debug!("Effect {} was removed by the engine; dropping", effect.path());
            self.remove(id);
        }
        true
    }

    /// Unsubscribe from the host and clear
    ///
    /// Safe to call more than once; `Drop` calls it too.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        for token in self.subscriptions.drain(..) {
            self.ctx.signals().unsubscribe(token);
        }
        let dropped = self.tasks.close();
        if dropped > 0 {
            log::debug!("Dropped {dropped} queued tasks");
        }

        self.clear();
        log::info!("Object registry disposed");
    }

    fn run_task(&mut self, task: TickTask) {
        match task {
            TickTask::PopulateGroup(id) => {
                let Some(object) = self.objects.get_mut(id) else {
                    log::trace!("Skipping population of removed object {id:?}");
                    return;
                };
                if let Err(error) = object.populate() {
                    log::error!("Failed to populate {}: {error}", object.path());
                }
            }
            TickTask::Remote(command) => self.run_remote(command),
        }
    }

    fn run_remote(&mut self, command: RemoteCommand) {
        match command {
            RemoteCommand::Spawn {
                path,
                patch,
                collide,
                reply,
            } => {
                // The caller may have dropped the receiver
                let _ = reply.send(self.add(&path, &patch, collide));
            }
            RemoteCommand::SpawnOnActor {
                path,
                target,
                options,
                reply,
            } => {
                let _ = reply.send(self.add_on_actor(&path, target, options));
            }
            RemoteCommand::SetTransform { id, patch } => {
                if let Err(error) = self.set_transform(id, &patch) {
                    log::warn!("Remote transform failed: {error}");
                }
            }
            RemoteCommand::Remove(id) => {
                self.remove(id);
            }
            RemoteCommand::Clear => self.clear(),
        }
    }

    fn update_counts(&mut self) {
        self.stats.current_objects = self.objects.len();
        self.stats.peak_objects = self.stats.peak_objects.max(self.stats.current_objects);
    }
}

impl Drop for ObjectRegistry {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("objects", &self.objects.len())
            .field("pending_tasks", &self.tasks.len())
            .field("disposed", &self.disposed)
            .field("stats", &self.stats)
            .finish()
    }
}
