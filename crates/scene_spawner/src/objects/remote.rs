//! Cross-thread registry access
//!
//! The registry itself never leaves the update thread. A [`RegistryRemote`]
//! can, and turns every call into a command that runs on the registry's next
//! tick. Spawn commands answer over a one-shot channel.

use super::error::SpawnError;
use super::spawned::ActorSpawnOptions;
use crate::foundation::collections::ObjectId;
use crate::foundation::math::TransformPatch;
use crate::host::ActorRef;
use crate::scheduler::TickSender;
use crossbeam::channel::{bounded, Receiver, Sender};

/// Result of a spawn made through a remote
pub type SpawnReply = Receiver<Result<ObjectId, SpawnError>>;

/// Deferred registry operation
#[derive(Debug)]
pub enum RemoteCommand {
    /// Spawn a free-standing object
    Spawn {
        /// Resource path
        path: String,
        /// Initial placement
        patch: TransformPatch,
        /// Collider state for groups
        collide: bool,
        /// Where the new id (or error) goes
        reply: Sender<Result<ObjectId, SpawnError>>,
    },
    /// Spawn an object on an actor
    SpawnOnActor {
        /// Resource path
        path: String,
        /// Actor to spawn on
        target: ActorRef,
        /// Lifetime and collider options
        options: ActorSpawnOptions,
        /// Where the new id (or error) goes
        reply: Sender<Result<ObjectId, SpawnError>>,
    },
    /// Move an object
    SetTransform {
        /// Object to move
        id: ObjectId,
        /// Fields to change
        patch: TransformPatch,
    },
    /// Remove one object
    Remove(ObjectId),
    /// Remove every object
    Clear,
}

/// Work item of the registry's tick queue
#[derive(Debug)]
pub(crate) enum TickTask {
    /// Load a group's definition one tick after creation
    PopulateGroup(ObjectId),
    /// Command sent by a remote
    Remote(RemoteCommand),
}

/// `Send + Clone` handle that queues work for the registry's update thread
#[derive(Debug, Clone)]
pub struct RegistryRemote {
    sender: TickSender<TickTask>,
}

impl RegistryRemote {
    pub(crate) fn new(sender: TickSender<TickTask>) -> Self {
        Self { sender }
    }

    /// Queue a spawn; the reply arrives after the registry's next tick
    ///
    /// If the registry is gone the reply channel disconnects without a value.
    pub fn spawn(&self, path: impl Into<String>, patch: TransformPatch, collide: bool) -> SpawnReply {
        let (reply, receiver) = bounded(1);
        self.send(RemoteCommand::Spawn {
            path: path.into(),
            patch,
            collide,
            reply,
        });
        receiver
    }

    /// Queue a spawn on an actor
    pub fn spawn_on_actor(&self, path: impl Into<String>, target: ActorRef, options: ActorSpawnOptions) -> SpawnReply {
        let (reply, receiver) = bounded(1);
        self.send(RemoteCommand::SpawnOnActor {
            path: path.into(),
            target,
            options,
            reply,
        });
        receiver
    }

    /// Queue a transform change
    pub fn set_transform(&self, id: ObjectId, patch: TransformPatch) -> bool {
        self.send(RemoteCommand::SetTransform { id, patch })
    }

    /// Queue a removal
    pub fn remove(&self, id: ObjectId) -> bool {
        self.send(RemoteCommand::Remove(id))
    }

    /// Queue a full clear
    pub fn clear(&self) -> bool {
        self.send(RemoteCommand::Clear)
    }

    fn send(&self, command: RemoteCommand) -> bool {
        let sent = self.sender.schedule(TickTask::Remote(command));
        if !sent {
            log::warn!("Registry is gone; dropping remote command");
        }
        sent
    }
}
