//! # Scene Spawner
//!
//! Spawns, tracks, moves and tears down transient visual objects inside a host
//! engine's live scene by driving the engine's own native objects.
//!
//! ## Features
//!
//! - **Meshes** (`.mdl`): culling fixed up once the model is resident
//! - **Groups** (`.sgb`): loaded one tick after allocation, with collider,
//!   alpha, highlight and stain control
//! - **Effects** (`.avfx`): free-standing or actor-to-actor, with expiry and
//!   in-place refresh for looping effects
//! - **Registry**: one owner for everything spawned, maintained once per frame
//! - **Remote access**: other threads queue commands for the update thread
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scene_spawner::prelude::*;
//! use std::rc::Rc;
//!
//! let host = Rc::new(MyHost::attach()?);
//! let ctx = HostContext::new(host.clone(), host, Rc::new(SystemClock::new()), SpawnerConfig::default());
//! let mut registry = ObjectRegistry::new(&ctx);
//!
//! let rock = registry.add("bg/ex1/rock.mdl", &TransformPatch::new().with_position(Vec3::new(0.0, 1.0, 0.0)), false)?;
//!
//! // every frame, on the update thread
//! registry.handle_signal(HostSignal::FrameUpdate);
//! ```
//!
//! Everything that touches native memory is `!Send` and stays on the thread
//! that built the [`host::HostContext`]. Use [`objects::RegistryRemote`] from
//! other threads.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod host;
pub mod objects;
pub mod scheduler;

#[cfg(test)]
mod testing;

/// Common imports for spawner users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::config::SpawnerConfig,
        foundation::{
            collections::ObjectId,
            math::{Quat, Transform, TransformPatch, Vec3},
            time::{Clock, ManualClock, SystemClock},
        },
        host::{ActorRef, HostContext, HostError, HostSignal, HostSignals, NativeHost},
        objects::{
            ActorSpawnOptions, EffectHandle, GroupHandle, MeshHandle, ObjectKind, ObjectRegistry,
            RegistryRemote, SpawnError, SpawnedObject,
        },
    };
}
