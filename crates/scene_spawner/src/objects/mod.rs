//! Spawned objects and their registry
//!
//! Handles own exactly one native resource each; the registry owns the
//! handles.
//!
//! ```text
//! ObjectRegistry ──► SpawnedObject ──► ObjectHandle ─┬─ MeshHandle
//!                                                    ├─ GroupHandle
//!                                                    └─ EffectHandle (Static | Actor)
//! ```

pub mod effect;
pub mod error;
pub mod group;
pub mod mesh;
pub mod registry;
pub mod remote;
pub mod spawned;
pub mod transform;

#[cfg(test)]
mod tests;

pub use effect::{EffectHandle, EffectVariant};
pub use error::SpawnError;
pub use group::GroupHandle;
pub use mesh::MeshHandle;
pub use registry::{ObjectRegistry, RegistryStats};
pub use remote::{RegistryRemote, RemoteCommand, SpawnReply};
pub use spawned::{ActorSpawnOptions, ObjectHandle, ObjectKind, ResourceFormat, SpawnedObject};
pub use transform::ObservedTransform;
