//! Host engine boundary
//!
//! Everything the spawner needs from the engine it lives in goes through the
//! traits in this module. Implementations resolve the engine's native entry
//! points; the spawner itself never dereferences engine memory, it only passes
//! typed addresses back to the host.
//!
//! # Architecture
//!
//! ```text
//! ObjectRegistry → handles → HostContext ─┬─ NativeHost   (native calls)
//!                                         ├─ HostSignals  (frame/zone/logout)
//!                                         ├─ Clock        (expiry)
//!                                         └─ SpawnerConfig
//! ```

pub mod context;
pub mod signals;

pub use context::HostContext;
pub use signals::{HostSignal, HostSignals, SignalToken};

use crate::foundation::math::{Transform, Vec3};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::num::NonZeroUsize;

/// Native mesh instance (engine background object)
pub enum MeshInstance {}
/// Native shared group layout instance
pub enum GroupInstance {}
/// Native effect instance
pub enum EffectInstance {}
/// Child layout instance inside a group
pub enum ChildInstance {}
/// Render-side object of a group child
pub enum ChildGraphics {}

/// Non-null address of a native object of kind `K`
///
/// Copying the address never copies ownership; the handle holding it is the
/// single owner.
pub struct NativePtr<K> {
    addr: NonZeroUsize,
    _kind: PhantomData<fn() -> K>,
}

impl<K> NativePtr<K> {
    /// Wrap an address, `None` for null
    pub fn new(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(|addr| Self {
            addr,
            _kind: PhantomData,
        })
    }

    /// Raw address
    pub fn addr(self) -> usize {
        self.addr.get()
    }
}

impl<K> Clone for NativePtr<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NativePtr<K> {}

impl<K> PartialEq for NativePtr<K> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<K> Eq for NativePtr<K> {}

impl<K> Hash for NativePtr<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

impl<K> fmt::Debug for NativePtr<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.addr.get())
    }
}

/// Mesh instance address
pub type MeshPtr = NativePtr<MeshInstance>;
/// Group instance address
pub type GroupPtr = NativePtr<GroupInstance>;
/// Effect instance address
pub type EffectPtr = NativePtr<EffectInstance>;
/// Group child address
pub type ChildPtr = NativePtr<ChildInstance>;
/// Child graphics address
pub type GraphicsPtr = NativePtr<ChildGraphics>;

/// Live actor an effect or object can be attached to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorRef {
    /// Address of the actor's game object
    pub address: usize,
    /// Current world position
    pub position: Vec3,
    /// Facing angle in radians
    pub rotation: f32,
}

impl ActorRef {
    /// Create an actor reference
    pub fn new(address: usize, position: Vec3, rotation: f32) -> Self {
        Self {
            address,
            position,
            rotation,
        }
    }
}

/// Load state of a model resource as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadState(pub u8);

impl LoadState {
    /// Whether the state equals the engine's "fully resident" sentinel
    pub fn is_ready(self, sentinel: u8) -> bool {
        self.0 == sentinel
    }
}

/// Kind of a child instance inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    /// Background part (static model)
    BgPart,
    /// Light, sound, nested group and every other layout instance type
    Other(u8),
}

/// Opaque 8-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Rgba {
    /// Opaque color from a 0..1 RGB vector
    pub fn opaque(color: Vec3) -> Self {
        use crate::foundation::math::utils::unit_to_byte;
        Self {
            r: unit_to_byte(color.x),
            g: unit_to_byte(color.y),
            b: unit_to_byte(color.z),
            a: 255,
        }
    }
}

bitflags::bitflags! {
    /// Flag word of a native effect instance
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EffectFlags: u32 {
        /// Draw regardless of the engine's own visibility culling
        const FORCE_VISIBLE = 0x2;
    }
}

/// Errors reported by the host's native layer
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The native function could not be resolved in the host binary
    #[error("native entry point `{0}` could not be resolved")]
    EntryPointMissing(&'static str),

    /// The native function returned a null instance
    #[error("`{0}` returned a null instance")]
    NullInstance(&'static str),

    /// Any other native failure
    #[error("native fault: {0}")]
    Fault(String),
}

/// Result of a native call
pub type HostResult<T> = Result<T, HostError>;

/// Native operations of the host engine
///
/// Every method must only be called from the host's update thread. The trait
/// is object safe; the spawner holds it as `Rc<dyn NativeHost>`.
pub trait NativeHost {
    // ---- Meshes ----------------------------------------------------------

    /// Create a background mesh instance for a `.mdl` resource
    fn create_mesh(&self, path: &str) -> HostResult<MeshPtr>;
    /// Load state of the mesh's model resource
    fn mesh_load_state(&self, mesh: MeshPtr) -> LoadState;
    /// Write position, rotation and scale
    fn set_mesh_transform(&self, mesh: MeshPtr, transform: &Transform);
    /// Recompute the renderer's culling data
    fn update_mesh_culling(&self, mesh: MeshPtr);
    /// Write the render alpha
    fn set_mesh_alpha(&self, mesh: MeshPtr, alpha: u8);
    /// Write the highlight flags
    fn set_mesh_highlight(&self, mesh: MeshPtr, color: u8);
    /// Push pending render state
    fn update_mesh_render(&self, mesh: MeshPtr);
    /// Clean up render state and destruct the instance
    fn destroy_mesh(&self, mesh: MeshPtr) -> HostResult<()>;

    // ---- Groups ----------------------------------------------------------

    /// Allocate an uninitialized group from the engine's default memory space
    fn allocate_group(&self) -> HostResult<GroupPtr>;
    /// Default-construct a group in place
    fn construct_group(&self, group: GroupPtr) -> HostResult<()>;
    /// Load a `.sgb` definition into the group, creating its children
    fn load_group(&self, group: GroupPtr, path: &str) -> HostResult<()>;
    /// Re-parent children the load step did not wire up
    fn fix_group_children(&self, group: GroupPtr) -> HostResult<()>;
    /// Child list in engine order; entries may be null
    fn group_children(&self, group: GroupPtr) -> Vec<Option<ChildPtr>>;
    /// Layout type of a child
    fn child_kind(&self, child: ChildPtr) -> InstanceKind;
    /// Render object of a child, `None` while not streamed in
    fn child_graphics(&self, child: ChildPtr) -> Option<GraphicsPtr>;
    /// Write a child's render alpha
    fn set_graphics_alpha(&self, graphics: GraphicsPtr, alpha: u8);
    /// Write a child's highlight flags
    fn set_graphics_highlight(&self, graphics: GraphicsPtr, color: u8);
    /// Recompute a child's culling data
    fn update_graphics_culling(&self, graphics: GraphicsPtr);
    /// Write the group's root transform
    fn set_group_transform(&self, group: GroupPtr, transform: &Transform);
    /// Toggle the group's collider
    fn set_group_collider(&self, group: GroupPtr, active: bool);
    /// Apply a dye color to the group
    fn apply_group_stain(&self, group: GroupPtr, color: Rgba);
    /// Default stain index, `None` when the group has no stain info
    fn group_stain_index(&self, group: GroupPtr) -> Option<u8>;
    /// Detach the group from the layout world
    fn deinit_group(&self, group: GroupPtr) -> HostResult<()>;
    /// Run the group's destructor
    fn destruct_group(&self, group: GroupPtr) -> HostResult<()>;
    /// Return the memory to the engine's memory space
    fn free_group(&self, group: GroupPtr);

    // ---- Effects ---------------------------------------------------------

    /// Create an unattached effect for a `.avfx` resource
    fn create_static_effect(&self, path: &str) -> HostResult<EffectPtr>;
    /// Start playback of an unattached effect
    fn run_static_effect(&self, effect: EffectPtr) -> HostResult<()>;
    /// Write position, rotation and scale of an unattached effect
    fn set_static_effect_transform(&self, effect: EffectPtr, transform: &Transform);
    /// OR flag bits into an unattached effect
    fn add_static_effect_flags(&self, effect: EffectPtr, flags: EffectFlags);
    /// Destroy an unattached effect
    fn destroy_static_effect(&self, effect: EffectPtr) -> HostResult<()>;
    /// Create an effect that travels from `source` to `target`
    fn create_actor_effect(&self, path: &str, source: usize, target: usize) -> HostResult<EffectPtr>;
    /// Destroy an actor effect
    fn destroy_actor_effect(&self, effect: EffectPtr) -> HostResult<()>;
}
