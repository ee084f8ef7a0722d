//! Headless stand-in for the host engine
//!
//! Hands out fake addresses and logs every native call. Models become resident
//! a few frames after creation, groups load a fixed set of children.

use scene_spawner::foundation::math::Transform;
use scene_spawner::host::{
    ChildPtr, EffectFlags, EffectPtr, GraphicsPtr, GroupPtr, HostError, HostResult, HostSignal, HostSignals,
    InstanceKind, LoadState, MeshPtr, NativeHost, NativePtr, Rgba, SignalToken,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

const RESIDENT: u8 = 7;
const LOADING: u8 = 4;

/// Frames a model needs before it reports resident
const LOAD_FRAMES: u64 = 3;

#[derive(Default)]
struct Scene {
    meshes: HashMap<usize, u64>,
    groups: HashMap<usize, Vec<usize>>,
    children: HashMap<usize, (InstanceKind, usize)>,
    effects: HashSet<usize>,
    subscriptions: HashSet<u64>,
}

/// Simulated engine
pub struct SimulatedHost {
    next_addr: Cell<usize>,
    next_token: Cell<u64>,
    frame: Cell<u64>,
    scene: RefCell<Scene>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self {
            next_addr: Cell::new(0x7ff6_0000),
            next_token: Cell::new(0),
            frame: Cell::new(0),
            scene: RefCell::new(Scene::default()),
        }
    }

    /// Advance the engine by one frame
    pub fn next_frame(&self) {
        self.frame.set(self.frame.get() + 1);
    }

    /// Live native objects of every kind
    pub fn live_objects(&self) -> usize {
        let scene = self.scene.borrow();
        scene.meshes.len() + scene.groups.len() + scene.effects.len()
    }

    /// Remove an effect the way the engine does when it runs out on its own
    pub fn expire_effect(&self, addr: usize) -> bool {
        self.scene.borrow_mut().effects.remove(&addr)
    }

    /// Whether anyone is still subscribed
    pub fn has_subscribers(&self) -> bool {
        !self.scene.borrow().subscriptions.is_empty()
    }

    fn alloc<K>(&self) -> HostResult<NativePtr<K>> {
        let addr = self.next_addr.get();
        self.next_addr.set(addr + 0x40);
        NativePtr::new(addr).ok_or(HostError::NullInstance("SimulatedHost.alloc"))
    }
}

impl NativeHost for SimulatedHost {
    fn create_mesh(&self, path: &str) -> HostResult<MeshPtr> {
        let mesh: MeshPtr = self.alloc()?;
        self.scene.borrow_mut().meshes.insert(mesh.addr(), self.frame.get());
        log::debug!("[host] create mesh {path} @ {mesh:?}");
        Ok(mesh)
    }

    fn mesh_load_state(&self, mesh: MeshPtr) -> LoadState {
        let created = self.scene.borrow().meshes.get(&mesh.addr()).copied();
        match created {
            Some(frame) if self.frame.get() >= frame + LOAD_FRAMES => LoadState(RESIDENT),
            _ => LoadState(LOADING),
        }
    }

    fn set_mesh_transform(&self, mesh: MeshPtr, transform: &Transform) {
        log::trace!("[host] mesh {mesh:?} → {:?}", transform.position);
    }

    fn update_mesh_culling(&self, mesh: MeshPtr) {
        log::debug!("[host] culling updated for mesh {mesh:?}");
    }

    fn set_mesh_alpha(&self, mesh: MeshPtr, alpha: u8) {
        log::trace!("[host] mesh {mesh:?} alpha {alpha}");
    }

    fn set_mesh_highlight(&self, mesh: MeshPtr, color: u8) {
        log::trace!("[host] mesh {mesh:?} highlight {color}");
    }

    fn update_mesh_render(&self, mesh: MeshPtr) {
        log::trace!("[host] mesh {mesh:?} render update");
    }

    fn destroy_mesh(&self, mesh: MeshPtr) -> HostResult<()> {
        log::debug!("[host] destroy mesh {mesh:?}");
        self.scene.borrow_mut().meshes.remove(&mesh.addr());
        Ok(())
    }

    fn allocate_group(&self) -> HostResult<GroupPtr> {
        self.alloc()
    }

    fn construct_group(&self, group: GroupPtr) -> HostResult<()> {
        self.scene.borrow_mut().groups.insert(group.addr(), Vec::new());
        log::debug!("[host] construct group @ {group:?}");
        Ok(())
    }

    fn load_group(&self, group: GroupPtr, path: &str) -> HostResult<()> {
        log::debug!("[host] load group {path} into {group:?}");
        let mut children = Vec::new();
        for kind in [InstanceKind::BgPart, InstanceKind::BgPart, InstanceKind::Other(3)] {
            let child: ChildPtr = self.alloc()?;
            let graphics: GraphicsPtr = self.alloc()?;
            self.scene.borrow_mut().children.insert(child.addr(), (kind, graphics.addr()));
            children.push(child.addr());
        }
        self.scene.borrow_mut().groups.insert(group.addr(), children);
        Ok(())
    }

    fn fix_group_children(&self, group: GroupPtr) -> HostResult<()> {
        log::debug!("[host] fix children of group {group:?}");
        Ok(())
    }

    fn group_children(&self, group: GroupPtr) -> Vec<Option<ChildPtr>> {
        self.scene
            .borrow()
            .groups
            .get(&group.addr())
            .map(|children| children.iter().map(|&child| NativePtr::new(child)).collect())
            .unwrap_or_default()
    }

    fn child_kind(&self, child: ChildPtr) -> InstanceKind {
        self.scene
            .borrow()
            .children
            .get(&child.addr())
            .map_or(InstanceKind::Other(0), |(kind, _)| *kind)
    }

    fn child_graphics(&self, child: ChildPtr) -> Option<GraphicsPtr> {
        self.scene
            .borrow()
            .children
            .get(&child.addr())
            .and_then(|(_, graphics)| NativePtr::new(*graphics))
    }

    fn set_graphics_alpha(&self, graphics: GraphicsPtr, alpha: u8) {
        log::trace!("[host] graphics {graphics:?} alpha {alpha}");
    }

    fn set_graphics_highlight(&self, graphics: GraphicsPtr, color: u8) {
        log::trace!("[host] graphics {graphics:?} highlight {color}");
    }

    fn update_graphics_culling(&self, graphics: GraphicsPtr) {
        log::trace!("[host] graphics {graphics:?} culling");
    }

    fn set_group_transform(&self, group: GroupPtr, transform: &Transform) {
        log::trace!("[host] group {group:?} → {:?}", transform.position);
    }

    fn set_group_collider(&self, group: GroupPtr, active: bool) {
        log::trace!("[host] group {group:?} collider {active}");
    }

    fn apply_group_stain(&self, group: GroupPtr, color: Rgba) {
        log::debug!("[host] group {group:?} stain {color:?}");
    }

    fn group_stain_index(&self, _group: GroupPtr) -> Option<u8> {
        Some(1)
    }

    fn deinit_group(&self, group: GroupPtr) -> HostResult<()> {
        log::trace!("[host] deinit group {group:?}");
        Ok(())
    }

    fn destruct_group(&self, group: GroupPtr) -> HostResult<()> {
        log::trace!("[host] destruct group {group:?}");
        Ok(())
    }

    fn free_group(&self, group: GroupPtr) {
        log::debug!("[host] free group {group:?}");
        let mut scene = self.scene.borrow_mut();
        if let Some(children) = scene.groups.remove(&group.addr()) {
            for child in children {
                scene.children.remove(&child);
            }
        }
    }

    fn create_static_effect(&self, path: &str) -> HostResult<EffectPtr> {
        let effect: EffectPtr = self.alloc()?;
        self.scene.borrow_mut().effects.insert(effect.addr());
        log::debug!("[host] create static effect {path} @ {effect:?}");
        Ok(effect)
    }

    fn run_static_effect(&self, effect: EffectPtr) -> HostResult<()> {
        log::trace!("[host] run effect {effect:?}");
        Ok(())
    }

    fn set_static_effect_transform(&self, effect: EffectPtr, transform: &Transform) {
        log::trace!("[host] effect {effect:?} → {:?}", transform.position);
    }

    fn add_static_effect_flags(&self, effect: EffectPtr, flags: EffectFlags) {
        log::trace!("[host] effect {effect:?} flags {flags:?}");
    }

    fn destroy_static_effect(&self, effect: EffectPtr) -> HostResult<()> {
        log::debug!("[host] destroy static effect {effect:?}");
        self.scene.borrow_mut().effects.remove(&effect.addr());
        Ok(())
    }

    fn create_actor_effect(&self, path: &str, source: usize, target: usize) -> HostResult<EffectPtr> {
        let effect: EffectPtr = self.alloc()?;
        self.scene.borrow_mut().effects.insert(effect.addr());
        log::debug!("[host] create actor effect {path} {source:#x} → {target:#x} @ {effect:?}");
        Ok(effect)
    }

    fn destroy_actor_effect(&self, effect: EffectPtr) -> HostResult<()> {
        log::debug!("[host] destroy actor effect {effect:?}");
        self.scene.borrow_mut().effects.remove(&effect.addr());
        Ok(())
    }
}

impl HostSignals for SimulatedHost {
    fn subscribe(&self, signal: HostSignal) -> SignalToken {
        let id = self.next_token.get() + 1;
        self.next_token.set(id);
        self.scene.borrow_mut().subscriptions.insert(id);
        log::debug!("[host] subscribed to {signal:?}");
        SignalToken { signal, id }
    }

    fn unsubscribe(&self, token: SignalToken) {
        self.scene.borrow_mut().subscriptions.remove(&token.id);
        log::debug!("[host] unsubscribed from {:?}", token.signal);
    }
}
