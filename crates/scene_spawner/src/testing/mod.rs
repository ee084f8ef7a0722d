//! In-memory host used by unit and scenario tests
//!
//! Hands out fake addresses, records every native call in order and lets a
//! test inject failures per operation.

use crate::core::config::SpawnerConfig;
use crate::foundation::math::Transform;
use crate::foundation::time::ManualClock;
use crate::host::{
    ChildPtr, EffectFlags, EffectPtr, GraphicsPtr, GroupPtr, HostContext, HostError, HostResult,
    HostSignal, HostSignals, InstanceKind, LoadState, MeshPtr, NativeHost, NativePtr, Rgba,
    SignalToken,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One recorded native call
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateMesh(String),
    MeshTransform(usize, Transform),
    MeshCulling(usize),
    MeshAlpha(usize, u8),
    MeshHighlight(usize, u8),
    MeshRender(usize),
    DestroyMesh(usize),
    AllocateGroup(usize),
    ConstructGroup(usize),
    LoadGroup(usize, String),
    FixChildren(usize),
    GroupTransform(usize, Transform),
    GroupCollider(usize, bool),
    GraphicsAlpha(usize, u8),
    GraphicsHighlight(usize, u8),
    GraphicsCulling(usize),
    GroupStain(usize, Rgba),
    DeinitGroup(usize),
    DestructGroup(usize),
    FreeGroup(usize),
    CreateStaticEffect(String, usize),
    RunStaticEffect(usize),
    StaticEffectTransform(usize, Transform),
    StaticEffectFlags(usize, u32),
    DestroyStaticEffect(usize),
    CreateActorEffect(String, usize, usize, usize),
    DestroyActorEffect(usize),
    Subscribe(HostSignal),
    Unsubscribe(HostSignal),
}

/// Shape of a child created when a group loads
#[derive(Debug, Clone, Copy)]
pub enum ChildSpec {
    /// Null slot in the child list
    Null,
    /// Child of `kind`, with or without streamed-in graphics
    Child { kind: InstanceKind, graphics: bool },
}

impl ChildSpec {
    pub fn part() -> Self {
        Self::Child { kind: InstanceKind::BgPart, graphics: true }
    }

    pub fn part_without_graphics() -> Self {
        Self::Child { kind: InstanceKind::BgPart, graphics: false }
    }

    pub fn other() -> Self {
        Self::Child { kind: InstanceKind::Other(3), graphics: true }
    }
}

#[derive(Default)]
struct FakeState {
    next_addr: usize,
    next_token: u64,
    calls: Vec<HostCall>,
    default_load_state: u8,
    mesh_states: HashMap<usize, u8>,
    group_template: Vec<ChildSpec>,
    groups: HashMap<usize, Vec<Option<usize>>>,
    children: HashMap<usize, (InstanceKind, Option<usize>)>,
    stain_index: Option<u8>,
    failures: HashMap<&'static str, HostError>,
}

/// Recording host
pub struct FakeHost {
    state: RefCell<FakeState>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(FakeState {
                next_addr: 0x1000,
                default_load_state: 7,
                ..FakeState::default()
            }),
        }
    }

    /// Load state new meshes report
    pub fn set_default_load_state(&self, state: u8) {
        self.state.borrow_mut().default_load_state = state;
    }

    /// Change the load state of one mesh
    pub fn set_mesh_load_state(&self, addr: usize, state: u8) {
        self.state.borrow_mut().mesh_states.insert(addr, state);
    }

    /// Children every group receives when it loads
    pub fn set_group_children(&self, children: Vec<ChildSpec>) {
        self.state.borrow_mut().group_template = children;
    }

    /// Stain index reported for groups
    pub fn set_stain_index(&self, index: Option<u8>) {
        self.state.borrow_mut().stain_index = index;
    }

    /// Make `op` fail with `error` from now on
    pub fn fail(&self, op: &'static str, error: HostError) {
        self.state.borrow_mut().failures.insert(op, error);
    }

    /// Make `op` succeed again
    pub fn heal(&self, op: &'static str) {
        self.state.borrow_mut().failures.remove(op);
    }

    /// Every call so far
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of calls matching `pred`
    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|call| pred(call)).count()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Addresses of the children a group currently lists
    pub fn children_of(&self, group: usize) -> Vec<Option<usize>> {
        self.state.borrow().groups.get(&group).cloned().unwrap_or_default()
    }

    /// Graphics address of a child
    pub fn graphics_of(&self, child: usize) -> Option<usize> {
        self.state.borrow().children.get(&child).and_then(|(_, graphics)| *graphics)
    }

    fn record(&self, call: HostCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn check(&self, op: &'static str) -> HostResult<()> {
        match self.state.borrow().failures.get(op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn next_addr(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let addr = state.next_addr;
        state.next_addr += 0x10;
        addr
    }

    fn alloc<K>(&self) -> NativePtr<K> {
        NativePtr::new(self.next_addr()).expect("Fake addresses are never null")
    }
}

impl NativeHost for FakeHost {
    fn create_mesh(&self, path: &str) -> HostResult<MeshPtr> {
        self.check("create_mesh")?;
        let mesh: MeshPtr = self.alloc();
        self.record(HostCall::CreateMesh(path.to_string()));
        let default = self.state.borrow().default_load_state;
        self.state.borrow_mut().mesh_states.insert(mesh.addr(), default);
        Ok(mesh)
    }

    fn mesh_load_state(&self, mesh: MeshPtr) -> LoadState {
        LoadState(self.state.borrow().mesh_states.get(&mesh.addr()).copied().unwrap_or(0))
    }

    fn set_mesh_transform(&self, mesh: MeshPtr, transform: &Transform) {
        self.record(HostCall::MeshTransform(mesh.addr(), *transform));
    }

    fn update_mesh_culling(&self, mesh: MeshPtr) {
        self.record(HostCall::MeshCulling(mesh.addr()));
    }

    fn set_mesh_alpha(&self, mesh: MeshPtr, alpha: u8) {
        self.record(HostCall::MeshAlpha(mesh.addr(), alpha));
    }

    fn set_mesh_highlight(&self, mesh: MeshPtr, color: u8) {
        self.record(HostCall::MeshHighlight(mesh.addr(), color));
    }

    fn update_mesh_render(&self, mesh: MeshPtr) {
        self.record(HostCall::MeshRender(mesh.addr()));
    }

    fn destroy_mesh(&self, mesh: MeshPtr) -> HostResult<()> {
        self.record(HostCall::DestroyMesh(mesh.addr()));
        self.check("destroy_mesh")
    }

    fn allocate_group(&self) -> HostResult<GroupPtr> {
        self.check("allocate_group")?;
        let group: GroupPtr = self.alloc();
        self.record(HostCall::AllocateGroup(group.addr()));
        Ok(group)
    }

    fn construct_group(&self, group: GroupPtr) -> HostResult<()> {
        self.record(HostCall::ConstructGroup(group.addr()));
        self.check("construct_group")?;
        self.state.borrow_mut().groups.insert(group.addr(), Vec::new());
        Ok(())
    }

    fn load_group(&self, group: GroupPtr, path: &str) -> HostResult<()> {
        self.record(HostCall::LoadGroup(group.addr(), path.to_string()));
        self.check("load_group")?;
        let template = self.state.borrow().group_template.clone();
        let mut list = Vec::with_capacity(template.len());
        for spec in template {
            match spec {
                ChildSpec::Null => list.push(None),
                ChildSpec::Child { kind, graphics } => {
                    let child = self.next_addr();
                    let graphics = graphics.then(|| self.next_addr());
                    self.state.borrow_mut().children.insert(child, (kind, graphics));
                    list.push(Some(child));
                }
            }
        }
        self.state.borrow_mut().groups.insert(group.addr(), list);
        Ok(())
    }

    fn fix_group_children(&self, group: GroupPtr) -> HostResult<()> {
        self.record(HostCall::FixChildren(group.addr()));
        self.check("fix_group_children")
    }

    fn group_children(&self, group: GroupPtr) -> Vec<Option<ChildPtr>> {
        self.children_of(group.addr())
            .into_iter()
            .map(|child| child.and_then(NativePtr::new))
            .collect()
    }

    fn child_kind(&self, child: ChildPtr) -> InstanceKind {
        self.state
            .borrow()
            .children
            .get(&child.addr())
            .map_or(InstanceKind::Other(0), |(kind, _)| *kind)
    }

    fn child_graphics(&self, child: ChildPtr) -> Option<GraphicsPtr> {
        self.graphics_of(child.addr()).and_then(NativePtr::new)
    }

    fn set_graphics_alpha(&self, graphics: GraphicsPtr, alpha: u8) {
        self.record(HostCall::GraphicsAlpha(graphics.addr(), alpha));
    }

    fn set_graphics_highlight(&self, graphics: GraphicsPtr, color: u8) {
        self.record(HostCall::GraphicsHighlight(graphics.addr(), color));
    }

    fn update_graphics_culling(&self, graphics: GraphicsPtr) {
        self.record(HostCall::GraphicsCulling(graphics.addr()));
    }

    fn set_group_transform(&self, group: GroupPtr, transform: &Transform) {
        self.record(HostCall::GroupTransform(group.addr(), *transform));
    }

    fn set_group_collider(&self, group: GroupPtr, active: bool) {
        self.record(HostCall::GroupCollider(group.addr(), active));
    }

    fn apply_group_stain(&self, group: GroupPtr, color: Rgba) {
        self.record(HostCall::GroupStain(group.addr(), color));
    }

    fn group_stain_index(&self, _group: GroupPtr) -> Option<u8> {
        self.state.borrow().stain_index
    }

    fn deinit_group(&self, group: GroupPtr) -> HostResult<()> {
        self.record(HostCall::DeinitGroup(group.addr()));
        self.check("deinit_group")
    }

    fn destruct_group(&self, group: GroupPtr) -> HostResult<()> {
        self.record(HostCall::DestructGroup(group.addr()));
        self.check("destruct_group")
    }

    fn free_group(&self, group: GroupPtr) {
        self.record(HostCall::FreeGroup(group.addr()));
        self.state.borrow_mut().groups.remove(&group.addr());
    }

    fn create_static_effect(&self, path: &str) -> HostResult<EffectPtr> {
        self.check("create_static_effect")?;
        let effect: EffectPtr = self.alloc();
        self.record(HostCall::CreateStaticEffect(path.to_string(), effect.addr()));
        Ok(effect)
    }

    fn run_static_effect(&self, effect: EffectPtr) -> HostResult<()> {
        self.record(HostCall::RunStaticEffect(effect.addr()));
        self.check("run_static_effect")
    }

    fn set_static_effect_transform(&self, effect: EffectPtr, transform: &Transform) {
        self.record(HostCall::StaticEffectTransform(effect.addr(), *transform));
    }

    fn add_static_effect_flags(&self, effect: EffectPtr, flags: EffectFlags) {
        self.record(HostCall::StaticEffectFlags(effect.addr(), flags.bits()));
    }

    fn destroy_static_effect(&self, effect: EffectPtr) -> HostResult<()> {
        self.record(HostCall::DestroyStaticEffect(effect.addr()));
        self.check("destroy_static_effect")
    }

    fn create_actor_effect(&self, path: &str, source: usize, target: usize) -> HostResult<EffectPtr> {
        self.check("create_actor_effect")?;
        let effect: EffectPtr = self.alloc();
        self.record(HostCall::CreateActorEffect(path.to_string(), source, target, effect.addr()));
        Ok(effect)
    }

    fn destroy_actor_effect(&self, effect: EffectPtr) -> HostResult<()> {
        self.record(HostCall::DestroyActorEffect(effect.addr()));
        self.check("destroy_actor_effect")
    }
}

impl HostSignals for FakeHost {
    fn subscribe(&self, signal: HostSignal) -> SignalToken {
        self.record(HostCall::Subscribe(signal));
        let mut state = self.state.borrow_mut();
        state.next_token += 1;
        SignalToken {
            signal,
            id: state.next_token,
        }
    }

    fn unsubscribe(&self, token: SignalToken) {
        self.record(HostCall::Unsubscribe(token.signal));
    }
}

/// Host, virtual clock and context wired together
pub struct Fixture {
    pub host: Rc<FakeHost>,
    pub clock: Rc<ManualClock>,
    pub ctx: HostContext,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(SpawnerConfig::default())
    }

    pub fn with_config(config: SpawnerConfig) -> Self {
        let host = Rc::new(FakeHost::new());
        let clock = Rc::new(ManualClock::new());
        let ctx = HostContext::new(host.clone(), host.clone(), clock.clone(), config);
        Self { host, clock, ctx }
    }
}

/// Predicates for [`FakeHost::count`]
pub mod calls {
    use super::HostCall;

    pub fn is_effect_destroy(call: &HostCall) -> bool {
        matches!(call, HostCall::DestroyStaticEffect(_) | HostCall::DestroyActorEffect(_))
    }

    pub fn is_effect_create(call: &HostCall) -> bool {
        matches!(call, HostCall::CreateStaticEffect(..) | HostCall::CreateActorEffect(..))
    }

    pub fn is_teardown(call: &HostCall) -> bool {
        matches!(call, HostCall::DestroyMesh(_) | HostCall::FreeGroup(_)) || is_effect_destroy(call)
    }
}
