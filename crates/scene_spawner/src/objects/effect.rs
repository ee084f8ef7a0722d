//! Effect handles
//!
//! Particle-style `.avfx` effects come in two variants. Static effects float at
//! a world placement and are re-created periodically so the engine never lets
//! them run out; actor effects travel from a source actor to a target actor and
//! cannot be moved after creation.
//!
//! Lifecycle of one handle:
//!
//! ```text
//! create ──► Active(expires_at, looping) ──[now ≥ expires_at]──┬─ looping ──► refresh ──► Active
//!                                                              └─ otherwise ─► disposed by the registry
//! ```

use super::error::SpawnError;
use super::transform::ObservedTransform;
use crate::foundation::math::{Transform, TransformPatch};
use crate::foundation::time::Expiry;
use crate::host::{ActorRef, EffectFlags, EffectPtr, HostContext};
use std::time::Duration;

/// What the effect is attached to
#[derive(Debug, Clone, PartialEq)]
pub enum EffectVariant {
    /// Free-standing effect at a world placement
    Static {
        /// Placement pushed on every (re)creation
        transform: ObservedTransform,
    },
    /// Effect travelling between two actors
    Actor {
        /// Actor the effect starts from
        source: ActorRef,
        /// Actor the effect is aimed at
        target: ActorRef,
    },
}

/// Owning handle to a native effect instance
#[derive(Debug)]
pub struct EffectHandle {
    ctx: HostContext,
    path: String,
    effect: Option<EffectPtr>,
    variant: EffectVariant,
    expiry: Expiry,
    looping: bool,
}

impl EffectHandle {
    /// Create a static effect at `placement`
    pub fn new_static(
        ctx: &HostContext,
        path: &str,
        placement: Transform,
        duration: Duration,
        looping: bool,
    ) -> Result<Self, SpawnError> {
        let variant = EffectVariant::Static {
            transform: ObservedTransform::new(placement),
        };
        Self::create(ctx, path, variant, duration, looping)
    }

    /// Create an effect travelling from `source` to `target`
    pub fn new_actor(
        ctx: &HostContext,
        path: &str,
        source: ActorRef,
        target: ActorRef,
        duration: Duration,
        looping: bool,
    ) -> Result<Self, SpawnError> {
        Self::create(ctx, path, EffectVariant::Actor { source, target }, duration, looping)
    }

    fn create(
        ctx: &HostContext,
        path: &str,
        variant: EffectVariant,
        duration: Duration,
        looping: bool,
    ) -> Result<Self, SpawnError> {
        let mut handle = Self {
            ctx: ctx.clone(),
            path: path.to_string(),
            effect: None,
            variant,
            expiry: Expiry::new(ctx.now(), duration),
            looping,
        };
        handle.effect = handle.create_native()?;
        Ok(handle)
    }

    /// Resource path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Native address, `None` when nothing is live
    pub fn native(&self) -> Option<EffectPtr> {
        self.effect
    }

    /// Whether a native instance is held
    pub fn is_live(&self) -> bool {
        self.effect.is_some()
    }

    /// Attachment variant
    pub fn variant(&self) -> &EffectVariant {
        &self.variant
    }

    /// Whether this is an actor effect
    pub fn is_actor(&self) -> bool {
        matches!(self.variant, EffectVariant::Actor { .. })
    }

    /// Placement of a static effect; actor effects have none
    pub fn transform(&self) -> Option<&ObservedTransform> {
        match &self.variant {
            EffectVariant::Static { transform } => Some(transform),
            EffectVariant::Actor { .. } => None,
        }
    }

    /// Whether the effect is re-created when it expires
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Enable or disable refresh on expiry
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Lifetime of one period; zero never expires
    pub fn duration(&self) -> Duration {
        self.expiry.duration
    }

    /// Clock time the current period ends, `None` if it never does
    pub fn expires_at(&self) -> Option<Duration> {
        self.expiry.expires_at()
    }

    /// Whether the current period has ended
    pub fn is_expired(&self) -> bool {
        self.expiry.is_expired(self.ctx.now())
    }

    /// Move a static effect
    ///
    /// Actor effects follow their actors; the call is logged and ignored and
    /// `false` is returned.
    pub fn set_transform(&mut self, patch: &TransformPatch) -> bool {
        let EffectVariant::Static { transform } = &mut self.variant else {
            log::warn!("Cannot set the transform of actor effect {}", self.path);
            return false;
        };

        if let (Some(transform), Some(effect)) = (transform.apply(patch), self.effect) {
            self.ctx.host().set_static_effect_transform(effect, &transform);
        }
        true
    }

    /// Refresh the effect if it is looping and its period has ended
    ///
    /// Returns whether a refresh happened.
    pub fn check_for_refresh(&mut self) -> Result<bool, SpawnError> {
        if !self.looping || !self.is_expired() {
            return Ok(false);
        }
        self.refresh()?;
        Ok(true)
    }

    /// Destroy the current instance, if any, then create a new one
    ///
    /// The new period starts now.
    pub fn refresh(&mut self) -> Result<(), SpawnError> {
        log::trace!("Refreshing effect {}", self.path);
        self.destroy_native();
        self.expiry.restart(self.ctx.now());
        self.effect = self.create_native()?;
        Ok(())
    }

    /// Drop the native pointer without destroying it
    ///
    /// For instances the engine already removed on its own.
    pub fn forget_native(&mut self) {
        if let Some(effect) = self.effect.take() {
            log::debug!("Forgetting effect {} @ {effect:?}", self.path);
        }
    }

    /// Stop looping and destroy the native instance
    pub fn dispose(&mut self) {
        self.looping = false;
        if let EffectVariant::Static { transform } = &mut self.variant {
            transform.unbind();
        }
        if self.effect.is_some() {
            log::debug!("Disposing effect {}", self.path);
        }
        self.destroy_native();
    }

    fn create_native(&self) -> Result<Option<EffectPtr>, SpawnError> {
        let host = self.ctx.host();
        match &self.variant {
            EffectVariant::Static { transform } => {
                let Some(effect) = SpawnError::from_creation(&self.path, host.create_static_effect(&self.path))? else {
                    return Ok(None);
                };
                if let Err(error) = SpawnError::from_creation(&self.path, host.run_static_effect(effect)) {
                    SpawnError::log_disposal(&self.path, host.destroy_static_effect(effect));
                    return Err(error);
                }
                host.set_static_effect_transform(effect, &transform.get());

                let flags = EffectFlags::from_bits_retain(self.ctx.config().effects.force_visible_flag);
                host.add_static_effect_flags(effect, flags);

                log::debug!("Created static effect {} @ {effect:?}", self.path);
                Ok(Some(effect))
            }
            EffectVariant::Actor { source, target } => {
                let effect = SpawnError::from_creation(
                    &self.path,
                    host.create_actor_effect(&self.path, source.address, target.address),
                )?;
                if let Some(effect) = effect {
                    log::debug!("Created actor effect {} @ {effect:?}", self.path);
                }
                Ok(effect)
            }
        }
    }

    fn destroy_native(&mut self) {
        let Some(effect) = self.effect.take() else {
            return;
        };
        let host = self.ctx.host();
        let result = match self.variant {
            EffectVariant::Static { .. } => host.destroy_static_effect(effect),
            EffectVariant::Actor { .. } => host.destroy_actor_effect(effect),
        };
        SpawnError::log_disposal(&self.path, result);
    }
}

impl Drop for EffectHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::host::HostError;
    use crate::testing::{calls, Fixture, HostCall};

    fn actor() -> ActorRef {
        ActorRef::new(0xBEEF, Vec3::new(10.0, 0.0, -4.0), 0.5)
    }

    fn addr(handle: &EffectHandle) -> usize {
        handle.native().map_or(0, |e| e.addr())
    }

    #[test]
    fn test_static_creation_runs_places_and_flags() {
        let fx = Fixture::new();
        let placement = Transform::from_position(Vec3::new(1.0, 1.0, 1.0));
        let handle = EffectHandle::new_static(&fx.ctx, "fx/glow.avfx", placement, Duration::from_secs(5), true)
            .expect("Should create");
        let a = addr(&handle);

        assert_eq!(
            fx.host.calls(),
            vec![
                HostCall::CreateStaticEffect("fx/glow.avfx".to_string(), a),
                HostCall::RunStaticEffect(a),
                HostCall::StaticEffectTransform(a, placement),
                HostCall::StaticEffectFlags(a, 0x2),
            ]
        );
        assert_eq!(handle.expires_at(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_actor_creation_passes_both_actors() {
        let fx = Fixture::new();
        let handle = EffectHandle::new_actor(&fx.ctx, "fx/hit.avfx", actor(), actor(), Duration::from_secs(3), false)
            .expect("Should create");

        assert!(handle.is_actor());
        assert_eq!(
            fx.host.calls(),
            vec![HostCall::CreateActorEffect("fx/hit.avfx".to_string(), 0xBEEF, 0xBEEF, addr(&handle))]
        );
    }

    #[test]
    fn test_actor_effect_refuses_transform() {
        let fx = Fixture::new();
        let mut handle =
            EffectHandle::new_actor(&fx.ctx, "fx/hit.avfx", actor(), actor(), Duration::from_secs(3), false)
                .expect("Should create");

        assert!(!handle.set_transform(&TransformPatch::new().with_scale(Vec3::new(2.0, 2.0, 2.0))));
        assert!(handle.transform().is_none());
    }

    #[test]
    fn test_refresh_destroys_before_creating() {
        let fx = Fixture::new();
        let mut handle =
            EffectHandle::new_static(&fx.ctx, "fx/glow.avfx", Transform::default(), Duration::from_secs(2), true)
                .expect("Should create");
        let old = addr(&handle);
        fx.host.clear_calls();

        fx.clock.advance_secs(2.0);
        assert!(handle.check_for_refresh().expect("Should refresh"));

        let new = addr(&handle);
        assert_ne!(old, new);
        let recorded = fx.host.calls();
        assert_eq!(recorded.first(), Some(&HostCall::DestroyStaticEffect(old)));
        assert_eq!(recorded.get(1), Some(&HostCall::CreateStaticEffect("fx/glow.avfx".to_string(), new)));
        assert_eq!(handle.expires_at(), Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_no_refresh_before_expiry_or_when_not_looping() {
        let fx = Fixture::new();
        let mut looping =
            EffectHandle::new_static(&fx.ctx, "fx/glow.avfx", Transform::default(), Duration::from_secs(2), true)
                .expect("Should create");
        let mut once = EffectHandle::new_actor(&fx.ctx, "fx/hit.avfx", actor(), actor(), Duration::from_secs(1), false)
            .expect("Should create");

        fx.clock.advance_secs(1.5);
        assert!(!looping.check_for_refresh().expect("No refresh"));
        assert!(!once.check_for_refresh().expect("No refresh"));
        assert!(once.is_expired());
    }

    #[test]
    fn test_zero_duration_never_expires() {
        let fx = Fixture::new();
        let mut handle = EffectHandle::new_static(&fx.ctx, "fx/glow.avfx", Transform::default(), Duration::ZERO, true)
            .expect("Should create");

        fx.clock.advance_secs(3600.0);
        assert!(!handle.is_expired());
        assert!(handle.expires_at().is_none());
        assert!(!handle.check_for_refresh().expect("No refresh"));
    }

    #[test]
    fn test_forget_native_skips_destroy() {
        let fx = Fixture::new();
        let mut handle =
            EffectHandle::new_actor(&fx.ctx, "fx/hit.avfx", actor(), actor(), Duration::from_secs(3), true)
                .expect("Should create");

        handle.forget_native();
        drop(handle);
        assert_eq!(fx.host.count(calls::is_effect_destroy), 0);
    }

    #[test]
    fn test_dispose_clears_looping_and_destroys_once() {
        let fx = Fixture::new();
        let mut handle =
            EffectHandle::new_static(&fx.ctx, "fx/glow.avfx", Transform::default(), Duration::from_secs(2), true)
                .expect("Should create");

        handle.dispose();
        handle.dispose();
        assert!(!handle.looping());

        fx.clock.advance_secs(5.0);
        assert!(!handle.check_for_refresh().expect("Disposed handles do not refresh"));
        drop(handle);
        assert_eq!(fx.host.count(|c| matches!(c, HostCall::DestroyStaticEffect(_))), 1);
        assert_eq!(fx.host.count(calls::is_effect_create), 1);
    }

    #[test]
    fn test_failed_refresh_retries_next_period() {
        let fx = Fixture::new();
        let mut handle =
            EffectHandle::new_static(&fx.ctx, "fx/glow.avfx", Transform::default(), Duration::from_secs(1), true)
                .expect("Should create");

        fx.host.fail("create_static_effect", HostError::NullInstance("VfxStatic.Create"));
        fx.clock.advance_secs(1.0);
        assert!(handle.check_for_refresh().expect("Fault is not fatal"));
        assert!(!handle.is_live());

        fx.host.heal("create_static_effect");
        fx.clock.advance_secs(1.0);
        assert!(handle.check_for_refresh().expect("Should refresh"));
        assert!(handle.is_live());
    }

    #[test]
    fn test_missing_runner_destroys_created_effect() {
        let fx = Fixture::new();
        fx.host.fail("run_static_effect", HostError::EntryPointMissing("VfxStatic.Run"));

        let result =
            EffectHandle::new_static(&fx.ctx, "fx/glow.avfx", Transform::default(), Duration::from_secs(1), true);
        assert!(matches!(result, Err(SpawnError::NativeEntryPointMissing("VfxStatic.Run"))));
        assert_eq!(fx.host.count(calls::is_effect_create), 1);
        assert_eq!(fx.host.count(|c| matches!(c, HostCall::DestroyStaticEffect(_))), 1);
    }

    #[test]
    fn test_missing_runner_on_refresh_destroys_new_effect() {
        let fx = Fixture::new();
        let mut handle =
            EffectHandle::new_static(&fx.ctx, "fx/glow.avfx", Transform::default(), Duration::from_secs(1), true)
                .expect("Should create");

        fx.host.fail("run_static_effect", HostError::EntryPointMissing("VfxStatic.Run"));
        fx.clock.advance_secs(1.0);
        assert!(handle.check_for_refresh().is_err());
        assert!(!handle.is_live());
        assert_eq!(fx.host.count(calls::is_effect_create), 2);
        assert_eq!(fx.host.count(|c| matches!(c, HostCall::DestroyStaticEffect(_))), 2);

        drop(handle);
        assert_eq!(fx.host.count(|c| matches!(c, HostCall::DestroyStaticEffect(_))), 2);
    }
}
