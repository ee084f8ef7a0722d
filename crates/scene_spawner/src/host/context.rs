//! Explicit host context
//!
//! One context is built at startup and passed by reference into every
//! constructor. Handles keep a clone so they can tear themselves down on drop.
//! The context is `!Send`: anything holding it stays on the update thread.

use super::{HostSignals, NativeHost};
use crate::core::config::SpawnerConfig;
use crate::foundation::time::Clock;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Collaborators shared by the registry and every handle
#[derive(Clone)]
pub struct HostContext {
    host: Rc<dyn NativeHost>,
    signals: Rc<dyn HostSignals>,
    clock: Rc<dyn Clock>,
    config: Rc<SpawnerConfig>,
}

impl HostContext {
    /// Create a new context
    pub fn new(
        host: Rc<dyn NativeHost>,
        signals: Rc<dyn HostSignals>,
        clock: Rc<dyn Clock>,
        config: SpawnerConfig,
    ) -> Self {
        Self {
            host,
            signals,
            clock,
            config: Rc::new(config),
        }
    }

    /// Native operations
    pub fn host(&self) -> &dyn NativeHost {
        self.host.as_ref()
    }

    /// Signal subscriptions
    pub fn signals(&self) -> &dyn HostSignals {
        self.signals.as_ref()
    }

    /// Current clock time
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Active configuration
    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("now", &self.clock.now())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
