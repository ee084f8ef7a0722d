//! Host lifecycle signals
//!
//! The registry subscribes to these for its lifetime. The host owns the
//! actual event sources; delivery happens by calling
//! [`ObjectRegistry::handle_signal`](crate::objects::ObjectRegistry::handle_signal)
//! on the update thread.

/// Signals the registry reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSignal {
    /// Once per frame, on the update thread
    FrameUpdate,
    /// The player entered a new zone; every spawned object is gone from the scene
    ZoneChanged,
    /// The player logged out
    Logout,
}

impl HostSignal {
    /// Every signal, in subscription order
    pub const ALL: [Self; 3] = [Self::FrameUpdate, Self::ZoneChanged, Self::Logout];
}

/// Receipt for one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalToken {
    /// Signal this token subscribes to
    pub signal: HostSignal,
    /// Host-assigned subscription id
    pub id: u64,
}

/// Subscription side of the host's event sources
pub trait HostSignals {
    /// Start receiving `signal`
    fn subscribe(&self, signal: HostSignal) -> SignalToken;
    /// Stop receiving the signal behind `token`
    fn unsubscribe(&self, token: SignalToken);
}
