//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable key of an object tracked by the registry
    ///
    /// Keys carry a generation, so a key held after its object was removed
    /// never aliases a newer object.
    pub struct ObjectId;
}

/// Handle-based map using slot map for stable references
pub type ObjectMap<T> = SlotMap<ObjectId, T>;
