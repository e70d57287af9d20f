//! Index of published lights.
//!
//! Maps a light's identity hash to the aid its accessory was registered
//! under and to its target-state-reached subscription. Both the publisher
//! and the projector go through this index; nothing else links a light to
//! its accessory.

use crate::hap::Aid;
use crate::light::ListenerId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// What the bridge knows about one published light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedLight {
    pub aid: Aid,
    /// `None` for internal lights, which are never subscribed
    pub listener: Option<ListenerId>,
}

#[derive(Default)]
pub struct AccessoryIndex {
    entries: RwLock<HashMap<u32, LinkedLight>>,
}

impl AccessoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the link for a light.
    pub fn insert(&self, identity_hash: u32, linked: LinkedLight) {
        self.entries.write().insert(identity_hash, linked);
    }

    /// Link recorded for a light, if it is published.
    pub fn get(&self, identity_hash: u32) -> Option<LinkedLight> {
        self.entries.read().get(&identity_hash).copied()
    }

    /// Aid of a published light.
    pub fn aid_of(&self, identity_hash: u32) -> Option<Aid> {
        self.get(identity_hash).map(|linked| linked.aid)
    }

    /// Forget a light. Returns the link it had.
    pub fn remove(&self, identity_hash: u32) -> Option<LinkedLight> {
        self.entries.write().remove(&identity_hash)
    }

    /// Whether no light is published.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
