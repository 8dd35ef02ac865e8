//! Last-publish memory per topic.

use hubbub_core::{Message, Topic};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// Retains the arguments of the most recent publish on each topic.
///
/// One slot per topic, created on first publish and overwritten by every
/// later one. No history is kept.
pub struct MemoryStore<A: Message> {
    slots: RwLock<HashMap<Topic, Arc<A>>>,
}

impl<A: Message> MemoryStore<A> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Record `args` as the last publish on `topic`, returning the previous
    /// arguments, if any.
    pub fn remember(&self, topic: &Topic, args: Arc<A>) -> Option<Arc<A>> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(topic.clone(), args)
    }

    /// The last arguments published on `topic`.
    pub fn recall(&self, topic: &str) -> Option<Arc<A>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
    }

    /// Drop the slot for `topic`.
    pub fn forget(&self, topic: &str) -> Option<Arc<A>> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(topic)
    }

    /// Number of topics with a remembered publish.
    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been remembered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A: Message> Default for MemoryStore<A> {
    fn default() -> Self {
        Self::new()
    }
}
