//! Topic registry: topic name to ordered subscription list.
//!
//! Each topic's list is an `Arc<Vec<_>>` that is cloned on write while a
//! [`Snapshot`] of it is outstanding, so an in-flight publish never observes
//! subscriptions added or removed after it started.

use hubbub_core::{Gadget, HandlerRef, Message, Subscription, Topic};
use std::{
    collections::HashMap,
    ops::Deref,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

type List<A> = Arc<Vec<Arc<Subscription<A>>>>;

/// An immutable view of one topic's subscriptions, in registration order.
pub struct Snapshot<A: Message>(List<A>);

impl<A: Message> Snapshot<A> {
    fn empty() -> Self {
        Self(Arc::new(Vec::new()))
    }
}

impl<A: Message> Deref for Snapshot<A> {
    type Target = [Arc<Subscription<A>>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<A: Message> Clone for Snapshot<A> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// Maps each topic to its ordered list of subscriptions.
///
/// The registry owns every subscription record. Locks are only held for the
/// duration of a lookup or mutation and never while user code runs.
pub struct TopicRegistry<A: Message> {
    topics: RwLock<HashMap<Topic, List<A>>>,
}

impl<A: Message> TopicRegistry<A> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Topic, List<A>>> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Topic, List<A>>> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a subscription to its topic's list.
    ///
    /// Returns the position it was stored at, or `None` when an identical
    /// (topic, handler, context, predicate) registration already exists, in
    /// which case the list is left untouched.
    pub fn add(&self, subscription: Arc<Subscription<A>>) -> Option<usize> {
        let mut topics = self.write();
        let list = topics.entry(subscription.topic().clone()).or_default();

        if list.iter().any(|s| s.same_registration(&subscription)) {
            return None;
        }

        let list = Arc::make_mut(list);
        list.push(subscription);
        debug_assert!(
            list.split_last()
                .is_some_and(|(new, rest)| rest.iter().all(|s| !s.same_registration(new))),
            "duplicate registration in topic list"
        );
        Some(list.len() - 1)
    }

    /// Remove every subscription of `handler` bound to `context` on `topic`.
    ///
    /// Returns how many were removed; unknown registrations remove nothing.
    /// More than one match means the handler was registered under distinct
    /// predicates.
    pub fn remove(&self, topic: &str, handler: &HandlerRef<A>, context: &Gadget) -> usize {
        self.remove_on(topic, |s| s.belongs_to(handler, context))
    }

    /// Remove every subscription bound to `context` on `topic`.
    pub fn remove_topic_context(&self, topic: &str, context: &Gadget) -> usize {
        self.remove_on(topic, |s| s.context().same(context))
    }

    /// Remove every subscription bound to `context`, on every topic.
    pub fn remove_context(&self, context: &Gadget) -> usize {
        let mut topics = self.write();
        let mut removed = 0;

        topics.retain(|_, list| {
            if list.iter().any(|s| s.context().same(context)) {
                let before = list.len();
                Arc::make_mut(list).retain(|s| !s.context().same(context));
                removed += before - list.len();
            }
            !list.is_empty()
        });

        removed
    }

    fn remove_on<F>(&self, topic: &str, matches: F) -> usize
    where
        F: Fn(&Subscription<A>) -> bool,
    {
        let mut topics = self.write();
        let Some(list) = topics.get_mut(topic) else {
            return 0;
        };

        if !list.iter().any(|s| matches(s.as_ref())) {
            return 0;
        }

        let before = list.len();
        Arc::make_mut(list).retain(|s| !matches(s.as_ref()));
        let removed = before - list.len();

        if list.is_empty() {
            topics.remove(topic);
        }
        removed
    }

    /// Snapshot of `topic`'s subscriptions; empty if none are registered.
    pub fn list(&self, topic: &str) -> Snapshot<A> {
        self.read()
            .get(topic)
            .map(|list| Snapshot(Arc::clone(list)))
            .unwrap_or_else(Snapshot::empty)
    }

    /// Number of subscriptions on `topic`.
    pub fn len(&self, topic: &str) -> usize {
        self.read().get(topic).map_or(0, |list| list.len())
    }

    /// Whether no topic has any subscription.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Topics that currently have at least one subscription.
    pub fn topics(&self) -> Vec<Topic> {
        self.read().keys().cloned().collect()
    }
}

impl<A: Message> Default for TopicRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}
