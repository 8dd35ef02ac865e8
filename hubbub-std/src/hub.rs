//! # The hub
//!
//! [`Hub`] ties the [`TopicRegistry`], the [`MemoryStore`] and the lifecycle
//! gate together and exposes the component-facing API: `subscribe`,
//! `unsubscribe`, `publish`.
//!
//! ## Publish
//! ```text
//! publish(topic, args)
//!     │  (synchronous)
//!     ├─► memory.remember(topic, args)
//!     ├─► snapshot = registry.list(topic)
//!     └─► for each subscription, in order:
//!             context inactive? ──► skip
//!             predicate false?  ──► skip
//!             otherwise         ──► start handler(context, args)
//!     │
//!     ▼  (Publish future)
//! drive suspended handlers in order ──► PublishReport / PublishError
//! ```
//!
//! Everything above the `Publish` future runs before `publish` returns,
//! including each handler up to its first suspension point. Concurrent
//! publishes each see a consistent snapshot taken at call time, and no
//! handler starts after its context has been deactivated.

use crate::{
    config::{HubBuilder, HubConfig},
    delivery::{Publish, Replay, deliver, panic_message, settled},
    memory::MemoryStore,
    registry::TopicRegistry,
};
use hubbub_core::{
    FailureKind, Gadget, HandlerRef, Message, SubscribeOptions, Subscription, Topic,
};
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// What `subscribe` did.
#[must_use]
#[derive(Debug)]
pub enum Subscribed {
    /// The subscription was registered.
    Added,
    /// The subscription was registered and the topic's remembered publish
    /// matched it. The handler is already running; awaiting the [`Replay`]
    /// yields its outcome.
    Replay(Replay),
    /// An identical registration already existed; nothing changed.
    Duplicate,
}

impl Subscribed {
    /// Whether a new subscription was registered.
    pub fn is_added(&self) -> bool {
        !self.is_duplicate()
    }

    /// Whether the call was a no-op.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Subscribed::Duplicate)
    }

    /// The pending replay, if any.
    pub fn into_replay(self) -> Option<Replay> {
        match self {
            Subscribed::Replay(replay) => Some(replay),
            Subscribed::Added | Subscribed::Duplicate => None,
        }
    }
}

enum Screen {
    Skip,
    Deliver,
    Broken(FailureKind),
}

/// Lifecycle gate and predicate check for one subscription.
fn screen<A: Message>(subscription: &Subscription<A>, args: &A) -> Screen {
    if !subscription.context().is_active() {
        return Screen::Skip;
    }
    match panic::catch_unwind(AssertUnwindSafe(|| subscription.matches(args))) {
        Ok(true) => Screen::Deliver,
        Ok(false) => Screen::Skip,
        Err(payload) => Screen::Broken(FailureKind::Panic(panic_message(&*payload))),
    }
}

/// An in-process publish/subscribe hub.
///
/// Construct one per application (or per test) and share it by reference
/// or `Arc`; there is no global instance.
///
/// # Example
/// ```ignore
/// let hub = Hub::<(bool, &'static str)>::new();
/// let gadget = Gadget::named("panel");
/// let handler = HandlerRef::new(|gadget: Gadget, args: Arc<(bool, &'static str)>| async move {
///     println!("{} got {:?}", gadget.name(), args);
/// });
///
/// hub.subscribe("foo", &handler, &gadget, SubscribeOptions::new());
/// hub.activate(&gadget);
/// hub.publish("foo", (true, "bar")).await?;
/// ```
pub struct Hub<A: Message> {
    registry: TopicRegistry<A>,
    memory: MemoryStore<A>,
    config: HubConfig,
}

impl<A: Message> Hub<A> {
    /// Create a hub with default settings.
    pub fn new() -> Self {
        HubBuilder::new().build()
    }

    /// Start building a hub.
    pub fn builder() -> HubBuilder<A> {
        HubBuilder::new()
    }

    pub(crate) fn from_parts(
        registry: TopicRegistry<A>,
        memory: MemoryStore<A>,
        config: HubConfig,
    ) -> Self {
        Self {
            registry,
            memory,
            config,
        }
    }

    /// The hub's configuration.
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// The topic registry.
    pub fn registry(&self) -> &TopicRegistry<A> {
        &self.registry
    }

    /// The memory store.
    pub fn memory(&self) -> &MemoryStore<A> {
        &self.memory
    }

    /// Register `handler` for `topic`, bound to `context`.
    ///
    /// For a memory-qualified subscription whose context is active, the
    /// topic's remembered publish is replayed if it passes the predicate.
    /// The replayed handler is started before this returns.
    pub fn subscribe(
        &self,
        topic: impl Into<Topic>,
        handler: &HandlerRef<A>,
        context: &Gadget,
        options: SubscribeOptions<A>,
    ) -> Subscribed {
        let subscription = Arc::new(Subscription::new(
            topic.into(),
            handler.clone(),
            context.clone(),
            options,
        ));

        let Some(position) = self.registry.add(Arc::clone(&subscription)) else {
            hub_log!(
                debug,
                topic = %subscription.topic(),
                context = %context.id(),
                "duplicate subscription ignored"
            );
            return Subscribed::Duplicate;
        };
        hub_log!(
            debug,
            topic = %subscription.topic(),
            context = %context.id(),
            position,
            "subscribed"
        );

        if !subscription.is_memory() {
            return Subscribed::Added;
        }
        let Some(args) = self.memory.recall(subscription.topic()) else {
            return Subscribed::Added;
        };

        let topic = subscription.topic().clone();
        match screen(&subscription, &args) {
            Screen::Skip => Subscribed::Added,
            Screen::Deliver => {
                hub_log!(debug, %topic, context = %context.id(), "replaying remembered publish");
                let delivery = deliver(subscription, position, args, self.config.handler_timeout);
                Subscribed::Replay(Replay::new(delivery))
            }
            Screen::Broken(kind) => {
                Subscribed::Replay(Replay::new(settled(topic, context.id(), position, kind)))
            }
        }
    }

    /// Remove `handler`'s subscriptions for `context` on `topic`.
    ///
    /// Returns how many were removed. Unknown registrations are a no-op.
    pub fn unsubscribe(&self, topic: &str, handler: &HandlerRef<A>, context: &Gadget) -> usize {
        let removed = self.registry.remove(topic, handler, context);
        hub_log!(debug, topic, context = %context.id(), removed, "unsubscribed");
        removed
    }

    /// Remove every subscription of `context` on `topic`.
    pub fn unsubscribe_context(&self, topic: &str, context: &Gadget) -> usize {
        let removed = self.registry.remove_topic_context(topic, context);
        hub_log!(debug, topic, context = %context.id(), removed, "unsubscribed context from topic");
        removed
    }

    /// Remove every subscription of `context` on every topic.
    ///
    /// Call when the owning component is destroyed.
    pub fn release(&self, context: &Gadget) -> usize {
        let removed = self.registry.remove_context(context);
        hub_log!(debug, context = %context.id(), removed, "released context");
        removed
    }

    /// Publish `args` on `topic`.
    ///
    /// The snapshot, lifecycle and predicate checks happen before this
    /// returns, and every eligible handler is started. The returned future
    /// drives handlers that suspended and resolves to the aggregate result.
    pub fn publish(&self, topic: impl Into<Topic>, args: A) -> Publish {
        self.publish_shared(topic, Arc::new(args))
    }

    /// Publish already-shared arguments on `topic`.
    pub fn publish_shared(&self, topic: impl Into<Topic>, args: Arc<A>) -> Publish {
        let topic = topic.into();

        if self.config.memory {
            self.memory.remember(&topic, Arc::clone(&args));
        }

        let snapshot = self.registry.list(&topic);
        let mut handlers = Vec::with_capacity(snapshot.len());

        for (position, subscription) in snapshot.iter().enumerate() {
            match screen(subscription, &args) {
                Screen::Skip => continue,
                Screen::Deliver => handlers.push(deliver(
                    Arc::clone(subscription),
                    position,
                    Arc::clone(&args),
                    self.config.handler_timeout,
                )),
                Screen::Broken(kind) => {
                    handlers.push(settled(
                        topic.clone(),
                        subscription.context().id(),
                        position,
                        kind,
                    ));
                }
            }
        }

        hub_log!(
            trace,
            %topic,
            subscribers = snapshot.len(),
            invoked = handlers.len(),
            "publish"
        );
        Publish::new(topic, handlers)
    }

    /// Mark `context` active. Returns `true` if it was inactive.
    pub fn activate(&self, context: &Gadget) -> bool {
        let changed = !context.lifecycle().activate();
        hub_log!(debug, context = %context.id(), changed, "activated");
        changed
    }

    /// Mark `context` inactive. Returns `true` if it was active.
    ///
    /// Subscriptions are kept; they simply stop firing until reactivation.
    pub fn deactivate(&self, context: &Gadget) -> bool {
        let changed = context.lifecycle().deactivate();
        hub_log!(debug, context = %context.id(), changed, "deactivated");
        changed
    }

    /// Whether `context` currently receives deliveries.
    pub fn is_active(&self, context: &Gadget) -> bool {
        context.is_active()
    }

    /// Number of subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.len(topic)
    }
}

impl<A: Message> Default for Hub<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Message> fmt::Debug for Hub<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("topics", &self.registry.topics())
            .field("remembered", &self.memory.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<u32>>>) -> HandlerRef<u32> {
        let log = Arc::clone(log);
        HandlerRef::new(move |_: Gadget, args: Arc<u32>| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(*args);
            }
        })
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let hub = Hub::<u32>::new();
        let report = hub.publish("nobody", 1).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_publish_records_memory_before_dispatch() {
        let hub = Hub::<u32>::new();
        let _ = hub.publish("t", 5);
        assert_eq!(hub.memory().recall("t").as_deref(), Some(&5));
    }

    #[tokio::test]
    async fn test_memory_disabled() {
        let hub = Hub::<u32>::builder().memory(false).build();
        let gadget = Gadget::new();
        hub.activate(&gadget);

        hub.publish("t", 5).await.unwrap();

        let log = Arc::new(Mutex::new(Vec::new()));
        let subscribed = hub.subscribe(
            "t",
            &recorder(&log),
            &gadget,
            SubscribeOptions::new().with_memory(true),
        );
        assert!(matches!(subscribed, Subscribed::Added));
    }

    #[tokio::test]
    async fn test_snapshot_taken_at_call_time() {
        let hub = Hub::<u32>::new();
        let gadget = Gadget::new();
        hub.activate(&gadget);

        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder(&log);
        assert!(hub.subscribe("t", &handler, &gadget, SubscribeOptions::new()).is_added());

        let publish = hub.publish("t", 1);
        hub.unsubscribe("t", &handler, &gadget);
        let late = recorder(&log);
        let _ = hub.subscribe("t", &late, &gadget, SubscribeOptions::new());

        let report = publish.await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(*log.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_panicking_predicate_is_isolated() {
        let hub = Hub::<u32>::new();
        let gadget = Gadget::new();
        hub.activate(&gadget);

        let log = Arc::new(Mutex::new(Vec::new()));
        let _ = hub.subscribe(
            "t",
            &recorder(&log),
            &gadget,
            SubscribeOptions::new().with_predicate(|_: &u32| panic!("bad predicate")),
        );
        let _ = hub.subscribe("t", &recorder(&log), &gadget, SubscribeOptions::new());

        let err = hub.publish("t", 2).await.unwrap_err();
        let report = err.report();
        assert_eq!(report.failure_count(), 1);
        assert!(report.outcomes()[0].failure().unwrap().is_panic());
        assert_eq!(*log.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_deactivate_after_publish_starts_nothing_new() {
        let hub = Hub::<u32>::new();
        let gadget = Gadget::new();
        hub.activate(&gadget);

        let log = Arc::new(Mutex::new(Vec::new()));
        let _ = hub.subscribe("t", &recorder(&log), &gadget, SubscribeOptions::new());

        let publish = hub.publish("t", 1);
        assert_eq!(*log.lock().unwrap(), vec![1]);
        hub.deactivate(&gadget);
        assert_eq!(publish.await.unwrap().len(), 1);

        let gated = hub.publish("t", 2);
        hub.activate(&gadget);
        assert!(gated.await.unwrap().is_empty());
        assert_eq!(*log.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_release_removes_every_topic() {
        let hub = Hub::<u32>::new();
        let gadget = Gadget::new();
        let other = Gadget::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder(&log);

        let _ = hub.subscribe("a", &handler, &gadget, SubscribeOptions::new());
        let _ = hub.subscribe("b", &handler, &gadget, SubscribeOptions::new());
        let _ = hub.subscribe("b", &handler, &other, SubscribeOptions::new());

        assert_eq!(hub.release(&gadget), 2);
        assert_eq!(hub.subscriber_count("a"), 0);
        assert_eq!(hub.subscriber_count("b"), 1);
        assert_eq!(hub.release(&gadget), 0);
    }

    #[test]
    fn test_activate_reports_change() {
        let hub = Hub::<u32>::new();
        let gadget = Gadget::new();

        assert!(hub.activate(&gadget));
        assert!(!hub.activate(&gadget));
        assert!(hub.is_active(&gadget));
        assert!(hub.deactivate(&gadget));
        assert!(!hub.deactivate(&gadget));
    }
}
