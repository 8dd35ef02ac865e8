//! Subscription records and their options.

use crate::{gadget::Gadget, handler::HandlerRef, message::Message, topic::Topic};
use std::{fmt, sync::Arc};

/// A shared argument predicate with pointer identity.
///
/// A subscription with a predicate only fires for publishes whose arguments
/// satisfy it.
pub struct Predicate<A: Message> {
    inner: Arc<dyn Fn(&A) -> bool + Send + Sync>,
}

impl<A: Message> Predicate<A> {
    /// Wrap a predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(predicate),
        }
    }

    /// Evaluate the predicate.
    pub fn matches(&self, args: &A) -> bool {
        (self.inner)(args)
    }

    /// Whether both references point at the same predicate.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A: Message> Clone for Predicate<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Message> fmt::Debug for Predicate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate")
            .field(&Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// Options for a subscription.
///
/// # Example
/// ```ignore
/// let options = SubscribeOptions::new()
///     .with_predicate(|args: &(bool, &'static str)| args.0)
///     .with_memory(true);
/// ```
pub struct SubscribeOptions<A: Message> {
    predicate: Option<Predicate<A>>,
    memory: bool,
}

impl<A: Message> SubscribeOptions<A> {
    /// No predicate, no memory.
    pub fn new() -> Self {
        Self {
            predicate: None,
            memory: false,
        }
    }

    /// Gate deliveries on a predicate.
    pub fn with_predicate<F>(self, predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.with_predicate_ref(Predicate::new(predicate))
    }

    /// Gate deliveries on an existing predicate, keeping its identity.
    pub fn with_predicate_ref(mut self, predicate: Predicate<A>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Ask for the topic's last publish to be replayed on subscribe.
    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    /// The predicate, if any.
    pub fn predicate(&self) -> Option<&Predicate<A>> {
        self.predicate.as_ref()
    }

    /// Whether the subscription is memory-qualified.
    pub fn memory(&self) -> bool {
        self.memory
    }
}

impl<A: Message> Default for SubscribeOptions<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Message> Clone for SubscribeOptions<A> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            memory: self.memory,
        }
    }
}

impl<A: Message> fmt::Debug for SubscribeOptions<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeOptions")
            .field("predicate", &self.predicate)
            .field("memory", &self.memory)
            .finish()
    }
}

/// A registration binding a topic, a handler, an owning context and options.
pub struct Subscription<A: Message> {
    topic: Topic,
    handler: HandlerRef<A>,
    context: Gadget,
    options: SubscribeOptions<A>,
}

impl<A: Message> Subscription<A> {
    /// Create a subscription record.
    pub fn new(
        topic: Topic,
        handler: HandlerRef<A>,
        context: Gadget,
        options: SubscribeOptions<A>,
    ) -> Self {
        Self {
            topic,
            handler,
            context,
            options,
        }
    }

    /// The subscribed topic.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// The handler.
    pub fn handler(&self) -> &HandlerRef<A> {
        &self.handler
    }

    /// The owning context.
    pub fn context(&self) -> &Gadget {
        &self.context
    }

    /// The predicate, if any.
    pub fn predicate(&self) -> Option<&Predicate<A>> {
        self.options.predicate()
    }

    /// Whether the subscription is memory-qualified.
    pub fn is_memory(&self) -> bool {
        self.options.memory()
    }

    /// Whether `args` pass the predicate. Always true without one.
    pub fn matches(&self, args: &A) -> bool {
        self.predicate().is_none_or(|p| p.matches(args))
    }

    /// Whether this record was registered by `handler` for `context`.
    pub fn belongs_to(&self, handler: &HandlerRef<A>, context: &Gadget) -> bool {
        self.handler.ptr_eq(handler) && self.context.same(context)
    }

    /// Whether both records share (topic, handler, context, predicate).
    pub fn same_registration(&self, other: &Self) -> bool {
        let same_predicate = match (self.predicate(), other.predicate()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        self.topic == other.topic
            && self.belongs_to(&other.handler, &other.context)
            && same_predicate
    }
}

impl<A: Message> fmt::Debug for Subscription<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("handler", &self.handler)
            .field("context", &self.context.id())
            .field("options", &self.options)
            .finish()
    }
}
