//! # Components
//!
//! A [`Component`] is a reference lifecycle collaborator: it owns a
//! [`Gadget`], carries declared handlers, and drives the hub's lifecycle
//! gate as it moves through its phases.
//!
//! ```text
//! Initial ──start──► Started ──finalize──► Finalized
//!                       ▲                      │
//!                       └────────start─────────┘
//! ```
//!
//! `dispose` may be called from any phase and consumes the component.

use crate::{
    declaration::Declaration,
    hub::{Hub, Subscribed},
};
use hubbub_core::{
    DeclarationError, Gadget, Handler, HandlerOutcome, HandlerRef, LifecycleError, Message,
    SubscribeOptions, Topic,
};
use std::{borrow::Cow, fmt};

/// Where a component is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Created, never started.
    #[default]
    Initial,
    /// Started; its gadget receives deliveries.
    Started,
    /// Finalized; subscriptions are kept but do not fire.
    Finalized,
}

struct Declared<A: Message> {
    declaration: Declaration,
    handler: HandlerRef<A>,
    options: SubscribeOptions<A>,
    subscribed: bool,
}

/// A gadget plus its declared handlers.
///
/// # Example
/// ```ignore
/// let mut panel = Component::<(String, String)>::new("panel")
///     .declare("hub/foo/bar(true)", |gadget: Gadget, args: Arc<(String, String)>| async move {
///         println!("{} got {:?}", gadget.name(), args);
///     })?;
///
/// hub.publish("foo/bar", ("foo".into(), "bar".into())).await?;
/// panel.start(&hub).await?; // replays ("foo", "bar")
/// ```
pub struct Component<A: Message> {
    gadget: Gadget,
    phase: Phase,
    declared: Vec<Declared<A>>,
}

impl<A: Message> Component<A> {
    /// Create a component with a fresh, inactive gadget.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self::with_gadget(Gadget::named(name))
    }

    /// Create a component around an existing gadget.
    pub fn with_gadget(gadget: Gadget) -> Self {
        Self {
            gadget,
            phase: Phase::Initial,
            declared: Vec::new(),
        }
    }

    /// The component's gadget.
    pub fn gadget(&self) -> &Gadget {
        &self.gadget
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Declare a handler under a key such as `hub/foo/bar(true)`.
    ///
    /// Declarations are subscribed by the next [`start`](Self::start).
    pub fn declare<H>(self, key: &str, handler: H) -> Result<Self, DeclarationError>
    where
        H: Handler<A>,
    {
        self.declare_with(key, HandlerRef::new(handler), SubscribeOptions::new())
    }

    /// Declare a handler with explicit options.
    ///
    /// The memory qualifier of `key` overrides the one in `options`.
    pub fn declare_with(
        mut self,
        key: &str,
        handler: HandlerRef<A>,
        options: SubscribeOptions<A>,
    ) -> Result<Self, DeclarationError> {
        let declaration = Declaration::parse(key)?;
        let options = options.with_memory(declaration.memory());
        self.declared.push(Declared {
            declaration,
            handler,
            options,
            subscribed: false,
        });
        Ok(self)
    }

    /// Start the component.
    ///
    /// Activates the gadget, subscribes every declaration not yet subscribed
    /// and drives any memory replays, returning their outcomes.
    pub async fn start(&mut self, hub: &Hub<A>) -> Result<Vec<HandlerOutcome>, LifecycleError> {
        if self.phase == Phase::Started {
            return Err(LifecycleError::AlreadyStarted(self.gadget.id()));
        }

        hub.activate(&self.gadget);
        self.phase = Phase::Started;

        let mut replays = Vec::new();
        for declared in self.declared.iter_mut().filter(|d| !d.subscribed) {
            let subscribed = hub.subscribe(
                declared.declaration.topic(),
                &declared.handler,
                &self.gadget,
                declared.options.clone(),
            );
            declared.subscribed = true;

            if let Subscribed::Replay(replay) = subscribed {
                replays.push(replay);
            }
        }

        hub_log!(
            debug,
            gadget = %self.gadget.id(),
            replays = replays.len(),
            "component started"
        );
        Ok(futures::future::join_all(replays).await)
    }

    /// Finalize the component. Its subscriptions stop firing but are kept.
    pub fn finalize(&mut self, hub: &Hub<A>) -> Result<(), LifecycleError> {
        if self.phase != Phase::Started {
            return Err(LifecycleError::NotStarted(self.gadget.id()));
        }

        hub.deactivate(&self.gadget);
        self.phase = Phase::Finalized;
        hub_log!(debug, gadget = %self.gadget.id(), "component finalized");
        Ok(())
    }

    /// Subscribe `handler` to `topic` for this component's gadget.
    pub fn on(
        &self,
        hub: &Hub<A>,
        topic: impl Into<Topic>,
        handler: &HandlerRef<A>,
    ) -> Subscribed {
        self.on_with(hub, topic, handler, SubscribeOptions::new())
    }

    /// Subscribe with explicit options.
    pub fn on_with(
        &self,
        hub: &Hub<A>,
        topic: impl Into<Topic>,
        handler: &HandlerRef<A>,
        options: SubscribeOptions<A>,
    ) -> Subscribed {
        hub.subscribe(topic, handler, &self.gadget, options)
    }

    /// Remove all of this component's subscriptions on `topic`.
    ///
    /// Declarations for `topic` are subscribed again by the next `start`.
    pub fn off(&mut self, hub: &Hub<A>, topic: &str) -> usize {
        for declared in &mut self.declared {
            if declared.declaration.topic().as_str() == topic {
                declared.subscribed = false;
            }
        }
        hub.unsubscribe_context(topic, &self.gadget)
    }

    /// Tear the component down, removing every subscription bound to its
    /// gadget, however it was made.
    ///
    /// Returns how many subscriptions were removed.
    pub fn dispose(self, hub: &Hub<A>) -> usize {
        hub.deactivate(&self.gadget);
        let removed = hub.release(&self.gadget);
        hub_log!(debug, gadget = %self.gadget.id(), removed, "component disposed");
        removed
    }
}

impl<A: Message> fmt::Debug for Component<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("gadget", &self.gadget)
            .field("phase", &self.phase)
            .field("declared", &self.declared.len())
            .finish()
    }
}
