//! Hub configuration and builder.

use crate::{hub::Hub, memory::MemoryStore, registry::TopicRegistry};
use hubbub_core::Message;
use std::{marker::PhantomData, time::Duration};

/// Settings fixed at hub construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// Remember the last publish per topic for memory-qualified
    /// subscriptions. Default: `true`.
    pub memory: bool,
    /// Upper bound on each handler invocation. Only honoured with the
    /// `timeout` feature. Default: none.
    pub handler_timeout: Option<Duration>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            memory: true,
            handler_timeout: None,
        }
    }
}

/// Builder for constructing a [`Hub`].
///
/// # Example
/// ```ignore
/// let hub = HubBuilder::<MyArgs>::new()
///     .memory(false)
///     .build();
/// ```
pub struct HubBuilder<A: Message> {
    config: HubConfig,
    _args: PhantomData<fn(A)>,
}

impl<A: Message> HubBuilder<A> {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: HubConfig::default(),
            _args: PhantomData,
        }
    }

    /// Start from an existing configuration.
    pub fn with_config(config: HubConfig) -> Self {
        Self {
            config,
            _args: PhantomData,
        }
    }

    /// Enable or disable the memory store.
    pub fn memory(mut self, memory: bool) -> Self {
        self.config.memory = memory;
        self
    }

    /// Bound every handler invocation by `limit`.
    ///
    /// Expiry is reported as a handler failure. Requires a Tokio runtime
    /// with the time driver enabled.
    #[cfg(feature = "timeout")]
    pub fn handler_timeout(mut self, limit: Duration) -> Self {
        self.config.handler_timeout = Some(limit);
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Build the hub.
    pub fn build(self) -> Hub<A> {
        Hub::from_parts(TopicRegistry::new(), MemoryStore::new(), self.config)
    }
}

impl<A: Message> Default for HubBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}
