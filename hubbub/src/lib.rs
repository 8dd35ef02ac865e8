//! # hubbub - In-Process Publish/Subscribe Hub
//!
//! `hubbub` routes published events to subscribed handlers inside a single
//! process. Every handler runs against an owning [`Gadget`] that is passed to
//! it explicitly, and only fires while that gadget is active.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hubbub::prelude::*;
//! use std::sync::Arc;
//!
//! let hub = Hub::<(bool, &'static str)>::new();
//! let gadget = Gadget::named("panel");
//!
//! let handler = HandlerRef::new(|gadget: Gadget, args: Arc<(bool, &'static str)>| async move {
//!     println!("{} got {:?}", gadget.name(), args);
//! });
//! let _ = hub.subscribe(
//!     "foo",
//!     &handler,
//!     &gadget,
//!     SubscribeOptions::new().with_predicate(|args: &(bool, &'static str)| args.0),
//! );
//!
//! hub.activate(&gadget);
//! hub.publish("foo", (true, "y")).await?;
//! ```
//!
//! ## Guarantees
//!
//! - Handlers of one publish start in registration order.
//! - A publish sees the subscriptions that existed when it was called.
//! - Inactive gadgets and failing predicates skip delivery.
//! - A failing or panicking handler never stops its siblings; failures are
//!   reported in aggregate through [`PublishError`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use hubbub_core::{
    // Errors
    BoxError,
    DeclarationError,
    // Handler
    DynHandler,
    FailureKind,
    // Context
    Gadget,
    GadgetId,
    Handler,
    HandlerFailure,
    // Report
    HandlerOutcome,
    HandlerRef,
    IntoOutcome,
    LifecycleError,
    LifecycleFlag,
    // Message
    Message,
    // Subscription
    Predicate,
    PublishError,
    PublishReport,
    SubscribeOptions,
    Subscription,
    Topic,
};

// Hub
pub use hubbub_std::{
    config::{HubBuilder, HubConfig},
    delivery::{Publish, Replay},
    hub::{Hub, Subscribed},
};

// Lifecycle collaborator
pub use hubbub_std::{
    component::{Component, Phase},
    declaration::Declaration,
};

/// Storage backing a hub.
pub mod storage {
    pub use hubbub_std::{
        memory::MemoryStore,
        registry::{Snapshot, TopicRegistry},
    };
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use hubbub_std::testing::*;
}

/// Prelude module - common imports for hubbub.
///
/// # Usage
///
/// ```rust,ignore
/// use hubbub::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Lifecycle
        Component,
        // Core types
        Gadget,
        Handler,
        HandlerRef,
        // Hub
        Hub,
        Message,
        // Errors
        PublishError,
        PublishReport,
        SubscribeOptions,
        Subscribed,
        Topic,
    };
}
