//! # hubbub-core
//!
//! Core traits and types for the hubbub in-process publish/subscribe hub.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! components that only need to *describe* handlers and subscriptions,
//! without pulling in the dispatcher from `hubbub-std`.
//!
//! # Vocabulary
//!
//! - **Topic** ([`Topic`]): a flat string naming an event channel.
//! - **Gadget** ([`Gadget`]): the owning context a handler runs against. Its
//!   [`LifecycleFlag`] decides whether the handler may fire at all.
//! - **Handler** ([`Handler`], [`HandlerRef`]): the async function run per
//!   delivery, compared by identity.
//! - **Subscription** ([`Subscription`], [`SubscribeOptions`]): binds the
//!   three together, optionally gated by a [`Predicate`] and marked for
//!   memory replay.
//! - **Report** ([`PublishReport`], [`HandlerOutcome`]): what happened to each
//!   invoked handler.
//!
//! # Error Types
//!
//! - [`HandlerFailure`] - One handler failed; siblings are unaffected
//! - [`PublishError`] - At least one handler of a publish failed
//! - [`LifecycleError`] / [`DeclarationError`] - Collaborator errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod gadget;
mod handler;
mod message;
mod outcome;
mod report;
mod subscription;
mod topic;

// Re-exports
pub use error::{
    BoxError, DeclarationError, FailureKind, HandlerFailure, LifecycleError, PublishError,
};
pub use gadget::{Gadget, GadgetId, LifecycleFlag};
pub use handler::{DynHandler, Handler, HandlerRef};
pub use message::Message;
pub use outcome::IntoOutcome;
pub use report::{HandlerOutcome, PublishReport};
pub use subscription::{Predicate, SubscribeOptions, Subscription};
pub use topic::Topic;
