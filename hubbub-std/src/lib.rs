//! # hubbub-std
//!
//! Standard implementations for the hubbub publish/subscribe hub.
//!
//! This crate provides:
//! - **Hub**: [`hub::Hub`], the subscribe / unsubscribe / publish surface
//! - **Storage**: [`registry::TopicRegistry`], [`memory::MemoryStore`]
//! - **Delivery**: the [`delivery::Publish`] and [`delivery::Replay`] futures
//! - **Lifecycle**: [`component::Component`] and declarative keys
//! - **Testing**: handler doubles in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use hubbub_core;

#[macro_use]
mod log;

// Modules
pub mod component;
pub mod config;
pub mod declaration;
pub mod delivery;
pub mod hub;
pub mod memory;
pub mod registry;
pub mod testing;
