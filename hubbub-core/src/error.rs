//! Error types for hubbub.
//!
//! - [`HandlerFailure`] - One handler failed during a delivery
//! - [`FailureKind`] - How it failed (error, panic, timeout)
//! - [`PublishError`] - Aggregate failure of a publish call
//! - [`LifecycleError`] - Illegal component lifecycle transition
//! - [`DeclarationError`] - Malformed declarative handler key

use crate::{gadget::GadgetId, report::PublishReport, topic::Topic};
use std::time::Duration;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// How a single handler invocation failed.
#[derive(Error, Debug)]
pub enum FailureKind {
    /// The handler panicked, either while being called or while polled.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// The handler did not resolve within the configured limit.
    #[error("handler timed out after {0:?}")]
    Timeout(Duration),

    /// The handler returned an error.
    #[error(transparent)]
    Error(BoxError),
}

/// A failure of one handler during one delivery.
///
/// Failures are isolated: they never prevent sibling handlers from running.
#[derive(Error, Debug)]
#[error("handler at position {position} of {context} on topic `{topic}` failed")]
pub struct HandlerFailure {
    /// The topic being delivered.
    pub topic: Topic,
    /// The context the handler was bound to.
    pub context: GadgetId,
    /// Position of the subscription in the topic's list at dispatch time.
    pub position: usize,
    /// What went wrong.
    #[source]
    pub kind: FailureKind,
}

impl HandlerFailure {
    /// Whether the handler panicked.
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, FailureKind::Panic(_))
    }

    /// Whether the handler timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, FailureKind::Timeout(_))
    }
}

/// The aggregate result of a publish in which at least one handler failed.
///
/// The full per-handler report is carried along, including the outcomes of
/// handlers that succeeded.
#[derive(Error, Debug)]
pub enum PublishError {
    /// One or more handlers failed.
    #[error(
        "{} of {} handler(s) failed on topic `{}`",
        .0.failure_count(),
        .0.len(),
        .0.topic()
    )]
    HandlerFailed(PublishReport),
}

impl PublishError {
    /// The per-handler report.
    pub fn report(&self) -> &PublishReport {
        match self {
            PublishError::HandlerFailed(report) => report,
        }
    }

    /// Consume the error, returning the per-handler report.
    pub fn into_report(self) -> PublishReport {
        match self {
            PublishError::HandlerFailed(report) => report,
        }
    }
}

/// Errors raised by the component lifecycle collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// `start` was called on a component that is already started.
    #[error("{0} is already started")]
    AlreadyStarted(GadgetId),

    /// `finalize` was called on a component that is not started.
    #[error("{0} is not started")]
    NotStarted(GadgetId),
}

/// Errors raised when translating a declarative handler key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    /// The key does not start with the `hub/` prefix.
    #[error("declaration `{0}` does not start with `hub/`")]
    MissingPrefix(String),

    /// Nothing follows the prefix.
    #[error("declaration `{0}` names no topic")]
    EmptyTopic(String),

    /// Parentheses are not balanced or appear inside the topic.
    #[error("declaration `{0}` has an unbalanced qualifier")]
    Unbalanced(String),

    /// The parenthesised qualifier is not `true` or `false`.
    #[error("declaration `{key}` has unknown qualifier `{qualifier}`")]
    UnknownQualifier {
        /// The full key.
        key: String,
        /// The qualifier found between the parentheses.
        qualifier: String,
    },
}
