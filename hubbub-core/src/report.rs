//! Per-handler outcomes and the aggregate publish report.

use crate::{
    error::{HandlerFailure, PublishError},
    gadget::GadgetId,
    topic::Topic,
};

/// The outcome of one handler invocation.
#[derive(Debug)]
pub struct HandlerOutcome {
    /// The context the handler was bound to.
    pub context: GadgetId,
    /// Position of the subscription in the topic's list at dispatch time.
    pub position: usize,
    /// Success, or the isolated failure.
    pub result: Result<(), HandlerFailure>,
}

impl HandlerOutcome {
    /// Whether the handler completed without failing.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&HandlerFailure> {
        self.result.as_ref().err()
    }
}

/// The outcomes of every handler invoked by one publish, in registration
/// order.
///
/// Handlers skipped because their context was inactive or their predicate
/// did not match do not appear.
#[derive(Debug)]
pub struct PublishReport {
    topic: Topic,
    outcomes: Vec<HandlerOutcome>,
}

impl PublishReport {
    /// Build a report.
    pub fn new(topic: Topic, outcomes: Vec<HandlerOutcome>) -> Self {
        Self { topic, outcomes }
    }

    /// The published topic.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// All outcomes, in registration order.
    pub fn outcomes(&self) -> &[HandlerOutcome] {
        &self.outcomes
    }

    /// Number of handlers invoked.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no handler was invoked.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of handlers that completed successfully.
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Iterate over the failures.
    pub fn failures(&self) -> impl Iterator<Item = &HandlerFailure> {
        self.outcomes.iter().filter_map(HandlerOutcome::failure)
    }

    /// Number of handlers that failed.
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Whether every invoked handler succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(HandlerOutcome::is_ok)
    }

    /// `Ok(self)` when every handler succeeded, otherwise
    /// [`PublishError::HandlerFailed`] carrying this report.
    pub fn into_result(self) -> Result<Self, PublishError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(PublishError::HandlerFailed(self))
        }
    }
}
