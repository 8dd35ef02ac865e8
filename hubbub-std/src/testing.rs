//! Testing utilities for hubbub.
//!
//! Handler doubles that make it easy to assert what a hub delivered.
//!
//! # Features
//!
//! - [`RecordingHandler`]: records every delivery it receives
//! - [`CountingHandler`]: counts deliveries
//! - [`FailingHandler`]: fails every delivery, by error or by panic

use hubbub_core::{BoxError, Gadget, GadgetId, Handler, Message};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records every delivery it receives.
///
/// Clones share the same record, so keep one clone for assertions and hand
/// another to the hub.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHandler::<u32>::new();
/// hub.subscribe("t", &HandlerRef::new(recorder.clone()), &gadget, SubscribeOptions::new());
///
/// hub.publish("t", 7).await?;
/// assert_eq!(recorder.args(), vec![7]);
/// ```
pub struct RecordingHandler<A> {
    deliveries: Arc<Mutex<Vec<(GadgetId, A)>>>,
}

impl<A: Clone> RecordingHandler<A> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            deliveries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The recorded deliveries, as `(context, args)` pairs.
    pub fn deliveries(&self) -> Vec<(GadgetId, A)> {
        self.deliveries.lock().unwrap().clone()
    }

    /// The recorded arguments, in delivery order.
    pub fn args(&self) -> Vec<A> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, args)| args.clone())
            .collect()
    }

    /// Number of recorded deliveries.
    pub fn count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    /// Clear all recorded deliveries.
    pub fn clear(&self) {
        self.deliveries.lock().unwrap().clear();
    }
}

impl<A: Clone> Default for RecordingHandler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for RecordingHandler<A> {
    fn clone(&self) -> Self {
        Self {
            deliveries: Arc::clone(&self.deliveries),
        }
    }
}

impl<A: Message + Clone> Handler<A> for RecordingHandler<A> {
    type Output = ();

    async fn call(&self, context: Gadget, args: Arc<A>) {
        self.deliveries
            .lock()
            .unwrap()
            .push((context.id(), (*args).clone()));
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that only counts its deliveries.
#[derive(Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of deliveries so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<A: Message> Handler<A> for CountingHandler {
    type Output = ();

    async fn call(&self, _context: Gadget, _args: Arc<A>) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that fails every delivery.
#[derive(Clone)]
pub struct FailingHandler {
    message: &'static str,
    panic: bool,
    calls: Arc<AtomicUsize>,
}

impl FailingHandler {
    /// Fail by returning an error with `message`.
    pub fn error(message: &'static str) -> Self {
        Self {
            message,
            panic: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail by panicking with `message`.
    pub fn panic(message: &'static str) -> Self {
        Self {
            panic: true,
            ..Self::error(message)
        }
    }

    /// How many times the handler was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<A: Message> Handler<A> for FailingHandler {
    type Output = Result<(), BoxError>;

    async fn call(&self, _context: Gadget, _args: Arc<A>) -> Result<(), BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic {
            panic!("{}", self.message);
        }
        Err(self.message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubbub_core::IntoOutcome;

    #[tokio::test]
    async fn test_recording_handler_shares_record() {
        let recorder = RecordingHandler::<u32>::new();
        let gadget = Gadget::new();

        recorder.clone().call(gadget.clone(), Arc::new(3)).await;
        assert_eq!(recorder.deliveries(), vec![(gadget.id(), 3)]);

        recorder.clear();
        assert_eq!(recorder.count(), 0);
    }

    #[tokio::test]
    async fn test_failing_handler_errors() {
        let failing = FailingHandler::error("nope");
        let result = Handler::<u32>::call(&failing, Gadget::new(), Arc::new(0)).await;

        assert_eq!(result.into_outcome().unwrap_err().to_string(), "nope");
        assert_eq!(failing.calls(), 1);
    }
}
