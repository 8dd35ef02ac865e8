//! # Handler delivery
//!
//! Turns an eligible subscription plus shared arguments into a future that
//! resolves to a [`HandlerOutcome`], and aggregates those futures into the
//! [`Publish`] future returned by `Hub::publish`.
//!
//! ## Rules
//! - **Eager start**: every delivery is polled once as soon as it is
//!   scheduled, in registration order, so a handler's synchronous prologue
//!   runs inside `publish` (or `subscribe`, for a replay) while its context
//!   is known to be active.
//! - **Ordered start**: [`Publish`] polls its handlers in registration order
//!   on every wake-up, so handler `n` always begins before handler `n + 1`.
//! - **Isolation**: errors and panics are caught per handler and recorded;
//!   siblings keep running.
//! - **No cancellation**: a handler that never resolves only holds back its
//!   own publish (unless the `timeout` feature bounds it).

use futures::{
    FutureExt,
    future::{BoxFuture, MaybeDone},
};
use hubbub_core::{
    BoxError, FailureKind, GadgetId, HandlerFailure, HandlerOutcome, Message, PublishError,
    PublishReport, Subscription, Topic,
};
use std::{
    any::Any,
    fmt,
    future::Future,
    panic::AssertUnwindSafe,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

type Delivery = BoxFuture<'static, HandlerOutcome>;

/// Build the outcome future for one handler invocation.
pub(crate) fn deliver<A: Message>(
    subscription: Arc<Subscription<A>>,
    position: usize,
    args: Arc<A>,
    limit: Option<Duration>,
) -> Delivery {
    let topic = subscription.topic().clone();
    let context = subscription.context().id();

    let call = async move {
        let invocation = subscription
            .handler()
            .call(subscription.context().clone(), args);
        bounded(invocation, limit).await
    };

    AssertUnwindSafe(call)
        .catch_unwind()
        .map(move |caught| {
            let kind = match caught {
                Ok(Ok(())) => None,
                Ok(Err(kind)) => Some(kind),
                Err(panic) => Some(FailureKind::Panic(panic_message(&*panic))),
            };
            outcome(topic, context, position, kind)
        })
        .boxed()
}

/// An outcome that is known before any handler runs.
pub(crate) fn settled(
    topic: Topic,
    context: GadgetId,
    position: usize,
    kind: FailureKind,
) -> Delivery {
    let outcome = outcome(topic, context, position, Some(kind));
    futures::future::ready(outcome).boxed()
}

fn outcome(
    topic: Topic,
    context: GadgetId,
    position: usize,
    kind: Option<FailureKind>,
) -> HandlerOutcome {
    let result = match kind {
        None => Ok(()),
        Some(kind) => {
            hub_log!(warn, %topic, %context, position, error = %kind, "handler failed");
            Err(HandlerFailure {
                topic,
                context,
                position,
                kind,
            })
        }
    };
    HandlerOutcome {
        context,
        position,
        result,
    }
}

#[cfg(feature = "timeout")]
async fn bounded<F>(invocation: F, limit: Option<Duration>) -> Result<(), FailureKind>
where
    F: Future<Output = Result<(), BoxError>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, invocation).await {
            Ok(result) => result.map_err(FailureKind::Error),
            Err(_) => Err(FailureKind::Timeout(limit)),
        },
        None => invocation.await.map_err(FailureKind::Error),
    }
}

#[cfg(not(feature = "timeout"))]
async fn bounded<F>(invocation: F, _limit: Option<Duration>) -> Result<(), FailureKind>
where
    F: Future<Output = Result<(), BoxError>>,
{
    invocation.await.map_err(FailureKind::Error)
}

/// Run a freshly scheduled delivery up to its first suspension point.
///
/// The delivery is polled again with a real waker by its owner, which
/// re-registers interest for whatever it is waiting on.
fn start(slot: &mut MaybeDone<Delivery>) {
    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    let _ = Pin::new(slot).poll(&mut cx);
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The aggregate result of a publish.
///
/// Every handler has already been started when `publish` returns. The
/// future resolves once every invoked handler has resolved: `Ok` with the
/// report if all succeeded, otherwise [`PublishError::HandlerFailed`]
/// carrying it. Dropping it abandons handlers still suspended.
#[must_use = "handlers suspended past their first await only finish while the publish is polled"]
pub struct Publish {
    topic: Topic,
    handlers: Vec<MaybeDone<Delivery>>,
}

impl Publish {
    pub(crate) fn new(topic: Topic, handlers: Vec<Delivery>) -> Self {
        let mut handlers: Vec<_> = handlers.into_iter().map(MaybeDone::Future).collect();
        for slot in &mut handlers {
            start(slot);
        }
        Self { topic, handlers }
    }

    /// The published topic.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Number of handlers this publish invoked.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Future for Publish {
    type Output = Result<PublishReport, PublishError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut pending = false;

        for handler in &mut this.handlers {
            if Pin::new(handler).poll(cx).is_pending() {
                pending = true;
            }
        }

        if pending {
            return Poll::Pending;
        }

        let outcomes = this
            .handlers
            .iter_mut()
            .filter_map(|handler| Pin::new(handler).take_output())
            .collect();
        Poll::Ready(PublishReport::new(this.topic.clone(), outcomes).into_result())
    }
}

impl fmt::Debug for Publish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publish")
            .field("topic", &self.topic)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Delivery of a topic's remembered publish to a newly added
/// memory-qualified subscription.
///
/// The handler has already been started when `subscribe` returns, so the
/// replay fires even if this value is dropped. Awaiting it drives a handler
/// that suspended to completion and yields its outcome.
pub struct Replay {
    inner: MaybeDone<Delivery>,
}

impl Replay {
    pub(crate) fn new(inner: Delivery) -> Self {
        let mut inner = MaybeDone::Future(inner);
        start(&mut inner);
        Self { inner }
    }

    /// Whether the replayed handler has already resolved.
    pub fn is_finished(&self) -> bool {
        matches!(self.inner, MaybeDone::Done(_))
    }
}

impl Future for Replay {
    type Output = HandlerOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = Pin::new(&mut self.inner);
        if inner.as_mut().poll(cx).is_pending() {
            return Poll::Pending;
        }
        match inner.take_output() {
            Some(outcome) => Poll::Ready(outcome),
            None => Poll::Pending,
        }
    }
}

impl fmt::Debug for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replay")
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingHandler;
    use hubbub_core::{Gadget, HandlerRef, SubscribeOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn subscription(handler: HandlerRef<u32>) -> Arc<Subscription<u32>> {
        Arc::new(Subscription::new(
            "t".into(),
            handler,
            Gadget::new(),
            SubscribeOptions::new(),
        ))
    }

    #[test]
    fn test_panic_message_variants() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*payload), "static");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*payload), "owned");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*payload), "unknown panic");
    }

    #[tokio::test]
    async fn test_deliver_catches_panic() {
        let handler = HandlerRef::new(|_: Gadget, _: Arc<u32>| -> std::future::Ready<()> {
            panic!("kaboom")
        });

        let outcome = deliver(subscription(handler), 3, Arc::new(1), None).await;
        let failure = outcome.failure().expect("handler should fail");

        assert_eq!(outcome.position, 3);
        assert!(failure.is_panic());
        assert_eq!(failure.kind.to_string(), "handler panicked: kaboom");
    }

    #[tokio::test]
    async fn test_deliver_records_error() {
        let handler = HandlerRef::new(|_: Gadget, args: Arc<u32>| async move {
            Err::<(), _>(std::io::Error::other(format!("bad {args}")))
        });

        let outcome = deliver(subscription(handler), 0, Arc::new(9), None).await;
        assert_eq!(outcome.failure().unwrap().kind.to_string(), "bad 9");
    }

    #[tokio::test]
    async fn test_publish_starts_handlers_before_first_poll() {
        let started = Arc::new(AtomicUsize::new(0));
        let handler = {
            let started = Arc::clone(&started);
            HandlerRef::new(move |_: Gadget, _: Arc<u32>| {
                let started = Arc::clone(&started);
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        let publish = Publish::new(
            "t".into(),
            vec![deliver(subscription(handler), 0, Arc::new(1), None)],
        );
        assert_eq!(started.load(Ordering::SeqCst), 1);

        let report = publish.await.unwrap();
        assert_eq!(report.delivered(), 1);
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_replay_runs_without_being_awaited() {
        let counter = CountingHandler::new();
        let replay = Replay::new(deliver(
            subscription(HandlerRef::new(counter.clone())),
            0,
            Arc::new(1),
            None,
        ));

        assert!(replay.is_finished());
        drop(replay);
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test]
    async fn test_publish_future_empty() {
        let report = Publish::new("t".into(), Vec::new()).await.unwrap();
        assert!(report.is_empty());
    }
}
