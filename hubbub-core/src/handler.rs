//! # Handlers
//!
//! A handler is the function a subscription runs when its topic is
//! published. It receives the owning [`Gadget`] explicitly, plus the shared
//! published arguments.
//!
//! # Usage Patterns
//!
//! 1. **Direct closure**: `|gadget, args| async move { ... }`
//! 2. **Struct implementation**: `impl Handler<MyArgs> for MyHandler`
//!
//! Registration and removal are by *identity*, so handlers are wrapped once
//! in a [`HandlerRef`] and that reference (or a clone of it) is used for both
//! `subscribe` and `unsubscribe`.

use crate::{error::BoxError, gadget::Gadget, message::Message, outcome::IntoOutcome};
use std::{fmt, future::Future, pin::Pin, sync::Arc};

/// The function run for each eligible delivery.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle arguments of type `{A}`",
    label = "missing `Handler<{A}>` implementation",
    note = "Handlers implement `call(&self, Gadget, Arc<{A}>)` or are closures of that shape."
)]
pub trait Handler<A: Message>: Send + Sync + 'static {
    /// The output of the handler, `()` or a `Result`.
    type Output: IntoOutcome;

    /// Executes the handler logic against the owning context.
    fn call(&self, context: Gadget, args: Arc<A>) -> impl Future<Output = Self::Output> + Send;
}

// Blanket impl for closures
impl<A, F, Fut> Handler<A> for F
where
    A: Message,
    F: Fn(Gadget, Arc<A>) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: IntoOutcome,
{
    type Output = Fut::Output;

    fn call(&self, context: Gadget, args: Arc<A>) -> impl Future<Output = Self::Output> + Send {
        (self)(context, args)
    }
}

/// Dynamic object-safe version of [`Handler`].
pub trait DynHandler<A: Message>: Send + Sync + 'static {
    /// Executes the handler, converting its output into an outcome.
    ///
    /// The handler is called before returning; only its future is deferred.
    fn call_dyn<'a>(
        &'a self,
        context: Gadget,
        args: Arc<A>,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

impl<A: Message, H: Handler<A>> DynHandler<A> for H {
    fn call_dyn<'a>(
        &'a self,
        context: Gadget,
        args: Arc<A>,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        let call = self.call(context, args);
        Box::pin(async move { call.await.into_outcome() })
    }
}

/// A shared, type-erased handler with pointer identity.
///
/// Two `HandlerRef`s are the same handler exactly when one is a clone of the
/// other.
pub struct HandlerRef<A: Message> {
    inner: Arc<dyn DynHandler<A>>,
}

impl<A: Message> HandlerRef<A> {
    /// Wrap a handler.
    pub fn new<H: Handler<A>>(handler: H) -> Self {
        Self {
            inner: Arc::new(handler),
        }
    }

    /// Whether both references point at the same handler.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Invoke the handler.
    pub fn call<'a>(
        &'a self,
        context: Gadget,
        args: Arc<A>,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        self.inner.call_dyn(context, args)
    }
}

impl<A: Message> Clone for HandlerRef<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Message> fmt::Debug for HandlerRef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerRef")
            .field(&Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}
