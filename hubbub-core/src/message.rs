//! Message trait for published argument types.

/// A marker trait for values published through a hub.
///
/// Every handler of a publish observes the same shared value, so messages
/// must be `Send + Sync + 'static`. Positional argument lists are modelled by
/// whatever type the application picks: a tuple, a `Vec` of a value enum, or
/// a domain event.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// struct Moved { x: i32, y: i32 }
///
/// // `Moved` is a `Message` through the blanket implementation.
/// hub.publish("cursor/moved", Moved { x: 1, y: 2 });
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Arguments published through a hub are shared between handlers."
)]
pub trait Message: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Message for T {}
