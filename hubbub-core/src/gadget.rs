//! # Owning Contexts (Gadget)
//!
//! A [`Gadget`] is the component instance a handler runs against. Every
//! subscription is bound to one gadget, and every handler invocation receives
//! that gadget as an explicit argument instead of an implicit receiver.
//!
//! Each gadget owns a [`LifecycleFlag`]. The hub only *reads* the flag at
//! dispatch time; the lifecycle collaborator flips it when the component
//! finishes starting and when it begins finalizing.

use std::{
    borrow::Cow,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

static NEXT_GADGET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Gadget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GadgetId(u64);

impl GadgetId {
    fn next() -> Self {
        Self(NEXT_GADGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GadgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gadget-{}", self.0)
    }
}

/// Per-context "active" flag consulted by the dispatcher.
///
/// Starts inactive. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct LifecycleFlag(Arc<AtomicBool>);

impl LifecycleFlag {
    /// Create a new, inactive flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the owning context currently accepts deliveries.
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the context active, returning the previous state.
    pub fn activate(&self) -> bool {
        self.0.swap(true, Ordering::AcqRel)
    }

    /// Mark the context inactive, returning the previous state.
    pub fn deactivate(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

struct GadgetInner {
    id: GadgetId,
    name: Cow<'static, str>,
    lifecycle: LifecycleFlag,
}

/// A shared handle to an owning context.
///
/// Clones refer to the same gadget: they share identity and lifecycle flag.
///
/// # Example
///
/// ```rust,ignore
/// let gadget = Gadget::named("sidebar");
/// hub.subscribe("user/login", &handler, &gadget, SubscribeOptions::new());
/// hub.activate(&gadget);
/// ```
#[derive(Clone)]
pub struct Gadget {
    inner: Arc<GadgetInner>,
}

impl Gadget {
    /// Create an anonymous gadget.
    pub fn new() -> Self {
        Self::named("gadget")
    }

    /// Create a gadget with a name used in diagnostics.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: Arc::new(GadgetInner {
                id: GadgetId::next(),
                name: name.into(),
                lifecycle: LifecycleFlag::new(),
            }),
        }
    }

    /// The gadget's identity.
    pub fn id(&self) -> GadgetId {
        self.inner.id
    }

    /// The diagnostic name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The gadget's lifecycle flag.
    pub fn lifecycle(&self) -> &LifecycleFlag {
        &self.inner.lifecycle
    }

    /// Shorthand for `self.lifecycle().is_active()`.
    pub fn is_active(&self) -> bool {
        self.inner.lifecycle.is_active()
    }

    /// Whether both handles refer to the same gadget.
    pub fn same(&self, other: &Gadget) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Default for Gadget {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Gadget {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Gadget {}

impl fmt::Debug for Gadget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gadget")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("active", &self.is_active())
            .finish()
    }
}
