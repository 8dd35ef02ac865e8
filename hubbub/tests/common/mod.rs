#![allow(dead_code)]

use hubbub::{Gadget, Handler, HandlerRef, Hub, Message};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Argument Types
// ============================================================================

/// Positional `(flag, label)` arguments.
pub type Args = (bool, &'static str);

// ============================================================================
// Test Handlers
// ============================================================================

/// Records its id when it starts and `id + 100` after yielding once.
pub struct OrderRecordingHandler {
    pub id: usize,
    pub order: Arc<Mutex<Vec<usize>>>,
    pub yields: bool,
}

impl<A: Message> Handler<A> for OrderRecordingHandler {
    type Output = ();

    async fn call(&self, _context: Gadget, _args: Arc<A>) {
        self.order.lock().unwrap().push(self.id);
        if self.yields {
            tokio::task::yield_now().await;
            self.order.lock().unwrap().push(self.id + 100);
        }
    }
}

pub fn order_handler<A: Message>(
    id: usize,
    order: &Arc<Mutex<Vec<usize>>>,
    yields: bool,
) -> HandlerRef<A> {
    HandlerRef::new(OrderRecordingHandler {
        id,
        order: Arc::clone(order),
        yields,
    })
}

// ============================================================================
// Fixtures
// ============================================================================

/// A fresh hub plus an already active gadget.
pub fn active_hub<A: Message>(name: &'static str) -> (Hub<A>, Gadget) {
    let hub = Hub::new();
    let gadget = Gadget::named(name);
    hub.activate(&gadget);
    (hub, gadget)
}
