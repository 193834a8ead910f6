//! Receiver registry
//!
//! Shared list of broadcast observers. A single instance normally lives for
//! the whole process, but managers always receive it by injection.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::connector::{Broadcast, BroadcastObserver};

/// Registration surface the connection manager depends on
pub trait ReceiverRegistry: Send + Sync {
    fn add_observer(&self, observer: Arc<dyn BroadcastObserver>);
    fn remove_observer(&self, observer: &Arc<dyn BroadcastObserver>);
}

static GLOBAL: Lazy<Arc<BroadcastRegistry>> = Lazy::new(|| Arc::new(BroadcastRegistry::new()));

/// In-process registry that fans broadcasts out to its observers
#[derive(Default)]
pub struct BroadcastRegistry {
    observers: RwLock<Vec<Arc<dyn BroadcastObserver>>>,
}

impl BroadcastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance
    pub fn global() -> Arc<BroadcastRegistry> {
        GLOBAL.clone()
    }

    /// Deliver a broadcast to every registered observer.
    ///
    /// Observers run outside the lock and may add or remove observers.
    pub fn dispatch(&self, broadcast: &Broadcast) -> usize {
        let observers: Vec<_> = self.observers.read().iter().cloned().collect();
        trace!(action = %broadcast.action, observers = observers.len(), "Dispatching broadcast");

        for observer in &observers {
            observer.on_broadcast(broadcast);
        }
        observers.len()
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Check whether `observer` is registered
    pub fn contains(&self, observer: &Arc<dyn BroadcastObserver>) -> bool {
        self.observers
            .read()
            .iter()
            .any(|existing| same_observer(existing, observer))
    }
}

impl ReceiverRegistry for BroadcastRegistry {
    fn add_observer(&self, observer: Arc<dyn BroadcastObserver>) {
        let mut observers = self.observers.write();
        if observers.iter().any(|existing| same_observer(existing, &observer)) {
            return;
        }
        observers.push(observer);
        debug!(observers = observers.len(), "Observer registered");
    }

    fn remove_observer(&self, observer: &Arc<dyn BroadcastObserver>) {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|existing| !same_observer(existing, observer));
        if observers.len() != before {
            debug!(observers = observers.len(), "Observer unregistered");
        }
    }
}

// Compare data pointers only; vtable pointers for the same type may differ
// between codegen units.
fn same_observer(a: &Arc<dyn BroadcastObserver>, b: &Arc<dyn BroadcastObserver>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}
