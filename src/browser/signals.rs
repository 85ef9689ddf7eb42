//! Multicast signals for host subscribers.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Slot<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// A named multicast event.
///
/// `emit` works on a snapshot of the subscriber list taken before the first
/// handler runs, so handlers may subscribe or unsubscribe (themselves
/// included) while a firing is in progress.
pub struct Signal<T> {
    name: &'static str,
    slots: Mutex<Vec<(SubscriptionId, Slot<T>)>>,
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new(name: &'static str) -> Self {
        Self { name, slots: Mutex::new(Vec::new()) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed));
        self.slots.lock().push((id, Arc::new(handler)));
        id
    }

    /// Returns whether `id` was subscribed to this signal.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|(slot_id, _)| *slot_id != id);
        slots.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn emit(&self, payload: &T) {
        let snapshot: Vec<Slot<T>> = self
            .slots
            .lock()
            .iter()
            .map(|(_, slot)| slot.clone())
            .collect();

        for slot in snapshot {
            slot(payload);
        }
    }
}
