//! # Dispatch Bus
//!
//! Priority-ordered, short-circuiting fan-out of input events to competing
//! handlers.
//!
//! The bus keeps one lane of registrations per [`Category`], sorted by
//! descending priority with insertion order breaking ties. Dispatch offers an
//! event to each handler in turn and stops at the first [`Outcome::Consumed`];
//! an event nobody consumes is dropped silently, which is a valid outcome.
//!
//! ## Re-entrancy
//!
//! Dispatch iterates over a snapshot of the lane taken at dispatch start and
//! holds no lane lock while a handler runs, so a handler may subscribe or
//! unsubscribe (itself included) mid-dispatch. Each registration carries an
//! active flag that unsubscribe clears, making cancellation effective
//! immediately: a handler unsubscribed during a pass is skipped even if it was
//! in the snapshot.
//!
//! ## Handler failures
//!
//! A panicking handler must not rob lower-priority handlers of the event. The
//! invocation is wrapped in `catch_unwind`; a panic is logged at error level
//! and treated as [`Outcome::PassThrough`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::{error, trace};

use crate::event::{Category, InputEvent, Outcome};

/// Handler callback signature
///
/// Invoked synchronously during dispatch; must stay cheap, since every tick's
/// events wait on it.
pub type Handler = Box<dyn FnMut(&InputEvent) -> Outcome + Send>;

struct Registration {
    id: u64,
    priority: i32,
    active: AtomicBool,
    handler: Mutex<Handler>,
}

struct BusInner {
    next_id: AtomicU64,
    lanes: [Mutex<Vec<Arc<Registration>>>; 3],
}

/// Priority-arbitrated event fan-out
///
/// Cheap to clone; clones share the same registration lists.
#[derive(Clone)]
pub struct DispatchBus {
    inner: Arc<BusInner>,
}

impl Default for DispatchBus {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_id: AtomicU64::new(0),
                lanes: [
                    Mutex::new(Vec::new()),
                    Mutex::new(Vec::new()),
                    Mutex::new(Vec::new()),
                ],
            }),
        }
    }

    /// Register a handler for one category
    ///
    /// Higher `priority` runs first; among equal priorities, earlier
    /// registrations run first. The returned [`Subscription`] removes the
    /// registration when dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, category: Category, priority: i32, handler: F) -> Subscription
    where
        F: FnMut(&InputEvent) -> Outcome + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let registration = Arc::new(Registration {
            id,
            priority,
            active: AtomicBool::new(true),
            handler: Mutex::new(Box::new(handler)),
        });

        let mut lane = lock_lane(&self.inner.lanes[category.lane()]);
        lane.push(registration);
        // Stable sort: equal priorities keep registration order.
        lane.sort_by(|a, b| b.priority.cmp(&a.priority));
        trace!(
            "Subscribed handler {} to {:?} at priority {} ({} registered)",
            id,
            category,
            priority,
            lane.len()
        );

        Subscription {
            bus: Arc::downgrade(&self.inner),
            category,
            id,
        }
    }

    /// Offer an event to the category's handlers, highest priority first
    ///
    /// Stops at the first handler reporting [`Outcome::Consumed`]. Returns
    /// the overall outcome: `Consumed` if any handler took the event,
    /// `PassThrough` if it fell off the end of the chain.
    pub fn dispatch(&self, category: Category, event: &InputEvent) -> Outcome {
        // Snapshot, then release the lane before any handler runs.
        let chain: Vec<Arc<Registration>> =
            lock_lane(&self.inner.lanes[category.lane()]).clone();

        for registration in chain {
            if !registration.active.load(Ordering::Acquire) {
                continue;
            }
            if invoke(&registration, event).is_consumed() {
                trace!(
                    "Event {:?} consumed by handler {}",
                    event,
                    registration.id
                );
                return Outcome::Consumed;
            }
        }
        Outcome::PassThrough
    }

    /// Number of live registrations for a category
    pub fn registered(&self, category: Category) -> usize {
        lock_lane(&self.inner.lanes[category.lane()]).len()
    }

    /// Drop every registration in every category
    ///
    /// Part of teardown; outstanding [`Subscription`] handles become no-ops.
    pub fn clear(&self) {
        for category in Category::ALL {
            let mut lane = lock_lane(&self.inner.lanes[category.lane()]);
            for registration in lane.drain(..) {
                registration.active.store(false, Ordering::Release);
            }
        }
    }
}

/// Run one handler, translating a panic into PassThrough
fn invoke(registration: &Registration, event: &InputEvent) -> Outcome {
    let mut handler = match registration.handler.lock() {
        Ok(guard) => guard,
        // A previous panic poisoned the handler lock; the closure state is
        // still usable for our purposes.
        Err(poisoned) => poisoned.into_inner(),
    };
    match panic::catch_unwind(AssertUnwindSafe(|| (*handler)(event))) {
        Ok(outcome) => outcome,
        Err(_) => {
            error!(
                "Handler {} panicked on {:?}; treating as pass-through",
                registration.id, event
            );
            Outcome::PassThrough
        }
    }
}

fn lock_lane(lane: &Mutex<Vec<Arc<Registration>>>) -> MutexGuard<'_, Vec<Arc<Registration>>> {
    match lane.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Reversible registration handle
///
/// Removing the registration is idempotent: explicit `unsubscribe` calls
/// after the first, and the implicit removal on drop, are no-ops. Holding the
/// handle is what keeps the registration alive, so bind it to a named
/// variable.
#[must_use = "dropping a Subscription immediately unsubscribes its handler"]
pub struct Subscription {
    bus: Weak<BusInner>,
    category: Category,
    id: u64,
}

impl Subscription {
    /// Remove the registration from the bus
    ///
    /// Effective immediately: no event dispatched after this call reaches the
    /// handler, including later events of an in-flight dispatch pass.
    pub fn unsubscribe(&self) {
        let Some(inner) = self.bus.upgrade() else {
            return; // Bus already torn down.
        };
        let mut lane = lock_lane(&inner.lanes[self.category.lane()]);
        if let Some(position) = lane.iter().position(|r| r.id == self.id) {
            let registration = lane.remove(position);
            registration.active.store(false, Ordering::Release);
            trace!("Unsubscribed handler {} from {:?}", self.id, self.category);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
