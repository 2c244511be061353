//! Typed multicast event sources
//!
//! An [`EventSource<T>`] holds an ordered list of handlers and dispatches a
//! payload to each of them, synchronously and in subscription order.
//!
//! Dispatch works on a snapshot of the handler list taken when [`EventSource::invoke`]
//! starts:
//! - handlers subscribed while a dispatch is running are first called on the
//!   next `invoke`
//! - handlers unregistered while a dispatch is running are skipped if they
//!   have not been reached yet
//!
//! No `RefCell` borrow is held while a handler runs, so handlers may freely
//! subscribe, unregister, or trigger nested dispatches.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::error::{DispatchError, HandlerFailure, ObservableError};

new_key_type! {
    /// Unique identifier for a subscription on an event source
    pub struct SubscriptionId;
}

/// Handler stored by an event source
type Handler<T> = Rc<dyn Fn(&T) -> anyhow::Result<()>>;

const UNLABELED: &str = "<unlabeled>";

struct Subscriber<T> {
    handler: Handler<T>,
    /// Cleared on unregister so in-flight snapshots skip the handler.
    live: Rc<Cell<bool>>,
}

struct SourceState<T> {
    label: &'static str,
    subscribers: SlotMap<SubscriptionId, Subscriber<T>>,
    /// Subscription order. Slot map iteration order is not insertion order.
    order: Vec<SubscriptionId>,
}

/// Type-erased view of a source, used by [`Registration`] to detach itself.
trait Detach {
    fn detach(&self, id: SubscriptionId) -> bool;
}

impl<T> Detach for RefCell<SourceState<T>> {
    fn detach(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut state = self.borrow_mut();
            let removed = state.subscribers.remove(id);
            if removed.is_some() {
                state.order.retain(|other| *other != id);
            }
            removed
        };

        // The handler is dropped outside the borrow; its captures may own
        // guards for this same source.
        match removed {
            Some(subscriber) => {
                subscriber.live.set(false);
                true
            }
            None => false,
        }
    }
}

/// A typed multicast notification channel.
///
/// Owned by exactly one entity; it is deliberately not `Clone`.
pub struct EventSource<T: 'static> {
    state: Rc<RefCell<SourceState<T>>>,
}

impl<T: 'static> EventSource<T> {
    pub fn new() -> Self {
        Self::with_label(UNLABELED)
    }

    /// Create a source with a label used in trace output and errors
    pub fn with_label(label: &'static str) -> Self {
        Self {
            state: Rc::new(RefCell::new(SourceState {
                label,
                subscribers: SlotMap::with_key(),
                order: Vec::new(),
            })),
        }
    }

    pub fn label(&self) -> &'static str {
        self.state.borrow().label
    }

    /// Subscribe a handler.
    ///
    /// Subscribing the same closure twice creates two independent
    /// registrations; each must be unregistered separately.
    pub fn subscribe<F>(&self, handler: F) -> Registration
    where
        F: Fn(&T) + 'static,
    {
        self.subscribe_fallible(move |payload| {
            handler(payload);
            Ok(())
        })
    }

    /// Subscribe a handler that can fail.
    ///
    /// A failure does not stop the dispatch; it is reported to the caller of
    /// [`invoke`](Self::invoke) once every handler has run.
    pub fn subscribe_fallible<F>(&self, handler: F) -> Registration
    where
        F: Fn(&T) -> anyhow::Result<()> + 'static,
    {
        let live = Rc::new(Cell::new(true));
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.subscribers.insert(Subscriber {
                handler: Rc::new(handler),
                live: Rc::clone(&live),
            });
            state.order.push(id);
            id
        };

        let weak: Weak<RefCell<SourceState<T>>> = Rc::downgrade(&self.state);
        let source: Weak<dyn Detach> = weak;
        Registration { id, source, live }
    }

    /// Dispatch `payload` to every handler subscribed when the call starts.
    ///
    /// All handlers run even if some fail. The failures are returned together,
    /// in the order the handlers ran.
    pub fn invoke(&self, payload: &T) -> Result<(), DispatchError> {
        let (label, snapshot) = {
            let state = self.state.borrow();
            let snapshot: SmallVec<[(SubscriptionId, Handler<T>, Rc<Cell<bool>>); 4]> = state
                .order
                .iter()
                .filter_map(|id| {
                    state
                        .subscribers
                        .get(*id)
                        .map(|sub| (*id, Rc::clone(&sub.handler), Rc::clone(&sub.live)))
                })
                .collect();
            (state.label, snapshot)
        };

        trace!(source = label, handlers = snapshot.len(), "dispatching event");

        let mut failures = Vec::new();
        for (id, handler, live) in snapshot {
            if !live.get() {
                continue;
            }
            if let Err(error) = handler(payload) {
                warn!(source = label, subscription = ?id, "event handler failed: {error:#}");
                failures.push(HandlerFailure {
                    subscription: id,
                    error,
                });
            }
        }

        match DispatchError::from_failures(failures) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Remove a subscription, checking that it belongs to this source.
    ///
    /// Returns `Ok(false)` if the registration was already removed.
    pub fn remove(&self, registration: &Registration) -> Result<bool, ObservableError> {
        if !self.owns(registration) {
            return Err(ObservableError::InvalidHandler {
                subscription: registration.id,
                source_label: self.label(),
            });
        }
        Ok(self.state.detach(registration.id))
    }

    /// Check whether a registration is currently subscribed to this source
    pub fn is_subscribed(&self, registration: &Registration) -> bool {
        self.owns(registration) && self.state.borrow().subscribers.contains_key(registration.id)
    }

    /// Number of subscribed handlers
    pub fn len(&self) -> usize {
        self.state.borrow().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().order.is_empty()
    }

    /// Unregister every handler
    pub fn clear(&self) {
        let removed: Vec<Subscriber<T>> = {
            let mut state = self.state.borrow_mut();
            state.order.clear();
            state.subscribers.drain().map(|(_, sub)| sub).collect()
        };
        for subscriber in &removed {
            subscriber.live.set(false);
        }
    }

    fn owns(&self, registration: &Registration) -> bool {
        registration.source.as_ptr() as *const () == Rc::as_ptr(&self.state) as *const ()
    }
}

impl<T: 'static> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventSource")
            .field("label", &state.label)
            .field("handlers", &state.order.len())
            .finish()
    }
}

/// Handle returned by [`EventSource::subscribe`].
///
/// Dropping a `Registration` leaves the handler subscribed. Call
/// [`unregister`](Self::unregister), or convert it with
/// [`into_guard`](Self::into_guard) to unsubscribe on drop.
#[must_use = "the handler stays subscribed until `unregister` is called"]
pub struct Registration {
    id: SubscriptionId,
    source: Weak<dyn Detach>,
    live: Rc<Cell<bool>>,
}

impl Registration {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove this subscription from its source.
    ///
    /// Returns `true` if the handler was removed by this call. Calling it
    /// again, or after the source is gone, is a no-op.
    pub fn unregister(&self) -> bool {
        match self.source.upgrade() {
            Some(source) => source.detach(self.id),
            None => false,
        }
    }

    /// Whether the handler is still subscribed to a live source
    pub fn is_active(&self) -> bool {
        self.live.get() && self.source.strong_count() > 0
    }

    /// Convert into a guard that unregisters when dropped
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard {
            registration: Some(self),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// RAII guard that unregisters its subscription on drop.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct SubscriptionGuard {
    registration: Option<Registration>,
}

impl SubscriptionGuard {
    /// Give back the registration without unsubscribing
    pub fn release(mut self) -> Registration {
        match self.registration.take() {
            Some(registration) => registration,
            None => unreachable!("guard registration is only taken once"),
        }
    }

    pub fn is_active(&self) -> bool {
        self.registration
            .as_ref()
            .is_some_and(Registration::is_active)
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.unregister();
        }
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("active", &self.is_active())
            .finish()
    }
}
