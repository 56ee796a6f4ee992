//! Per-display publish/subscribe channel.
//!
//! Delivery is synchronous on the posting thread and follows registration
//! order. The channel is `!Send`: every `post`, `subscribe` and `unregister`
//! on one channel happens on the thread that owns the display. Work from
//! other threads goes through `display::RemoteNotifier` instead.
//!
//! The registry keeps only `Weak` references. A subscriber dropped without
//! unregistering is pruned with a warning on the next post and never called.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};

use super::events::{DisplayEvent, EventKind};
use crate::config::ChannelSettings;
use crate::error::ChannelError;
use crate::traits::Subscriber;

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Registration handle, process-unique and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct Registration {
    id: SubscriberId,
    label: String,
    interest: Vec<EventKind>,
    subscriber: Weak<dyn Subscriber>,
}

/// A handler that returned an error or panicked during delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub subscriber: String,
    pub kind: EventKind,
    pub message: String,
}

/// Outcome of one `post` call, including queued events it drained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub kind: EventKind,
    /// Handler calls that completed successfully
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
    /// The event was posted from inside a handler and waits in the queue
    pub queued: bool,
    /// Queued events delivered after the main fan-out
    pub drained: usize,
    /// Events discarded because a queue limit was hit
    pub dropped: usize,
}

impl DeliveryReport {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            delivered: 0,
            failures: Vec::new(),
            queued: false,
            drained: 0,
            dropped: 0,
        }
    }

    /// Every handler succeeded and nothing was dropped
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.dropped == 0
    }

    fn absorb(&mut self, other: DeliveryReport) {
        self.delivered += other.delivered;
        self.failures.extend(other.failures);
        self.dropped += other.dropped;
        self.drained += 1;
    }
}

/// Publish/subscribe bus owned by one display window
pub struct DisplayEventChannel {
    name: String,
    settings: ChannelSettings,
    registry: RefCell<Vec<Registration>>,
    pending: RefCell<VecDeque<DisplayEvent>>,
    dispatching: Cell<bool>,
    self_ref: Weak<DisplayEventChannel>,
}

impl DisplayEventChannel {
    /// Create a channel; `name` only appears in log output
    pub fn new(name: impl Into<String>, settings: ChannelSettings) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|self_ref| Self {
            name,
            settings,
            registry: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
            self_ref: self_ref.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a subscriber for the event kinds it declares.
    ///
    /// Dropping or cancelling the returned token unregisters it.
    pub fn subscribe(
        &self,
        subscriber: Weak<dyn Subscriber>,
    ) -> Result<Subscription, ChannelError> {
        let strong = subscriber.upgrade().ok_or(ChannelError::SubscriberGone)?;
        let label = strong.label().to_string();
        let interest = strong.interest().to_vec();
        drop(strong);

        // Each registered Weak pins its allocation, so addresses cannot be reused here
        let mut registry = self.registry.borrow_mut();
        if registry.iter().any(|r| r.subscriber.ptr_eq(&subscriber)) {
            return Err(ChannelError::AlreadyRegistered { label });
        }

        let id = SubscriberId::next();
        debug!("{}: registered `{}` for {:?}", self.name, label, interest);
        registry.push(Registration {
            id,
            label,
            interest,
            subscriber,
        });

        Ok(Subscription {
            channel: self.self_ref.clone(),
            id,
            active: true,
        })
    }

    /// Remove a registration. Unknown ids are ignored and return false.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let Some(index) = registry.iter().position(|r| r.id == id) else {
            return false;
        };
        let removed = registry.remove(index);
        debug!("{}: unregistered `{}`", self.name, removed.label);
        true
    }

    pub fn is_registered(&self, id: SubscriberId) -> bool {
        self.registry.borrow().iter().any(|r| r.id == id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// True while a fan-out is running
    pub fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }

    /// Deliver an event to every matching subscriber.
    ///
    /// Posting from inside a handler queues the event; the outermost post
    /// delivers the queue in FIFO order once its own fan-out is done.
    pub fn post(&self, event: DisplayEvent) -> DeliveryReport {
        if self.dispatching.get() {
            return self.enqueue(event);
        }

        let _guard = DispatchGuard::enter(&self.dispatching);
        self.prune();

        let mut report = self.deliver(&event);
        let mut rounds = 0;
        while let Some(next) = self.next_pending() {
            if rounds >= self.settings.max_drain_rounds {
                let discarded = 1 + self.pending.borrow_mut().drain(..).count();
                warn!(
                    "{}: dropping {} queued event(s) after {} drain rounds",
                    self.name, discarded, rounds
                );
                report.dropped += discarded;
                break;
            }
            rounds += 1;
            report.absorb(self.deliver(&next));
        }

        report
    }

    fn enqueue(&self, event: DisplayEvent) -> DeliveryReport {
        let kind = event.kind();
        let mut report = DeliveryReport::new(kind);
        let mut pending = self.pending.borrow_mut();

        if pending.len() >= self.settings.max_queued_events {
            warn!("{}: re-entrant queue full, dropping {}", self.name, kind);
            report.dropped = 1;
        } else {
            debug!("{}: queued re-entrant {}", self.name, kind);
            pending.push_back(event);
            report.queued = true;
        }
        report
    }

    fn next_pending(&self) -> Option<DisplayEvent> {
        self.pending.borrow_mut().pop_front()
    }

    fn prune(&self) {
        let name = &self.name;
        self.registry.borrow_mut().retain(|r| {
            let alive = r.subscriber.strong_count() > 0;
            if !alive {
                warn!("{}: `{}` was dropped without unregistering", name, r.label);
            }
            alive
        });
    }

    fn deliver(&self, event: &DisplayEvent) -> DeliveryReport {
        let kind = event.kind();
        let mut report = DeliveryReport::new(kind);

        // Snapshot so handlers can subscribe or unregister mid fan-out
        let targets: Vec<(SubscriberId, String, Weak<dyn Subscriber>)> = self
            .registry
            .borrow()
            .iter()
            .filter(|r| r.interest.contains(&kind))
            .map(|r| (r.id, r.label.clone(), r.subscriber.clone()))
            .collect();

        for (id, label, weak) in targets {
            if !self.is_registered(id) {
                continue;
            }
            let Some(subscriber) = weak.upgrade() else {
                warn!("{}: `{}` was dropped without unregistering", self.name, label);
                self.unregister(id);
                continue;
            };

            let message = match panic::catch_unwind(AssertUnwindSafe(|| subscriber.handle(event))) {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(err)) => format!("{:#}", err),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };

            warn!("{}: `{}` failed on {}: {}", self.name, label, kind, message);
            report.failures.push(DeliveryFailure {
                subscriber: label,
                kind,
                message,
            });
        }

        report
    }
}

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

struct DispatchGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Registration token; the registration lives until it is cancelled or dropped
#[derive(Debug)]
#[must_use = "dropping a Subscription unregisters it immediately"]
pub struct Subscription {
    channel: Weak<DisplayEventChannel>,
    id: SubscriberId,
    active: bool,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Unregister now. Later calls do nothing and return false.
    pub fn cancel(&mut self) -> bool {
        if !std::mem::replace(&mut self.active, false) {
            return false;
        }
        self.channel
            .upgrade()
            .map_or(false, |channel| channel.unregister(self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
