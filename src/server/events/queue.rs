//! Deferred publish/subscribe queue for catalog events.

use super::{ServerEvent, ServerEventKind};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Subscriber callback invoked for each delivered event.
pub type EventHandler = Arc<dyn Fn(&ServerEvent) + Send + Sync>;

/// Ordered queue that decouples catalog mutation from notification.
///
/// [`EventQueue::enqueue`] never calls handlers. Events accumulate until
/// [`EventQueue::start_publishing`] drains them, in enqueue order, to every
/// handler subscribed to the event's kind. Events without subscribers are
/// dropped with a warning.
///
/// Handlers may enqueue further events or subscribe new handlers while a
/// flush is running. Events enqueued during a flush are delivered by that
/// same flush, after every event that was already queued. A nested call to
/// `start_publishing` from inside a handler returns immediately and leaves
/// the draining to the outer call.
///
/// # Examples
///
/// ```
/// use proxy_catalog::server::events::{EventQueue, ServerEventKind};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let queue = EventQueue::new();
/// let delivered = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&delivered);
/// queue.subscribe(ServerEventKind::Added, move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
/// queue.start_publishing();
/// assert_eq!(delivered.load(Ordering::SeqCst), 0);
/// ```
#[derive(Default)]
pub struct EventQueue {
    pending: Mutex<VecDeque<ServerEvent>>,
    handlers: RwLock<HashMap<ServerEventKind, Vec<EventHandler>>>,
    publishing: AtomicBool,
}

impl EventQueue {
    /// Creates an empty queue with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    ///
    /// Handlers for the same kind run in subscription order. A handler only
    /// sees events delivered after it subscribed.
    pub fn subscribe(
        &self,
        kind: ServerEventKind,
        handler: impl Fn(&ServerEvent) + Send + Sync + 'static,
    ) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Appends an event to the queue without delivering it.
    pub fn enqueue(&self, event: ServerEvent) {
        tracing::debug!(
            event_kind = %event.kind(),
            server_id = %event.server_id(),
            "event enqueued"
        );
        self.lock_pending().push_back(event);
    }

    /// Delivers every queued event to its subscribers and empties the queue.
    ///
    /// Delivery happens synchronously on the calling thread.
    pub fn start_publishing(&self) {
        if self.publishing.swap(true, Ordering::AcqRel) {
            return;
        }
        let _publishing = PublishingGuard(&self.publishing);

        let mut delivered = 0_usize;
        while let Some(event) = self.next_event() {
            let handlers = self.handlers_for(event.kind());
            if handlers.is_empty() {
                tracing::warn!(
                    event_kind = %event.kind(),
                    server_id = %event.server_id(),
                    "dropping event with no subscribers"
                );
                continue;
            }
            for handler in &handlers {
                handler(&event);
            }
            delivered += 1;
        }

        tracing::debug!(delivered, "event queue drained");
    }

    /// Returns the number of events waiting for delivery.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.lock_pending().len()
    }

    fn next_event(&self) -> Option<ServerEvent> {
        self.lock_pending().pop_front()
    }

    fn handlers_for(&self, kind: ServerEventKind) -> Vec<EventHandler> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    fn lock_pending(&self) -> MutexGuard<'_, VecDeque<ServerEvent>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the publishing flag even when a handler panics.
struct PublishingGuard<'a>(&'a AtomicBool);

impl Drop for PublishingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EventQueue")
            .field("pending", &self.pending_len())
            .field("publishing", &self.publishing.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
