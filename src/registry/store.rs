//! Subscriber registry implementation
//!
//! The set of sinks that receive every converted buffer. Mutation happens
//! from the session-control side while dispatch runs on the frame thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::media::{DisplayOrientation, ScaleFactor, TimedMediaBuffer};

use super::subscriber::{BufferSubscriber, SubscriberId};

struct Entry {
    id: SubscriberId,
    subscriber: Arc<dyn BufferSubscriber>,
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Subscribers that accepted the buffer
    pub delivered: usize,
    /// Subscribers that returned an error or panicked
    pub failed: usize,
}

/// Thread-safe, ordered set of buffer subscribers
///
/// Copy-on-write: attach and detach replace the whole `Arc<Vec<_>>`, and
/// dispatch clones the current `Arc` under a read lock held only for that
/// clone. Subscriber callbacks never run with the lock held, so they may
/// attach or detach (including themselves) without deadlocking.
pub struct SubscriberRegistry {
    entries: RwLock<Arc<Vec<Entry>>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Attach a subscriber
    ///
    /// Idempotent: attaching a subscriber that is already present returns
    /// its existing id and does not add a second delivery.
    pub fn attach(&self, subscriber: Arc<dyn BufferSubscriber>) -> SubscriberId {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = entries
            .iter()
            .find(|e| std::ptr::addr_eq(Arc::as_ptr(&e.subscriber), Arc::as_ptr(&subscriber)))
        {
            tracing::debug!(subscriber = %existing.id, "Subscriber already attached");
            return existing.id;
        }

        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut next: Vec<Entry> = entries
            .iter()
            .map(|e| Entry {
                id: e.id,
                subscriber: Arc::clone(&e.subscriber),
            })
            .collect();
        next.push(Entry { id, subscriber });
        *entries = Arc::new(next);

        tracing::debug!(subscriber = %id, subscribers = entries.len(), "Subscriber attached");
        id
    }

    /// Detach a subscriber by id
    ///
    /// Returns `false` if it was not attached. Detaching an absent
    /// subscriber is not an error.
    pub fn detach(&self, id: SubscriberId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if !entries.iter().any(|e| e.id == id) {
            tracing::debug!(subscriber = %id, "Subscriber not attached");
            return false;
        }

        let next: Vec<Entry> = entries
            .iter()
            .filter(|e| e.id != id)
            .map(|e| Entry {
                id: e.id,
                subscriber: Arc::clone(&e.subscriber),
            })
            .collect();
        *entries = Arc::new(next);

        tracing::debug!(subscriber = %id, subscribers = entries.len(), "Subscriber detached");
        true
    }

    /// Whether a subscriber id is currently attached
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.snapshot().iter().any(|e| e.id == id)
    }

    /// Number of attached subscribers
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a buffer to every subscriber, in attach order
    ///
    /// A failing or panicking subscriber is logged and skipped; the rest
    /// still receive the buffer.
    pub fn dispatch(
        &self,
        buffer: &TimedMediaBuffer,
        orientation: DisplayOrientation,
        scale: ScaleFactor,
    ) -> DispatchReport {
        let entries = self.snapshot();
        let mut report = DispatchReport::default();

        for entry in entries.iter() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                entry.subscriber.on_buffer(buffer, orientation, scale)
            }));

            match result {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::warn!(subscriber = %entry.id, error = %e, "Subscriber rejected buffer");
                }
                Err(_) => {
                    report.failed += 1;
                    tracing::warn!(subscriber = %entry.id, "Subscriber panicked during dispatch");
                }
            }
        }

        report
    }

    fn snapshot(&self) -> Arc<Vec<Entry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&entries)
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
