//! Subscriber registry

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DeliveryError;
use crate::snapshot::Snapshot;

/// Messages queued per subscriber before new snapshots are dropped for it
pub const SUBSCRIBER_QUEUE_CAPACITY: usize = 8;

/// Result of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    /// Subscribers the snapshot was queued for
    pub delivered: usize,
    /// Subscribers whose queue was full; they miss this snapshot only
    pub skipped: usize,
    /// Closed subscribers removed from the registry
    pub dropped: usize,
}

/// Live dashboard observers keyed by connection id
///
/// Every subscriber is a bounded queue drained by its own writer task, so
/// a slow observer never stalls the cycle or the other observers.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<HashMap<Uuid, mpsc::Sender<Arc<str>>>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its id and message queue
    #[must_use]
    pub fn register(&self) -> (Uuid, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);
        let id = Uuid::new_v4();
        self.lock().insert(id, tx);
        debug!(subscriber = %id, "Subscriber registered");
        (id, rx)
    }

    /// Removes a subscriber; unknown ids are ignored
    pub fn deregister(&self, id: Uuid) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "Subscriber deregistered");
        }
        removed
    }

    /// Number of registered subscribers
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nobody is subscribed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Queues `snapshot` for every subscriber
    ///
    /// Serializes once. Never blocks and never fails: closed subscribers
    /// are removed, full queues skip this snapshot.
    pub fn broadcast(&self, snapshot: &Snapshot) -> BroadcastSummary {
        let payload: Arc<str> = match snapshot.to_json() {
            Ok(json) => Arc::from(json),
            Err(e) => {
                warn!(error = %DeliveryError::Serialize(e.to_string()), "Snapshot not broadcast");
                return BroadcastSummary::default();
            }
        };
        self.broadcast_payload(&payload)
    }

    /// Queues an already serialized payload for every subscriber
    pub fn broadcast_payload(&self, payload: &Arc<str>) -> BroadcastSummary {
        let _span = tracing::debug_span!(crate::tracing::span_names::FANOUT_BROADCAST).entered();
        let mut summary = BroadcastSummary::default();
        let mut subscribers = self.lock();

        subscribers.retain(|id, tx| {
            if tx.is_closed() {
                warn!(error = %DeliveryError::Closed(*id), "Dropping subscriber");
                summary.dropped += 1;
                return false;
            }
            match tx.try_send(Arc::clone(payload)) {
                Ok(()) => {
                    summary.delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    debug!(subscriber = %id, "Subscriber queue full, snapshot skipped");
                    summary.skipped += 1;
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(error = %DeliveryError::Closed(*id), "Dropping subscriber");
                    summary.dropped += 1;
                    false
                }
            }
        });

        debug!(
            subscribers = subscribers.len(),
            delivered = summary.delivered,
            skipped = summary.skipped,
            dropped = summary.dropped,
            "Snapshot broadcast"
        );
        summary
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, mpsc::Sender<Arc<str>>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
