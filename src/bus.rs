//! Change notification bus
//!
//! Single-slot publish/subscribe channels telling observers that the registry
//! or the reconciliation results changed. Each bus keeps only the most recent
//! notification; a late subscriber receives it immediately, before any newer
//! one. Subscribers that fall behind skip straight to the latest notification,
//! so consumers re-derive their own view from the registry rather than relying
//! on every delta.

use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::model::{CompareRecord, ConsoleSource, Game};

/// One published notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Change<T> {
    /// Monotonic publication counter, starting at 1
    pub sequence: u64,
    /// What changed
    pub delta: T,
}

/// Fresh reconciliation results for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareUpdate {
    pub source: ConsoleSource,
    pub records: Vec<CompareRecord>,
}

/// Bus carrying the games touched by each registry merge.
pub type RegistryBus = ChangeBus<Vec<Game>>;

/// Bus carrying reconciliation results.
pub type CompareBus = ChangeBus<CompareUpdate>;

/// Typed single-slot notification channel.
pub struct ChangeBus<T> {
    name: &'static str,
    sender: watch::Sender<Option<Change<T>>>,
}

impl<T> ChangeBus<T>
where
    T: Clone + Debug + Send + Sync + 'static,
{
    /// Create a bus with an empty slot.
    pub fn new(name: &'static str) -> Self {
        let (sender, _) = watch::channel(None);
        Self { name, sender }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Publish a notification, replacing the slot. Never fails, even without
    /// subscribers.
    pub fn publish(&self, delta: T) -> u64 {
        let mut sequence = 0;
        self.sender.send_modify(|slot| {
            sequence = slot.as_ref().map(|c| c.sequence).unwrap_or(0) + 1;
            trace!(bus = self.name, sequence, delta = ?delta, "Publishing change");
            *slot = Some(Change { sequence, delta });
        });
        sequence
    }

    /// The most recent notification, if any was published.
    pub fn latest(&self) -> Option<Change<T>> {
        self.sender.borrow().clone()
    }

    /// Subscribe, replaying the current notification first.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut receiver = self.sender.subscribe();
        let pending = receiver.borrow_and_update().clone();
        Subscription { receiver, pending }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Run `callback` for every notification on a background task.
    pub fn spawn_listener<F>(&self, callback: F) -> tokio::task::JoinHandle<()>
    where
        F: Fn(Change<T>) + Send + 'static,
    {
        let mut subscription = self.subscribe();
        let name = self.name;
        tokio::spawn(async move {
            while let Some(change) = subscription.next().await {
                callback(change);
            }
            debug!(bus = name, "Change bus closed, stopping listener");
        })
    }
}

/// Receiving side of a [`ChangeBus`].
pub struct Subscription<T> {
    receiver: watch::Receiver<Option<Change<T>>>,
    pending: Option<Change<T>>,
}

impl<T: Clone> Subscription<T> {
    /// Wait for the next notification. Returns `None` once the bus is dropped.
    pub async fn next(&mut self) -> Option<Change<T>> {
        if let Some(change) = self.pending.take() {
            return Some(change);
        }
        loop {
            self.receiver.changed().await.ok()?;
            if let Some(change) = self.receiver.borrow_and_update().clone() {
                return Some(change);
            }
        }
    }

    /// Take a notification that is already available without waiting.
    pub fn try_next(&mut self) -> Option<Change<T>> {
        if let Some(change) = self.pending.take() {
            return Some(change);
        }
        if self.receiver.has_changed().unwrap_or(false) {
            return self.receiver.borrow_and_update().clone();
        }
        None
    }
}

/// Mirror both buses into the debug log.
pub fn spawn_logging_listener(
    registry_bus: Arc<RegistryBus>,
    compare_bus: Arc<CompareBus>,
) -> (tokio::task::JoinHandle<()>, tokio::task::JoinHandle<()>) {
    let games = registry_bus.spawn_listener(|change| {
        debug!(
            sequence = change.sequence,
            games = change.delta.len(),
            "Registry changed"
        );
    });
    let compare = compare_bus.spawn_listener(|change| {
        debug!(
            sequence = change.sequence,
            source = %change.delta.source,
            records = change.delta.records.len(),
            "Compare data changed"
        );
    });
    (games, compare)
}
