//! The environment a router lives in: where locations come from and where
//! navigation goes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::channel::mpsc;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Receiver for location changes that happen outside the router.
pub type LocationChanges = mpsc::UnboundedReceiver<LocationChange>;

/// A location change reported by the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChange {
    /// The location after the change.
    pub location: String,
}

/// Identifies a subscription so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// An active subscription to location changes.
#[derive(Debug)]
pub struct Subscription {
    /// Pass to [`Environment::unsubscribe`].
    pub id: SubscriptionId,
    /// Change notifications.
    pub changes: LocationChanges,
}

/// How navigation is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMethod {
    /// Add a new history entry.
    #[default]
    Push,
    /// Overwrite the current entry.
    Replace,
}

/// Options for [`crate::Router::navigate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigateOptions {
    /// Title recorded with the entry.
    pub title: String,
    /// Arbitrary state recorded with the entry.
    pub state: serde_json::Value,
    /// Push or replace.
    pub history_method: HistoryMethod,
}

impl NavigateOptions {
    /// Creates default options (push, no title, null state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the entry state.
    #[must_use]
    pub fn state(mut self, state: serde_json::Value) -> Self {
        self.state = state;
        self
    }

    /// Replaces the current entry instead of pushing a new one.
    #[must_use]
    pub fn replace(mut self) -> Self {
        self.history_method = HistoryMethod::Replace;
        self
    }
}

/// The host a router reads locations from and writes navigation to.
pub trait Environment: Send {
    /// Returns the current location (path and query string).
    fn current_location(&self) -> String;

    /// Persists a new location.
    fn navigate(&mut self, location: &str, options: &NavigateOptions);

    /// Starts receiving location changes made outside the router.
    ///
    /// Returns `None` when the environment never reports changes.
    fn subscribe(&mut self) -> Option<Subscription>;

    /// Stops a subscription.
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// A recorded history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Location of the entry.
    pub location: String,
    /// Title given when the entry was recorded.
    pub title: String,
    /// State given when the entry was recorded.
    pub state: serde_json::Value,
}

impl HistoryEntry {
    fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            title: String::new(),
            state: serde_json::Value::Null,
        }
    }
}

#[derive(Debug)]
struct HistoryInner {
    entries: Vec<HistoryEntry>,
    index: usize,
    next_id: u64,
    listeners: Vec<(SubscriptionId, mpsc::UnboundedSender<LocationChange>)>,
}

impl HistoryInner {
    fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    fn notify(&mut self) {
        let change = LocationChange {
            location: self.current().location.clone(),
        };
        trace!(location = %change.location, listeners = self.listeners.len(), "location changed");
        self.listeners
            .retain(|(_, tx)| tx.unbounded_send(change.clone()).is_ok());
    }
}

/// An in-memory session history.
///
/// Clones share the same history, so a test or host can keep a handle while
/// a router owns another. [`MemoryHistory::back`] and
/// [`MemoryHistory::forward`] notify subscribers; navigation through the
/// router does not.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    inner: Arc<Mutex<HistoryInner>>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryHistory {
    /// Creates a history with a single entry.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HistoryInner {
                entries: vec![HistoryEntry::new(initial)],
                index: 0,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current location.
    pub fn location(&self) -> String {
        self.lock().current().location.clone()
    }

    /// Returns the current entry.
    pub fn current_entry(&self) -> HistoryEntry {
        self.lock().current().clone()
    }

    /// Returns every entry, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().entries.clone()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns true if the history holds no entry; never the case.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Returns the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Adds an entry after the current one, dropping any forward entries.
    pub fn push(&self, entry: HistoryEntry) {
        let mut inner = self.lock();
        let keep = inner.index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(entry);
        inner.index = keep;
    }

    /// Overwrites the current entry.
    pub fn replace(&self, entry: HistoryEntry) {
        let mut inner = self.lock();
        let index = inner.index;
        inner.entries[index] = entry;
    }

    /// Moves one entry back and notifies subscribers.
    ///
    /// Returns false if already at the oldest entry.
    pub fn back(&self) -> bool {
        let mut inner = self.lock();
        if inner.index == 0 {
            return false;
        }
        inner.index -= 1;
        inner.notify();
        true
    }

    /// Moves one entry forward and notifies subscribers.
    ///
    /// Returns false if already at the newest entry.
    pub fn forward(&self) -> bool {
        let mut inner = self.lock();
        if inner.index + 1 >= inner.entries.len() {
            return false;
        }
        inner.index += 1;
        inner.notify();
        true
    }
}

impl Environment for MemoryHistory {
    fn current_location(&self) -> String {
        self.location()
    }

    fn navigate(&mut self, location: &str, options: &NavigateOptions) {
        let entry = HistoryEntry {
            location: location.to_string(),
            title: options.title.clone(),
            state: options.state.clone(),
        };
        match options.history_method {
            HistoryMethod::Push => self.push(entry),
            HistoryMethod::Replace => self.replace(entry),
        }
    }

    fn subscribe(&mut self) -> Option<Subscription> {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        let (tx, changes) = mpsc::unbounded();
        inner.listeners.push((id, tx));
        Some(Subscription { id, changes })
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.lock().listeners.retain(|(listener, _)| *listener != id);
    }
}
