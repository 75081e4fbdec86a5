use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use super::event::{known_event_names, SubjectKind};
use super::payload::Snapshot;
use super::transport::Envelope;
use crate::ids::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub event_id: Uuid,
    pub event: String,
    pub subject_kind: SubjectKind,
    pub subject_id: RecordId,
    pub data: Snapshot,
    pub received_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedChange {
    Appended,
    Duplicate,
    /// Event name the feed does not handle.
    Ignored,
}

/// Entries (and remembered event ids) a session keeps before evicting the oldest.
pub const FEED_CAPACITY: usize = 500;

/// Session-local notification list, de-duplicated by event id.
///
/// Bounded: `seen` only tracks ids still present in `entries`, so an evicted
/// event arriving again would be appended as new.
#[derive(Debug)]
pub struct NotificationFeed {
    entries: Vec<FeedEntry>,
    seen: HashSet<Uuid>,
    known: HashSet<String>,
    unread: usize,
    capacity: usize,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::with_capacity(FEED_CAPACITY)
    }
}

impl NotificationFeed {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
            known: known_event_names().into_iter().collect(),
            unread: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn apply(&mut self, envelope: Envelope) -> FeedChange {
        if !self.known.contains(&envelope.event) {
            return FeedChange::Ignored;
        }
        if !self.seen.insert(envelope.event_id) {
            return FeedChange::Duplicate;
        }

        self.entries.push(FeedEntry {
            event_id: envelope.event_id,
            event: envelope.event,
            subject_kind: envelope.subject_kind,
            subject_id: envelope.subject_id,
            data: envelope.data,
            received_at: Utc::now(),
            read: false,
        });
        self.unread += 1;
        self.evict_overflow();
        FeedChange::Appended
    }

    fn evict_overflow(&mut self) {
        let overflow = self.entries.len().saturating_sub(self.capacity);
        for evicted in self.entries.drain(..overflow) {
            self.seen.remove(&evicted.event_id);
            if !evicted.read {
                self.unread -= 1;
            }
        }
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn mark_read(&mut self, event_id: Uuid) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.event_id == event_id && !entry.read)
        {
            Some(entry) => {
                entry.read = true;
                self.unread -= 1;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for entry in &mut self.entries {
            entry.read = true;
        }
        self.unread = 0;
    }
}

/// Shareable handle over a feed that publishes the unread count on every change.
#[derive(Debug, Clone)]
pub struct FeedStore {
    feed: Arc<Mutex<NotificationFeed>>,
    unread_tx: Arc<watch::Sender<usize>>,
}

impl Default for FeedStore {
    fn default() -> Self {
        let (unread_tx, _) = watch::channel(0);
        Self {
            feed: Arc::new(Mutex::new(NotificationFeed::default())),
            unread_tx: Arc::new(unread_tx),
        }
    }
}

impl FeedStore {
    pub fn apply(&self, envelope: Envelope) -> FeedChange {
        self.update(|feed| feed.apply(envelope))
    }

    pub fn mark_read(&self, event_id: Uuid) -> bool {
        self.update(|feed| feed.mark_read(event_id))
    }

    pub fn mark_all_read(&self) {
        self.update(NotificationFeed::mark_all_read)
    }

    pub fn entries(&self) -> Vec<FeedEntry> {
        self.feed
            .lock()
            .expect("feed mutex poisoned")
            .entries()
            .to_vec()
    }

    pub fn unread(&self) -> usize {
        self.feed.lock().expect("feed mutex poisoned").unread()
    }

    /// Receiver that observes the unread counter.
    pub fn watch_unread(&self) -> watch::Receiver<usize> {
        self.unread_tx.subscribe()
    }

    fn update<T>(&self, change: impl FnOnce(&mut NotificationFeed) -> T) -> T {
        let mut feed = self.feed.lock().expect("feed mutex poisoned");
        let result = change(&mut feed);
        self.unread_tx.send_replace(feed.unread());
        result
    }
}
