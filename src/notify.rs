//! Transient user-facing notifications with timed auto-expiry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Every notification dismisses itself after this long unless removed
/// explicitly first.
pub const DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

/// Change events observed by subscribers (the toast container re-renders
/// on each).
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    Added(Notification),
    Removed(String),
}

struct Entry {
    note: Notification,
    timer: JoinHandle<()>,
}

struct BusInner {
    entries: Mutex<Vec<Entry>>,
    events: broadcast::Sender<NotificationEvent>,
    seq: AtomicU64,
}

/// Process-wide queue of transient messages, displayed in insertion
/// order. Each entry owns its own expiry timer, so removing one never
/// disturbs the others.
///
/// `add` spawns the expiry timer and must run inside a tokio runtime.
#[derive(Clone)]
pub struct NotificationBus {
    inner: Arc<BusInner>,
}

impl NotificationBus {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(BusInner {
                entries: Mutex::new(Vec::new()),
                events,
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Queue a notification and schedule its removal. Returns the id, for
    /// callers that want to dismiss early.
    pub fn add(&self, message: impl Into<String>, kind: NotificationKind) -> String {
        let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("{}-{:06x}", seq, rand::random::<u32>() & 0xff_ffff);
        let note = Notification {
            id: id.clone(),
            message: message.into(),
            kind,
            created_at: Utc::now(),
        };

        let timer = {
            let bus = self.clone();
            let id = id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(DISMISS_AFTER).await;
                bus.remove(&id);
            })
        };

        let mut entries = self.inner.entries.lock().expect("notification lock");
        entries.push(Entry {
            note: note.clone(),
            timer,
        });
        drop(entries);

        // Nobody listening is fine.
        let _ = self.inner.events.send(NotificationEvent::Added(note));
        id
    }

    /// Dismiss a notification and cancel its pending timer. Unknown ids
    /// are ignored.
    pub fn remove(&self, id: &str) {
        let removed = {
            let mut entries = self.inner.entries.lock().expect("notification lock");
            entries
                .iter()
                .position(|e| e.note.id == id)
                .map(|pos| entries.remove(pos))
        };
        if let Some(entry) = removed {
            entry.timer.abort();
            let _ = self
                .inner
                .events
                .send(NotificationEvent::Removed(entry.note.id));
        }
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.add(message, NotificationKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.add(message, NotificationKind::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.add(message, NotificationKind::Info)
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.add(message, NotificationKind::Warning)
    }

    /// Current notifications in insertion order.
    pub fn snapshot(&self) -> Vec<Notification> {
        let entries = self.inner.entries.lock().expect("notification lock");
        entries.iter().map(|e| e.note.clone()).collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_added_notification_is_present_then_expires() {
        let bus = NotificationBus::new();
        let id = bus.add("Ticket created successfully!", NotificationKind::Success);

        let snapshot = bus.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].kind, NotificationKind::Success);

        tokio::time::sleep(DISMISS_AFTER + Duration::from_millis(100)).await;
        assert!(bus.snapshot().is_empty(), "Notification should auto-expire");
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_remove_cancels_timer() {
        let bus = NotificationBus::new();
        let id = bus.add("gone soon", NotificationKind::Info);
        bus.remove(&id);
        assert!(bus.snapshot().is_empty());

        // The cancelled timer must not fire anything later.
        tokio::time::sleep(DISMISS_AFTER * 2).await;
        assert!(bus.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_unknown_id_is_a_no_op() {
        let bus = NotificationBus::new();
        bus.add("still here", NotificationKind::Warning);
        bus.remove("not-an-id");
        assert_eq!(bus.snapshot().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insertion_order_preserved_and_independent_timers() {
        let bus = NotificationBus::new();
        let first = bus.add("first", NotificationKind::Info);
        tokio::time::sleep(Duration::from_secs(3)).await;
        let second = bus.add("second", NotificationKind::Error);

        let ids: Vec<String> = bus.snapshot().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first.clone(), second.clone()]);

        // Another 3 seconds expires the first entry only.
        tokio::time::sleep(Duration::from_secs(3)).await;
        let ids: Vec<String> = bus.snapshot().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![second]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_add_and_remove_events() {
        let bus = NotificationBus::new();
        let mut events = bus.subscribe();

        let id = bus.add("observable", NotificationKind::Success);
        match events.recv().await.unwrap() {
            NotificationEvent::Added(note) => assert_eq!(note.id, id),
            other => panic!("Expected Added event, got {other:?}"),
        }

        bus.remove(&id);
        match events.recv().await.unwrap() {
            NotificationEvent::Removed(removed) => assert_eq!(removed, id),
            other => panic!("Expected Removed event, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_unique() {
        let bus = NotificationBus::new();
        let a = bus.add("a", NotificationKind::Info);
        let b = bus.add("b", NotificationKind::Info);
        assert_ne!(a, b);
    }
}
