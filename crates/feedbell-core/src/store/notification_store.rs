use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::models::{has_next_page, ClientNotificationItem, Cursor, NotificationRecord, UserId};

/// Immutable view of the store at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationSnapshot {
    pub user_id: Option<UserId>,
    /// Newest first, unique by id
    pub items: Vec<ClientNotificationItem>,
    pub cursor: Option<Cursor>,
    pub has_next: bool,
    pub loading: bool,
    pub loading_more: bool,
    /// Authoritative server count; independent of `items`
    pub badge_unread_count: u64,
}

impl NotificationSnapshot {
    pub fn get(&self, id: &str) -> Option<&ClientNotificationItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Unread items in the loaded window. Not the badge.
    pub fn loaded_unread(&self) -> usize {
        self.items.iter().filter(|i| !i.is_read).count()
    }
}

/// Single in-memory source of truth for the notification feed.
///
/// Every mutation builds a fresh [`NotificationSnapshot`] and swaps it in
/// atomically, so readers never observe a half-applied change.
pub struct NotificationStore {
    tx: watch::Sender<Arc<NotificationSnapshot>>,
    // Serializes read-modify-publish so concurrent writers can't lose updates
    write_lock: Mutex<()>,
}

impl NotificationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(NotificationSnapshot::default()));
        Self {
            tx,
            write_lock: Mutex::new(()),
        }
    }

    // ===== Getters =====

    pub fn snapshot(&self) -> Arc<NotificationSnapshot> {
        self.tx.borrow().clone()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<NotificationSnapshot>> {
        self.tx.subscribe()
    }

    // ===== Mutations =====

    fn update<R>(&self, f: impl FnOnce(&mut NotificationSnapshot) -> R) -> R {
        let _guard = self.write_lock.lock();
        let mut next = NotificationSnapshot::clone(&self.tx.borrow());
        let result = f(&mut next);
        self.tx.send_replace(Arc::new(next));
        result
    }

    /// Clear items, cursor, paging and loading flags. The badge and user are kept.
    pub fn reset(&self) {
        self.update(|s| {
            s.items.clear();
            s.cursor = None;
            s.has_next = false;
            s.loading = false;
            s.loading_more = false;
        });
    }

    /// Drop everything, including the badge and owning user (logout).
    pub fn reset_session(&self) {
        self.update(|s| *s = NotificationSnapshot::default());
    }

    /// Replace the whole list with a first page.
    pub fn set_all(&self, user_id: UserId, raw_list: Vec<NotificationRecord>, requested: usize) {
        let now = Utc::now();
        let returned = raw_list.len();
        self.update(|s| {
            s.cursor = raw_list.last().map(|r| Cursor::new(r.id.clone()));
            let mut seen = HashSet::with_capacity(returned);
            s.items = raw_list
                .into_iter()
                .filter(|r| seen.insert(r.id.clone()))
                .map(|r| ClientNotificationItem::from_record(r, now))
                .collect();
            s.user_id = Some(user_id);
            s.has_next = has_next_page(returned, requested);
            s.loading = false;
        });
    }

    /// Merge a subsequent page onto the tail, skipping ids already present.
    pub fn append_many(&self, raw_list: Vec<NotificationRecord>, requested: usize) {
        let now = Utc::now();
        let returned = raw_list.len();
        self.update(|s| {
            if let Some(last) = raw_list.last() {
                s.cursor = Some(Cursor::new(last.id.clone()));
            }
            let mut seen: HashSet<String> = s.items.iter().map(|i| i.id.clone()).collect();
            for record in raw_list {
                if seen.insert(record.id.clone()) {
                    s.items.push(ClientNotificationItem::from_record(record, now));
                }
            }
            s.has_next = has_next_page(returned, requested);
            s.loading_more = false;
        });
    }

    /// Upsert one record: replaced in place if known, otherwise inserted at the head.
    pub fn ingest(&self, record: NotificationRecord) {
        let item = ClientNotificationItem::from_record(record, Utc::now());
        self.update(|s| match s.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => s.items.insert(0, item),
        });
    }

    /// Optimistically flip one item to read. Returns the item as it was
    /// before the flip, or `None` if it isn't loaded.
    pub fn mark_as_read_local(&self, id: &str) -> Option<ClientNotificationItem> {
        self.update(|s| {
            let item = s.items.iter_mut().find(|i| i.id == id)?;
            let prior = item.clone();
            item.is_read = true;
            Some(prior)
        })
    }

    /// Optimistically flip every loaded item to read. Returns how many changed.
    pub fn mark_all_as_read_local(&self) -> usize {
        self.update(|s| {
            let mut changed = 0;
            for item in s.items.iter_mut().filter(|i| !i.is_read) {
                item.is_read = true;
                changed += 1;
            }
            changed
        })
    }

    pub fn set_badge_unread_count(&self, count: u64) {
        self.update(|s| s.badge_unread_count = count);
    }

    pub fn set_paging(&self, has_next: bool) {
        self.update(|s| s.has_next = has_next);
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|s| s.loading = loading);
    }

    pub fn set_loading_more(&self, loading_more: bool) {
        self.update(|s| s.loading_more = loading_more);
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, NotificationType};
    use chrono::{Duration, TimeZone};

    fn record(id: &str, minutes_ago: i64) -> NotificationRecord {
        let base = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        NotificationRecord {
            id: id.to_string(),
            actor: Actor {
                id: "u-2".to_string(),
                nickname: Some("lena".to_string()),
            },
            kind: NotificationType::Comment,
            target_type: None,
            target_id: None,
            created_at: base - Duration::minutes(minutes_ago),
            is_read: false,
            payload: serde_json::Value::Null,
        }
    }

    fn ids(store: &NotificationStore) -> Vec<String> {
        store.snapshot().items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_set_all_establishes_cursor_and_paging() {
        let store = NotificationStore::new();
        let page = (0..5).map(|i| record(&format!("n{}", i), i)).collect();
        store.set_all(UserId::new("me"), page, 5);

        let snap = store.snapshot();
        assert_eq!(snap.items.len(), 5);
        assert_eq!(snap.cursor, Some(Cursor::new("n4")));
        assert!(snap.has_next);
        assert_eq!(snap.user_id, Some(UserId::new("me")));
    }

    #[test]
    fn test_short_first_page_has_no_next() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), vec![record("a", 1)], 5);
        assert!(!store.snapshot().has_next);
    }

    #[test]
    fn test_empty_first_page() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), Vec::new(), 5);
        let snap = store.snapshot();
        assert!(snap.items.is_empty());
        assert!(snap.cursor.is_none());
        assert!(!snap.has_next);
    }

    #[test]
    fn test_append_many_dedupes_and_advances_cursor() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), vec![record("a", 1), record("b", 2)], 2);
        store.append_many(vec![record("b", 2), record("c", 3)], 2);

        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        let snap = store.snapshot();
        assert_eq!(snap.cursor, Some(Cursor::new("c")));
        assert!(snap.has_next);
    }

    #[test]
    fn test_append_empty_page_keeps_cursor() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), vec![record("a", 1)], 1);
        store.set_loading_more(true);
        store.append_many(Vec::new(), 1);
        let snap = store.snapshot();
        assert_eq!(snap.cursor, Some(Cursor::new("a")));
        assert!(!snap.has_next);
        assert!(!snap.loading_more);
    }

    #[test]
    fn test_ingest_new_goes_to_head() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), vec![record("a", 5)], 10);
        store.ingest(record("z", 0));
        assert_eq!(ids(&store), vec!["z", "a"]);
    }

    #[test]
    fn test_ingest_existing_replaces_in_place() {
        let store = NotificationStore::new();
        store.set_all(
            UserId::new("me"),
            vec![record("a", 1), record("b", 2), record("c", 3)],
            10,
        );
        let mut updated = record("b", 2);
        updated.is_read = true;
        store.ingest(updated);

        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert!(store.snapshot().get("b").unwrap().is_read);
    }

    #[test]
    fn test_no_duplicates_across_mixed_sequences() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), vec![record("a", 1), record("a", 1)], 10);
        store.ingest(record("b", 0));
        store.append_many(vec![record("b", 0), record("a", 1), record("c", 9)], 10);
        store.ingest(record("c", 9));
        store.ingest(record("b", 0));

        let all = ids(&store);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), unique.len());
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_mark_as_read_local_returns_prior_state() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), vec![record("a", 1)], 10);

        let prior = store.mark_as_read_local("a").unwrap();
        assert!(!prior.is_read);
        assert!(store.snapshot().get("a").unwrap().is_read);
        assert!(store.mark_as_read_local("missing").is_none());

        // Rolling back restores the prior flag
        store.ingest(prior.as_record());
        assert!(!store.snapshot().get("a").unwrap().is_read);
    }

    #[test]
    fn test_mark_all_as_read_local() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), vec![record("a", 1), record("b", 2)], 10);
        assert_eq!(store.mark_all_as_read_local(), 2);
        assert_eq!(store.snapshot().loaded_unread(), 0);
        assert_eq!(store.mark_all_as_read_local(), 0);
    }

    #[test]
    fn test_badge_is_independent_of_items() {
        let store = NotificationStore::new();
        store.set_badge_unread_count(12);
        store.set_all(UserId::new("me"), vec![record("a", 1)], 10);
        let snap = store.snapshot();
        assert_eq!(snap.badge_unread_count, 12);
        assert_eq!(snap.loaded_unread(), 1);
    }

    #[test]
    fn test_reset_keeps_badge_and_user() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), vec![record("a", 1)], 1);
        store.set_badge_unread_count(3);
        store.set_loading_more(true);
        store.reset();

        let snap = store.snapshot();
        assert!(snap.items.is_empty());
        assert!(snap.cursor.is_none());
        assert!(!snap.has_next);
        assert!(!snap.loading_more);
        assert_eq!(snap.badge_unread_count, 3);
        assert_eq!(snap.user_id, Some(UserId::new("me")));

        store.reset_session();
        assert_eq!(*store.snapshot(), NotificationSnapshot::default());
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let store = NotificationStore::new();
        store.set_all(UserId::new("me"), vec![record("a", 1)], 10);
        let before = store.snapshot();
        store.mark_as_read_local("a");
        assert!(!before.get("a").unwrap().is_read);
        assert!(store.snapshot().get("a").unwrap().is_read);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_mutation() {
        let store = NotificationStore::new();
        let mut rx = store.subscribe();
        store.set_badge_unread_count(4);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().badge_unread_count, 4);
    }
}
