use crate::api::models::Notification;
use crate::storage::Storage;

#[derive(Debug)]
pub struct NotificationsStore {
    storage: Storage,
    items: Vec<Notification>,
}

impl NotificationsStore {
    pub fn load(storage: Storage) -> Self {
        let items = storage.notifications(Some(200)).unwrap_or_else(|e| {
            log::warn!("Failed to read notifications: {e}");
            Vec::new()
        });
        Self { storage, items }
    }

    pub fn all(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Returns false when the id was already known.
    pub fn push(&mut self, notification: Notification) -> bool {
        if self.items.iter().any(|n| n.id == notification.id) {
            return false;
        }
        if let Err(e) = self.storage.upsert_notifications(std::slice::from_ref(&notification)) {
            log::warn!("Failed to store notification: {e}");
        }
        let at = self
            .items
            .iter()
            .position(|n| n.created_at <= notification.created_at)
            .unwrap_or(self.items.len());
        self.items.insert(at, notification);
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn mark_as_read(&mut self, id: &str) {
        if let Some(n) = self.items.iter_mut().find(|n| n.id == id) {
            n.read = true;
            if let Err(e) = self.storage.mark_notification_read(id) {
                log::warn!("Failed to mark notification {id} read: {e}");
            }
        }
    }

    pub fn mark_all_as_read(&mut self) {
        self.items.iter_mut().for_each(|n| n.read = true);
        if let Err(e) = self.storage.mark_all_notifications_read() {
            log::warn!("Failed to mark notifications read: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::{notification, temp_storage};

    #[test]
    fn unread_count_tracks_reads() {
        let (_dir, storage) = temp_storage();
        let mut store = NotificationsStore::load(storage.clone());
        assert!(store.push(notification("a", 5, false)));
        assert!(store.push(notification("b", 1, false)));
        assert!(store.push(notification("c", 3, true)));
        assert_eq!(store.unread_count(), 2);

        store.mark_as_read("a");
        store.mark_as_read("missing");
        assert_eq!(store.unread_count(), 1);

        let reloaded = NotificationsStore::load(storage);
        assert_eq!(reloaded.unread_count(), 1);
    }

    #[test]
    fn push_dedupes_and_orders_newest_first() {
        let (_dir, storage) = temp_storage();
        let mut store = NotificationsStore::load(storage);
        store.push(notification("old", 10, false));
        store.push(notification("new", 1, false));
        store.push(notification("mid", 4, false));
        assert!(!store.push(notification("new", 1, false)));

        let ids: Vec<&str> = store.all().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn mark_all_as_read_persists() {
        let (_dir, storage) = temp_storage();
        let mut store = NotificationsStore::load(storage.clone());
        store.push(notification("a", 1, false));
        store.push(notification("b", 2, false));
        store.mark_all_as_read();
        assert_eq!(store.unread_count(), 0);
        assert_eq!(NotificationsStore::load(storage).unread_count(), 0);
    }

    #[test]
    fn clear_empties_the_bell() {
        let (_dir, storage) = temp_storage();
        let mut store = NotificationsStore::load(storage);
        store.push(notification("a", 1, false));
        store.clear();
        assert!(store.all().is_empty());
        assert_eq!(store.unread_count(), 0);
        assert!(store.push(notification("a", 1, false)));
    }
}
