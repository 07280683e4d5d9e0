//! Fixed-interval polling for the console notification bell.
//!
//! No backoff and no pause-on-idle: the cadence is a constant from config,
//! and the feed itself degrades fetch failures to an empty list.
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::api::ApiClient;

#[async_trait]
pub trait NotificationFeed: Send + Sync {
    async fn latest(&self) -> Vec<Value>;
}

#[async_trait]
impl NotificationFeed for ApiClient {
    async fn latest(&self) -> Vec<Value> {
        self.notification_history().await
    }
}

/// Keeps the entries not seen before, updating `seen` in place. Entries
/// are keyed by `id`, falling back to the whole payload for id-less ones.
pub fn fresh_entries(seen: &mut HashSet<String>, items: Vec<Value>) -> Vec<Value> {
    items
        .into_iter()
        .filter(|item| {
            let key = item
                .get("id")
                .map(|id| id.to_string())
                .unwrap_or_else(|| item.to_string());
            seen.insert(key)
        })
        .collect()
}

/// One poll round: fetch and diff.
pub async fn poll_once(feed: &dyn NotificationFeed, seen: &mut HashSet<String>) -> Vec<Value> {
    let items = feed.latest().await;
    debug!(count = items.len(), "notification poll");
    fresh_entries(seen, items)
}

/// Polls forever at a fixed interval, handing unseen entries to `on_new`.
#[instrument(skip_all)]
pub async fn watch(
    feed: &dyn NotificationFeed,
    interval: Duration,
    mut on_new: impl FnMut(&Value),
) {
    let mut seen = HashSet::new();
    loop {
        for entry in poll_once(feed, &mut seen).await {
            on_new(&entry);
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeFeed {
        batches: Mutex<Vec<Vec<Value>>>,
    }

    #[async_trait]
    impl NotificationFeed for FakeFeed {
        async fn latest(&self) -> Vec<Value> {
            let mut batches = self.batches.lock().unwrap();
            if batches.is_empty() {
                Vec::new()
            } else {
                batches.remove(0)
            }
        }
    }

    #[test]
    fn fresh_entries_skips_already_seen_ids() {
        let mut seen = HashSet::new();
        let first = fresh_entries(
            &mut seen,
            vec![json!({ "id": 1, "title": "a" }), json!({ "id": 2, "title": "b" })],
        );
        assert_eq!(first.len(), 2);

        let second = fresh_entries(
            &mut seen,
            vec![json!({ "id": 2, "title": "b" }), json!({ "id": 3, "title": "c" })],
        );
        assert_eq!(second.len(), 1);
        assert_eq!(second[0]["id"], 3);
    }

    #[test]
    fn idless_entries_are_keyed_by_payload() {
        let mut seen = HashSet::new();
        assert_eq!(fresh_entries(&mut seen, vec![json!({ "title": "x" })]).len(), 1);
        assert_eq!(fresh_entries(&mut seen, vec![json!({ "title": "x" })]).len(), 0);
        assert_eq!(fresh_entries(&mut seen, vec![json!({ "title": "y" })]).len(), 1);
    }

    #[tokio::test]
    async fn poll_once_only_surfaces_new_entries() {
        let feed = FakeFeed {
            batches: Mutex::new(vec![
                vec![json!({ "id": 1 })],
                vec![json!({ "id": 1 }), json!({ "id": 2 })],
            ]),
        };
        let mut seen = HashSet::new();

        let first = poll_once(&feed, &mut seen).await;
        assert_eq!(first, vec![json!({ "id": 1 })]);

        let second = poll_once(&feed, &mut seen).await;
        assert_eq!(second, vec![json!({ "id": 2 })]);

        let third = poll_once(&feed, &mut seen).await;
        assert!(third.is_empty());
    }
}
