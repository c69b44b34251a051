//! Per-bucket notification configuration store.

use dashmap::DashMap;
use notistack_notify_model::{Binding, BucketNotification};
use tracing::debug;

/// One [`BucketNotification`] per bucket.
///
/// Writers to the same bucket are serialized by the map's entry lock, so
/// concurrent saves resolve as last writer wins on each binding.
#[derive(Debug, Default)]
pub struct NotificationStore {
    configs: DashMap<String, BucketNotification>,
}

impl NotificationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored configuration of `bucket`, if any.
    #[must_use]
    pub fn get(&self, bucket: &str) -> Option<BucketNotification> {
        self.configs.get(bucket).map(|c| c.value().clone())
    }

    /// Merge `bindings` into the bucket's configuration.
    ///
    /// Bindings are matched by kind and id: a match is replaced in place, an
    /// unknown id is appended, and stored bindings absent from `bindings`
    /// are kept. An empty `bindings` deletes the configuration. A binding
    /// with an empty id is matched against stored bindings with the same
    /// destination, events and filter; when none exists it gets a generated
    /// id.
    pub fn save(&self, bucket: &str, bindings: Vec<Binding>) {
        if bindings.is_empty() {
            self.delete(bucket);
            return;
        }

        let mut entry = self
            .configs
            .entry(bucket.to_owned())
            .or_insert_with(|| BucketNotification::new(bucket));

        for mut binding in bindings {
            if binding.id.is_empty() {
                if entry.bindings.iter().any(|b| b.same_target(&binding)) {
                    continue;
                }
                binding.id = uuid::Uuid::new_v4().to_string();
            }
            match entry
                .bindings
                .iter_mut()
                .find(|b| b.kind() == binding.kind() && b.id == binding.id)
            {
                Some(existing) => *existing = binding,
                None => entry.bindings.push(binding),
            }
        }
        debug!(%bucket, bindings = entry.bindings.len(), "notification configuration saved");
    }

    /// Remove the bucket's configuration. Returns whether one existed.
    pub fn delete(&self, bucket: &str) -> bool {
        let removed = self.configs.remove(bucket).is_some();
        if removed {
            debug!(%bucket, "notification configuration deleted");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use notistack_core::AccountId;
    use notistack_notify_model::{EventName, FilterRule, Resource};

    use super::*;

    fn binding(id: &str, resource: Resource) -> Binding {
        Binding {
            id: id.to_owned(),
            events: vec![EventName::ObjectCreatedPut],
            filter_rules: vec![],
            resource,
        }
    }

    fn queue(name: &str) -> Resource {
        Resource::queue(AccountId::new("acct1").unwrap(), name)
    }

    #[test]
    fn test_should_upsert_bindings_by_id() {
        let store = NotificationStore::new();
        store.save("data", vec![binding("a", queue("q1")), binding("b", queue("q2"))]);

        let mut updated = binding("a", queue("q3"));
        updated.filter_rules = vec![FilterRule::prefix("logs/")];
        store.save("data", vec![updated, binding("c", queue("q4"))]);

        let config = store.get("data").unwrap();
        let ids: Vec<&str> = config.bindings.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(config.bindings[0].resource.name, "q3");
        assert_eq!(config.bindings[0].filter_rules, vec![FilterRule::prefix("logs/")]);
    }

    #[test]
    fn test_should_keep_same_id_of_different_kind() {
        let store = NotificationStore::new();
        let topic = Resource::topic(AccountId::new("acct1").unwrap(), "t");
        store.save("data", vec![binding("x", queue("q1"))]);
        store.save("data", vec![binding("x", topic)]);
        assert_eq!(store.get("data").unwrap().bindings.len(), 2);
    }

    #[test]
    fn test_should_delete_on_empty_save() {
        let store = NotificationStore::new();
        store.save("data", vec![binding("a", queue("q1"))]);
        store.save("data", vec![]);
        assert!(store.get("data").is_none());
        assert!(!store.delete("data"));
    }

    #[test]
    fn test_should_generate_missing_ids() {
        let store = NotificationStore::new();
        store.save("data", vec![binding("", queue("q1")), binding("", queue("q2"))]);
        let config = store.get("data").unwrap();
        assert_eq!(config.bindings.len(), 2);
        assert!(config.bindings.iter().all(|b| !b.id.is_empty()));
    }

    #[test]
    fn test_should_not_duplicate_unnamed_binding_on_resave() {
        let store = NotificationStore::new();
        for _ in 0..3 {
            store.save("data", vec![binding("", queue("q1"))]);
        }
        let config = store.get("data").unwrap();
        assert_eq!(config.bindings.len(), 1);

        let mut filtered = binding("", queue("q1"));
        filtered.filter_rules = vec![FilterRule::suffix(".png")];
        store.save("data", vec![filtered]);
        assert_eq!(store.get("data").unwrap().bindings.len(), 2);
    }
}
