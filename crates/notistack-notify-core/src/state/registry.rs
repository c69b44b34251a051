//! Resource registry.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use notistack_core::AccountId;
use notistack_notify_model::{Endpoint, Resource, ServiceKind};
use tracing::{debug, info};

use crate::error::StoreError;

#[derive(Debug)]
struct ResourceEntry {
    id: u64,
    endpoints: Vec<Endpoint>,
}

/// Queues and topics keyed by `(service, account, name)`, each with a numeric
/// identity and, for topics, an ordered endpoint list.
#[derive(Debug)]
pub struct ResourceRegistry {
    resources: DashMap<Resource, ResourceEntry>,
    next_id: AtomicU64,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new resource.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the triple is taken.
    pub fn create(&self, resource: Resource) -> Result<Resource, StoreError> {
        match self.resources.entry(resource) {
            Entry::Occupied(e) => Err(StoreError::AlreadyExists(e.key().name.clone())),
            Entry::Vacant(e) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let resource = e.key().clone();
                e.insert(ResourceEntry {
                    id,
                    endpoints: Vec::new(),
                });
                info!(%id, service = %resource.service, account = %resource.account_id, name = %resource.name, "resource created");
                Ok(resource)
            }
        }
    }

    /// Register `resource` unless it already exists. Returns its id.
    pub fn find_or_create(&self, resource: Resource) -> u64 {
        self.resources
            .entry(resource)
            .or_insert_with(|| ResourceEntry {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                endpoints: Vec::new(),
            })
            .id
    }

    /// Look up a resource by its triple.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if it is not registered.
    pub fn find(
        &self,
        service: ServiceKind,
        account_id: &AccountId,
        name: &str,
    ) -> Result<Resource, StoreError> {
        let resource = Resource::new(service, account_id.clone(), name);
        if self.resources.contains_key(&resource) {
            Ok(resource)
        } else {
            Err(StoreError::NotFound(format!("{service}:{account_id}:{name}")))
        }
    }

    /// Whether the resource is registered.
    #[must_use]
    pub fn contains(&self, resource: &Resource) -> bool {
        self.resources.contains_key(resource)
    }

    /// Numeric identity of a resource.
    #[must_use]
    pub fn id(&self, resource: &Resource) -> Option<u64> {
        self.resources.get(resource).map(|e| e.id)
    }

    /// Resources of one kind owned by `account_id`, oldest first.
    #[must_use]
    pub fn list(&self, service: ServiceKind, account_id: &AccountId) -> Vec<Resource> {
        let mut found: Vec<(u64, Resource)> = self
            .resources
            .iter()
            .filter(|r| r.key().service == service && &r.key().account_id == account_id)
            .map(|r| (r.value().id, r.key().clone()))
            .collect();
        found.sort_by_key(|(id, _)| *id);
        found.into_iter().map(|(_, r)| r).collect()
    }

    /// Remove a resource and its endpoints. Returns whether it existed.
    pub fn delete(&self, resource: &Resource) -> bool {
        let removed = self.resources.remove(resource);
        if let Some((_, entry)) = &removed {
            debug!(name = %resource.name, endpoints = entry.endpoints.len(), "resource deleted");
        }
        removed.is_some()
    }

    /// Attach an endpoint to a topic.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the resource is not registered.
    pub fn add_endpoint(&self, resource: &Resource, endpoint: Endpoint) -> Result<(), StoreError> {
        let mut entry = self
            .resources
            .get_mut(resource)
            .ok_or_else(|| StoreError::NotFound(resource.name.clone()))?;
        entry.endpoints.push(endpoint);
        Ok(())
    }

    /// Detach an endpoint by name. Returns whether it existed.
    pub fn remove_endpoint(&self, resource: &Resource, endpoint_name: &str) -> bool {
        self.resources.get_mut(resource).is_some_and(|mut entry| {
            let before = entry.endpoints.len();
            entry.endpoints.retain(|e| e.name != endpoint_name);
            entry.endpoints.len() != before
        })
    }

    /// Endpoints currently attached to a resource.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the resource is not registered.
    pub fn endpoints(&self, resource: &Resource) -> Result<Vec<Endpoint>, StoreError> {
        self.resources
            .get(resource)
            .map(|e| e.endpoints.clone())
            .ok_or_else(|| StoreError::NotFound(resource.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(id: &str) -> AccountId {
        AccountId::new(id).unwrap()
    }

    fn endpoint(name: &str) -> Endpoint {
        Endpoint {
            name: name.to_owned(),
            protocol: "http".to_owned(),
            uri: format!("hooks.local/{name}"),
        }
    }

    #[test]
    fn test_should_reject_duplicate_triple() {
        let registry = ResourceRegistry::new();
        registry.create(Resource::queue(acct("a1"), "q")).unwrap();
        assert!(matches!(
            registry.create(Resource::queue(acct("a1"), "q")),
            Err(StoreError::AlreadyExists(_))
        ));
        // Same name under another kind or account is a different resource.
        registry.create(Resource::topic(acct("a1"), "q")).unwrap();
        registry.create(Resource::queue(acct("a2"), "q")).unwrap();
    }

    #[test]
    fn test_should_find_and_list_by_owner() {
        let registry = ResourceRegistry::new();
        registry.create(Resource::queue(acct("a1"), "second")).unwrap();
        registry.create(Resource::queue(acct("a1"), "first")).unwrap();
        registry.create(Resource::queue(acct("a2"), "other")).unwrap();

        let names: Vec<String> = registry
            .list(ServiceKind::Queue, &acct("a1"))
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);

        assert!(registry.find(ServiceKind::Queue, &acct("a1"), "first").is_ok());
        assert!(matches!(
            registry.find(ServiceKind::Topic, &acct("a1"), "first"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_should_keep_identity_on_find_or_create() {
        let registry = ResourceRegistry::new();
        let topic = Resource::topic(acct("a1"), "news");
        let id = registry.find_or_create(topic.clone());
        assert_eq!(registry.find_or_create(topic.clone()), id);
        assert_eq!(registry.id(&topic), Some(id));
    }

    #[test]
    fn test_should_cascade_endpoints_on_delete() {
        let registry = ResourceRegistry::new();
        let topic = registry.create(Resource::topic(acct("a1"), "news")).unwrap();
        registry.add_endpoint(&topic, endpoint("e1")).unwrap();
        registry.add_endpoint(&topic, endpoint("e2")).unwrap();
        assert_eq!(registry.endpoints(&topic).unwrap().len(), 2);

        assert!(registry.remove_endpoint(&topic, "e1"));
        assert!(!registry.remove_endpoint(&topic, "e1"));
        assert_eq!(registry.endpoints(&topic).unwrap()[0].name, "e2");

        assert!(registry.delete(&topic));
        assert!(!registry.delete(&topic));
        assert!(registry.endpoints(&topic).is_err());

        // Recreating the topic starts with no endpoints.
        let topic = registry.create(Resource::topic(acct("a1"), "news")).unwrap();
        assert!(registry.endpoints(&topic).unwrap().is_empty());
    }
}
