//! Compiled per-bucket rule map.

use std::collections::HashMap;

use notistack_notify_model::{BucketNotification, EventName, Resource};

use super::pattern::{match_simple, pattern_from_rules};

/// `leaf event -> pattern -> destinations`.
///
/// Destination lists are not deduplicated: two bindings with the same event,
/// pattern and resource deliver twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesMap {
    map: HashMap<EventName, HashMap<String, Vec<Resource>>>,
}

impl RulesMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a bucket configuration. Pure.
    #[must_use]
    pub fn compile(config: &BucketNotification) -> Self {
        let mut rules = Self::new();
        for binding in &config.bindings {
            rules.add(
                &binding.events,
                pattern_from_rules(&binding.filter_rules),
                &binding.resource,
            );
        }
        rules
    }

    /// Add one rule. Group names expand to their leaves and an empty pattern
    /// becomes `*`.
    pub fn add(&mut self, events: &[EventName], pattern: String, resource: &Resource) {
        let pattern = if pattern.is_empty() {
            "*".to_owned()
        } else {
            pattern
        };
        for event in events {
            for leaf in event.expand() {
                self.map
                    .entry(*leaf)
                    .or_default()
                    .entry(pattern.clone())
                    .or_default()
                    .push(resource.clone());
            }
        }
    }

    /// Destinations reached by a leaf `event` on `key`, in no particular order.
    #[must_use]
    pub fn match_event(&self, event: EventName, key: &str) -> Vec<Resource> {
        self.map
            .get(&event)
            .map(|patterns| {
                patterns
                    .iter()
                    .filter(|(pattern, _)| match_simple(pattern, key))
                    .flat_map(|(_, resources)| resources.iter().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether any rule exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use notistack_core::AccountId;
    use notistack_notify_model::{Binding, FilterRule};

    use super::*;

    fn queue(name: &str) -> Resource {
        Resource::queue(AccountId::new("acct1").unwrap(), name)
    }

    fn binding(id: &str, events: Vec<EventName>, rules: Vec<FilterRule>, resource: Resource) -> Binding {
        Binding {
            id: id.to_owned(),
            events,
            filter_rules: rules,
            resource,
        }
    }

    fn sorted_names(mut resources: Vec<Resource>) -> Vec<String> {
        resources.sort();
        resources.into_iter().map(|r| r.name).collect()
    }

    #[test]
    fn test_should_expand_groups_to_leaves() {
        let mut config = BucketNotification::new("data");
        config.bindings.push(binding(
            "all-created",
            vec![EventName::ObjectCreatedAll],
            vec![],
            queue("q1"),
        ));
        let rules = RulesMap::compile(&config);

        for leaf in EventName::ObjectCreatedAll.expand() {
            let patterns: Vec<&str> = rules.map[leaf].keys().map(String::as_str).collect();
            assert_eq!(patterns, vec!["*"]);
        }
        assert_eq!(rules.match_event(EventName::ObjectCreatedCopy, "any").len(), 1);
        assert!(rules.match_event(EventName::ObjectRemovedDelete, "any").is_empty());
        // Groups themselves are never keys.
        assert!(!rules.map.contains_key(&EventName::ObjectCreatedAll));
    }

    #[test]
    fn test_should_union_destinations_without_dedup() {
        let mut config = BucketNotification::new("data");
        let events = vec![EventName::ObjectCreatedPut];
        let rules = vec![FilterRule::prefix("reports/")];
        config.bindings.push(binding("a", events.clone(), rules.clone(), queue("q1")));
        config.bindings.push(binding("b", events.clone(), rules.clone(), queue("q2")));
        config.bindings.push(binding("c", events, rules, queue("q1")));
        let compiled = RulesMap::compile(&config);

        let matched = compiled.match_event(EventName::ObjectCreatedPut, "reports/q1.csv");
        assert_eq!(sorted_names(matched), vec!["q1", "q1", "q2"]);
        assert!(compiled.match_event(EventName::ObjectCreatedPut, "other/q1.csv").is_empty());
    }

    #[test]
    fn test_should_match_each_pattern_independently() {
        let mut config = BucketNotification::new("data");
        config.bindings.push(binding(
            "png",
            vec![EventName::ObjectCreatedPut],
            vec![FilterRule::prefix("img_"), FilterRule::suffix(".png")],
            queue("images"),
        ));
        config.bindings.push(binding(
            "everything",
            vec![EventName::ObjectCreatedPut],
            vec![],
            queue("audit"),
        ));
        let compiled = RulesMap::compile(&config);

        assert_eq!(
            sorted_names(compiled.match_event(EventName::ObjectCreatedPut, "img_001.png")),
            vec!["audit", "images"]
        );
        assert_eq!(
            sorted_names(compiled.match_event(EventName::ObjectCreatedPut, "img_001.jpg")),
            vec!["audit"]
        );
    }

    #[test]
    fn test_should_compile_empty_config_to_empty_map() {
        assert!(RulesMap::compile(&BucketNotification::new("data")).is_empty());
    }
}
