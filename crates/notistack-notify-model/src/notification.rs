//! Bucket notification configuration.
//!
//! The `*Configuration` types mirror the XML document exchanged on
//! `?notification`; [`BucketNotification`] is the resolved form kept by the
//! store, with typed events and resources in place of raw strings.

use notistack_core::AwsRegion;

use crate::event_name::EventName;
use crate::resource::{Resource, ServiceKind};

/// Root of the `?notification` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationConfiguration {
    /// `QueueConfiguration` elements.
    pub queue_configurations: Vec<QueueConfiguration>,
    /// `TopicConfiguration` elements.
    pub topic_configurations: Vec<TopicConfiguration>,
}

impl NotificationConfiguration {
    /// A configuration with no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue_configurations.is_empty() && self.topic_configurations.is_empty()
    }
}

/// A queue binding as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueConfiguration {
    /// Local identifier, unique within the configuration.
    pub id: Option<String>,
    /// Destination queue ARN.
    pub queue_arn: String,
    /// Event names, unvalidated.
    pub events: Vec<String>,
    /// Optional key filter.
    pub filter: Option<NotificationFilter>,
}

/// A topic binding as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicConfiguration {
    /// Local identifier, unique within the configuration.
    pub id: Option<String>,
    /// Destination topic ARN.
    pub topic_arn: String,
    /// Event names, unvalidated.
    pub events: Vec<String>,
    /// Optional key filter.
    pub filter: Option<NotificationFilter>,
}

/// `Filter` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    /// `S3Key` element.
    pub key: Option<S3KeyFilter>,
}

/// `S3Key` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3KeyFilter {
    /// `FilterRule` elements in document order.
    pub filter_rules: Vec<FilterRule>,
}

/// One `{Name, Value}` filter rule; `Name` is `prefix` or `suffix`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FilterRule {
    /// Rule name.
    pub name: String,
    /// Rule value.
    pub value: String,
}

impl FilterRule {
    /// Create a rule.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A `prefix` rule.
    #[must_use]
    pub fn prefix(value: impl Into<String>) -> Self {
        Self::new("prefix", value)
    }

    /// A `suffix` rule.
    #[must_use]
    pub fn suffix(value: impl Into<String>) -> Self {
        Self::new("suffix", value)
    }
}

fn filter_rules(filter: Option<&NotificationFilter>) -> Vec<FilterRule> {
    filter
        .and_then(|f| f.key.as_ref())
        .map(|k| k.filter_rules.clone())
        .unwrap_or_default()
}

fn to_filter(rules: &[FilterRule]) -> Option<NotificationFilter> {
    if rules.is_empty() {
        return None;
    }
    Some(NotificationFilter {
        key: Some(S3KeyFilter {
            filter_rules: rules.to_vec(),
        }),
    })
}

impl QueueConfiguration {
    /// Filter rules, empty when no filter is present.
    #[must_use]
    pub fn rules(&self) -> Vec<FilterRule> {
        filter_rules(self.filter.as_ref())
    }
}

impl TopicConfiguration {
    /// Filter rules, empty when no filter is present.
    #[must_use]
    pub fn rules(&self) -> Vec<FilterRule> {
        filter_rules(self.filter.as_ref())
    }
}

/// A resolved binding: typed events and an existing resource.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Local identifier.
    pub id: String,
    /// Events the binding fires on, possibly groups.
    pub events: Vec<EventName>,
    /// Prefix/suffix rules.
    pub filter_rules: Vec<FilterRule>,
    /// Destination.
    pub resource: Resource,
}

impl Binding {
    /// Queue or topic binding.
    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        self.resource.service
    }

    /// Whether both bindings deliver the same events under the same filter
    /// to the same resource, ignoring ids and event order.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        self.resource == other.resource
            && self.filter_rules == other.filter_rules
            && self.events.len() == other.events.len()
            && self.events.iter().all(|e| other.events.contains(e))
    }
}

/// The stored configuration of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketNotification {
    /// Bucket name.
    pub bucket: String,
    /// Bindings in insertion order.
    pub bindings: Vec<Binding>,
}

impl BucketNotification {
    /// Create an empty configuration for `bucket`.
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            bindings: Vec::new(),
        }
    }

    /// Render back into the wire document, formatting ARNs in `region`.
    #[must_use]
    pub fn to_configuration(&self, region: &AwsRegion) -> NotificationConfiguration {
        let mut out = NotificationConfiguration::default();
        for b in &self.bindings {
            let events = b.events.iter().map(|e| e.as_str().to_owned()).collect();
            let arn = b.resource.arn(region);
            let filter = to_filter(&b.filter_rules);
            match b.kind() {
                ServiceKind::Queue => out.queue_configurations.push(QueueConfiguration {
                    id: Some(b.id.clone()),
                    queue_arn: arn,
                    events,
                    filter,
                }),
                ServiceKind::Topic => out.topic_configurations.push(TopicConfiguration {
                    id: Some(b.id.clone()),
                    topic_arn: arn,
                    events,
                    filter,
                }),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use notistack_core::AccountId;

    use super::*;

    #[test]
    fn test_should_render_bindings_by_kind() {
        let acct = AccountId::new("acct1").unwrap();
        let config = BucketNotification {
            bucket: "data".to_owned(),
            bindings: vec![
                Binding {
                    id: "q".to_owned(),
                    events: vec![EventName::ObjectCreatedPut],
                    filter_rules: vec![FilterRule::prefix("reports/")],
                    resource: Resource::queue(acct.clone(), "alerts"),
                },
                Binding {
                    id: "t".to_owned(),
                    events: vec![EventName::ObjectRemovedAll],
                    filter_rules: vec![],
                    resource: Resource::topic(acct, "news"),
                },
            ],
        };

        let wire = config.to_configuration(&AwsRegion::default());
        assert_eq!(wire.queue_configurations.len(), 1);
        assert_eq!(wire.topic_configurations.len(), 1);
        assert_eq!(wire.queue_configurations[0].queue_arn, "arn:aws:sqs:us-east-1:acct1:alerts");
        assert_eq!(wire.queue_configurations[0].rules(), vec![FilterRule::prefix("reports/")]);
        assert_eq!(wire.topic_configurations[0].events, vec!["s3:ObjectRemoved:*"]);
        assert!(wire.topic_configurations[0].filter.is_none());
    }
}
