//! Topic subscriptions.

use notistack_core::AwsRegion;

use crate::resource::{ArnError, Resource, ServiceKind};

/// One subscription of a topic to a delivery target.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Opaque subscription id generated at subscribe time.
    pub name: String,
    /// Delivery protocol as given by the subscriber, e.g. `http`.
    pub protocol: String,
    /// Delivery target.
    pub uri: String,
}

impl Endpoint {
    /// Subscription ARN: the topic ARN followed by `:{name}`.
    #[must_use]
    pub fn subscription_arn(&self, topic: &Resource, region: &AwsRegion) -> String {
        format!("{}:{}", topic.arn(region), self.name)
    }
}

/// A parsed subscription ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// The subscribed topic.
    pub topic: Resource,
    /// The endpoint name.
    pub endpoint_name: String,
}

impl Subscription {
    /// Parse `arn:aws:sns:{region}:{account}:{topic}:{endpoint}`.
    pub fn parse_arn(arn: &str) -> Result<Self, ArnError> {
        let tokens: Vec<&str> = arn.split(':').collect();
        let topic = Resource::from_tokens(&tokens)?;
        if topic.service != ServiceKind::Topic {
            return Err(ArnError::InvalidPrefix);
        }
        match tokens.get(6) {
            Some(name) if !name.is_empty() => Ok(Self {
                topic,
                endpoint_name: (*name).to_owned(),
            }),
            _ => Err(ArnError::MissingSubscriptionId),
        }
    }
}
