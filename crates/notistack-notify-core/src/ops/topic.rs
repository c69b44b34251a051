//! Topic and subscription operations.

use std::sync::LazyLock;

use notistack_core::AccountId;
use notistack_notify_model::error::NotifyError;
use notistack_notify_model::input::{
    CreateTopicInput, DeleteTopicInput, SubscribeInput, UnsubscribeInput,
};
use notistack_notify_model::output::{
    CreateTopicOutput, EmptyOutput, ListSubscriptionsOutput, ListTopicsOutput, SubscribeOutput,
    SubscriptionSummary,
};
use notistack_notify_model::{Endpoint, Resource, ServiceKind, Subscription};
use regex::Regex;
use tracing::info;

use crate::error::{StoreError, store_error_to_notify};
use crate::provider::NotistackNotify;

static TOPIC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]{1,256}$").expect("valid topic name pattern"));

fn parse_topic_arn(arn: &str) -> Result<Resource, NotifyError> {
    match Resource::parse_arn(arn) {
        Ok(topic) if topic.service == ServiceKind::Topic => Ok(topic),
        _ => Err(NotifyError::invalid_parameter("TopicArn")),
    }
}

impl NotistackNotify {
    /// Handle `CreateTopic`. Creating an existing topic returns it.
    pub fn handle_create_topic(
        &self,
        caller: &AccountId,
        input: CreateTopicInput,
    ) -> Result<CreateTopicOutput, NotifyError> {
        if !TOPIC_NAME.is_match(&input.name) {
            return Err(NotifyError::invalid_parameter("Topic Name"));
        }
        let topic = Resource::topic(caller.clone(), input.name);
        self.registry.find_or_create(topic.clone());
        Ok(CreateTopicOutput {
            topic_arn: topic.arn(&self.config.region),
        })
    }

    /// Handle `ListTopics`.
    #[must_use]
    pub fn handle_list_topics(&self, caller: &AccountId) -> ListTopicsOutput {
        ListTopicsOutput {
            topic_arns: self
                .registry
                .list(ServiceKind::Topic, caller)
                .iter()
                .map(|t| t.arn(&self.config.region))
                .collect(),
        }
    }

    /// Handle `DeleteTopic`. Deleting a missing topic succeeds.
    pub fn handle_delete_topic(
        &self,
        caller: &AccountId,
        input: DeleteTopicInput,
    ) -> Result<EmptyOutput, NotifyError> {
        let topic = parse_topic_arn(&input.topic_arn)?;
        if &topic.account_id != caller {
            return Err(NotifyError::authorization_error());
        }
        if self.registry.delete(&topic) {
            info!(topic = %topic, "topic deleted");
        }
        Ok(EmptyOutput)
    }

    /// Handle `Subscribe`.
    pub fn handle_subscribe(
        &self,
        caller: &AccountId,
        input: SubscribeInput,
    ) -> Result<SubscribeOutput, NotifyError> {
        let topic = parse_topic_arn(&input.topic_arn)?;
        if &topic.account_id != caller {
            return Err(NotifyError::authorization_error());
        }
        if !self.registry.contains(&topic) {
            return Err(NotifyError::not_found("Topic does not exist"));
        }
        if input.protocol.is_empty() {
            return Err(NotifyError::invalid_parameter("Protocol"));
        }
        if input.endpoint.is_empty() {
            return Err(NotifyError::invalid_parameter("Endpoint"));
        }

        let endpoint = Endpoint {
            name: uuid::Uuid::new_v4().to_string(),
            protocol: input.protocol,
            uri: input.endpoint,
        };
        let subscription_arn = endpoint.subscription_arn(&topic, &self.config.region);
        self.registry
            .add_endpoint(&topic, endpoint)
            .map_err(|e| match e {
                StoreError::NotFound(_) => NotifyError::not_found("Topic does not exist"),
                other => store_error_to_notify(other),
            })?;
        info!(topic = %topic, %subscription_arn, "endpoint subscribed");
        Ok(SubscribeOutput { subscription_arn })
    }

    /// Handle `Unsubscribe`. Removing an unknown subscription succeeds.
    pub fn handle_unsubscribe(
        &self,
        caller: &AccountId,
        input: UnsubscribeInput,
    ) -> Result<EmptyOutput, NotifyError> {
        let subscription = Subscription::parse_arn(&input.subscription_arn)
            .map_err(|_| NotifyError::invalid_parameter("SubscriptionId"))?;
        if &subscription.topic.account_id != caller {
            return Err(NotifyError::authorization_error());
        }
        if self
            .registry
            .remove_endpoint(&subscription.topic, &subscription.endpoint_name)
        {
            info!(topic = %subscription.topic, endpoint = %subscription.endpoint_name, "endpoint unsubscribed");
        }
        Ok(EmptyOutput)
    }

    /// Handle `ListSubscriptions`: every endpoint of the caller's topics.
    #[must_use]
    pub fn handle_list_subscriptions(&self, caller: &AccountId) -> ListSubscriptionsOutput {
        let region = &self.config.region;
        let subscriptions = self
            .registry
            .list(ServiceKind::Topic, caller)
            .into_iter()
            .flat_map(|topic| {
                let endpoints = self.registry.endpoints(&topic).unwrap_or_default();
                let topic_arn = topic.arn(region);
                endpoints
                    .into_iter()
                    .map(|e| SubscriptionSummary {
                        topic_arn: topic_arn.clone(),
                        subscription_arn: e.subscription_arn(&topic, region),
                        protocol: e.protocol,
                        owner: topic.account_id.to_string(),
                        endpoint: e.uri,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        ListSubscriptionsOutput { subscriptions }
    }
}

#[cfg(test)]
mod tests {
    use notistack_notify_model::error::NotifyErrorCode;

    use super::*;
    use crate::config::NotifyConfig;

    fn acct(id: &str) -> AccountId {
        AccountId::new(id).unwrap()
    }

    fn provider() -> NotistackNotify {
        NotistackNotify::new(NotifyConfig::default()).unwrap()
    }

    fn create(p: &NotistackNotify, account: &str, name: &str) -> String {
        p.handle_create_topic(&acct(account), CreateTopicInput { name: name.to_owned() })
            .unwrap()
            .topic_arn
    }

    fn subscribe(p: &NotistackNotify, account: &str, arn: &str) -> Result<SubscribeOutput, NotifyError> {
        p.handle_subscribe(
            &acct(account),
            SubscribeInput {
                topic_arn: arn.to_owned(),
                protocol: "http".to_owned(),
                endpoint: "hooks.local/in".to_owned(),
            },
        )
    }

    #[tokio::test]
    async fn test_should_create_topic_idempotently() {
        let p = provider();
        let arn = create(&p, "acct1", "news");
        assert_eq!(arn, "arn:aws:sns:us-east-1:acct1:news");
        assert_eq!(create(&p, "acct1", "news"), arn);
        assert_eq!(p.handle_list_topics(&acct("acct1")).topic_arns, vec![arn]);
    }

    #[tokio::test]
    async fn test_should_validate_topic_names() {
        let p = provider();
        for bad in ["", "has space", "dot.ted", &"x".repeat(257)] {
            let err = p
                .handle_create_topic(&acct("acct1"), CreateTopicInput { name: bad.to_owned() })
                .unwrap_err();
            assert_eq!(err.code, NotifyErrorCode::InvalidParameter);
            assert_eq!(err.message, "Invalid parameter: Topic Name");
        }
        create(&p, "acct1", "under_score-and-dash");
    }

    #[tokio::test]
    async fn test_should_subscribe_and_list() {
        let p = provider();
        let arn = create(&p, "acct1", "news");
        let sub = subscribe(&p, "acct1", &arn).unwrap();
        assert!(sub.subscription_arn.starts_with(&format!("{arn}:")));

        let listed = p.handle_list_subscriptions(&acct("acct1")).subscriptions;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].subscription_arn, sub.subscription_arn);
        assert_eq!(listed[0].endpoint, "hooks.local/in");
        assert_eq!(listed[0].owner, "acct1");
        assert!(p.handle_list_subscriptions(&acct("acct2")).subscriptions.is_empty());

        p.handle_unsubscribe(
            &acct("acct1"),
            UnsubscribeInput { subscription_arn: sub.subscription_arn.clone() },
        )
        .unwrap();
        assert!(p.handle_list_subscriptions(&acct("acct1")).subscriptions.is_empty());
        // Second unsubscribe is a no-op.
        p.handle_unsubscribe(&acct("acct1"), UnsubscribeInput { subscription_arn: sub.subscription_arn })
            .unwrap();
    }

    #[tokio::test]
    async fn test_should_reject_bad_subscriptions() {
        let p = provider();
        let arn = create(&p, "acct1", "news");

        let err = subscribe(&p, "acct1", "arn:aws:sns:us-east-1:acct1:missing").unwrap_err();
        assert_eq!(err.code, NotifyErrorCode::NotFound);

        let err = subscribe(&p, "acct2", &arn).unwrap_err();
        assert_eq!(err.code, NotifyErrorCode::AuthorizationError);

        let err = p
            .handle_subscribe(
                &acct("acct1"),
                SubscribeInput { topic_arn: arn, protocol: "http".to_owned(), endpoint: String::new() },
            )
            .unwrap_err();
        assert_eq!(err.code, NotifyErrorCode::InvalidParameter);

        let err = p
            .handle_unsubscribe(
                &acct("acct1"),
                UnsubscribeInput { subscription_arn: "arn:aws:sns:us-east-1:acct1:news".to_owned() },
            )
            .unwrap_err();
        assert_eq!(err.message, "Invalid parameter: SubscriptionId");
    }

    #[tokio::test]
    async fn test_should_not_reveal_foreign_topic_existence() {
        let p = provider();
        let arn = create(&p, "acct1", "news");

        let existing = subscribe(&p, "acct2", &arn).unwrap_err();
        let missing = subscribe(&p, "acct2", "arn:aws:sns:us-east-1:acct1:missing").unwrap_err();
        assert_eq!(existing.code, NotifyErrorCode::AuthorizationError);
        assert_eq!(missing.code, existing.code);
        assert_eq!(missing.message, existing.message);
    }

    #[tokio::test]
    async fn test_should_delete_topic_with_subscriptions() {
        let p = provider();
        let arn = create(&p, "acct1", "news");
        subscribe(&p, "acct1", &arn).unwrap();

        let err = p
            .handle_delete_topic(&acct("acct2"), DeleteTopicInput { topic_arn: arn.clone() })
            .unwrap_err();
        assert_eq!(err.code, NotifyErrorCode::AuthorizationError);

        let err = p
            .handle_delete_topic(&acct("acct1"), DeleteTopicInput { topic_arn: "not-an-arn".to_owned() })
            .unwrap_err();
        assert_eq!(err.code, NotifyErrorCode::InvalidParameter);

        p.handle_delete_topic(&acct("acct1"), DeleteTopicInput { topic_arn: arn.clone() })
            .unwrap();
        p.handle_delete_topic(&acct("acct1"), DeleteTopicInput { topic_arn: arn.clone() })
            .unwrap();
        assert!(p.handle_list_topics(&acct("acct1")).topic_arns.is_empty());

        // A recreated topic starts without subscriptions.
        create(&p, "acct1", "news");
        assert!(p.handle_list_subscriptions(&acct("acct1")).subscriptions.is_empty());
    }
}
