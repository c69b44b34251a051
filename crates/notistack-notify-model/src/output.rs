//! Control-plane operation outputs.

/// `CreateQueueResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateQueueOutput {
    /// URL of the new queue.
    pub queue_url: String,
}

/// `ListQueuesResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQueuesOutput {
    /// One URL per queue.
    pub queue_urls: Vec<String>,
}

/// A popped queue message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Fresh id per receive.
    pub message_id: String,
    /// Always empty; messages are removed on receive.
    pub receipt_handle: String,
    /// Lowercase hex MD5 of the body.
    pub md5_of_body: String,
    /// Serialized event record.
    pub body: String,
}

/// `ReceiveMessageResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveMessageOutput {
    /// Oldest first.
    pub messages: Vec<Message>,
}

/// `CreateTopicResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTopicOutput {
    /// ARN of the topic.
    pub topic_arn: String,
}

/// `ListTopicsResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTopicsOutput {
    /// One ARN per topic.
    pub topic_arns: Vec<String>,
}

/// `SubscribeResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeOutput {
    /// ARN of the new subscription.
    pub subscription_arn: String,
}

/// One entry of `ListSubscriptionsResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSummary {
    /// Subscribed topic.
    pub topic_arn: String,
    /// Delivery protocol.
    pub protocol: String,
    /// Subscription ARN.
    pub subscription_arn: String,
    /// Owning account.
    pub owner: String,
    /// Delivery target.
    pub endpoint: String,
}

/// `ListSubscriptionsResult`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSubscriptionsOutput {
    /// Subscriptions across the caller's topics.
    pub subscriptions: Vec<SubscriptionSummary>,
}

/// Result of operations that return no fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyOutput;
