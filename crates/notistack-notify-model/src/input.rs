//! Control-plane operation inputs.

use crate::notification::NotificationConfiguration;

/// `CreateQueue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateQueueInput {
    /// `QueueName`.
    pub queue_name: String,
}

/// `DeleteQueue`, addressed by the queue URL path or the request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteQueueInput {
    /// Account segment of the queue URL.
    pub account_id: String,
    /// Queue segment of the queue URL.
    pub queue_name: String,
}

/// `ReceiveMessage`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveMessageInput {
    /// Account segment of the queue URL.
    pub account_id: String,
    /// Queue segment of the queue URL.
    pub queue_name: String,
    /// Raw `MaxNumberOfMessages`; clamped by the provider.
    pub max_number_of_messages: Option<i64>,
}

/// `CreateTopic`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTopicInput {
    /// `Name`.
    pub name: String,
}

/// `DeleteTopic`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteTopicInput {
    /// `TopicArn`.
    pub topic_arn: String,
}

/// `Subscribe`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeInput {
    /// `TopicArn`.
    pub topic_arn: String,
    /// `Protocol`.
    pub protocol: String,
    /// `Endpoint`.
    pub endpoint: String,
}

/// `Unsubscribe`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsubscribeInput {
    /// `SubscriptionArn`.
    pub subscription_arn: String,
}

/// `GET /{bucket}?notification`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetBucketNotificationInput {
    /// Bucket name.
    pub bucket: String,
}

/// `PUT /{bucket}?notification`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBucketNotificationInput {
    /// Bucket name.
    pub bucket: String,
    /// Parsed request body.
    pub configuration: NotificationConfiguration,
}
