//! Control-plane operation enum.

use std::fmt;

/// All supported control-plane operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyOperation {
    // Queues
    /// Create a queue.
    CreateQueue,
    /// List the caller's queues.
    ListQueues,
    /// Delete a queue.
    DeleteQueue,
    /// Pop messages from a queue.
    ReceiveMessage,

    // Topics
    /// Create or fetch a topic.
    CreateTopic,
    /// List the caller's topics.
    ListTopics,
    /// Delete a topic and its subscriptions.
    DeleteTopic,
    /// Subscribe an endpoint to a topic.
    Subscribe,
    /// Remove a subscription.
    Unsubscribe,
    /// List subscriptions across the caller's topics.
    ListSubscriptions,

    // Bucket configuration
    /// `GET /{bucket}?notification`.
    GetBucketNotification,
    /// `PUT /{bucket}?notification`.
    PutBucketNotification,
}

impl NotifyOperation {
    /// Returns the `Action` name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateQueue => "CreateQueue",
            Self::ListQueues => "ListQueues",
            Self::DeleteQueue => "DeleteQueue",
            Self::ReceiveMessage => "ReceiveMessage",
            Self::CreateTopic => "CreateTopic",
            Self::ListTopics => "ListTopics",
            Self::DeleteTopic => "DeleteTopic",
            Self::Subscribe => "Subscribe",
            Self::Unsubscribe => "Unsubscribe",
            Self::ListSubscriptions => "ListSubscriptions",
            Self::GetBucketNotification => "GetBucketNotificationConfiguration",
            Self::PutBucketNotification => "PutBucketNotificationConfiguration",
        }
    }

    /// Parse an `Action` value. Bucket configuration operations are routed
    /// by method and query, never by `Action`, and are not returned here.
    #[must_use]
    pub fn from_action(name: &str) -> Option<Self> {
        match name {
            "CreateQueue" => Some(Self::CreateQueue),
            "ListQueues" => Some(Self::ListQueues),
            "DeleteQueue" => Some(Self::DeleteQueue),
            "ReceiveMessage" => Some(Self::ReceiveMessage),
            "CreateTopic" => Some(Self::CreateTopic),
            "ListTopics" => Some(Self::ListTopics),
            "DeleteTopic" => Some(Self::DeleteTopic),
            "Subscribe" => Some(Self::Subscribe),
            "Unsubscribe" => Some(Self::Unsubscribe),
            "ListSubscriptions" => Some(Self::ListSubscriptions),
            _ => None,
        }
    }

    /// Whether the operation works on a bucket's configuration.
    #[must_use]
    pub fn is_bucket_operation(&self) -> bool {
        matches!(
            self,
            Self::GetBucketNotification | Self::PutBucketNotification
        )
    }
}

impl fmt::Display for NotifyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_round_trip_actions() {
        for op in [
            NotifyOperation::CreateQueue,
            NotifyOperation::ListQueues,
            NotifyOperation::DeleteQueue,
            NotifyOperation::ReceiveMessage,
            NotifyOperation::CreateTopic,
            NotifyOperation::ListTopics,
            NotifyOperation::DeleteTopic,
            NotifyOperation::Subscribe,
            NotifyOperation::Unsubscribe,
            NotifyOperation::ListSubscriptions,
        ] {
            assert_eq!(NotifyOperation::from_action(op.as_str()), Some(op));
            assert!(!op.is_bucket_operation());
        }
        assert_eq!(NotifyOperation::from_action("SendMessage"), None);
        assert_eq!(
            NotifyOperation::from_action("PutBucketNotificationConfiguration"),
            None
        );
    }
}
