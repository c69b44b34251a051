//! Handler bridging the HTTP layer to the notification provider.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use notistack_notify_http::body::NotifyResponseBody;
use notistack_notify_http::dispatch::{NotifyHandler, ProxiedExchange};
use notistack_notify_http::request::{FromNotifyRequest, NotifyRequest};
use notistack_notify_http::response::{empty_response, query_response, rest_xml_response};
use notistack_notify_model::error::NotifyError;
use notistack_notify_model::input::{
    CreateQueueInput, CreateTopicInput, DeleteQueueInput, DeleteTopicInput,
    GetBucketNotificationInput, PutBucketNotificationInput, ReceiveMessageInput, SubscribeInput,
    UnsubscribeInput,
};
use notistack_notify_model::operations::NotifyOperation;
use notistack_notify_xml::{SNS_NAMESPACE, SQS_NAMESPACE};
use tracing::{debug, warn};

use crate::provider::NotistackNotify;

/// Handler that bridges the HTTP layer to [`NotistackNotify`].
#[derive(Debug)]
pub struct NotistackNotifyHandler {
    provider: Arc<NotistackNotify>,
}

impl NotistackNotifyHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<NotistackNotify>) -> Self {
        Self { provider }
    }

    /// The wrapped provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<NotistackNotify> {
        &self.provider
    }
}

impl NotifyHandler for NotistackNotifyHandler {
    fn handle_operation(
        &self,
        op: NotifyOperation,
        req: NotifyRequest,
        request_id: String,
    ) -> Pin<
        Box<
            dyn Future<Output = Result<http::Response<NotifyResponseBody>, NotifyError>> + Send,
        >,
    > {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), op, &req, &request_id).await })
    }

    fn observe_exchange(&self, exchange: ProxiedExchange) {
        match self.provider.observe(&exchange) {
            Ok(Some(event)) => debug!(
                bucket = %event.bucket,
                key = %event.key,
                event = %event.event_name,
                "event accepted for dispatch"
            ),
            Ok(None) => {}
            Err(e) => warn!(
                method = %exchange.method,
                uri = %exchange.uri,
                error = %e,
                "failed to enqueue event"
            ),
        }
    }
}

/// Dispatch a control-plane operation to the matching provider method.
async fn dispatch(
    provider: &NotistackNotify,
    op: NotifyOperation,
    req: &NotifyRequest,
    request_id: &str,
) -> Result<http::Response<NotifyResponseBody>, NotifyError> {
    let caller = &req.account_id;
    let action = op.as_str();

    match op {
        // Queues
        NotifyOperation::CreateQueue => {
            let input = CreateQueueInput::from_notify_request(req)?;
            let output = provider.handle_create_queue(caller, input)?;
            query_response(action, SQS_NAMESPACE, &output, request_id)
        }
        NotifyOperation::ListQueues => {
            let output = provider.handle_list_queues(caller);
            query_response(action, SQS_NAMESPACE, &output, request_id)
        }
        NotifyOperation::DeleteQueue => {
            let input = DeleteQueueInput::from_notify_request(req)?;
            let output = provider.handle_delete_queue(caller, input).await?;
            query_response(action, SQS_NAMESPACE, &output, request_id)
        }
        NotifyOperation::ReceiveMessage => {
            let input = ReceiveMessageInput::from_notify_request(req)?;
            let output = provider.handle_receive_message(caller, input).await?;
            query_response(action, SQS_NAMESPACE, &output, request_id)
        }

        // Topics
        NotifyOperation::CreateTopic => {
            let input = CreateTopicInput::from_notify_request(req)?;
            let output = provider.handle_create_topic(caller, input)?;
            query_response(action, SNS_NAMESPACE, &output, request_id)
        }
        NotifyOperation::ListTopics => {
            let output = provider.handle_list_topics(caller);
            query_response(action, SNS_NAMESPACE, &output, request_id)
        }
        NotifyOperation::DeleteTopic => {
            let input = DeleteTopicInput::from_notify_request(req)?;
            let output = provider.handle_delete_topic(caller, input)?;
            query_response(action, SNS_NAMESPACE, &output, request_id)
        }
        NotifyOperation::Subscribe => {
            let input = SubscribeInput::from_notify_request(req)?;
            let output = provider.handle_subscribe(caller, input)?;
            query_response(action, SNS_NAMESPACE, &output, request_id)
        }
        NotifyOperation::Unsubscribe => {
            let input = UnsubscribeInput::from_notify_request(req)?;
            let output = provider.handle_unsubscribe(caller, input)?;
            query_response(action, SNS_NAMESPACE, &output, request_id)
        }
        NotifyOperation::ListSubscriptions => {
            let output = provider.handle_list_subscriptions(caller);
            query_response(action, SNS_NAMESPACE, &output, request_id)
        }

        // Bucket configuration
        NotifyOperation::GetBucketNotification => {
            let input = GetBucketNotificationInput::from_notify_request(req)?;
            let output = provider.handle_get_bucket_notification(caller, input)?;
            rest_xml_response("NotificationConfiguration", &output)
        }
        NotifyOperation::PutBucketNotification => {
            let input = PutBucketNotificationInput::from_notify_request(req)?;
            provider.handle_put_bucket_notification(caller, input)?;
            Ok(empty_response())
        }
    }
}
