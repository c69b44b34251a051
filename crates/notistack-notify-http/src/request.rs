//! Control-plane request parsing.
//!
//! awsQuery parameters may arrive in the query string, in a form-encoded
//! body, or both. They are merged query-first into one list and each operation
//! input is extracted through [`FromNotifyRequest`].

use bytes::Bytes;
use notistack_core::AccountId;
use notistack_notify_model::error::NotifyError;
use notistack_notify_model::input::{
    CreateQueueInput, CreateTopicInput, DeleteQueueInput, DeleteTopicInput,
    GetBucketNotificationInput, PutBucketNotificationInput, ReceiveMessageInput, SubscribeInput,
    UnsubscribeInput,
};
use notistack_notify_model::operations::NotifyOperation;
use notistack_notify_xml::from_xml;

use crate::router::parse_query_params;

/// An authenticated control-plane request.
#[derive(Debug, Clone)]
pub struct NotifyRequest {
    /// Account the caller acts for.
    pub account_id: AccountId,
    /// Merged query and form parameters.
    pub params: Vec<(String, String)>,
    /// Bucket for `?notification` requests.
    pub bucket: Option<String>,
    /// `/{account}/{queue}` path segments of GET-style queue requests.
    pub queue_path: Option<(String, String)>,
    /// Raw request body.
    pub body: Bytes,
}

impl NotifyRequest {
    /// Build a request from its parts. Form bodies contribute parameters.
    #[must_use]
    pub fn new(
        account_id: AccountId,
        parts: &http::request::Parts,
        body: Bytes,
        bucket: Option<String>,
        queue_path: Option<(String, String)>,
    ) -> Self {
        let mut params = parse_query_params(parts.uri.query().unwrap_or(""));
        if bucket.is_none() {
            if let Ok(form) = std::str::from_utf8(&body) {
                params.extend(parse_query_params(form));
            }
        }
        Self {
            account_id,
            params,
            bucket,
            queue_path,
            body,
        }
    }

    /// First value of a parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// A parameter that must be present and non-empty.
    pub fn required_param(&self, name: &str) -> Result<&str, NotifyError> {
        self.param(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| NotifyError::missing_parameter(name))
    }

    /// Resolve the operation named by `Action`.
    pub fn operation(&self) -> Result<NotifyOperation, NotifyError> {
        let action = self
            .param("Action")
            .filter(|a| !a.is_empty())
            .ok_or_else(NotifyError::missing_action)?;
        NotifyOperation::from_action(action).ok_or_else(|| NotifyError::invalid_action(action))
    }

    /// Account and queue name, from the request path or the `QueueUrl`
    /// parameter.
    pub fn queue_address(&self) -> Result<(String, String), NotifyError> {
        if let Some(path) = &self.queue_path {
            return Ok(path.clone());
        }
        let url = self.required_param("QueueUrl")?;
        parse_queue_url(url).ok_or_else(|| NotifyError::invalid_parameter("QueueUrl"))
    }

    fn bucket(&self) -> Result<String, NotifyError> {
        self.bucket
            .clone()
            .ok_or_else(|| NotifyError::missing_parameter("Bucket"))
    }
}

/// Take the first two path segments of a queue URL as account and queue.
///
/// Accepts absolute URLs (`http://host/acct/name`) and bare paths.
#[must_use]
pub fn parse_queue_url(url: &str) -> Option<(String, String)> {
    let path = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest.find('/').map_or("", |i| &rest[i..]));
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let account = segments.next()?;
    let queue = segments.next()?;
    Some((account.to_owned(), queue.to_owned()))
}

/// Extract an operation input from a control-plane request.
pub trait FromNotifyRequest: Sized {
    /// Build the input.
    ///
    /// # Errors
    ///
    /// Returns a `NotifyError` if a required parameter is missing or the body
    /// does not parse.
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError>;
}

impl FromNotifyRequest for CreateQueueInput {
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError> {
        Ok(Self {
            queue_name: req.required_param("QueueName")?.to_owned(),
        })
    }
}

impl FromNotifyRequest for DeleteQueueInput {
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError> {
        let (account_id, queue_name) = req.queue_address()?;
        Ok(Self {
            account_id,
            queue_name,
        })
    }
}

impl FromNotifyRequest for ReceiveMessageInput {
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError> {
        let (account_id, queue_name) = req.queue_address()?;
        Ok(Self {
            account_id,
            queue_name,
            max_number_of_messages: req
                .param("MaxNumberOfMessages")
                .and_then(|v| v.trim().parse().ok()),
        })
    }
}

impl FromNotifyRequest for CreateTopicInput {
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError> {
        Ok(Self {
            name: req.param("Name").unwrap_or_default().to_owned(),
        })
    }
}

impl FromNotifyRequest for DeleteTopicInput {
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError> {
        Ok(Self {
            topic_arn: req.required_param("TopicArn")?.to_owned(),
        })
    }
}

impl FromNotifyRequest for SubscribeInput {
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError> {
        Ok(Self {
            topic_arn: req.required_param("TopicArn")?.to_owned(),
            protocol: req.param("Protocol").unwrap_or_default().to_owned(),
            endpoint: req.param("Endpoint").unwrap_or_default().to_owned(),
        })
    }
}

impl FromNotifyRequest for UnsubscribeInput {
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError> {
        Ok(Self {
            subscription_arn: req.required_param("SubscriptionArn")?.to_owned(),
        })
    }
}

impl FromNotifyRequest for GetBucketNotificationInput {
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError> {
        Ok(Self {
            bucket: req.bucket()?,
        })
    }
}

impl FromNotifyRequest for PutBucketNotificationInput {
    fn from_notify_request(req: &NotifyRequest) -> Result<Self, NotifyError> {
        let configuration = from_xml(&req.body).map_err(|e| {
            tracing::debug!(error = %e, "notification configuration did not parse");
            NotifyError::malformed_xml().with_source(e)
        })?;
        Ok(Self {
            bucket: req.bucket()?,
            configuration,
        })
    }
}
