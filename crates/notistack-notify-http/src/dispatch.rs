//! Handler trait and the proxied exchange it observes.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use notistack_notify_model::error::NotifyError;
use notistack_notify_model::operations::NotifyOperation;

use crate::body::NotifyResponseBody;
use crate::request::NotifyRequest;
use crate::router::ObjectLocation;

/// Request and response heads of one proxied storage operation.
#[derive(Debug, Clone)]
pub struct ProxiedExchange {
    /// Request method.
    pub method: http::Method,
    /// Request URI as received.
    pub uri: http::Uri,
    /// Request headers as received.
    pub request_headers: http::HeaderMap,
    /// Bucket and key the request addresses, if any.
    pub location: Option<ObjectLocation>,
    /// Upstream response status.
    pub status: http::StatusCode,
    /// Upstream response headers.
    pub response_headers: http::HeaderMap,
    /// Client address.
    pub peer: Option<SocketAddr>,
}

impl ProxiedExchange {
    /// Whether the request query contains `name`, with or without a value.
    #[must_use]
    pub fn has_query_param(&self, name: &str) -> bool {
        self.uri.query().is_some_and(|q| {
            form_urlencoded::parse(q.as_bytes()).any(|(k, _)| k == name)
        })
    }

    /// Request `Content-Length`, 0 when absent or invalid.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        self.request_headers
            .get(http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// A response header as a string.
    #[must_use]
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Boundary between the HTTP layer and the notification service.
pub trait NotifyHandler: Send + Sync + 'static {
    /// Handle an authenticated control-plane operation.
    fn handle_operation(
        &self,
        op: NotifyOperation,
        req: NotifyRequest,
        request_id: String,
    ) -> Pin<
        Box<
            dyn Future<Output = Result<http::Response<NotifyResponseBody>, NotifyError>> + Send,
        >,
    >;

    /// Observe a completed proxied exchange.
    ///
    /// Called after the upstream response head arrives and before it is
    /// returned to the client. Implementations must not block and must not
    /// fail; the client response never depends on this call.
    fn observe_exchange(&self, exchange: ProxiedExchange);
}

/// Dispatch a control-plane operation to the handler.
pub async fn dispatch_operation<H: NotifyHandler>(
    handler: &H,
    op: NotifyOperation,
    req: NotifyRequest,
    request_id: &str,
) -> Result<http::Response<NotifyResponseBody>, NotifyError> {
    tracing::debug!(operation = %op, account = %req.account_id, "dispatching control-plane operation");
    handler
        .handle_operation(op, req, request_id.to_owned())
        .await
}
