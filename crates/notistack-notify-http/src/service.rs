//! Hyper `Service` for the notification proxy.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use notistack_auth::{AuthBackend, AuthError, DummyBackend};
use notistack_core::AccountId;
use notistack_notify_model::error::{NotifyError, NotifyErrorCode};
use notistack_notify_model::operations::NotifyOperation;
use notistack_notify_xml::error_to_xml;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::body::NotifyResponseBody;
use crate::dispatch::{NotifyHandler, ProxiedExchange, dispatch_operation};
use crate::proxy::{ProxyClient, ProxyError};
use crate::request::NotifyRequest;
use crate::response::{
    CONTENT_TYPE, ErrorStyle, add_common_headers, cors_preflight_response, error_to_response,
};
use crate::router::{NotifyRouter, Route};

/// Configuration for the HTTP service.
#[derive(Clone)]
pub struct NotifyHttpConfig {
    /// Host clients use to reach the service.
    pub public_host: String,
    /// Whether `{bucket}.{public_host}` addressing is recognized.
    pub virtual_hosting: bool,
    /// Backing gateway base URL.
    pub upstream_endpoint: String,
    /// How long to wait for the upstream response head.
    pub upstream_timeout: Duration,
    /// Resolves control-plane requests to accounts.
    pub auth: Arc<dyn AuthBackend>,
}

impl std::fmt::Debug for NotifyHttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyHttpConfig")
            .field("public_host", &self.public_host)
            .field("virtual_hosting", &self.virtual_hosting)
            .field("upstream_endpoint", &self.upstream_endpoint)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("auth", &self.auth)
            .finish()
    }
}

impl Default for NotifyHttpConfig {
    fn default() -> Self {
        Self {
            public_host: "localhost:8003".to_owned(),
            virtual_hosting: true,
            upstream_endpoint: "http://127.0.0.1:7480".to_owned(),
            upstream_timeout: Duration::from_secs(60),
            auth: Arc::new(DummyBackend::new(AccountId::default())),
        }
    }
}

/// Hyper `Service` routing between the control plane and the upstream proxy.
#[derive(Debug)]
pub struct NotifyHttpService<H: NotifyHandler> {
    handler: Arc<H>,
    router: NotifyRouter,
    proxy: ProxyClient,
    config: Arc<NotifyHttpConfig>,
    peer: Option<SocketAddr>,
}

impl<H: NotifyHandler> NotifyHttpService<H> {
    /// Create a new service.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::InvalidUpstream` if the upstream URL is unusable.
    pub fn new(handler: Arc<H>, config: NotifyHttpConfig) -> Result<Self, ProxyError> {
        let proxy = ProxyClient::new(&config.upstream_endpoint, config.upstream_timeout)?;
        Ok(Self {
            handler,
            router: NotifyRouter::new(config.public_host.clone(), config.virtual_hosting),
            proxy,
            config: Arc::new(config),
            peer: None,
        })
    }

    /// A copy of the service bound to one client connection.
    #[must_use]
    pub fn with_peer(&self, peer: SocketAddr) -> Self {
        let mut svc = self.clone();
        svc.peer = Some(peer);
        svc
    }
}

impl<H: NotifyHandler> Clone for NotifyHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            router: self.router.clone(),
            proxy: self.proxy.clone(),
            config: Arc::clone(&self.config),
            peer: self.peer,
        }
    }
}

impl<H: NotifyHandler> hyper::service::Service<http::Request<Incoming>> for NotifyHttpService<H> {
    type Response = http::Response<NotifyResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let svc = self.clone();

        Box::pin(async move {
            let response = match svc.router.resolve(&req) {
                Route::Proxy => svc.proxy_request(req).await,
                Route::Preflight => cors_preflight_response(),
                Route::Query { queue_path } => {
                    let request_id = Uuid::new_v4().to_string();
                    let response = svc
                        .control_plane(req, None, queue_path, &request_id)
                        .await;
                    add_common_headers(response, &request_id)
                }
                Route::BucketNotification { bucket } => {
                    let request_id = Uuid::new_v4().to_string();
                    let response = svc
                        .control_plane(req, Some(bucket), None, &request_id)
                        .await;
                    add_common_headers(response, &request_id)
                }
            };
            Ok(response)
        })
    }
}

impl<H: NotifyHandler> NotifyHttpService<H> {
    /// Authenticate, parse and dispatch a control-plane request.
    async fn control_plane(
        &self,
        req: http::Request<Incoming>,
        bucket: Option<String>,
        queue_path: Option<(String, String)>,
        request_id: &str,
    ) -> http::Response<NotifyResponseBody> {
        let (style, resource) = match &bucket {
            Some(b) => (ErrorStyle::RestXml, Some(format!("/{b}"))),
            None => (ErrorStyle::Query, None),
        };
        let fail = |err: NotifyError| {
            debug!(code = %err.code, message = %err.message, request_id, "control-plane request failed");
            error_to_response(&err, style, resource.as_deref(), request_id)
        };

        let (parts, incoming) = req.into_parts();
        let body = match collect_body(incoming).await {
            Ok(body) => body,
            Err(err) => return fail(err),
        };

        let account = match self.config.auth.authenticate(&parts, &body) {
            Ok(account) => account,
            Err(auth_err) => {
                warn!(error = %auth_err, request_id, "authentication failed");
                return fail(auth_error(&auth_err));
            }
        };

        let notify_req = NotifyRequest::new(account, &parts, body, bucket, queue_path);
        let op = match &notify_req.bucket {
            Some(_) if parts.method == http::Method::PUT => Ok(NotifyOperation::PutBucketNotification),
            Some(_) => Ok(NotifyOperation::GetBucketNotification),
            None => notify_req.operation(),
        };
        let op = match op {
            Ok(op) => op,
            Err(err) => return fail(err),
        };

        info!(operation = %op, account = %notify_req.account_id, request_id, "routed control-plane request");

        match dispatch_operation(self.handler.as_ref(), op, notify_req, request_id).await {
            Ok(response) => response,
            Err(err) => fail(err),
        }
    }

    /// Forward to the backing gateway and report the exchange to the handler.
    async fn proxy_request(&self, req: http::Request<Incoming>) -> http::Response<NotifyResponseBody> {
        let location = self.router.locate(&req);
        let method = req.method().clone();
        let uri = req.uri().clone();
        let request_headers = req.headers().clone();

        match self.proxy.forward(req).await {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                self.handler.observe_exchange(ProxiedExchange {
                    method,
                    uri,
                    request_headers,
                    location,
                    status: parts.status,
                    response_headers: parts.headers.clone(),
                    peer: self.peer,
                });
                http::Response::from_parts(parts, NotifyResponseBody::Upstream(body))
            }
            Err(err) => {
                warn!(%method, %uri, error = %err, "proxy request failed");
                proxy_error_response(&err)
            }
        }
    }
}

/// Collect the incoming body into a single `Bytes` buffer.
async fn collect_body(incoming: Incoming) -> Result<Bytes, NotifyError> {
    incoming
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| NotifyError::internal_error(format!("Failed to read request body: {e}")))
}

/// Map an authentication failure to its control-plane error.
fn auth_error(err: &AuthError) -> NotifyError {
    let code = match err {
        AuthError::MissingAuthHeader => NotifyErrorCode::AccessDenied,
        AuthError::AccessKeyNotFound(_) => NotifyErrorCode::InvalidAccessKeyId,
        AuthError::SignatureDoesNotMatch => NotifyErrorCode::SignatureDoesNotMatch,
        e if e.is_malformed() => NotifyErrorCode::AuthorizationHeaderMalformed,
        _ => NotifyErrorCode::AccessDenied,
    };
    NotifyError::with_message(code, err.to_string())
}

fn proxy_error_response(err: &ProxyError) -> http::Response<NotifyResponseBody> {
    let status = err.status_code();
    let code = match status {
        http::StatusCode::GATEWAY_TIMEOUT => "GatewayTimeout",
        _ => "BadGateway",
    };
    let xml = error_to_xml(code, &err.to_string(), None, "");
    http::Response::builder()
        .status(status)
        .header("content-type", CONTENT_TYPE)
        .body(NotifyResponseBody::from_bytes(xml))
        .expect("valid proxy error response")
}
