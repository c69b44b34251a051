//! Gateway service in front of the notification proxy.
//!
//! Health checks (`/_health`, `/health`) are answered here. Everything else
//! goes to [`NotifyHttpService`], which routes control-plane requests to the
//! provider and proxies the rest upstream.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use hyper::body::Incoming;
use hyper::service::Service;
use notistack_notify_http::body::NotifyResponseBody;
use notistack_notify_http::dispatch::NotifyHandler;
use notistack_notify_http::service::NotifyHttpService;

/// Gateway wrapping the notification service.
#[derive(Debug)]
pub struct GatewayService<H: NotifyHandler> {
    notify: NotifyHttpService<H>,
    version: &'static str,
}

impl<H: NotifyHandler> GatewayService<H> {
    /// Create a gateway reporting `version` in health responses.
    pub fn new(notify: NotifyHttpService<H>, version: &'static str) -> Self {
        Self { notify, version }
    }

    /// A copy of the gateway bound to one client connection.
    #[must_use]
    pub fn with_peer(&self, peer: SocketAddr) -> Self {
        Self {
            notify: self.notify.with_peer(peer),
            version: self.version,
        }
    }
}

impl<H: NotifyHandler> Clone for GatewayService<H> {
    fn clone(&self) -> Self {
        Self {
            notify: self.notify.clone(),
            version: self.version,
        }
    }
}

impl<H: NotifyHandler> Service<http::Request<Incoming>> for GatewayService<H> {
    type Response = http::Response<NotifyResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            let response = health_check_response(self.version);
            return Box::pin(async { Ok(response) });
        }

        let notify = self.notify.clone();
        Box::pin(async move { notify.call(req).await })
    }
}

/// Check if the request is a health check.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/health")
}

fn health_check_response(version: &str) -> http::Response<NotifyResponseBody> {
    let body = serde_json::json!({ "status": "running", "version": version }).to_string();
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(NotifyResponseBody::from_string(body))
        .expect("static health response should be valid")
}
