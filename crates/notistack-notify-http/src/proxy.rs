//! Upstream reverse proxy.
//!
//! Requests are forwarded to the backing gateway with the original method,
//! path, query, headers and streaming body. Hop-by-hop headers are dropped in
//! both directions.

use std::time::Duration;

use http::header::{self, HeaderName};
use hyper::body::Incoming;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: [HeaderName; 5] = [
    header::CONNECTION,
    header::UPGRADE,
    header::TRANSFER_ENCODING,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
];

/// Proxy failures. None of them produce an event.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The configured upstream is not an `http://host[:port]` URL.
    #[error("invalid upstream endpoint: {0}")]
    InvalidUpstream(String),

    /// The rewritten request could not be built.
    #[error("failed to build upstream request: {0}")]
    Build(#[from] http::Error),

    /// Connecting to or talking to the upstream failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// No response head arrived in time.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl ProxyError {
    /// Status returned to the client.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::Timeout(_) => http::StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidUpstream(_) | Self::Build(_) | Self::Upstream(_) => {
                http::StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Forwards requests to the backing gateway.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client<HttpConnector, Incoming>,
    base: String,
    timeout: Duration,
}

impl ProxyClient {
    /// Create a client for `upstream`, e.g. `http://127.0.0.1:7480`.
    pub fn new(upstream: &str, timeout: Duration) -> Result<Self, ProxyError> {
        let uri: http::Uri = upstream
            .parse()
            .map_err(|_| ProxyError::InvalidUpstream(upstream.to_owned()))?;
        if uri.scheme() != Some(&http::uri::Scheme::HTTP) || uri.authority().is_none() {
            return Err(ProxyError::InvalidUpstream(upstream.to_owned()));
        }

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeout));
        connector.set_keepalive(Some(Duration::from_secs(60)));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .build(connector);

        Ok(Self {
            client,
            base: upstream.trim_end_matches('/').to_owned(),
            timeout,
        })
    }

    /// Forward a request and wait for the upstream response head.
    pub async fn forward(
        &self,
        req: http::Request<Incoming>,
    ) -> Result<http::Response<Incoming>, ProxyError> {
        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map_or("/", http::uri::PathAndQuery::as_str);
        let target = format!("{}{path_and_query}", self.base);
        debug!(method = %parts.method, %target, "forwarding request upstream");

        let mut builder = http::Request::builder()
            .method(parts.method)
            .uri(target)
            .version(parts.version);
        if let Some(headers) = builder.headers_mut() {
            *headers = strip_hop_by_hop(parts.headers);
        }
        let upstream_req = builder.body(body)?;

        let response = tokio::time::timeout(self.timeout, self.client.request(upstream_req))
            .await
            .map_err(|_| ProxyError::Timeout(self.timeout))?
            .inspect_err(|e| warn!(error = %e, connect = e.is_connect(), "upstream request failed"))?;

        let (mut parts, body) = response.into_parts();
        parts.headers = strip_hop_by_hop(parts.headers);
        Ok(http::Response::from_parts(parts, body))
    }
}

fn strip_hop_by_hop(mut headers: http::HeaderMap) -> http::HeaderMap {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_reject_invalid_upstream() {
        assert!(matches!(
            ProxyClient::new("not a url", Duration::from_secs(1)),
            Err(ProxyError::InvalidUpstream(_))
        ));
        assert!(matches!(
            ProxyClient::new("https://gateway:443", Duration::from_secs(1)),
            Err(ProxyError::InvalidUpstream(_))
        ));
    }

    #[tokio::test]
    async fn test_should_trim_trailing_slash_from_base() {
        let client = ProxyClient::new("http://127.0.0.1:7480/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base, "http://127.0.0.1:7480");
    }

    #[test]
    fn test_should_strip_hop_by_hop_headers() {
        let mut headers = http::HeaderMap::new();
        headers.insert(header::CONNECTION, http::HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", http::HeaderValue::from_static("timeout=5"));
        headers.insert(header::ETAG, http::HeaderValue::from_static("\"e\""));
        let headers = strip_hop_by_hop(headers);
        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get(header::ETAG).is_some());
    }

    #[test]
    fn test_should_map_errors_to_gateway_statuses() {
        assert_eq!(
            ProxyError::Timeout(Duration::from_secs(1)).status_code(),
            http::StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::InvalidUpstream("x".to_owned()).status_code(),
            http::StatusCode::BAD_GATEWAY
        );
    }
}
