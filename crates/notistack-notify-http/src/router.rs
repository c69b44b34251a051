//! Request routing and object addressing.
//!
//! Routing only decides which path a request takes; it never fails. Anything
//! that is not recognizably a control-plane request is proxied.
//!
//! Objects are addressed in two ways:
//!
//! - path style: `/{bucket}/{key...}`
//! - virtual-host style: `Host: {bucket}.{public_host}` with the whole path as
//!   the key

use http::Method;
use percent_encoding::percent_decode_str;

/// Which path a request takes through the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// CORS preflight answered locally.
    Preflight,
    /// awsQuery control-plane request. `queue_path` carries the
    /// `/{account}/{queue}` segments of GET-style queue requests.
    Query {
        /// Account and queue taken from the request path.
        queue_path: Option<(String, String)>,
    },
    /// `GET`/`PUT ?notification` on a bucket.
    BucketNotification {
        /// Bucket the configuration belongs to.
        bucket: String,
    },
    /// Forward to the backing gateway.
    Proxy,
}

/// Bucket and key a storage request addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    /// Bucket name.
    pub bucket: String,
    /// Object key, empty for bucket-level requests.
    pub key: String,
}

/// Routes requests given the public host name.
#[derive(Debug, Clone)]
pub struct NotifyRouter {
    /// Host name clients use to reach the service, optionally with a port.
    pub public_host: String,
    /// Whether `{bucket}.{public_host}` addressing is recognized.
    pub virtual_hosting: bool,
}

impl NotifyRouter {
    /// Create a new router.
    #[must_use]
    pub fn new(public_host: impl Into<String>, virtual_hosting: bool) -> Self {
        Self {
            public_host: public_host.into(),
            virtual_hosting,
        }
    }

    /// Decide the route for a request.
    pub fn resolve<B>(&self, req: &http::Request<B>) -> Route {
        let method = req.method();
        let path = req.uri().path();
        let params = parse_query_params(req.uri().query().unwrap_or(""));
        let has_param = |name: &str| params.iter().any(|(k, _)| k == name);

        if method == Method::OPTIONS {
            return if has_param("notification") || path == "/" {
                Route::Preflight
            } else {
                Route::Proxy
            };
        }

        if has_param("Action") {
            return Route::Query {
                queue_path: queue_path(path),
            };
        }

        if method == Method::POST
            && path == "/"
            && is_form_encoded(req.headers())
            && self.virtual_host_bucket(req.headers()).is_none()
        {
            return Route::Query { queue_path: None };
        }

        if has_param("notification") && (method == Method::GET || method == Method::PUT) {
            if let Some(location) = self.locate(req) {
                return Route::BucketNotification {
                    bucket: location.bucket,
                };
            }
        }

        Route::Proxy
    }

    /// Extract the bucket and key a request addresses.
    pub fn locate<B>(&self, req: &http::Request<B>) -> Option<ObjectLocation> {
        extract_object_location(
            host_header(req.headers()),
            req.uri().path(),
            &self.public_host,
            self.virtual_hosting,
        )
    }

    fn virtual_host_bucket<'a>(&self, headers: &'a http::HeaderMap) -> Option<&'a str> {
        if !self.virtual_hosting {
            return None;
        }
        host_header(headers).and_then(|host| virtual_host_bucket(host, &self.public_host))
    }
}

/// Extract the bucket and key from a host and path.
///
/// With virtual hosting enabled and `host` of the form `{bucket}.{public_host}`
/// the bucket is the leading label and the key is the whole path without its
/// leading `/`. Otherwise the first path segment is the bucket and the rest is
/// the key. Returns `None` when no bucket can be found.
#[must_use]
pub fn extract_object_location(
    host: Option<&str>,
    path: &str,
    public_host: &str,
    virtual_hosting: bool,
) -> Option<ObjectLocation> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);

    if virtual_hosting {
        if let Some(bucket) = host.and_then(|h| virtual_host_bucket(h, public_host)) {
            return Some(ObjectLocation {
                bucket: bucket.to_owned(),
                key: decode_uri_component(trimmed),
            });
        }
    }

    let (bucket, key) = trimmed.split_once('/').unwrap_or((trimmed, ""));
    if bucket.is_empty() {
        return None;
    }
    Some(ObjectLocation {
        bucket: decode_uri_component(bucket),
        key: decode_uri_component(key),
    })
}

fn virtual_host_bucket<'a>(host: &'a str, public_host: &str) -> Option<&'a str> {
    let leading = host
        .strip_suffix(public_host)
        .or_else(|| strip_port(host).strip_suffix(strip_port(public_host)))?;
    leading.strip_suffix('.').filter(|bucket| !bucket.is_empty())
}

fn strip_port(host: &str) -> &str {
    host.rsplit_once(':')
        .filter(|(_, port)| port.bytes().all(|b| b.is_ascii_digit()))
        .map_or(host, |(name, _)| name)
}

fn host_header(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
}

fn is_form_encoded(headers: &http::HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

fn queue_path(path: &str) -> Option<(String, String)> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let account = segments.next()?;
    let queue = segments.next()?;
    Some((decode_uri_component(account), decode_uri_component(queue)))
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string or form body into key-value pairs.
pub(crate) fn parse_query_params(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
