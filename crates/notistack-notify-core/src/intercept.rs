//! Classification of proxied exchanges into storage events.

use chrono::Utc;
use notistack_notify_http::ProxiedExchange;
use notistack_notify_model::{EventName, ObservedEvent};

use crate::config::NotifyConfig;

const COPY_SOURCE: &str = "x-amz-copy-source";

/// Classify a completed exchange.
///
/// Rules are tried in order and the first match wins:
///
/// | Condition | Event |
/// |-----------|-------|
/// | request has `x-amz-copy-source` | `ObjectCreated:Copy` |
/// | `POST`, `?uploadId`, 200 | `ObjectCreated:CompleteMultipartUpload` |
/// | `PUT`, 200, `ETag`, not a part upload | `ObjectCreated:Put` |
/// | `DELETE`, 204 | `ObjectRemoved:Delete` |
///
/// Returns `None` for unmatched exchanges, requests without a bucket, and
/// event kinds switched off in `config`. Bucket-level exchanges carry an
/// empty key.
#[must_use]
pub fn classify(exchange: &ProxiedExchange, config: &NotifyConfig) -> Option<ObservedEvent> {
    let event_name = event_name(exchange)?;
    let enabled = match event_name {
        EventName::ObjectCreatedCopy => config.notify_on_copy,
        EventName::ObjectRemovedDelete => config.notify_on_delete,
        _ => config.notify_on_create,
    };
    if !enabled {
        return None;
    }

    let location = exchange.location.as_ref()?;

    let size = match event_name {
        EventName::ObjectRemovedDelete => 0,
        _ => exchange.content_length(),
    };

    Some(ObservedEvent {
        event_name,
        bucket: location.bucket.clone(),
        key: location.key.clone(),
        size,
        etag: exchange.response_header("etag").map(str::to_owned),
        request_id: exchange
            .response_header("x-amz-request-id")
            .map(str::to_owned),
        source_ip: exchange
            .peer
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default(),
        event_time: Utc::now(),
    })
}

fn event_name(exchange: &ProxiedExchange) -> Option<EventName> {
    let ok = exchange.status == http::StatusCode::OK;
    let method = &exchange.method;

    if exchange.request_headers.contains_key(COPY_SOURCE) {
        Some(EventName::ObjectCreatedCopy)
    } else if method == http::Method::POST && ok && exchange.has_query_param("uploadId") {
        Some(EventName::ObjectCreatedCompleteMultipartUpload)
    } else if method == http::Method::PUT
        && ok
        && exchange.response_headers.contains_key(http::header::ETAG)
        && !(exchange.has_query_param("partNumber") && exchange.has_query_param("uploadId"))
    {
        Some(EventName::ObjectCreatedPut)
    } else if method == http::Method::DELETE && exchange.status == http::StatusCode::NO_CONTENT {
        Some(EventName::ObjectRemovedDelete)
    } else {
        None
    }
}
