//! Control-plane response building and error formatting.

use notistack_notify_model::error::NotifyError;
use notistack_notify_xml::{
    QueryResult, S3_NAMESPACE, XmlSerialize, error_to_xml, query_error_to_xml,
    to_query_response, to_xml,
};

use crate::body::NotifyResponseBody;

/// Content type for XML responses.
pub const CONTENT_TYPE: &str = "application/xml";

/// Headers a browser may send on control-plane requests.
pub const CORS_ALLOW_HEADERS: &str =
    "content-type,x-amz-content-sha256,x-amz-date,authorization,host,x-amz-user-agent";

/// Methods allowed on control-plane requests.
pub const CORS_ALLOW_METHODS: &str = "GET,POST,PUT,DELETE";

/// Which error envelope a failure is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStyle {
    /// Flat S3 `<Error>`, for bucket configuration requests.
    RestXml,
    /// `<ErrorResponse>`, for queue and topic actions.
    Query,
}

/// Build a 200 XML response.
#[must_use]
pub fn xml_response(xml: Vec<u8>) -> http::Response<NotifyResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", CONTENT_TYPE)
        .body(NotifyResponseBody::from_bytes(xml))
        .expect("valid XML response")
}

/// Render an awsQuery `{action}Response`.
pub fn query_response<T: QueryResult>(
    action: &str,
    namespace: &str,
    result: &T,
    request_id: &str,
) -> Result<http::Response<NotifyResponseBody>, NotifyError> {
    let xml = to_query_response(action, namespace, result, request_id)
        .map_err(|e| NotifyError::internal_error("failed to serialize response").with_source(e))?;
    Ok(xml_response(xml))
}

/// Render a RestXml document with root `root`.
pub fn rest_xml_response<T: XmlSerialize>(
    root: &str,
    value: &T,
) -> Result<http::Response<NotifyResponseBody>, NotifyError> {
    let xml = to_xml(root, S3_NAMESPACE, value)
        .map_err(|e| NotifyError::internal_error("failed to serialize response").with_source(e))?;
    Ok(xml_response(xml))
}

/// Build an empty 200 response.
#[must_use]
pub fn empty_response() -> http::Response<NotifyResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .body(NotifyResponseBody::empty())
        .expect("valid empty response")
}

/// Convert a `NotifyError` into a complete HTTP error response.
#[must_use]
pub fn error_to_response(
    error: &NotifyError,
    style: ErrorStyle,
    resource: Option<&str>,
    request_id: &str,
) -> http::Response<NotifyResponseBody> {
    let xml = match style {
        ErrorStyle::RestXml => {
            error_to_xml(error.code.as_str(), &error.message, resource, request_id)
        }
        ErrorStyle::Query => query_error_to_xml(
            error.code.error_type(),
            error.code.as_str(),
            &error.message,
            request_id,
        ),
    };

    http::Response::builder()
        .status(error.status_code)
        .header("content-type", CONTENT_TYPE)
        .body(NotifyResponseBody::from_bytes(xml))
        .expect("valid error response")
}

/// CORS preflight answer.
#[must_use]
pub fn cors_preflight_response() -> http::Response<NotifyResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::NO_CONTENT)
        .header("access-control-allow-origin", "*")
        .header("access-control-allow-methods", CORS_ALLOW_METHODS)
        .header("access-control-allow-headers", CORS_ALLOW_HEADERS)
        .body(NotifyResponseBody::empty())
        .expect("static CORS response should be valid")
}

/// Add the headers every locally answered response carries.
#[must_use]
pub fn add_common_headers(
    mut response: http::Response<NotifyResponseBody>,
    request_id: &str,
) -> http::Response<NotifyResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry("x-amz-request-id").or_insert(hv);
    }
    headers.insert("server", http::HeaderValue::from_static("Notistack"));
    headers.insert(
        "access-control-allow-origin",
        http::HeaderValue::from_static("*"),
    );

    response
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use notistack_notify_model::error::NotifyErrorCode;
    use notistack_notify_model::output::CreateQueueOutput;
    use notistack_notify_xml::SQS_NAMESPACE;

    use super::*;

    fn body_string(resp: http::Response<NotifyResponseBody>) -> String {
        let bytes = tokio_test::block_on(resp.into_body().collect())
            .unwrap()
            .to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_should_render_query_error_envelope() {
        let err = NotifyError::queue_already_exists();
        let resp = error_to_response(&err, ErrorStyle::Query, None, "req-1");
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        let body = body_string(resp);
        assert!(body.contains("<ErrorResponse>"));
        assert!(body.contains("<Type>Sender</Type>"));
        assert!(body.contains("<Code>QueueAlreadyExists</Code>"));
        assert!(body.contains("<RequestId>req-1</RequestId>"));
    }

    #[test]
    fn test_should_render_rest_error_envelope() {
        let err = NotifyError::with_message(NotifyErrorCode::ArnNotification, "bad arn");
        let resp = error_to_response(&err, ErrorStyle::RestXml, Some("/data"), "req-2");
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        let body = body_string(resp);
        assert!(body.contains("<Error><Code>InvalidArgument</Code>"));
        assert!(body.contains("<Resource>/data</Resource>"));
    }

    #[test]
    fn test_should_render_query_response() {
        let out = CreateQueueOutput {
            queue_url: "http://localhost:8003/acct1/alerts".to_owned(),
        };
        let resp = query_response("CreateQueue", SQS_NAMESPACE, &out, "req-3").unwrap();
        assert_eq!(resp.headers().get("content-type").unwrap(), CONTENT_TYPE);
        let body = body_string(resp);
        assert!(body.contains("<CreateQueueResult><QueueUrl>http://localhost:8003/acct1/alerts</QueueUrl>"));
    }

    #[test]
    fn test_should_answer_preflight() {
        let resp = cors_preflight_response();
        assert_eq!(resp.status(), http::StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers().get("access-control-allow-headers").unwrap(),
            CORS_ALLOW_HEADERS
        );
    }

    #[test]
    fn test_should_add_common_headers() {
        let resp = add_common_headers(empty_response(), "req-4");
        assert_eq!(resp.headers().get("x-amz-request-id").unwrap(), "req-4");
        assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
    }
}
