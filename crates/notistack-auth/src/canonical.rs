//! SigV4 canonical request construction.
//!
//! ```text
//! Method\nCanonicalURI\nCanonicalQuery\nCanonicalHeaders\n\nSignedHeaders\nPayloadHash
//! ```

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Everything except RFC 3986 unreserved characters is encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the canonical request string.
///
/// # Examples
///
/// ```
/// use notistack_auth::canonical::build_canonical_request;
///
/// let canonical = build_canonical_request(
///     "POST",
///     "/",
///     "",
///     &[("host", "localhost:8003")],
///     &["host"],
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
/// );
/// assert!(canonical.starts_with("POST\n/\n\nhost:localhost:8003\n\nhost\n"));
/// ```
#[must_use]
pub fn build_canonical_request(
    method: &str,
    uri: &str,
    query_string: &str,
    headers: &[(&str, &str)],
    signed_headers: &[&str],
    payload_hash: &str,
) -> String {
    format!(
        "{method}\n{}\n{}\n{}\n\n{}\n{payload_hash}",
        build_canonical_uri(uri),
        build_canonical_query_string(query_string),
        build_canonical_headers(headers, signed_headers),
        build_signed_headers_string(signed_headers),
    )
}

/// Encode each path segment, keeping `/`. An empty path becomes `/`.
///
/// Segments are decoded first so already-encoded paths are not encoded twice.
#[must_use]
pub fn build_canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }
    path.split('/')
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            utf8_percent_encode(&decoded, URI_ENCODE_SET).to_string()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Sort query parameters by name then value, keeping the raw encoding the
/// client signed with.
#[must_use]
pub fn build_canonical_query_string(query: &str) -> String {
    let mut params: Vec<(&str, &str)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| param.split_once('=').unwrap_or((param, "")))
        .collect();
    params.sort_unstable();
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// `name:value` lines for the signed headers, sorted, without a trailing newline.
///
/// Names are lowercased, values trimmed with inner whitespace collapsed, and
/// repeated headers joined with `,`.
#[must_use]
pub fn build_canonical_headers(headers: &[(&str, &str)], signed_headers: &[&str]) -> String {
    let mut header_map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = collapse_whitespace(value.trim());
        header_map
            .entry(name.to_lowercase())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    let mut sorted: Vec<&str> = signed_headers.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .filter_map(|name| header_map.get(*name).map(|value| format!("{name}:{value}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sorted, `;`-separated signed header names.
#[must_use]
pub fn build_signed_headers_string(signed_headers: &[&str]) -> String {
    let mut sorted: Vec<&str> = signed_headers.to_vec();
    sorted.sort_unstable();
    sorted.join(";")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_normalize_uri() {
        assert_eq!(build_canonical_uri(""), "/");
        assert_eq!(build_canonical_uri("/acct1/alerts"), "/acct1/alerts");
        assert_eq!(build_canonical_uri("/data/hello world"), "/data/hello%20world");
        assert_eq!(build_canonical_uri("/data/a%20b"), "/data/a%20b");
    }

    #[test]
    fn test_should_sort_query_and_keep_raw_values() {
        assert_eq!(build_canonical_query_string(""), "");
        assert_eq!(build_canonical_query_string("notification"), "notification=");
        assert_eq!(
            build_canonical_query_string("Action=ListQueues&A=x%2Fy"),
            "A=x%2Fy&Action=ListQueues"
        );
    }

    #[test]
    fn test_should_build_headers_sorted_and_collapsed() {
        let headers = [("Host", "  example.com "), ("X-Amz-Date", "a   b"), ("x-other", "z")];
        let result = build_canonical_headers(&headers, &["x-amz-date", "host"]);
        assert_eq!(result, "host:example.com\nx-amz-date:a b");
        assert_eq!(build_signed_headers_string(&["x-amz-date", "host"]), "host;x-amz-date");
    }

    #[test]
    fn test_should_build_canonical_request_matching_aws_example() {
        use sha2::{Digest, Sha256};

        let empty = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        let headers = [
            ("host", "examplebucket.s3.amazonaws.com"),
            ("range", "bytes=0-9"),
            ("x-amz-content-sha256", empty),
            ("x-amz-date", "20130524T000000Z"),
        ];
        let signed = ["host", "range", "x-amz-content-sha256", "x-amz-date"];
        let canonical = build_canonical_request("GET", "/test.txt", "", &headers, &signed, empty);

        let hash = hex::encode(Sha256::digest(canonical.as_bytes()));
        assert_eq!(
            hash,
            "7344ae5b7ee6c3e7e6b0fe0640412a37625d1fbfff95c48bbb2dc43964946972"
        );
    }
}
