//! Access key extraction without signature checks.

use percent_encoding::percent_decode_str;

use crate::error::AuthError;

/// Pull the access key ID out of a request.
///
/// Looks at, in order: a SigV4 `Authorization` header
/// (`AWS4-HMAC-SHA256 Credential=AKID/...`), a SigV2 header (`AWS AKID:sig`),
/// and the presigned query parameters `X-Amz-Credential` / `AWSAccessKeyId`.
///
/// # Errors
///
/// Returns [`AuthError::MissingAuthHeader`] when the request carries no
/// credentials and [`AuthError::InvalidAuthHeader`] when it carries
/// unparseable ones.
pub fn extract_access_key(parts: &http::request::Parts) -> Result<String, AuthError> {
    if let Some(value) = parts.headers.get(http::header::AUTHORIZATION) {
        let header = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
        return from_header(header);
    }
    parts
        .uri
        .query()
        .and_then(from_query)
        .ok_or(AuthError::MissingAuthHeader)
}

fn from_header(header: &str) -> Result<String, AuthError> {
    if let Some(rest) = header.strip_prefix("AWS4-HMAC-SHA256 ") {
        let credential = rest
            .split(',')
            .map(str::trim)
            .find_map(|p| p.strip_prefix("Credential="))
            .ok_or(AuthError::InvalidAuthHeader)?;
        return non_empty(credential.split('/').next().unwrap_or_default());
    }
    if let Some(rest) = header.strip_prefix("AWS ") {
        let (akid, _sig) = rest.split_once(':').ok_or(AuthError::InvalidAuthHeader)?;
        return non_empty(akid);
    }
    Err(AuthError::InvalidAuthHeader)
}

fn from_query(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        let value = percent_decode_str(value).decode_utf8_lossy();
        let akid = match key {
            "X-Amz-Credential" => value.split('/').next().unwrap_or_default().to_owned(),
            "AWSAccessKeyId" => value.into_owned(),
            _ => return None,
        };
        (!akid.is_empty()).then_some(akid)
    })
}

fn non_empty(akid: &str) -> Result<String, AuthError> {
    if akid.is_empty() {
        Err(AuthError::InvalidAuthHeader)
    } else {
        Ok(akid.to_owned())
    }
}
