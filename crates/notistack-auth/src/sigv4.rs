//! AWS Signature Version 4 verification.
//!
//! The flow is the standard one: parse the `Authorization` header, rebuild
//! the canonical request, derive the signing key from the stored secret, and
//! compare signatures in constant time. [`verify_sigv4`] is the entry point.

use hmac::{Hmac, KeyInit, Mac};
use notistack_core::AccountId;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::build_canonical_request;
use crate::credentials::CredentialProvider;
use crate::error::AuthError;

/// The only algorithm supported.
pub const SUPPORTED_ALGORITHM: &str = "AWS4-HMAC-SHA256";

type HmacSha256 = Hmac<Sha256>;

/// A verified request.
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// The access key ID that signed the request.
    pub access_key_id: String,
    /// The account owning that key.
    pub account_id: AccountId,
    /// Region from the credential scope.
    pub region: String,
    /// Service from the credential scope.
    pub service: String,
}

/// Parsed `AWS4-HMAC-SHA256 Credential=..,SignedHeaders=..,Signature=..`.
#[derive(Debug, Clone)]
pub struct ParsedAuth {
    /// The access key ID.
    pub access_key_id: String,
    /// Credential scope date (YYYYMMDD).
    pub date: String,
    /// Credential scope region.
    pub region: String,
    /// Credential scope service.
    pub service: String,
    /// Lowercase signed header names.
    pub signed_headers: Vec<String>,
    /// Hex-encoded signature.
    pub signature: String,
}

/// Parse a SigV4 `Authorization` header value.
///
/// # Errors
///
/// Returns [`AuthError::InvalidAuthHeader`] for a malformed header,
/// [`AuthError::UnsupportedAlgorithm`] for anything but `AWS4-HMAC-SHA256`,
/// and [`AuthError::InvalidCredential`] for a malformed credential scope.
pub fn parse_authorization_header(header: &str) -> Result<ParsedAuth, AuthError> {
    let (algorithm, rest) = header.split_once(' ').ok_or(AuthError::InvalidAuthHeader)?;
    if algorithm != SUPPORTED_ALGORITHM {
        return Err(AuthError::UnsupportedAlgorithm(algorithm.to_owned()));
    }

    let mut credential = None;
    let mut signed_headers = None;
    let mut signature = None;
    for part in rest.split(',').map(str::trim) {
        if let Some(v) = part.strip_prefix("Credential=") {
            credential = Some(v);
        } else if let Some(v) = part.strip_prefix("SignedHeaders=") {
            signed_headers = Some(v);
        } else if let Some(v) = part.strip_prefix("Signature=") {
            signature = Some(v);
        }
    }
    let (Some(credential), Some(signed_headers), Some(signature)) =
        (credential, signed_headers, signature)
    else {
        return Err(AuthError::InvalidAuthHeader);
    };

    let scope: Vec<&str> = credential.splitn(5, '/').collect();
    if scope.len() != 5 || scope[4] != "aws4_request" || scope[0].is_empty() {
        return Err(AuthError::InvalidCredential);
    }

    Ok(ParsedAuth {
        access_key_id: scope[0].to_owned(),
        date: scope[1].to_owned(),
        region: scope[2].to_owned(),
        service: scope[3].to_owned(),
        signed_headers: signed_headers.split(';').map(ToOwned::to_owned).collect(),
        signature: signature.to_owned(),
    })
}

/// `AWS4-HMAC-SHA256\n{timestamp}\n{scope}\n{hex(sha256(canonical))}`.
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{SUPPORTED_ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the signing key: HMAC chain over date, region, service and
/// `aws4_request`, keyed with `AWS4{secret}`.
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let region_key = hmac_sha256(&date_key, region.as_bytes());
    let service_key = hmac_sha256(&region_key, service.as_bytes());
    hmac_sha256(&service_key, b"aws4_request")
}

/// Hex HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Verify a SigV4-signed request and resolve its account.
///
/// `body_hash` is the hex SHA-256 of the payload, or whatever the client
/// put in `x-amz-content-sha256`.
///
/// # Errors
///
/// Returns an [`AuthError`] if the header is missing or malformed, the key is
/// unknown, a signed header is absent, or the signature does not match.
pub fn verify_sigv4(
    parts: &http::request::Parts,
    body_hash: &str,
    credential_provider: &dyn CredentialProvider,
) -> Result<AuthResult, AuthError> {
    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let parsed = parse_authorization_header(auth_header)?;
    let credential = credential_provider.lookup(&parsed.access_key_id)?;
    let timestamp = header_str(parts, "x-amz-date")?;

    let signed: Vec<&str> = parsed.signed_headers.iter().map(String::as_str).collect();
    let mut header_pairs = Vec::with_capacity(signed.len());
    for &name in &signed {
        header_pairs.push((name, header_str(parts, name)?));
    }

    let canonical_request = build_canonical_request(
        parts.method.as_str(),
        parts.uri.path(),
        parts.uri.query().unwrap_or(""),
        &header_pairs,
        &signed,
        body_hash,
    );
    debug!(canonical_request, "built canonical request");

    let canonical_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    let scope = format!(
        "{}/{}/{}/aws4_request",
        parsed.date, parsed.region, parsed.service
    );
    let string_to_sign = build_string_to_sign(timestamp, &scope, &canonical_hash);
    let signing_key = derive_signing_key(
        &credential.secret_key,
        &parsed.date,
        &parsed.region,
        &parsed.service,
    );
    let expected = compute_signature(&signing_key, &string_to_sign);

    if bool::from(parsed.signature.as_bytes().ct_eq(expected.as_bytes())) {
        debug!(access_key_id = %parsed.access_key_id, account = %credential.account_id, "signature verified");
        Ok(AuthResult {
            access_key_id: parsed.access_key_id,
            account_id: credential.account_id,
            region: parsed.region,
            service: parsed.service,
        })
    } else {
        debug!(access_key_id = %parsed.access_key_id, "signature mismatch");
        Err(AuthError::SignatureDoesNotMatch)
    }
}

fn header_str<'a>(parts: &'a http::request::Parts, name: &str) -> Result<&'a str, AuthError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AuthError::MissingHeader(name.to_owned()))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Hex SHA-256 of a payload, as sent in `x-amz-content-sha256`.
///
/// # Examples
///
/// ```
/// use notistack_auth::sigv4::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}
