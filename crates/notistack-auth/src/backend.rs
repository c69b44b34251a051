//! Pluggable request-to-account resolution.

use std::fmt;
use std::sync::Arc;

use notistack_core::{AccountId, AuthBackendKind};

use crate::access_key::extract_access_key;
use crate::credentials::CredentialProvider;
use crate::error::AuthError;
use crate::sigv4::{hash_payload, verify_sigv4};

/// Resolves a request to the account it acts for.
pub trait AuthBackend: Send + Sync + fmt::Debug {
    /// Authenticate a request given its head and buffered body.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`AuthError`] when the request cannot be attributed.
    fn authenticate(&self, parts: &http::request::Parts, body: &[u8])
    -> Result<AccountId, AuthError>;
}

/// Every request belongs to one configured account.
#[derive(Debug, Clone)]
pub struct DummyBackend {
    account: AccountId,
}

impl DummyBackend {
    /// Create a backend that always returns `account`.
    #[must_use]
    pub fn new(account: AccountId) -> Self {
        Self { account }
    }
}

impl AuthBackend for DummyBackend {
    fn authenticate(&self, _parts: &http::request::Parts, _body: &[u8]) -> Result<AccountId, AuthError> {
        Ok(self.account.clone())
    }
}

/// Trusts the access key named in the request and maps it to its account.
#[derive(Debug, Clone)]
pub struct AccessKeyBackend {
    provider: Arc<dyn CredentialProvider>,
}

impl AccessKeyBackend {
    /// Create a backend over a credential store.
    #[must_use]
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self { provider }
    }
}

impl AuthBackend for AccessKeyBackend {
    fn authenticate(&self, parts: &http::request::Parts, _body: &[u8]) -> Result<AccountId, AuthError> {
        let akid = extract_access_key(parts)?;
        Ok(self.provider.lookup(&akid)?.account_id)
    }
}

/// Verifies SigV4 signatures.
#[derive(Debug, Clone)]
pub struct SigV4Backend {
    provider: Arc<dyn CredentialProvider>,
}

impl SigV4Backend {
    /// Create a backend over a credential store.
    #[must_use]
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self { provider }
    }
}

impl AuthBackend for SigV4Backend {
    fn authenticate(&self, parts: &http::request::Parts, body: &[u8]) -> Result<AccountId, AuthError> {
        let body_hash = parts
            .headers
            .get("x-amz-content-sha256")
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| hash_payload(body), ToOwned::to_owned);
        Ok(verify_sigv4(parts, &body_hash, self.provider.as_ref())?.account_id)
    }
}

/// Build the backend selected by configuration.
#[must_use]
pub fn build_backend(
    kind: AuthBackendKind,
    dummy_account: AccountId,
    provider: Arc<dyn CredentialProvider>,
) -> Arc<dyn AuthBackend> {
    match kind {
        AuthBackendKind::Dummy => Arc::new(DummyBackend::new(dummy_account)),
        AuthBackendKind::AccessKey => Arc::new(AccessKeyBackend::new(provider)),
        AuthBackendKind::Sigv4 => Arc::new(SigV4Backend::new(provider)),
    }
}
