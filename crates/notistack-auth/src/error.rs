//! Authentication error types.

/// Errors raised while resolving a request to an account.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request carries no credentials at all.
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// The `Authorization` header could not be parsed.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// The signing algorithm is not supported by the active backend.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A header named in `SignedHeaders` is missing.
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// The `Credential` component is not `AKID/date/region/service/aws4_request`.
    #[error("Invalid credential format")]
    InvalidCredential,

    /// The access key ID is not in the credential store.
    #[error("Access key not found: {0}")]
    AccessKeyNotFound(String),

    /// The computed signature does not match the provided one.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}

impl AuthError {
    /// Whether the failure is a malformed request rather than a rejected one.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::InvalidAuthHeader
                | Self::UnsupportedAlgorithm(_)
                | Self::MissingHeader(_)
                | Self::InvalidCredential
        )
    }
}
