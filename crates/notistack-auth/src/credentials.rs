//! Credential store: access key to secret key and owning account.

use std::collections::HashMap;

use notistack_core::{AccountId, NotistackError};

use crate::error::AuthError;

/// What an access key resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Secret used to verify signatures.
    pub secret_key: String,
    /// Account the key belongs to.
    pub account_id: AccountId,
}

/// Looks up credentials by access key ID.
pub trait CredentialProvider: Send + Sync + std::fmt::Debug {
    /// Resolve an access key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccessKeyNotFound`] if the access key ID is not recognized.
    fn lookup(&self, access_key_id: &str) -> Result<Credential, AuthError>;
}

/// In-memory credential store.
///
/// # Examples
///
/// ```
/// use notistack_auth::credentials::{CredentialProvider, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::parse("AKID:secret:acct1").unwrap();
/// let cred = provider.lookup("AKID").unwrap();
/// assert_eq!(cred.account_id.as_str(), "acct1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    credentials: HashMap<String, Credential>,
}

impl StaticCredentialProvider {
    /// Create a provider from `(access_key_id, credential)` pairs.
    pub fn new(credentials: impl IntoIterator<Item = (String, Credential)>) -> Self {
        Self {
            credentials: credentials.into_iter().collect(),
        }
    }

    /// Parse `AKID:SECRET:ACCOUNT` entries separated by `,`.
    ///
    /// An entry without an account uses the access key as the account.
    ///
    /// # Errors
    ///
    /// Returns a config error for entries without a secret or with an
    /// unusable account.
    pub fn parse(spec: &str) -> Result<Self, NotistackError> {
        let mut credentials = HashMap::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut fields = entry.splitn(3, ':');
            let (Some(akid), Some(secret)) = (fields.next(), fields.next()) else {
                return Err(NotistackError::Config(format!(
                    "credential entry must be AKID:SECRET[:ACCOUNT], got {entry:?}"
                )));
            };
            let account = fields.next().unwrap_or(akid);
            credentials.insert(
                akid.to_owned(),
                Credential {
                    secret_key: secret.to_owned(),
                    account_id: AccountId::new(account)?,
                },
            );
        }
        Ok(Self { credentials })
    }

    /// Load from `CREDENTIALS`, plus `ACCESS_KEY`/`SECRET_KEY` when both are set.
    ///
    /// # Errors
    ///
    /// Returns a config error if `CREDENTIALS` is malformed.
    pub fn from_env() -> Result<Self, NotistackError> {
        let mut provider = match std::env::var("CREDENTIALS") {
            Ok(spec) => Self::parse(&spec)?,
            Err(_) => Self::default(),
        };
        if let (Ok(ak), Ok(sk)) = (std::env::var("ACCESS_KEY"), std::env::var("SECRET_KEY")) {
            let account_id = AccountId::new(ak.as_str())?;
            provider.credentials.insert(
                ak,
                Credential {
                    secret_key: sk,
                    account_id,
                },
            );
        }
        Ok(provider)
    }

    /// Number of known access keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether no access keys are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn lookup(&self, access_key_id: &str) -> Result<Credential, AuthError> {
        self.credentials
            .get(access_key_id)
            .cloned()
            .ok_or_else(|| AuthError::AccessKeyNotFound(access_key_id.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_entries_with_and_without_account() {
        let provider = StaticCredentialProvider::parse("AK1:s1:acct1, AK2:s2").unwrap();
        assert_eq!(provider.len(), 2);

        let first = provider.lookup("AK1").unwrap();
        assert_eq!(first.secret_key, "s1");
        assert_eq!(first.account_id.as_str(), "acct1");

        let second = provider.lookup("AK2").unwrap();
        assert_eq!(second.account_id.as_str(), "AK2");
    }

    #[test]
    fn test_should_reject_entry_without_secret() {
        assert!(StaticCredentialProvider::parse("AK1").is_err());
    }

    #[test]
    fn test_should_return_error_for_unknown_access_key() {
        let provider = StaticCredentialProvider::default();
        assert!(provider.is_empty());
        assert!(matches!(
            provider.lookup("UNKNOWN"),
            Err(AuthError::AccessKeyNotFound(_))
        ));
    }
}
