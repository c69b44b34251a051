//! Identity newtypes shared across services.

use std::fmt;

/// Account identifier owning queues, topics and buckets.
///
/// Accounts come from whatever the auth backend returns, so the only
/// restriction is that the value fits in one ARN token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Account returned by the dummy auth backend.
    pub const DEFAULT: &str = "tester";

    /// Create a new account ID.
    ///
    /// # Errors
    /// Returns an error if the value is empty or contains `:` or `/`.
    pub fn new(id: impl Into<String>) -> Result<Self, crate::NotistackError> {
        let id = id.into();
        if id.is_empty() || id.contains([':', '/']) {
            return Err(crate::NotistackError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    /// Get the account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// AWS region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Region used when none is configured.
    pub const DEFAULT: &str = "us-east-1";

    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_accept_non_numeric_account_id() {
        let id = AccountId::new("acct-1").unwrap();
        assert_eq!(id.as_str(), "acct-1");
    }

    #[test]
    fn test_should_reject_account_id_breaking_arn_tokens() {
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("a:b").is_err());
        assert!(AccountId::new("a/b").is_err());
    }

    #[test]
    fn test_should_use_default_account_id() {
        assert_eq!(AccountId::default().as_str(), "tester");
    }

    #[test]
    fn test_should_use_default_region() {
        let region = AwsRegion::default();
        assert_eq!(region.as_str(), "us-east-1");
        assert_eq!(AwsRegion::new("eu-west-1").to_string(), "eu-west-1");
    }
}
