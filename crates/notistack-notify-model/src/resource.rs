//! Queues and topics and their ARN encoding.

use std::fmt;

use notistack_core::{AccountId, AwsRegion};

/// The service a resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum ServiceKind {
    /// A list-backed virtual queue.
    #[serde(rename = "sqs")]
    Queue,
    /// A webhook fan-out topic.
    #[serde(rename = "sns")]
    Topic,
}

impl ServiceKind {
    /// Service token used in ARNs and list keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queue => "sqs",
            Self::Topic => "sns",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons an ARN string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArnError {
    /// The string does not start with `arn:aws:sqs` or `arn:aws:sns`.
    #[error("ARN must start with arn:aws:sqs or arn:aws:sns")]
    InvalidPrefix,
    /// Wrong number of `:`-separated tokens.
    #[error("ARN has {0} tokens, expected 6 or 7")]
    TokenCount(usize),
    /// Account or name token is empty.
    #[error("ARN account and resource name must be non-empty")]
    EmptyToken,
    /// Subscription ARNs need the trailing endpoint token.
    #[error("subscription ARN is missing the subscription id")]
    MissingSubscriptionId,
}

/// One virtual queue or topic, unique per `(service, account_id, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Queue or topic.
    pub service: ServiceKind,
    /// Owning account.
    pub account_id: AccountId,
    /// Name, unique within the account and service.
    pub name: String,
}

impl Resource {
    /// Create a resource value.
    #[must_use]
    pub fn new(service: ServiceKind, account_id: AccountId, name: impl Into<String>) -> Self {
        Self {
            service,
            account_id,
            name: name.into(),
        }
    }

    /// Shorthand for a queue.
    #[must_use]
    pub fn queue(account_id: AccountId, name: impl Into<String>) -> Self {
        Self::new(ServiceKind::Queue, account_id, name)
    }

    /// Shorthand for a topic.
    #[must_use]
    pub fn topic(account_id: AccountId, name: impl Into<String>) -> Self {
        Self::new(ServiceKind::Topic, account_id, name)
    }

    /// Canonical ARN: `arn:aws:{service}:{region}:{account}:{name}`.
    #[must_use]
    pub fn arn(&self, region: &AwsRegion) -> String {
        format!(
            "arn:aws:{}:{}:{}:{}",
            self.service, region, self.account_id, self.name
        )
    }

    /// Queue URL: `http://{public_host}/{account}/{name}`.
    #[must_use]
    pub fn url(&self, public_host: &str) -> String {
        format!("http://{public_host}/{}/{}", self.account_id, self.name)
    }

    /// Key of the message list backing a queue: `{service}:{account}:{name}`.
    #[must_use]
    pub fn list_key(&self) -> String {
        format!("{}:{}:{}", self.service, self.account_id, self.name)
    }

    /// Parse an ARN back into a resource.
    ///
    /// Accepts 6 tokens (a resource ARN) or 7 tokens (a subscription ARN,
    /// whose last token is ignored here). The region token is not retained.
    pub fn parse_arn(arn: &str) -> Result<Self, ArnError> {
        let tokens: Vec<&str> = arn.split(':').collect();
        Self::from_tokens(&tokens)
    }

    pub(crate) fn from_tokens(tokens: &[&str]) -> Result<Self, ArnError> {
        if tokens.len() < 3 || tokens[0] != "arn" || tokens[1] != "aws" {
            return Err(ArnError::InvalidPrefix);
        }
        let service = match tokens[2] {
            "sqs" => ServiceKind::Queue,
            "sns" => ServiceKind::Topic,
            _ => return Err(ArnError::InvalidPrefix),
        };
        if tokens.len() != 6 && tokens.len() != 7 {
            return Err(ArnError::TokenCount(tokens.len()));
        }
        if tokens[4].is_empty() || tokens[5].is_empty() {
            return Err(ArnError::EmptyToken);
        }
        let account_id = AccountId::new(tokens[4]).map_err(|_| ArnError::EmptyToken)?;
        Ok(Self::new(service, account_id, tokens[5]))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.service, self.account_id, self.name)
    }
}
