//! Bucket owner directory.

use std::collections::{HashMap, HashSet};

use notistack_core::AccountId;
use notistack_notify_model::error::NotifyError;

use crate::config::OwnershipMode;

/// Decides which accounts may configure which buckets.
#[derive(Debug, Clone, Default)]
pub enum BucketOwners {
    /// Every account owns every bucket.
    #[default]
    Open,
    /// Known buckets and their owning accounts.
    Static(HashMap<String, HashSet<String>>),
}

impl BucketOwners {
    /// Build from the configured mode and `bucket=a|b;bucket2=c` table.
    #[must_use]
    pub fn from_config(mode: OwnershipMode, table: &str) -> Self {
        match mode {
            OwnershipMode::Open => Self::Open,
            OwnershipMode::Static => Self::Static(parse_table(table)),
        }
    }

    /// Check that `account` may configure `bucket`.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` for a bucket not in the directory, `AccessDenied` when
    /// `account` is not among its owners.
    pub fn check(&self, bucket: &str, account: &AccountId) -> Result<(), NotifyError> {
        match self {
            Self::Open => Ok(()),
            Self::Static(table) => {
                let owners = table
                    .get(bucket)
                    .ok_or_else(|| NotifyError::no_such_bucket(bucket))?;
                if owners.contains(account.as_str()) {
                    Ok(())
                } else {
                    Err(NotifyError::access_denied())
                }
            }
        }
    }
}

fn parse_table(table: &str) -> HashMap<String, HashSet<String>> {
    table
        .split(';')
        .filter_map(|entry| entry.split_once('='))
        .map(|(bucket, owners)| {
            let owners = owners
                .split('|')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_owned)
                .collect();
            (bucket.trim().to_owned(), owners)
        })
        .filter(|(bucket, _)| !bucket.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use notistack_notify_model::error::NotifyErrorCode;

    use super::*;

    fn acct(id: &str) -> AccountId {
        AccountId::new(id).unwrap()
    }

    #[test]
    fn test_should_allow_everyone_when_open() {
        let owners = BucketOwners::from_config(OwnershipMode::Open, "ignored=x");
        assert!(owners.check("anything", &acct("a1")).is_ok());
    }

    #[test]
    fn test_should_check_static_owners() {
        let owners = BucketOwners::from_config(OwnershipMode::Static, "data=a1|a2; logs = a3 ;junk");
        assert!(owners.check("data", &acct("a2")).is_ok());
        assert!(owners.check("logs", &acct("a3")).is_ok());
        assert_eq!(
            owners.check("data", &acct("a3")).unwrap_err().code,
            NotifyErrorCode::AccessDenied
        );
        assert_eq!(
            owners.check("missing", &acct("a1")).unwrap_err().code,
            NotifyErrorCode::NoSuchBucket
        );
    }
}
