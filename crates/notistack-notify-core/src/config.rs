//! Notification service configuration.
//!
//! Provides [`NotifyConfig`], loaded from environment variables. Unset or
//! invalid values fall back to the defaults below.

use std::str::FromStr;
use std::time::Duration;

use notistack_core::{AwsRegion, env_bool, env_parse};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// How bucket ownership is decided for `?notification` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipMode {
    /// Every caller owns every bucket.
    #[default]
    Open,
    /// Buckets and their owners come from `BUCKET_OWNERS`.
    Static,
}

impl FromStr for OwnershipMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "static" => Ok(Self::Static),
            other => Err(format!("unknown bucket ownership mode: {other}")),
        }
    }
}

/// Notification service configuration.
///
/// # Examples
///
/// ```
/// use notistack_notify_core::config::NotifyConfig;
///
/// let config = NotifyConfig::builder().public_host("s3.example:80".to_owned()).build();
/// assert_eq!(config.public_host, "s3.example:80");
/// assert!(config.notify_on_delete);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct NotifyConfig {
    /// Host used in queue URLs and virtual-host bucket detection.
    #[builder(default = String::from("localhost:8003"))]
    pub public_host: String,

    /// Whether `{bucket}.{public_host}` addressing is recognized.
    #[builder(default = true)]
    pub virtual_hosting: bool,

    /// Backing gateway base URL.
    #[builder(default = String::from("http://127.0.0.1:7480"))]
    pub upstream_endpoint: String,

    /// Seconds to wait for the upstream response head.
    #[builder(default = 60)]
    pub upstream_timeout_secs: u64,

    /// Region written into ARNs and event records.
    #[builder(default)]
    pub region: AwsRegion,

    /// Emit `Put` and `CompleteMultipartUpload` events.
    #[builder(default = true)]
    pub notify_on_create: bool,

    /// Emit `Copy` events.
    #[builder(default = true)]
    pub notify_on_copy: bool,

    /// Emit `Delete` events.
    #[builder(default = true)]
    pub notify_on_delete: bool,

    /// Capacity of the dispatch channel.
    #[builder(default = 1024)]
    pub dispatch_queue_capacity: usize,

    /// Number of webhook delivery workers.
    #[builder(default = 4)]
    pub webhook_workers: usize,

    /// Capacity of the webhook task channel.
    #[builder(default = 1024)]
    pub webhook_queue_capacity: usize,

    /// Delivery attempts per webhook task.
    #[builder(default = 3)]
    pub webhook_max_attempts: u32,

    /// Per-attempt webhook timeout in seconds.
    #[builder(default = 10)]
    pub webhook_timeout_secs: u64,

    /// Bucket ownership mode.
    #[builder(default)]
    pub bucket_ownership: OwnershipMode,

    /// `bucket=acct1|acct2;bucket2=acct3`, used in static mode.
    #[builder(default)]
    pub bucket_owners: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl NotifyConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `PUBLIC_HOST` | `localhost:8003` |
    /// | `VIRTUAL_HOSTING` | `true` |
    /// | `UPSTREAM_ENDPOINT` | `http://127.0.0.1:7480` |
    /// | `UPSTREAM_TIMEOUT_SECS` | `60` |
    /// | `DEFAULT_REGION` | `us-east-1` |
    /// | `NOTIFY_ON_CREATE` / `NOTIFY_ON_COPY` / `NOTIFY_ON_DELETE` | `true` |
    /// | `DISPATCH_QUEUE_CAPACITY` | `1024` |
    /// | `WEBHOOK_WORKERS` | `4` |
    /// | `WEBHOOK_QUEUE_CAPACITY` | `1024` |
    /// | `WEBHOOK_MAX_ATTEMPTS` | `3` |
    /// | `WEBHOOK_TIMEOUT_SECS` | `10` |
    /// | `BUCKET_OWNERSHIP` | `open` |
    /// | `BUCKET_OWNERS` | empty |
    #[must_use]
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            public_host: std::env::var("PUBLIC_HOST").unwrap_or(d.public_host),
            virtual_hosting: env_bool("VIRTUAL_HOSTING", d.virtual_hosting),
            upstream_endpoint: std::env::var("UPSTREAM_ENDPOINT").unwrap_or(d.upstream_endpoint),
            upstream_timeout_secs: env_parse("UPSTREAM_TIMEOUT_SECS", d.upstream_timeout_secs),
            region: std::env::var("DEFAULT_REGION").map_or(d.region, AwsRegion::new),
            notify_on_create: env_bool("NOTIFY_ON_CREATE", d.notify_on_create),
            notify_on_copy: env_bool("NOTIFY_ON_COPY", d.notify_on_copy),
            notify_on_delete: env_bool("NOTIFY_ON_DELETE", d.notify_on_delete),
            dispatch_queue_capacity: env_parse("DISPATCH_QUEUE_CAPACITY", d.dispatch_queue_capacity)
                .max(1),
            webhook_workers: env_parse("WEBHOOK_WORKERS", d.webhook_workers).max(1),
            webhook_queue_capacity: env_parse("WEBHOOK_QUEUE_CAPACITY", d.webhook_queue_capacity)
                .max(1),
            webhook_max_attempts: env_parse("WEBHOOK_MAX_ATTEMPTS", d.webhook_max_attempts).max(1),
            webhook_timeout_secs: env_parse("WEBHOOK_TIMEOUT_SECS", d.webhook_timeout_secs),
            bucket_ownership: env_parse("BUCKET_OWNERSHIP", d.bucket_ownership),
            bucket_owners: std::env::var("BUCKET_OWNERS").unwrap_or(d.bucket_owners),
        }
    }

    /// Upstream timeout as a `Duration`.
    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Webhook timeout as a `Duration`.
    #[must_use]
    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }
}
