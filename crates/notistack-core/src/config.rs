//! Process-wide configuration.
//!
//! All configuration is driven by environment variables. Service crates keep
//! their own settings next to their code and reuse the helpers here.

use std::str::FromStr;

use crate::error::NotistackError;
use crate::types::{AccountId, AwsRegion};

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = NotistackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(NotistackError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// Which authentication backend resolves callers to accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthBackendKind {
    /// Every request belongs to a fixed account.
    #[default]
    Dummy,
    /// The access key in the `Authorization` header selects the account.
    AccessKey,
    /// Full SigV4 signature verification.
    Sigv4,
}

impl FromStr for AuthBackendKind {
    type Err = NotistackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dummy" => Ok(Self::Dummy),
            "access-key" | "access_key" | "accesskey" => Ok(Self::AccessKey),
            "sigv4" | "ceph" => Ok(Self::Sigv4),
            other => Err(NotistackError::Config(format!("unknown auth backend: {other}"))),
        }
    }
}

/// Global configuration for Notistack.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotistackConfig {
    /// Bind address for the gateway.
    pub gateway_listen: String,
    /// Region used in ARNs and event records.
    pub default_region: AwsRegion,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Authentication backend.
    pub auth_backend: AuthBackendKind,
    /// Account returned by the dummy backend.
    pub dummy_account: AccountId,
}

impl Default for NotistackConfig {
    fn default() -> Self {
        Self {
            gateway_listen: "0.0.0.0:8003".to_owned(),
            default_region: AwsRegion::default(),
            log_level: "info".to_owned(),
            log_format: LogFormat::default(),
            auth_backend: AuthBackendKind::default(),
            dummy_account: AccountId::default(),
        }
    }
}

impl NotistackConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("DEFAULT_REGION") {
            config.default_region = AwsRegion::new(v);
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        config.log_format = env_parse("LOG_FORMAT", config.log_format);
        config.auth_backend = env_parse("AUTH_BACKEND", config.auth_backend);
        if let Ok(v) = std::env::var("DUMMY_ACCOUNT") {
            match AccountId::new(v) {
                Ok(id) => config.dummy_account = id,
                Err(e) => tracing::warn!(error = %e, "ignoring DUMMY_ACCOUNT"),
            }
        }

        config
    }
}

/// Read a boolean environment variable, falling back to `default` when the
/// variable is unset or unrecognized.
#[must_use]
pub fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => parse_bool(&v).unwrap_or_else(|| {
            tracing::warn!(var = name, value = %v, "invalid boolean, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Read and parse an environment variable, falling back to `default` when the
/// variable is unset or fails to parse.
#[must_use]
pub fn env_parse<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(v) => v.trim().parse().unwrap_or_else(|e: T::Err| {
            tracing::warn!(var = name, value = %v, error = %e, "invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
