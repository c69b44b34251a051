//! Core types, configuration, and errors for Notistack.
//!
//! This crate holds the pieces every other Notistack crate agrees on: the
//! account and region newtypes used when building resource names, the global
//! process configuration, and the infrastructure error type.

mod config;
mod error;
mod types;

pub use config::{AuthBackendKind, LogFormat, NotistackConfig, env_bool, env_parse};
pub use error::{NotistackError, NotistackResult};
pub use types::{AccountId, AwsRegion};
