//! Notification service for Notistack.
//!
//! Holds the resource registry, bucket notification configurations and
//! queue message lists; compiles configurations into key-pattern rules;
//! classifies proxied storage responses into events and delivers them to
//! queues and topic webhooks.
//!
//! [`handler::NotistackNotifyHandler`] plugs the service into
//! `notistack-notify-http`.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod intercept;
mod ops;
pub mod provider;
pub mod rules;
pub mod state;

pub use config::{NotifyConfig, OwnershipMode};
pub use handler::NotistackNotifyHandler;
pub use provider::NotistackNotify;
