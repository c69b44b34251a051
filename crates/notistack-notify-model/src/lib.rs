//! Model types for Notistack notifications.
//!
//! Queues and topics are [`Resource`]s addressed by ARN. Buckets carry a
//! [`BucketNotification`] made of [`Binding`]s, each pointing at one resource
//! and firing on a set of [`EventName`]s. Proxied storage operations become
//! [`ObservedEvent`]s, serialized for delivery as an [`EventRecord`].
#![allow(clippy::module_name_repetitions)]

pub mod endpoint;
pub mod error;
pub mod event;
pub mod event_name;
pub mod input;
pub mod notification;
pub mod operations;
pub mod output;
pub mod resource;

pub use endpoint::{Endpoint, Subscription};
pub use error::{NotifyError, NotifyErrorCode};
pub use event::{EventRecord, ObservedEvent};
pub use event_name::{EventName, UnknownEventName};
pub use notification::{
    Binding, BucketNotification, FilterRule, NotificationConfiguration, NotificationFilter,
    QueueConfiguration, S3KeyFilter, TopicConfiguration,
};
pub use operations::NotifyOperation;
pub use resource::{ArnError, Resource, ServiceKind};
