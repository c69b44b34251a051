//! Service state.
//!
//! - [`ResourceRegistry`]: queues and topics with their endpoints
//! - [`NotificationStore`]: one [`BucketNotification`] per bucket
//! - [`MessageStore`]: per-queue message lists behind an async trait, with
//!   the in-memory [`InMemoryMessageStore`]
//! - [`BucketOwners`]: who may configure which bucket
//!
//! # Thread Safety
//!
//! All stores are `Send + Sync`. The registry and notification store are
//! `DashMap`s whose entry locks serialize writers to the same key; message
//! lists sit behind one `parking_lot::Mutex` per list.
//!
//! [`BucketNotification`]: notistack_notify_model::BucketNotification

mod messages;
mod notification;
mod owners;
mod registry;

pub use messages::{InMemoryMessageStore, MessageStore};
pub use notification::NotificationStore;
pub use owners::BucketOwners;
pub use registry::ResourceRegistry;
