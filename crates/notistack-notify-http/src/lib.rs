//! HTTP layer for Notistack.
//!
//! Every inbound request takes one of three paths:
//!
//! - **Control plane**: awsQuery `Action` requests for queues and topics, and
//!   `GET`/`PUT /{bucket}?notification`. These are authenticated, parsed into
//!   a [`NotifyRequest`] and handed to a [`NotifyHandler`].
//! - **Preflight**: CORS `OPTIONS` for the control plane, answered locally.
//! - **Proxy**: everything else is forwarded unchanged to the backing
//!   gateway by the [`ProxyClient`]. Once the upstream response head is
//!   available the exchange is reported to the handler, which must not block.

pub mod body;
pub mod dispatch;
pub mod proxy;
pub mod request;
pub mod response;
pub mod router;
pub mod service;

pub use body::NotifyResponseBody;
pub use dispatch::{NotifyHandler, ProxiedExchange};
pub use proxy::{ProxyClient, ProxyError};
pub use request::{FromNotifyRequest, NotifyRequest};
pub use router::{NotifyRouter, ObjectLocation, Route, extract_object_location};
pub use service::{NotifyHttpConfig, NotifyHttpService};
