//! Service-internal error types.

use notistack_notify_model::error::NotifyError;

/// Failures of the registry, notification and message stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The (kind, account, name) triple is taken.
    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    /// No such resource.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the event dispatch pipeline. Never shown to proxied clients.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The dispatch channel is full; the event was dropped.
    #[error("dispatch queue is full")]
    Backpressure,

    /// The dispatch worker has stopped.
    #[error("dispatcher is shut down")]
    Closed,

    /// The event record could not be serialized.
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The webhook HTTP client could not be built.
    #[error("failed to build webhook client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failures submitting a webhook delivery task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// The task channel is full.
    #[error("task broker is full")]
    Full,

    /// The workers have stopped.
    #[error("task broker is closed")]
    Closed,
}

/// A failed webhook delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned {0}")]
    Status(http::StatusCode),

    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Convert a store error into an internal control-plane error.
///
/// Takes `e` by value because this is used as a closure argument to `.map_err()`.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn store_error_to_notify(e: StoreError) -> NotifyError {
    match e {
        StoreError::NotFound(what) => NotifyError::not_found(what),
        other => NotifyError::internal_error(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use notistack_notify_model::error::NotifyErrorCode;

    use super::*;

    #[test]
    fn test_should_convert_store_errors() {
        let err = store_error_to_notify(StoreError::Unavailable("list store".to_owned()));
        assert_eq!(err.code, NotifyErrorCode::InternalError);
        let err = store_error_to_notify(StoreError::NotFound("topic".to_owned()));
        assert_eq!(err.code, NotifyErrorCode::NotFound);
    }
}
