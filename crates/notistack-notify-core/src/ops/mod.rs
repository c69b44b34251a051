//! Control-plane operations, grouped by resource.

mod notification;
mod queue;
mod topic;

use notistack_core::AccountId;
use notistack_notify_model::error::NotifyError;

/// Parse an account named in a request, rejecting values that cannot be one.
fn parse_account(value: &str, param: &str) -> Result<AccountId, NotifyError> {
    AccountId::new(value).map_err(|_| NotifyError::invalid_parameter(param))
}
