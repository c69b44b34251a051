//! Queue operations.

use md5::{Digest, Md5};
use notistack_core::AccountId;
use notistack_notify_model::error::NotifyError;
use notistack_notify_model::input::{CreateQueueInput, DeleteQueueInput, ReceiveMessageInput};
use notistack_notify_model::output::{
    CreateQueueOutput, EmptyOutput, ListQueuesOutput, Message, ReceiveMessageOutput,
};
use notistack_notify_model::{Resource, ServiceKind};
use tracing::info;

use super::parse_account;
use crate::error::{StoreError, store_error_to_notify};
use crate::provider::NotistackNotify;

/// Most messages one receive may return.
const MAX_RECEIVE: usize = 10;

/// Clamp a requested receive count into `1..=10`.
fn receive_limit(requested: Option<i64>) -> usize {
    match requested {
        Some(n) if n > 0 => usize::try_from(n).map_or(MAX_RECEIVE, |n| n.min(MAX_RECEIVE)),
        _ => 1,
    }
}

fn validate_queue_name(name: &str) -> Result<(), NotifyError> {
    if name.is_empty() || name.contains(['/', ':']) {
        return Err(NotifyError::invalid_parameter("QueueName"));
    }
    Ok(())
}

impl NotistackNotify {
    /// Resolve a queue address and check the caller owns it.
    fn owned_queue(
        caller: &AccountId,
        account_id: &str,
        queue_name: &str,
    ) -> Result<Resource, NotifyError> {
        if caller.as_str() != account_id {
            return Err(NotifyError::access_denied());
        }
        let owner = parse_account(account_id, "QueueUrl")?;
        Ok(Resource::queue(owner, queue_name))
    }

    /// Handle `CreateQueue`.
    pub fn handle_create_queue(
        &self,
        caller: &AccountId,
        input: CreateQueueInput,
    ) -> Result<CreateQueueOutput, NotifyError> {
        validate_queue_name(&input.queue_name)?;
        let queue = self
            .registry
            .create(Resource::queue(caller.clone(), input.queue_name))
            .map_err(|e| match e {
                StoreError::AlreadyExists(_) => NotifyError::queue_already_exists(),
                other => store_error_to_notify(other),
            })?;
        Ok(CreateQueueOutput {
            queue_url: queue.url(&self.config.public_host),
        })
    }

    /// Handle `ListQueues`.
    #[must_use]
    pub fn handle_list_queues(&self, caller: &AccountId) -> ListQueuesOutput {
        ListQueuesOutput {
            queue_urls: self
                .registry
                .list(ServiceKind::Queue, caller)
                .iter()
                .map(|q| q.url(&self.config.public_host))
                .collect(),
        }
    }

    /// Handle `DeleteQueue`. Deleting a missing queue succeeds.
    pub async fn handle_delete_queue(
        &self,
        caller: &AccountId,
        input: DeleteQueueInput,
    ) -> Result<EmptyOutput, NotifyError> {
        let queue = Self::owned_queue(caller, &input.account_id, &input.queue_name)?;
        if self.registry.delete(&queue) {
            self.messages
                .remove(&queue.list_key())
                .await
                .map_err(store_error_to_notify)?;
            info!(queue = %queue, "queue deleted");
        }
        Ok(EmptyOutput)
    }

    /// Handle `ReceiveMessage`: pop up to the requested number of messages
    /// from the head of the queue.
    pub async fn handle_receive_message(
        &self,
        caller: &AccountId,
        input: ReceiveMessageInput,
    ) -> Result<ReceiveMessageOutput, NotifyError> {
        let queue = Self::owned_queue(caller, &input.account_id, &input.queue_name)?;
        if !self.registry.contains(&queue) {
            return Ok(ReceiveMessageOutput::default());
        }

        let limit = receive_limit(input.max_number_of_messages);
        let bodies = self
            .messages
            .pop_front(&queue.list_key(), limit)
            .await
            .map_err(store_error_to_notify)?;

        let messages = bodies
            .into_iter()
            .map(|body| Message {
                message_id: uuid::Uuid::new_v4().to_string(),
                receipt_handle: String::new(),
                md5_of_body: hex::encode(Md5::digest(body.as_bytes())),
                body,
            })
            .collect();
        Ok(ReceiveMessageOutput { messages })
    }
}
