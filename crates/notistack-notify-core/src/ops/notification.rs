//! Bucket notification configuration operations.

use notistack_core::AccountId;
use notistack_notify_model::error::NotifyError;
use notistack_notify_model::input::{GetBucketNotificationInput, PutBucketNotificationInput};
use notistack_notify_model::output::EmptyOutput;
use notistack_notify_model::{
    Binding, EventName, FilterRule, NotificationConfiguration, Resource, ServiceKind,
};
use tracing::info;

use crate::provider::NotistackNotify;

impl NotistackNotify {
    /// Handle `GET /{bucket}?notification`. A bucket without configuration
    /// yields an empty document.
    pub fn handle_get_bucket_notification(
        &self,
        caller: &AccountId,
        input: GetBucketNotificationInput,
    ) -> Result<NotificationConfiguration, NotifyError> {
        self.owners.check(&input.bucket, caller)?;
        Ok(self
            .notifications
            .get(&input.bucket)
            .map(|config| config.to_configuration(&self.config.region))
            .unwrap_or_default())
    }

    /// Handle `PUT /{bucket}?notification`.
    ///
    /// Every binding is validated before anything is stored, so a rejected
    /// document leaves the configuration untouched. An empty document
    /// deletes the configuration.
    pub fn handle_put_bucket_notification(
        &self,
        caller: &AccountId,
        input: PutBucketNotificationInput,
    ) -> Result<EmptyOutput, NotifyError> {
        self.owners.check(&input.bucket, caller)?;

        let doc = input.configuration;
        let mut bindings = Vec::with_capacity(doc.queue_configurations.len() + doc.topic_configurations.len());
        for queue in &doc.queue_configurations {
            bindings.push(self.resolve_binding(
                caller,
                ServiceKind::Queue,
                queue.id.as_deref(),
                &queue.events,
                queue.rules(),
                &queue.queue_arn,
            )?);
        }
        for topic in &doc.topic_configurations {
            bindings.push(self.resolve_binding(
                caller,
                ServiceKind::Topic,
                topic.id.as_deref(),
                &topic.events,
                topic.rules(),
                &topic.topic_arn,
            )?);
        }

        let count = bindings.len();
        self.notifications.save(&input.bucket, bindings);
        self.rules.invalidate(&input.bucket);
        info!(bucket = %input.bucket, bindings = count, "bucket notification updated");
        Ok(EmptyOutput)
    }

    /// Destinations must exist and belong to `caller`. A foreign destination
    /// is reported the same way as a missing one.
    fn resolve_binding(
        &self,
        caller: &AccountId,
        kind: ServiceKind,
        id: Option<&str>,
        events: &[String],
        filter_rules: Vec<FilterRule>,
        arn: &str,
    ) -> Result<Binding, NotifyError> {
        let events = events
            .iter()
            .map(|name| {
                name.trim()
                    .parse::<EventName>()
                    .map_err(|_| NotifyError::invalid_event(name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let resource = Resource::parse_arn(arn.trim()).map_err(|_| NotifyError::invalid_arn(arn))?;
        if resource.service != kind
            || &resource.account_id != caller
            || !self.registry.contains(&resource)
        {
            return Err(NotifyError::arn_notification(arn));
        }

        Ok(Binding {
            id: id.unwrap_or_default().trim().to_owned(),
            events,
            filter_rules,
            resource,
        })
    }
}
