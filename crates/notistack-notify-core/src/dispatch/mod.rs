//! Event dispatch.
//!
//! [`Dispatcher::submit`] hands a classified event to a bounded channel and
//! returns at once; a single worker drains the channel in order, matching
//! the event against the bucket's compiled rules and delivering one record
//! per destination:
//!
//! - queues: the record is appended to the queue's message list
//! - topics: one [`DeliveryTask`] per endpoint goes to the [`TaskBroker`]
//!
//! Failures never reach the proxied client. They are counted in the
//! [`DispatchReport`] and logged.

mod broker;
mod webhook;

use std::sync::Arc;

use notistack_core::AwsRegion;
use notistack_notify_model::{EventRecord, ObservedEvent, Resource, ServiceKind};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

pub use broker::{BrokerOptions, DeliveryTask, TaskBroker};
pub use webhook::{WebhookDeliverer, normalize_uri};

use crate::error::DispatchError;
use crate::rules::RuleCache;
use crate::state::{MessageStore, NotificationStore, ResourceRegistry};

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Destinations matched by the rules.
    pub matched: usize,
    /// Records appended to queues.
    pub queued: usize,
    /// Webhook tasks accepted by the broker.
    pub submitted: usize,
    /// Appends or submissions that failed.
    pub failed: usize,
    /// Destinations no longer registered.
    pub skipped: usize,
}

enum Command {
    Job(ObservedEvent),
    Flush(oneshot::Sender<()>),
}

/// Collaborators the dispatch pipeline reads and writes.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    /// Queues and topics.
    pub registry: Arc<ResourceRegistry>,
    /// Bucket configurations.
    pub notifications: Arc<NotificationStore>,
    /// Compiled rules.
    pub rules: Arc<RuleCache>,
    /// Queue message lists.
    pub messages: Arc<dyn MessageStore>,
    /// Webhook task broker.
    pub broker: TaskBroker,
    /// Region written into records.
    pub region: AwsRegion,
}

/// Ordered, bounded event dispatcher.
#[derive(Debug)]
pub struct Dispatcher {
    tx: mpsc::Sender<Command>,
    context: Arc<DispatchContext>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Job(event) => f.debug_tuple("Job").field(&event.key).finish(),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl Dispatcher {
    /// Spawn the dispatch worker. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn start(context: DispatchContext, capacity: usize) -> Self {
        let context = Arc::new(context);
        let (tx, mut rx) = mpsc::channel(capacity.max(1));

        let worker = Arc::clone(&context);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Job(event) => match process(&worker, &event).await {
                        Ok(report) => debug!(
                            bucket = %event.bucket,
                            key = %event.key,
                            event = %event.event_name,
                            matched = report.matched,
                            failed = report.failed,
                            "event dispatched"
                        ),
                        Err(e) => warn!(
                            bucket = %event.bucket,
                            key = %event.key,
                            event = %event.event_name,
                            error = %e,
                            "event dropped"
                        ),
                    },
                    Command::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("dispatch worker stopped");
        });

        Self { tx, context }
    }

    /// Enqueue an event without waiting.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Backpressure`] when the channel is full,
    /// [`DispatchError::Closed`] when the worker is gone.
    pub fn submit(&self, event: ObservedEvent) -> Result<(), DispatchError> {
        self.tx.try_send(Command::Job(event)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Run the pipeline for one event on the calling task.
    pub async fn process(&self, event: &ObservedEvent) -> Result<DispatchReport, DispatchError> {
        process(&self.context, event).await
    }

    /// Wait until every event submitted before this call has been processed.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(Command::Flush(done)).await.is_ok() {
            let _ = wait.await;
        }
    }
}

async fn process(
    ctx: &DispatchContext,
    event: &ObservedEvent,
) -> Result<DispatchReport, DispatchError> {
    let rules = ctx.rules.get_or_compile(&event.bucket, &ctx.notifications);
    let destinations = rules.match_event(event.event_name, &event.key);

    let mut report = DispatchReport {
        matched: destinations.len(),
        ..DispatchReport::default()
    };

    for destination in &destinations {
        if !ctx.registry.contains(destination) {
            debug!(%destination, "destination no longer exists");
            report.skipped += 1;
            continue;
        }
        let body = serde_json::to_string(&EventRecord::new(event, &ctx.region, destination))?;
        match destination.service {
            ServiceKind::Queue => append(ctx, destination, body, &mut report).await,
            ServiceKind::Topic => fan_out(ctx, destination, &body, &mut report),
        }
    }
    Ok(report)
}

async fn append(
    ctx: &DispatchContext,
    queue: &Resource,
    body: String,
    report: &mut DispatchReport,
) {
    // Not retried: a failed append loses the event for this queue.
    match ctx.messages.append(&queue.list_key(), body).await {
        Ok(()) => report.queued += 1,
        Err(e) => {
            warn!(queue = %queue, error = %e, "failed to append event to queue");
            report.failed += 1;
        }
    }
}

fn fan_out(ctx: &DispatchContext, topic: &Resource, body: &str, report: &mut DispatchReport) {
    let endpoints = match ctx.registry.endpoints(topic) {
        Ok(endpoints) => endpoints,
        Err(e) => {
            warn!(topic = %topic, error = %e, "failed to read topic endpoints");
            report.failed += 1;
            return;
        }
    };
    for endpoint in endpoints {
        let task = DeliveryTask {
            uri: endpoint.uri,
            body: body.to_owned(),
        };
        match ctx.broker.submit(task) {
            Ok(()) => report.submitted += 1,
            Err(e) => {
                warn!(topic = %topic, endpoint = %endpoint.name, error = %e, "failed to submit webhook task");
                report.failed += 1;
            }
        }
    }
}
