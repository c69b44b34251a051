//! Bounded task broker feeding the webhook worker pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::config::NotifyConfig;
use crate::error::{BrokerError, DispatchError};

use super::webhook::WebhookDeliverer;

/// Pause unit between webhook attempts.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// One webhook delivery: target URI and event body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTask {
    /// Endpoint URI, scheme optional.
    pub uri: String,
    /// Serialized event record.
    pub body: String,
}

/// Worker pool settings.
#[derive(Debug, Clone)]
pub struct BrokerOptions {
    /// Number of worker tasks.
    pub workers: usize,
    /// Channel capacity.
    pub capacity: usize,
    /// Attempts per task.
    pub max_attempts: u32,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Pause unit between attempts.
    pub backoff: Duration,
}

impl BrokerOptions {
    /// Options from the service configuration.
    #[must_use]
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self {
            workers: config.webhook_workers.max(1),
            capacity: config.webhook_queue_capacity.max(1),
            max_attempts: config.webhook_max_attempts,
            timeout: config.webhook_timeout(),
            backoff: RETRY_BACKOFF,
        }
    }
}

/// Fire-and-forget submission of delivery tasks.
///
/// Tasks go into a bounded channel drained by a fixed pool of workers, each
/// delivering with [`WebhookDeliverer`]. Submitting never waits.
#[derive(Debug, Clone)]
pub struct TaskBroker {
    tx: mpsc::Sender<DeliveryTask>,
}

impl TaskBroker {
    /// Spawn the worker pool. Must be called inside a Tokio runtime.
    pub fn start(options: &BrokerOptions) -> Result<Self, DispatchError> {
        let deliverer = WebhookDeliverer::new(options.timeout, options.max_attempts, options.backoff)?;
        let (tx, rx) = mpsc::channel(options.capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..options.workers.max(1) {
            let rx = Arc::clone(&rx);
            let deliverer = deliverer.clone();
            tokio::spawn(async move {
                loop {
                    let task = rx.lock().await.recv().await;
                    let Some(task) = task else { break };
                    // Failures are logged by the deliverer.
                    let _ = deliverer.deliver(&task).await;
                }
                debug!(worker, "webhook worker stopped");
            });
        }
        info!(workers = options.workers, capacity = options.capacity, "webhook workers started");

        Ok(Self { tx })
    }

    /// Build a broker over an existing channel, with no workers.
    #[must_use]
    pub fn from_sender(tx: mpsc::Sender<DeliveryTask>) -> Self {
        Self { tx }
    }

    /// Enqueue a task without waiting.
    pub fn submit(&self, task: DeliveryTask) -> Result<(), BrokerError> {
        self.tx.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => BrokerError::Full,
            mpsc::error::TrySendError::Closed(_) => BrokerError::Closed,
        })
    }
}
