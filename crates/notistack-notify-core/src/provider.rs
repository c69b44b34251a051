//! Notification provider owning all service state.

use std::sync::Arc;

use notistack_notify_http::ProxiedExchange;
use notistack_notify_model::ObservedEvent;

use crate::config::NotifyConfig;
use crate::dispatch::{BrokerOptions, DispatchContext, Dispatcher, TaskBroker};
use crate::error::DispatchError;
use crate::intercept::classify;
use crate::rules::RuleCache;
use crate::state::{
    BucketOwners, InMemoryMessageStore, MessageStore, NotificationStore, ResourceRegistry,
};

/// Queues, topics, bucket configurations and the event pipeline.
///
/// Control-plane operations live in the `ops` submodules as `handle_*`
/// methods on this type.
#[derive(Debug)]
pub struct NotistackNotify {
    /// Configuration.
    pub config: Arc<NotifyConfig>,
    /// Queues and topics.
    pub registry: Arc<ResourceRegistry>,
    /// Bucket configurations.
    pub notifications: Arc<NotificationStore>,
    /// Compiled rule cache.
    pub rules: Arc<RuleCache>,
    /// Queue message lists.
    pub messages: Arc<dyn MessageStore>,
    /// Bucket owner directory.
    pub owners: BucketOwners,
    dispatcher: Dispatcher,
}

impl NotistackNotify {
    /// Create a provider with in-memory message lists.
    ///
    /// Spawns the dispatch worker and webhook pool, so it must be called
    /// inside a Tokio runtime.
    pub fn new(config: NotifyConfig) -> Result<Self, DispatchError> {
        Self::with_message_store(config, Arc::new(InMemoryMessageStore::new()))
    }

    /// Create a provider over the given message store.
    pub fn with_message_store(
        config: NotifyConfig,
        messages: Arc<dyn MessageStore>,
    ) -> Result<Self, DispatchError> {
        let broker = TaskBroker::start(&BrokerOptions::from_config(&config))?;
        let registry = Arc::new(ResourceRegistry::new());
        let notifications = Arc::new(NotificationStore::new());
        let rules = Arc::new(RuleCache::new());

        let dispatcher = Dispatcher::start(
            DispatchContext {
                registry: Arc::clone(&registry),
                notifications: Arc::clone(&notifications),
                rules: Arc::clone(&rules),
                messages: Arc::clone(&messages),
                broker,
                region: config.region.clone(),
            },
            config.dispatch_queue_capacity,
        );

        Ok(Self {
            owners: BucketOwners::from_config(config.bucket_ownership, &config.bucket_owners),
            config: Arc::new(config),
            registry,
            notifications,
            rules,
            messages,
            dispatcher,
        })
    }

    /// The event dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Classify a proxied exchange and enqueue the resulting event.
    ///
    /// Returns the event that was enqueued, `None` when the exchange is not
    /// a notifiable storage operation.
    pub fn observe(&self, exchange: &ProxiedExchange) -> Result<Option<ObservedEvent>, DispatchError> {
        let Some(event) = classify(exchange, &self.config) else {
            return Ok(None);
        };
        self.dispatcher.submit(event.clone())?;
        Ok(Some(event))
    }
}
