// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::modules::{
    error::MailboxResult,
    hook::{events::MailboxEvent, http::WebhookClient, nats::publisher::NatsPublisher},
};

pub mod events;
pub mod http;
pub mod nats;

/// Sink for state-change events. Delivery is at-most-once.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &MailboxEvent) -> MailboxResult<()>;
}

/// Sends each event to the queue and the webhook, whichever are configured.
#[derive(Default)]
pub struct EventDispatcher {
    queue: Option<Arc<NatsPublisher>>,
    webhook: Option<WebhookClient>,
}

impl EventDispatcher {
    pub fn new(queue: Option<Arc<NatsPublisher>>, webhook: Option<WebhookClient>) -> Self {
        Self { queue, webhook }
    }

    pub fn is_enabled(&self) -> bool {
        self.queue.is_some() || self.webhook.is_some()
    }
}

#[async_trait]
impl Notifier for EventDispatcher {
    async fn notify(&self, event: &MailboxEvent) -> MailboxResult<()> {
        let payload = event.to_json_value()?;
        let mut first_error = None;

        if let Some(queue) = &self.queue {
            if let Err(e) = queue.publish(event, &payload).await {
                warn!("Failed to enqueue {} event: {}", event, e);
                first_error.get_or_insert(e);
            }
        }
        if let Some(webhook) = &self.webhook {
            if let Err(e) = webhook.post(&payload).await {
                warn!("Failed to post {} event to webhook: {}", event, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => {
                debug!("Dispatched {} event", event);
                Ok(())
            }
        }
    }
}

/// Emits an event after a committed change; a delivery failure is only logged.
pub async fn notify_best_effort(notifier: &dyn Notifier, event: MailboxEvent) {
    if let Err(e) = notifier.notify(&event).await {
        warn!("Notification for {} was not delivered: {}", event, e);
    }
}
