// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::{debug, error, info};

use crate::modules::error::code::ErrorCode;
use crate::modules::hook::events::MailboxEvent;
use crate::modules::hook::nats::pool::{open_queue_pool, QueuePool};
use crate::modules::hook::nats::NatsConfig;
use crate::{modules::error::MailboxResult, raise_error};

pub const EVENT_HEADER: &str = "Event";
pub const TIMESTAMP_HEADER: &str = "Timestamp";

/// Publishes events on the JetStream subject named after the queue.
pub struct NatsPublisher {
    config: NatsConfig,
    pool: QueuePool,
}

impl NatsPublisher {
    /// Connects, ensures the stream exists and keeps a small connection pool.
    pub async fn connect(config: NatsConfig) -> MailboxResult<Self> {
        config.validate()?;
        let pool = open_queue_pool(&config).await?;
        // fail fast when the server or stream is unavailable
        drop(pool.get().await?);
        info!(
            "Queue notifications enabled on NATS stream '{}'",
            config.stream_name()
        );
        Ok(Self { config, pool })
    }

    pub async fn publish(
        &self,
        event: &MailboxEvent,
        payload: &serde_json::Value,
    ) -> MailboxResult<()> {
        let mut headers = async_nats::HeaderMap::new();
        headers.insert(EVENT_HEADER, event.event.to_string());
        headers.insert(TIMESTAMP_HEADER, event.timestamp.clone());

        let ack = self
            .pool
            .get()
            .await?
            .publish_with_headers(
                self.config.subject().to_string(),
                headers,
                payload.to_string().into(),
            )
            .await
            .map_err(|e| {
                error!("Failed to publish event to NATS: {:?}", e);
                raise_error!(format!("{:#?}", e), ErrorCode::NatsRequestFailed)
            })?;
        ack.await.map_err(|e| {
            raise_error!(
                format!("NATS did not acknowledge the event: {:#?}", e),
                ErrorCode::NatsRequestFailed
            )
        })?;
        debug!("Successfully published event: {}", event);
        Ok(())
    }
}
