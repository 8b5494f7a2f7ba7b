// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use async_nats::jetstream;
use bb8::{ManageConnection, Pool};
use tracing::warn;

use crate::{
    modules::{
        error::{code::ErrorCode, MailboxError, MailboxResult},
        hook::nats::NatsConfig,
    },
    raise_error,
};

/// Publishes are short and best-effort; a handful of contexts covers the
/// request handlers.
const MAX_CONTEXTS: u32 = 4;
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);
const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

pub type QueuePool = Pool<QueueContexts>;

/// Hands out JetStream contexts bound to the notification queue.
///
/// A context is only handed out while the queue's stream is still present on the
/// server. When the stream is gone the context is dropped, and the next connect
/// recreates the stream.
#[derive(Debug)]
pub struct QueueContexts {
    config: NatsConfig,
}

impl QueueContexts {
    pub fn new(config: &NatsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl ManageConnection for QueueContexts {
    type Connection = jetstream::Context;
    type Error = MailboxError;

    async fn connect(&self) -> MailboxResult<jetstream::Context> {
        self.config.create_producer().await
    }

    async fn is_valid(&self, context: &mut jetstream::Context) -> MailboxResult<()> {
        let stream = self.config.stream_name();
        context.get_stream(&stream).await.map_err(|e| {
            warn!("NATS stream '{}' is no longer available: {}", stream, e);
            raise_error!(
                format!("stream '{}' lookup failed: {:#?}", stream, e),
                ErrorCode::NatsConnectionFailed
            )
        })?;
        Ok(())
    }

    fn has_broken(&self, _: &mut jetstream::Context) -> bool {
        false
    }
}

pub async fn open_queue_pool(config: &NatsConfig) -> MailboxResult<QueuePool> {
    let pool = Pool::builder()
        .max_size(MAX_CONTEXTS)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .retry_connection(true)
        .test_on_check_out(true)
        .build(QueueContexts::new(config))
        .await?;
    Ok(pool)
}
