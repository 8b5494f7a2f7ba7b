// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use tracing::warn;

use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailboxResult;
use crate::{raise_error, rustmailbox_version};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts event payloads to the configured webhook.
#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>) -> MailboxResult<WebhookClient> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(format!("RustMailbox/{}", rustmailbox_version!()))
            .timeout(WEBHOOK_TIMEOUT)
            .connect_timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| {
                raise_error!(
                    format!("Failed to build HTTP client: {:#?}", e),
                    ErrorCode::InternalError
                )
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The response body is ignored; a non-2xx status is logged, not returned.
    pub async fn post(&self, payload: &serde_json::Value) -> MailboxResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                raise_error!(
                    format!("webhook request to {} failed: {:#?}", self.url, e),
                    ErrorCode::NotificationFailed
                )
            })?;
        let status = response.status();
        if !status.is_success() {
            warn!("Webhook {} answered with status {}", self.url, status);
        }
        Ok(())
    }
}
