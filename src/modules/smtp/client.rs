// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use async_trait::async_trait;
use mail_send::{smtp::message::IntoMessage, Credentials, SmtpClientBuilder};
use tracing::info;

use crate::{
    modules::{
        error::{code::ErrorCode, MailboxResult},
        smtp::{build_message, generate_message_id, Mailer, OutboundEmail, SentMessage},
    },
    raise_error,
};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS; otherwise STARTTLS.
    pub tls: bool,
    /// Domain part of generated `Message-ID`s.
    pub message_id_domain: String,
}

/// Submits outbound mail over SMTP, one connection per message.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> MailboxResult<SentMessage> {
        let message_id = generate_message_id();
        let original_message_id = format!("<{}@{}>", message_id, self.config.message_id_domain);
        let message = build_message(email, &message_id, &self.config.message_id_domain)
            .into_message()
            .map_err(|e| {
                raise_error!(
                    format!("Failed to build message: {}", e),
                    ErrorCode::InternalError
                )
            })?;
        if message.rcpt_to.is_empty() {
            return Err(raise_error!(
                "the email has no recipients".into(),
                ErrorCode::InvalidInput
            ));
        }
        let raw = message.body.to_vec();

        let mut builder =
            SmtpClientBuilder::new(self.config.host.clone(), self.config.port)
                .implicit_tls(self.config.tls)
                .timeout(SMTP_TIMEOUT);
        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        let mut client = builder
            .connect()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::MailerFailed))?;
        client
            .send(message)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::MailerFailed))?;
        let _ = client.quit().await;

        info!("Submitted message {} via {}", message_id, self.config.host);
        Ok(SentMessage {
            message_id,
            original_message_id,
            raw,
        })
    }
}
