// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use async_nats::jetstream;

use crate::{
    modules::error::{code::ErrorCode, MailboxResult},
    raise_error,
};

pub mod pool;
pub mod publisher;

/// Where queue notifications go. The queue name doubles as the subject; the
/// stream is named after it with characters NATS forbids in stream names replaced.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct NatsConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub queue: String,
}

impl NatsConfig {
    pub fn new(url: impl Into<String>, queue: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            queue: queue.into(),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    pub fn subject(&self) -> &str {
        &self.queue
    }

    pub fn stream_name(&self) -> String {
        self.queue
            .chars()
            .map(|c| match c {
                '.' | '*' | '>' | '/' | '\\' => '_',
                c if c.is_whitespace() => '_',
                c => c,
            })
            .collect()
    }

    pub fn validate(&self) -> MailboxResult<()> {
        if self.queue.trim().is_empty() {
            return Err(raise_error!(
                "queue name must not be empty".into(),
                ErrorCode::InvalidInput
            ));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(raise_error!(
                "NATS username and password must be given together".into(),
                ErrorCode::InvalidInput
            ));
        }
        Ok(())
    }

    pub async fn create_producer(&self) -> MailboxResult<jetstream::Context> {
        let client = match (&self.username, &self.password) {
            (Some(username), Some(password)) => async_nats::connect_with_options(
                &self.url,
                async_nats::ConnectOptions::new()
                    .user_and_password(username.clone(), password.clone()),
            )
            .await
            .map_err(|error| {
                raise_error!(
                    format!(
                        "Failed to connect to NATS server at {} with username/password authentication. Error: {}",
                        self.url, error
                    ),
                    ErrorCode::NatsConnectionFailed
                )
            })?,
            _ => async_nats::connect(&self.url).await.map_err(|error| {
                raise_error!(
                    format!(
                        "Failed to connect to NATS server at {} without authentication. Error: {}",
                        self.url, error
                    ),
                    ErrorCode::NatsConnectionFailed
                )
            })?,
        };

        let jetstream = jetstream::new(client);
        jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: self.stream_name(),
                subjects: vec![self.subject().to_string()],
                ..Default::default()
            })
            .await
            .map_err(|error| {
                raise_error!(
                    format!(
                        "Failed to create NATS stream '{}'. Error: {}",
                        self.stream_name(),
                        error
                    ),
                    ErrorCode::NatsCreateStreamFailed
                )
            })?;

        Ok(jetstream)
    }
}
