// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use tracing::info;

use crate::modules::{
    database::{manager::DatabaseManager, table::NativeTable, MetadataStore},
    envelope::text::GenerateText,
    error::MailboxResult,
    hook::{
        http::WebhookClient,
        nats::{publisher::NatsPublisher, NatsConfig},
        EventDispatcher, Notifier,
    },
    settings::{cli::Settings, dir::DATA_DIR_MANAGER},
    smtp::{
        client::{SmtpConfig, SmtpMailer},
        Mailer,
    },
    storage::{BlobStore, DiskBlobStore},
};

#[cfg(test)]
pub mod testing;

pub trait Initialize {
    async fn initialize() -> MailboxResult<()>;
}

/// Deployment parameters every operation needs, fixed at startup.
#[derive(Debug, Clone)]
pub struct Env {
    pub region: String,
    pub table_name: String,
    pub time_index: String,
    pub original_index: String,
    pub bucket: String,
    pub queue: Option<String>,
    pub webhook_url: Option<String>,
    /// Domain of outbound `Message-ID`s; replies to `<id@domain>` are matched by ID.
    pub message_id_domain: String,
    /// Ingestion default for generating text bodies from HTML.
    pub generate_text: GenerateText,
}

impl Env {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            region: settings.region.clone(),
            table_name: settings.dynamodb_table.clone(),
            time_index: settings.dynamodb_time_index.clone(),
            original_index: settings.dynamodb_original_index.clone(),
            bucket: settings.s3_bucket.clone(),
            queue: settings.sqs_queue.clone().filter(|q| !q.trim().is_empty()),
            webhook_url: settings.webhook_url.clone().filter(|u| !u.trim().is_empty()),
            message_id_domain: settings.message_id_domain(),
            generate_text: settings.rustmailbox_generate_text,
        }
    }
}

/// Everything an operation talks to. Cheap to clone.
#[derive(Clone)]
pub struct MailboxContext {
    pub env: Arc<Env>,
    pub store: Arc<dyn MetadataStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub mailer: Arc<dyn Mailer>,
    pub notifier: Arc<dyn Notifier>,
}

impl MailboxContext {
    pub fn new(
        env: Env,
        store: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        mailer: Arc<dyn Mailer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            env: Arc::new(env),
            store,
            blobs,
            mailer,
            notifier,
        }
    }

    /// Wires the production adapters described by `settings`.
    pub async fn build(settings: &Settings) -> MailboxResult<Self> {
        let env = Env::from_settings(settings);

        let database = if settings.rustmailbox_metadata_memory_mode_enabled {
            DatabaseManager::open_in_memory()?
        } else {
            DatabaseManager::open(
                &DATA_DIR_MANAGER.meta_db,
                settings.rustmailbox_metadata_cache_size,
            )?
        };
        let store = NativeTable::new(database, &env.time_index, &env.original_index);
        let blobs = DiskBlobStore::new(DATA_DIR_MANAGER.blob_dir.clone());

        let mailer = SmtpMailer::new(SmtpConfig {
            host: settings.rustmailbox_smtp_host.clone(),
            port: settings.rustmailbox_smtp_port,
            username: settings.rustmailbox_smtp_username.clone(),
            password: settings.rustmailbox_smtp_password.clone(),
            tls: settings.rustmailbox_smtp_tls,
            message_id_domain: env.message_id_domain.clone(),
        });

        let queue = match &env.queue {
            Some(queue) => {
                let config = NatsConfig::new(&settings.rustmailbox_nats_url, queue)
                    .with_credentials(
                        settings.rustmailbox_nats_username.clone(),
                        settings.rustmailbox_nats_password.clone(),
                    );
                let publisher = NatsPublisher::connect(config).await?;
                info!("Notifications are enqueued on '{}'", queue);
                Some(Arc::new(publisher))
            }
            None => None,
        };
        let webhook = match &env.webhook_url {
            Some(url) => {
                info!("Notifications are posted to {}", url);
                Some(WebhookClient::new(url)?)
            }
            None => None,
        };
        let notifier = EventDispatcher::new(queue, webhook);
        if !notifier.is_enabled() {
            info!("No notification sink configured; events are dropped");
        }

        Ok(Self::new(
            env,
            Arc::new(store),
            Arc::new(blobs),
            Arc::new(mailer),
            Arc::new(notifier),
        ))
    }
}
