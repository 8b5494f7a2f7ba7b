// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! In-process fakes for operation tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::{
    modules::{
        context::{Env, MailboxContext},
        database::{manager::DatabaseManager, table::NativeTable},
        envelope::text::GenerateText,
        error::{code::ErrorCode, MailboxResult},
        hook::{
            events::{EventAction, EventKind, MailboxEvent},
            Notifier,
        },
        smtp::{build_message, generate_message_id, Mailer, OutboundEmail, SentMessage},
        storage::DiskBlobStore,
    },
    raise_error,
};

pub const TEST_DOMAIN: &str = "us-west-2.amazonses.com";

/// Keeps every event it is given.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<MailboxEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<MailboxEvent> {
        self.events.lock().unwrap().clone()
    }

    /// `(kind, action, id)` triples, oldest first.
    pub fn summary(&self) -> Vec<(EventKind, EventAction, String)> {
        self.events()
            .into_iter()
            .map(|e| {
                let id = e.target_id().to_string();
                (e.event, e.action, id)
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &MailboxEvent) -> MailboxResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Accepts every message and hands out queued IDs (random ones once the queue is empty).
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    next_ids: Mutex<Vec<String>>,
    fail: Mutex<bool>,
}

impl RecordingMailer {
    pub fn push_id(&self, id: &str) {
        self.next_ids.lock().unwrap().push(id.to_string());
    }

    pub fn fail_next(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> MailboxResult<SentMessage> {
        if *self.fail.lock().unwrap() {
            return Err(raise_error!(
                "connection refused".into(),
                ErrorCode::MailerFailed
            ));
        }
        let message_id = {
            let mut ids = self.next_ids.lock().unwrap();
            if ids.is_empty() {
                generate_message_id()
            } else {
                ids.remove(0)
            }
        };
        let raw = build_message(email, &message_id, TEST_DOMAIN)
            .write_to_vec()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        self.sent.lock().unwrap().push(email.clone());
        Ok(SentMessage {
            original_message_id: format!("<{}@{}>", message_id, TEST_DOMAIN),
            message_id,
            raw,
        })
    }
}

pub fn test_env() -> Env {
    Env {
        region: "us-west-2".into(),
        table_name: "mailbox-test".into(),
        time_index: "TimeIndex".into(),
        original_index: "OriginalMessageIDIndex".into(),
        bucket: "mailbox-test-raw".into(),
        queue: None,
        webhook_url: None,
        message_id_domain: TEST_DOMAIN.into(),
        generate_text: GenerateText::Auto,
    }
}

/// A context over an in-memory table and a temporary blob directory.
pub struct TestMailbox {
    pub ctx: MailboxContext,
    pub notifier: Arc<RecordingNotifier>,
    pub mailer: Arc<RecordingMailer>,
    _blob_dir: TempDir,
}

pub fn test_mailbox() -> TestMailbox {
    let env = test_env();
    let database = DatabaseManager::open_in_memory().unwrap();
    let store = NativeTable::new(database, &env.time_index, &env.original_index);
    let blob_dir = tempfile::tempdir().unwrap();
    let blobs = DiskBlobStore::new(blob_dir.path());
    let notifier = Arc::new(RecordingNotifier::default());
    let mailer = Arc::new(RecordingMailer::default());
    let ctx = MailboxContext::new(
        env,
        Arc::new(store),
        Arc::new(blobs),
        mailer.clone(),
        notifier.clone(),
    );
    TestMailbox {
        ctx,
        notifier,
        mailer,
        _blob_dir: blob_dir,
    }
}

/// A minimal plain-text message.
pub fn raw_message(header_id: &str, in_reply_to: Option<&str>, subject: &str) -> String {
    let mut raw = format!(
        "From: Bob <bob@example.com>\r\n\
To: alice@example.com\r\n\
Subject: {}\r\n\
Message-ID: {}\r\n\
Date: Tue, 05 Mar 2024 12:00:00 +0000\r\n",
        subject, header_id
    );
    if let Some(parent) = in_reply_to {
        raw.push_str(&format!("In-Reply-To: {}\r\nReferences: {}\r\n", parent, parent));
    }
    raw.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\nHello\r\n");
    raw
}

/// Stores `raw` under `message_id` and runs ingestion for it.
pub async fn deliver(mailbox: &TestMailbox, message_id: &str, raw: &str, timestamp: &str) {
    use crate::modules::{envelope::InboundMail, message::ingest::ingest_mail};

    mailbox
        .ctx
        .blobs
        .put(message_id, raw.as_bytes())
        .await
        .unwrap();
    let mail = InboundMail {
        message_id: message_id.into(),
        timestamp: timestamp.into(),
        source: "bob@example.com".into(),
        destination: vec!["alice@example.com".into()],
        ..Default::default()
    };
    ingest_mail(&mailbox.ctx, &mail).await.unwrap();
}
