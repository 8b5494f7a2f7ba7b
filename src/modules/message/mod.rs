// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::{
    modules::{
        attribute::{AttributeValue, Item, ItemExt},
        context::MailboxContext,
        database::schema::*,
        error::{code::ErrorCode, MailboxResult},
        format::{extract_type_year_month, rejoin_date, EmailType},
        storage::parts::PartEntry,
    },
    raise_error,
};

pub mod content;
pub mod delete;
pub mod draft;
pub mod flag;
pub mod ingest;
pub mod list;
pub mod reparse;
pub mod send;
pub mod trash;

/// Metadata of one non-body MIME part.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct EmailPart {
    /// Content-ID without angle brackets, or `part<N>` when the part has none.
    #[serde(rename = "contentID")]
    #[oai(rename = "contentID")]
    pub content_id: String,
    pub content_type: String,
    pub content_type_params: BTreeMap<String, String>,
    pub filename: String,
}

impl From<PartEntry> for EmailPart {
    fn from(entry: PartEntry) -> Self {
        Self {
            content_id: entry.content_id,
            content_type: entry.content_type,
            content_type_params: entry.content_type_params,
            filename: entry.filename,
        }
    }
}

/// A stored email as returned by `GET /emails/{id}`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct Email {
    #[serde(rename = "messageID")]
    #[oai(rename = "messageID")]
    pub message_id: String,
    /// `inbox`, `sent` or `draft`.
    #[serde(rename = "type")]
    #[oai(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub return_path: String,
    pub source: String,
    pub destination: Vec<String>,
    /// `Message-ID` header, with angle brackets.
    #[serde(rename = "originalMessageID")]
    #[oai(rename = "originalMessageID")]
    pub original_message_id: String,
    pub in_reply_to: String,
    pub references: String,
    /// `Date` header as RFC 3339.
    pub date_sent: String,
    /// Set for received emails.
    pub time_received: Option<String>,
    /// Set for sent emails.
    pub time_sent: Option<String>,
    /// Set for drafts: the last save.
    pub time_updated: Option<String>,
    pub text: String,
    pub html: String,
    pub attachments: Vec<EmailPart>,
    pub inlines: Vec<EmailPart>,
    pub other_parts: Vec<EmailPart>,
    pub unread: bool,
    pub trashed_time: Option<String>,
    #[serde(rename = "threadID")]
    #[oai(rename = "threadID")]
    pub thread_id: Option<String>,
    pub is_thread_latest: bool,
}

/// The three time fields of an email; only the one matching its kind is set.
pub(crate) fn effective_times(
    kind: EmailType,
    item: &Item,
) -> (Option<String>, Option<String>, Option<String>) {
    let time = rejoin_date(
        item.get_s(TYPE_YEAR_MONTH).unwrap_or_default(),
        item.get_s(DATE_TIME).unwrap_or_default(),
    );
    match kind {
        EmailType::Inbox => (Some(time), None, None),
        EmailType::Sent => (None, Some(time), None),
        EmailType::Draft | EmailType::Thread => (None, None, Some(time)),
    }
}

fn parts(item: &Item, name: &str) -> Vec<EmailPart> {
    item.get(name)
        .and_then(AttributeValue::as_l)
        .map(|list| {
            list.iter()
                .filter_map(PartEntry::from_attribute)
                .map(EmailPart::from)
                .collect()
        })
        .unwrap_or_default()
}

impl Email {
    pub fn from_item(item: &Item) -> MailboxResult<Self> {
        let kind = email_kind(item)?;
        let (time_received, time_sent, time_updated) = effective_times(kind, item);
        Ok(Self {
            message_id: item.get_string(MESSAGE_ID),
            kind: kind.to_string(),
            subject: item.get_string(SUBJECT),
            from: item.get_list(FROM),
            to: item.get_list(TO),
            cc: item.get_list(CC),
            bcc: item.get_list(BCC),
            reply_to: item.get_list(REPLY_TO),
            return_path: item.get_string(RETURN_PATH),
            source: item.get_string(SOURCE),
            destination: item.get_list(DESTINATION),
            original_message_id: item.get_string(ORIGINAL_MESSAGE_ID),
            in_reply_to: item.get_string(IN_REPLY_TO),
            references: item.get_string(REFERENCES),
            date_sent: item.get_string(DATE_SENT),
            time_received,
            time_sent,
            time_updated,
            text: item.get_string(TEXT),
            html: item.get_string(HTML),
            attachments: parts(item, ATTACHMENTS),
            inlines: parts(item, INLINES),
            other_parts: parts(item, OTHER_PARTS),
            unread: item.has(UNREAD),
            trashed_time: item.get_s(TRASHED_TIME).map(str::to_string),
            thread_id: item.get_s(THREAD_ID).map(str::to_string),
            is_thread_latest: item.has(IS_THREAD_LATEST),
        })
    }
}

/// The record kind of an email row; thread rows and malformed keys are rejected.
pub(crate) fn email_kind(item: &Item) -> MailboxResult<EmailType> {
    let id = item.get_s(MESSAGE_ID).unwrap_or_default();
    let kind = item
        .get_s(TYPE_YEAR_MONTH)
        .and_then(|ym| extract_type_year_month(ym).ok())
        .map(|ym| ym.kind)
        .filter(EmailType::is_email);
    kind.ok_or_else(|| raise_error!(format!("email '{}' not found", id), ErrorCode::NotFound))
}

/// Loads an email row, failing with `NotFound` for missing rows and threads.
pub async fn load_email(ctx: &MailboxContext, message_id: &str) -> MailboxResult<Item> {
    let item = ctx.store.get_item(message_id).await?;
    email_kind(&item)?;
    Ok(item)
}

/// True while the `DraftID` slot of `thread_id` names `draft_id`.
pub(crate) async fn holds_draft_slot(
    ctx: &MailboxContext,
    thread_id: &str,
    draft_id: &str,
) -> MailboxResult<bool> {
    match ctx.store.get_item(thread_id).await {
        Ok(thread) => Ok(thread.get_s(DRAFT_ID) == Some(draft_id)),
        Err(e) if e.is(ErrorCode::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}

/// `GET /emails/{id}`.
pub async fn get_email(ctx: &MailboxContext, message_id: &str) -> MailboxResult<Email> {
    let item = load_email(ctx, message_id).await?;
    Email::from_item(&item)
}
