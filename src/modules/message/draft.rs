// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::Utc;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    modules::{
        attribute::{AttributeValue, Item, ItemExt},
        context::MailboxContext,
        coordinator::WriteBatch,
        database::{schema::*, Condition, TransactItem, Update},
        envelope::text::GenerateText,
        error::{code::ErrorCode, MailboxResult},
        format::{clean_addresses, format_date_time, generate_draft_id, is_draft_id, EmailType},
        hook::{
            events::{EventAction, MailboxEvent},
            notify_best_effort,
        },
        message::{load_email, send::send_email},
    },
    raise_error,
};

/// Editable fields of a draft.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct EmailInput {
    #[oai(default)]
    #[serde(default)]
    pub subject: String,
    #[oai(default)]
    #[serde(default)]
    pub from: Vec<String>,
    #[oai(default)]
    #[serde(default)]
    pub to: Vec<String>,
    #[oai(default)]
    #[serde(default)]
    pub cc: Vec<String>,
    #[oai(default)]
    #[serde(default)]
    pub bcc: Vec<String>,
    #[oai(default)]
    #[serde(default)]
    pub reply_to: Vec<String>,
    #[oai(default)]
    #[serde(default)]
    pub text: String,
    #[oai(default)]
    #[serde(default)]
    pub html: String,
    /// Whether to derive the text body from the HTML body (default `auto`).
    pub generate_text: Option<GenerateText>,
    /// Email this draft replies to. Only honoured on creation.
    #[serde(rename = "replyEmailID")]
    #[oai(rename = "replyEmailID")]
    pub reply_email_id: Option<String>,
    /// Send right after storing the draft.
    pub send: Option<bool>,
}

/// Outcome of `POST /emails` and `PUT /emails/{id}`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct DraftResult {
    /// The draft ID, or the sent ID when the draft was sent.
    #[serde(rename = "messageID")]
    #[oai(rename = "messageID")]
    pub message_id: String,
    pub sent: bool,
}

impl EmailInput {
    /// The attributes a save rewrites, with partition keys moved to `now`.
    fn editable_attributes(&self) -> Vec<(&'static str, AttributeValue)> {
        let now = Utc::now();
        let generate = self.generate_text.unwrap_or_default();
        vec![
            (
                TYPE_YEAR_MONTH,
                EmailType::Draft.type_year_month(&now).into(),
            ),
            (DATE_TIME, format_date_time(&now).into()),
            (SUBJECT, self.subject.as_str().into()),
            (FROM, AttributeValue::string_list(clean_addresses(&self.from, false))),
            (TO, AttributeValue::string_list(clean_addresses(&self.to, false))),
            (CC, AttributeValue::string_list(clean_addresses(&self.cc, false))),
            (BCC, AttributeValue::string_list(clean_addresses(&self.bcc, false))),
            (
                REPLY_TO,
                AttributeValue::string_list(clean_addresses(&self.reply_to, false)),
            ),
            (TEXT, generate.apply(&self.text, &self.html).into()),
            (HTML, self.html.as_str().into()),
        ]
    }
}

/// `References` of a reply to `replied`: its own references followed by its Message-ID.
fn reply_references(replied: &Item) -> String {
    [
        replied.get_s(REFERENCES).unwrap_or_default(),
        replied.get_s(ORIGINAL_MESSAGE_ID).unwrap_or_default(),
    ]
    .iter()
    .flat_map(|s| s.split_whitespace())
    .collect::<Vec<_>>()
    .join(" ")
}

/// `POST /emails`: stores a new draft, optionally as a reply, and sends it on request.
pub async fn create_email(ctx: &MailboxContext, input: &EmailInput) -> MailboxResult<DraftResult> {
    let message_id = generate_draft_id();
    let mut item = Item::new();
    item.insert(MESSAGE_ID.into(), message_id.as_str().into());
    for (name, value) in input.editable_attributes() {
        item.insert(name.into(), value);
    }

    let mut batch = WriteBatch::new();
    if let Some(reply_email_id) = input
        .reply_email_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    {
        let replied = load_email(ctx, reply_email_id).await?;
        let in_reply_to = replied.get_string(ORIGINAL_MESSAGE_ID);
        if !in_reply_to.is_empty() {
            item.insert(IN_REPLY_TO.into(), in_reply_to.into());
        }
        let references = reply_references(&replied);
        if !references.is_empty() {
            item.insert(REFERENCES.into(), references.into());
        }
        if let Some(thread_id) = replied.get_s(THREAD_ID) {
            item.insert(THREAD_ID.into(), thread_id.into());
            take_draft_slot(ctx, &mut batch, thread_id, &message_id).await?;
        }
    }
    batch.push(TransactItem::put(
        item,
        Some(Condition::not_exists(MESSAGE_ID)),
    ));
    batch.commit(ctx.store.as_ref()).await?;
    info!("Created draft {}", message_id);
    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::email(EventAction::Created, &message_id),
    )
    .await;

    finish(ctx, message_id, input.send.unwrap_or(false)).await
}

/// Points the `DraftID` slot of `thread_id` at `draft_id`. A reply-draft that
/// held the slot before is detached from the thread and kept as a plain draft.
async fn take_draft_slot(
    ctx: &MailboxContext,
    batch: &mut WriteBatch,
    thread_id: &str,
    draft_id: &str,
) -> MailboxResult<()> {
    let previous = match ctx.store.get_item(thread_id).await {
        Ok(thread) => thread.get_s(DRAFT_ID).map(str::to_string),
        Err(e) if e.is(ErrorCode::NotFound) => None,
        Err(e) => return Err(e),
    };
    let slot = match previous.as_deref() {
        Some(previous) => Condition::equals(DRAFT_ID, previous),
        None => Condition::not_exists(DRAFT_ID),
    };
    batch.push(TransactItem::update(
        thread_id,
        Update::new().set(DRAFT_ID, draft_id),
        Some(Condition::exists(MESSAGE_ID).and(slot)),
    ));

    let Some(previous) = previous else {
        return Ok(());
    };
    match ctx.store.get_item(&previous).await {
        Ok(draft) if draft.get_s(THREAD_ID) == Some(thread_id) => {
            info!(
                "Draft {} replaces {} as the reply-draft of thread {}",
                draft_id, previous, thread_id
            );
            batch.push(TransactItem::update(
                previous.as_str(),
                Update::new().remove(THREAD_ID),
                Some(Condition::equals(THREAD_ID, thread_id)),
            ));
        }
        Ok(_) => {}
        Err(e) if e.is(ErrorCode::NotFound) => {}
        Err(e) => return Err(e),
    }
    Ok(())
}

/// `PUT /emails/{id}`: replaces the editable fields of a draft.
pub async fn save_email(
    ctx: &MailboxContext,
    message_id: &str,
    input: &EmailInput,
) -> MailboxResult<DraftResult> {
    if !is_draft_id(message_id) {
        return Err(raise_error!(
            format!("email '{}' is not a draft", message_id),
            ErrorCode::EmailIsNotDraft
        ));
    }
    let update = input
        .editable_attributes()
        .into_iter()
        .fold(Update::new(), |update, (name, value)| update.set(name, value));
    let condition =
        Condition::exists(MESSAGE_ID).and(Condition::begins_with(TYPE_YEAR_MONTH, EmailType::Draft.prefix()));
    match ctx.store.update_item(message_id, update, Some(condition)).await {
        Ok(_) => {}
        Err(e) if e.is(ErrorCode::ConditionalCheckFailed) => {
            // missing rows surface as NotFound
            load_email(ctx, message_id).await?;
            return Err(raise_error!(
                format!("email '{}' is not a draft", message_id),
                ErrorCode::EmailIsNotDraft
            ));
        }
        Err(e) => return Err(e),
    }
    info!("Saved draft {}", message_id);
    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::email(EventAction::Saved, message_id),
    )
    .await;

    finish(ctx, message_id.to_string(), input.send.unwrap_or(false)).await
}

async fn finish(ctx: &MailboxContext, message_id: String, send: bool) -> MailboxResult<DraftResult> {
    if !send {
        return Ok(DraftResult {
            message_id,
            sent: false,
        });
    }
    let result = send_email(ctx, &message_id).await?;
    Ok(DraftResult {
        message_id: result.message_id,
        sent: true,
    })
}
