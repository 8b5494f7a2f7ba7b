// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::Utc;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    modules::{
        attribute::{AttributeValue, Item, ItemExt},
        context::MailboxContext,
        coordinator::WriteBatch,
        database::{schema::*, Condition, TransactItem},
        envelope::{extractor::parse_content, text::GenerateText},
        error::{code::ErrorCode, MailboxResult},
        format::{
            clean_address, format_date_time, format_rfc3339, EmailType, DRAFT_ID_PREFIX,
        },
        hook::{
            events::{EventAction, MailboxEvent},
            notify_best_effort,
        },
        message::holds_draft_slot,
        smtp::OutboundEmail,
        thread::resolver::resolve_thread,
    },
    raise_error,
};

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct SendResult {
    /// ID of the sent record that replaced the draft.
    #[serde(rename = "messageID")]
    #[oai(rename = "messageID")]
    pub message_id: String,
}

fn outbound_from_draft(draft: &Item) -> OutboundEmail {
    OutboundEmail {
        from: draft.get_list(FROM),
        to: draft.get_list(TO),
        cc: draft.get_list(CC),
        bcc: draft.get_list(BCC),
        reply_to: draft.get_list(REPLY_TO),
        subject: draft.get_string(SUBJECT),
        text: draft.get_string(TEXT),
        html: draft.get_string(HTML),
        in_reply_to: draft.get_string(IN_REPLY_TO),
        references: draft.get_string(REFERENCES),
    }
}

/// `POST /emails/{id}/send`: delivers a draft and rekeys it as a sent email.
///
/// The delivery is not rolled back when the follow-up write fails; the draft then
/// stays in place and the error is returned.
pub async fn send_email(ctx: &MailboxContext, message_id: &str) -> MailboxResult<SendResult> {
    if !message_id.starts_with(DRAFT_ID_PREFIX) {
        return Err(raise_error!(
            format!("email '{}' is not a draft", message_id),
            ErrorCode::EmailIsNotDraft
        ));
    }
    let draft = ctx.store.get_item(message_id).await?;
    if !draft
        .get_s(TYPE_YEAR_MONTH)
        .is_some_and(|ym| ym.starts_with(&EmailType::Draft.prefix()))
    {
        return Err(raise_error!(
            format!("email '{}' is not a draft", message_id),
            ErrorCode::EmailIsNotDraft
        ));
    }

    let outbound = outbound_from_draft(&draft);
    let sent = ctx.mailer.send(&outbound).await?;
    info!("Draft {} left the system as {}", message_id, sent.message_id);

    if let Err(e) = ctx.blobs.put(&sent.message_id, &sent.raw).await {
        warn!("Failed to store raw message of {}: {}", sent.message_id, e);
    }

    let now = Utc::now();
    let mut item = Item::new();
    item.insert(MESSAGE_ID.into(), sent.message_id.as_str().into());
    item.insert(
        TYPE_YEAR_MONTH.into(),
        EmailType::Sent.type_year_month(&now).into(),
    );
    item.insert(DATE_TIME.into(), format_date_time(&now).into());
    item.insert(
        ORIGINAL_MESSAGE_ID.into(),
        sent.original_message_id.as_str().into(),
    );
    item.insert(DATE_SENT.into(), format_rfc3339(&now).into());
    if let Some(from) = outbound.from.first() {
        item.insert(SOURCE.into(), clean_address(from, true).into());
    }
    for name in [SUBJECT, FROM, TO, CC, BCC, REPLY_TO, TEXT, HTML, IN_REPLY_TO, REFERENCES] {
        if let Some(value) = draft.get(name) {
            item.insert(name.to_string(), value.clone());
        }
    }
    let parts = parse_content(&sent.raw, GenerateText::Off)
        .map(|content| content.parts)
        .unwrap_or_default();
    for (name, entries) in [
        (ATTACHMENTS, &parts.attachments),
        (INLINES, &parts.inlines),
        (OTHER_PARTS, &parts.others),
    ] {
        item.insert(
            name.to_string(),
            AttributeValue::L(entries.iter().map(|entry| entry.to_attribute()).collect()),
        );
    }

    let decision = resolve_thread(
        ctx,
        &sent.message_id,
        &outbound.in_reply_to,
        &outbound.references,
    )
    .await?;

    let mut batch = WriteBatch::new();
    batch.push(TransactItem::delete(
        message_id,
        Some(Condition::begins_with(
            TYPE_YEAR_MONTH,
            EmailType::Draft.prefix(),
        )),
    ));
    batch.insert_email(&decision, item);
    if let Some(thread_id) = draft.get_s(THREAD_ID) {
        if holds_draft_slot(ctx, thread_id, message_id).await? {
            batch.release_draft(thread_id, message_id);
        }
    }
    batch.commit(ctx.store.as_ref()).await?;
    info!("Stored sent email {}", sent.message_id);

    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::email(EventAction::Sent, &sent.message_id),
    )
    .await;
    Ok(SendResult {
        message_id: sent.message_id,
    })
}
