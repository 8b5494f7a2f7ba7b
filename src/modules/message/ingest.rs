// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::info;

use crate::{
    modules::{
        attribute::ItemExt,
        context::MailboxContext,
        coordinator::WriteBatch,
        database::schema::{IN_REPLY_TO, REFERENCES},
        envelope::{extractor::build_inbox_record, InboundEvent, InboundMail},
        error::{code::ErrorCode, MailboxResult},
        format::is_draft_id,
        hook::events::{EventAction, MailboxEvent},
        thread::resolver::resolve_thread,
    },
    raise_error,
};

/// Ingests every record of an inbound delivery and returns the stored IDs.
pub async fn receive_events(
    ctx: &MailboxContext,
    events: Vec<InboundEvent>,
) -> MailboxResult<Vec<String>> {
    let mut received = Vec::with_capacity(events.len());
    for event in events {
        received.push(ingest_mail(ctx, &event.mail).await?);
    }
    Ok(received)
}

/// Stores one received message and attaches it to its thread.
///
/// A redelivery of a stored message writes nothing and re-emits `received`.
pub async fn ingest_mail(ctx: &MailboxContext, mail: &InboundMail) -> MailboxResult<String> {
    let message_id = mail.message_id.trim();
    if is_draft_id(message_id) {
        return Err(raise_error!(
            format!("inbound message ID '{}' uses the draft prefix", message_id),
            ErrorCode::InvalidInput
        ));
    }

    match ctx.store.get_item(message_id).await {
        Ok(_) => {
            info!("Message {} is already stored; skipping", message_id);
        }
        Err(e) if e.is(ErrorCode::NotFound) => {
            let raw = ctx.blobs.get(message_id).await?;
            let item = build_inbox_record(&raw, mail, ctx.env.generate_text)?;
            let decision = resolve_thread(
                ctx,
                message_id,
                item.get_s(IN_REPLY_TO).unwrap_or_default(),
                item.get_s(REFERENCES).unwrap_or_default(),
            )
            .await?;

            let mut batch = WriteBatch::new();
            batch.insert_email(&decision, item);
            match batch.commit(ctx.store.as_ref()).await {
                Ok(()) => match decision.thread_id() {
                    Some(thread_id) => {
                        info!("Received {} into thread {}", message_id, thread_id)
                    }
                    None => info!("Received {}", message_id),
                },
                // lost a race against a concurrent delivery of the same message
                Err(e) if e.is(ErrorCode::ConditionalCheckFailed) => {
                    info!("Message {} was stored concurrently; skipping", message_id);
                }
                Err(e) => return Err(e),
            }
        }
        Err(e) => return Err(e),
    }

    ctx.notifier
        .notify(&MailboxEvent::email(EventAction::Received, message_id))
        .await?;
    Ok(message_id.to_string())
}
