// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::info;

use crate::modules::{
    context::MailboxContext,
    database::{schema::MESSAGE_ID, Condition},
    envelope::extractor::parse_content,
    error::MailboxResult,
    hook::{
        events::{EventAction, MailboxEvent},
        notify_best_effort,
    },
    message::load_email,
};

/// `POST /emails/{id}/reparse`: re-extracts bodies and part metadata from the
/// stored MIME message. Running it twice leaves the same record.
pub async fn reparse_email(ctx: &MailboxContext, message_id: &str) -> MailboxResult<()> {
    load_email(ctx, message_id).await?;
    let raw = ctx.blobs.get(message_id).await?;
    let content = parse_content(&raw, ctx.env.generate_text)?;
    ctx.store
        .update_item(
            message_id,
            content.to_update(),
            Some(Condition::exists(MESSAGE_ID)),
        )
        .await?;
    info!("Reparsed email {}", message_id);
    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::email(EventAction::Reparsed, message_id),
    )
    .await;
    Ok(())
}
