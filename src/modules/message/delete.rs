// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::{debug, info, warn};

use crate::modules::{
    attribute::ItemExt,
    context::MailboxContext,
    coordinator::WriteBatch,
    database::{schema::*, Condition, TransactItem},
    error::{code::ErrorCode, MailboxError, MailboxResult, RecordKind},
    format::EmailType,
    hook::{
        events::{EventAction, MailboxEvent},
        notify_best_effort,
    },
    message::{email_kind, holds_draft_slot, load_email},
};

/// Condition under which an email row may be removed: trashed, or a draft.
pub(crate) fn deletable() -> Condition {
    Condition::exists(TRASHED_TIME).or(Condition::begins_with(
        TYPE_YEAR_MONTH,
        EmailType::Draft.prefix(),
    ))
}

/// `DELETE /emails/{id}`: permanently removes a trashed email or a draft.
///
/// Threaded emails are removed with their thread; a reply-draft also releases
/// its thread's `DraftID`.
pub async fn delete_email(ctx: &MailboxContext, message_id: &str) -> MailboxResult<()> {
    let item = load_email(ctx, message_id).await?;
    let kind = email_kind(&item)?;

    match (kind, item.get_s(THREAD_ID)) {
        (EmailType::Draft, Some(thread_id)) => {
            delete_reply_draft(ctx, message_id, thread_id).await?;
        }
        _ => {
            let condition = deletable().and(Condition::not_exists(THREAD_ID));
            match ctx.store.delete_item(message_id, Some(condition)).await {
                Ok(()) => {}
                Err(e) if e.is(ErrorCode::ConditionalCheckFailed) => {
                    return Err(classify_failure(ctx, message_id).await);
                }
                Err(e) => return Err(e),
            }
            if kind != EmailType::Draft {
                if let Err(e) = ctx.blobs.delete(message_id).await {
                    warn!("Failed to delete raw message {}: {}", message_id, e);
                }
            }
        }
    }
    info!("Deleted email {}", message_id);
    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::email(EventAction::Deleted, message_id),
    )
    .await;
    Ok(())
}

async fn delete_reply_draft(
    ctx: &MailboxContext,
    message_id: &str,
    thread_id: &str,
) -> MailboxResult<()> {
    let mut batch = WriteBatch::new();
    batch.push(TransactItem::delete(
        message_id,
        Some(Condition::begins_with(
            TYPE_YEAR_MONTH,
            EmailType::Draft.prefix(),
        )),
    ));
    if holds_draft_slot(ctx, thread_id, message_id).await? {
        batch.release_draft(thread_id, message_id);
    }
    batch.commit(ctx.store.as_ref()).await
}

/// Explains why a conditional delete was refused, from the row as it is now.
async fn classify_failure(ctx: &MailboxContext, message_id: &str) -> MailboxError {
    let item = match load_email(ctx, message_id).await {
        Ok(item) => item,
        Err(e) => return e,
    };
    if let (true, Some(thread_id)) = (item.has(TRASHED_TIME), item.get_s(THREAD_ID)) {
        debug!(
            "Email {} is a member of thread {}; it is removed with the thread",
            message_id, thread_id
        );
    }
    MailboxError::not_trashed(RecordKind::Email)
}
