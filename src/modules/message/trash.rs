// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::{debug, info};

use crate::modules::{
    context::MailboxContext,
    database::{schema::*, Condition, Update},
    error::{code::ErrorCode, MailboxError, MailboxResult, RecordKind},
    format::{rfc3339_now, EmailType},
    hook::{
        events::{EventAction, MailboxEvent},
        notify_best_effort,
    },
    message::{email_kind, load_email},
};

/// `POST /emails/{id}/trash`. Drafts cannot be trashed and are refused as
/// `AlreadyTrashed`; they are deleted directly.
pub async fn trash_email(ctx: &MailboxContext, message_id: &str) -> MailboxResult<()> {
    let condition = Condition::exists(MESSAGE_ID)
        .and(Condition::not_exists(TRASHED_TIME))
        .and(Condition::begins_with(TYPE_YEAR_MONTH, EmailType::Draft.prefix()).negate())
        .and(Condition::begins_with(TYPE_YEAR_MONTH, EmailType::Thread.prefix()).negate());
    let update = Update::new().set(TRASHED_TIME, rfc3339_now());

    match ctx.store.update_item(message_id, update, Some(condition)).await {
        Ok(_) => {}
        Err(e) if e.is(ErrorCode::ConditionalCheckFailed) => {
            let item = load_email(ctx, message_id).await?;
            if email_kind(&item)? == EmailType::Draft {
                debug!("Draft {} is deleted rather than trashed", message_id);
            }
            return Err(MailboxError::already_trashed(RecordKind::Email));
        }
        Err(e) => return Err(e),
    }
    info!("Trashed email {}", message_id);
    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::email(EventAction::Trashed, message_id),
    )
    .await;
    Ok(())
}

/// `POST /emails/{id}/untrash`.
pub async fn untrash_email(ctx: &MailboxContext, message_id: &str) -> MailboxResult<()> {
    let condition = Condition::exists(TRASHED_TIME)
        .and(Condition::begins_with(TYPE_YEAR_MONTH, EmailType::Thread.prefix()).negate());
    match ctx
        .store
        .update_item(message_id, Update::new().remove(TRASHED_TIME), Some(condition))
        .await
    {
        Ok(_) => {}
        Err(e) if e.is(ErrorCode::ConditionalCheckFailed) => {
            load_email(ctx, message_id).await?;
            return Err(MailboxError::not_trashed(RecordKind::Email));
        }
        Err(e) => return Err(e),
    }
    info!("Restored email {}", message_id);
    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::email(EventAction::Untrashed, message_id),
    )
    .await;
    Ok(())
}
