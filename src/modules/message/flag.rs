// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::info;

use crate::{
    modules::{
        context::MailboxContext,
        database::{schema::*, Condition, Update},
        error::{code::ErrorCode, MailboxResult},
        format::EmailType,
        hook::{
            events::{EventAction, MailboxEvent},
            notify_best_effort,
        },
        message::load_email,
    },
    raise_error,
};

/// Marks an inbox email read (`read = true`) or unread.
///
/// Fails with `ReadActionFailed` when the email is not in the inbox or already
/// carries the requested state.
pub async fn mark_read(ctx: &MailboxContext, message_id: &str, read: bool) -> MailboxResult<()> {
    let inbox = Condition::begins_with(TYPE_YEAR_MONTH, EmailType::Inbox.prefix());
    let (update, condition, action) = if read {
        (
            Update::new().remove(UNREAD),
            inbox.and(Condition::exists(UNREAD)),
            EventAction::Read,
        )
    } else {
        (
            Update::new().set(UNREAD, true),
            inbox.and(Condition::not_exists(UNREAD)),
            EventAction::Unread,
        )
    };

    match ctx.store.update_item(message_id, update, Some(condition)).await {
        Ok(_) => {}
        Err(e) if e.is(ErrorCode::ConditionalCheckFailed) => {
            load_email(ctx, message_id).await?;
            return Err(raise_error!(
                format!("cannot mark email '{}' as {}", message_id, action),
                ErrorCode::ReadActionFailed
            ));
        }
        Err(e) => return Err(e),
    }
    info!("Marked {} as {}", message_id, action);
    notify_best_effort(ctx.notifier.as_ref(), MailboxEvent::email(action, message_id)).await;
    Ok(())
}
