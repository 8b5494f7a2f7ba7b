// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    modules::{
        attribute::{Item, ItemExt},
        context::MailboxContext,
        database::{schema::*, Condition, TransactItem, Update},
        error::{code::ErrorCode, MailboxError, MailboxResult, RecordKind},
        format::{extract_type_year_month, rejoin_date, rfc3339_now, EmailType},
        hook::{
            events::{EventAction, MailboxEvent},
            notify_best_effort,
        },
        message::{delete::deletable, Email},
    },
    raise_error,
};

pub mod resolver;
#[cfg(test)]
mod tests;

/// A conversation with its member emails, oldest first.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct Thread {
    #[serde(rename = "messageID")]
    #[oai(rename = "messageID")]
    pub message_id: String,
    /// Subject of the first email.
    pub subject: String,
    #[serde(rename = "emailIDs")]
    #[oai(rename = "emailIDs")]
    pub email_ids: Vec<String>,
    /// Reply-draft in progress, if any.
    #[serde(rename = "draftID")]
    #[oai(rename = "draftID")]
    pub draft_id: Option<String>,
    /// When the thread was created.
    pub time_created: String,
    pub time_updated: String,
    pub trashed_time: Option<String>,
    pub emails: Vec<Email>,
}

/// Loads a thread row, failing with `NotFound` for missing rows and emails.
async fn load_thread(ctx: &MailboxContext, thread_id: &str) -> MailboxResult<Item> {
    let item = ctx.store.get_item(thread_id).await?;
    let is_thread = item
        .get_s(TYPE_YEAR_MONTH)
        .and_then(|ym| extract_type_year_month(ym).ok())
        .is_some_and(|ym| ym.kind == EmailType::Thread);
    if !is_thread {
        return Err(raise_error!(
            format!("thread '{}' not found", thread_id),
            ErrorCode::NotFound
        ));
    }
    Ok(item)
}

/// `GET /threads/{id}`.
pub async fn get_thread(ctx: &MailboxContext, thread_id: &str) -> MailboxResult<Thread> {
    let item = load_thread(ctx, thread_id).await?;
    let email_ids = item.get_list(EMAIL_IDS);
    let emails = ctx
        .store
        .batch_get(&email_ids)
        .await?
        .iter()
        .map(Email::from_item)
        .collect::<MailboxResult<Vec<_>>>()?;
    Ok(Thread {
        message_id: item.get_string(MESSAGE_ID),
        subject: item.get_string(SUBJECT),
        email_ids,
        draft_id: item.get_s(DRAFT_ID).map(str::to_string),
        time_created: rejoin_date(
            item.get_s(TYPE_YEAR_MONTH).unwrap_or_default(),
            item.get_s(DATE_TIME).unwrap_or_default(),
        ),
        time_updated: item.get_string(TIME_UPDATED),
        trashed_time: item.get_s(TRASHED_TIME).map(str::to_string),
        emails,
    })
}

fn is_thread_row() -> Condition {
    Condition::begins_with(TYPE_YEAR_MONTH, EmailType::Thread.prefix())
}

/// `POST /threads/{id}/trash`: trashes the thread and every member.
pub async fn trash_thread(ctx: &MailboxContext, thread_id: &str) -> MailboxResult<()> {
    let thread = load_thread(ctx, thread_id).await?;
    if thread.has(TRASHED_TIME) {
        return Err(MailboxError::already_trashed(RecordKind::Thread));
    }
    let now = rfc3339_now();
    let mut actions = vec![TransactItem::update(
        thread_id,
        Update::new().set(TRASHED_TIME, now.as_str()),
        Some(is_thread_row().and(Condition::not_exists(TRASHED_TIME))),
    )];
    for email_id in thread.get_list(EMAIL_IDS) {
        actions.push(TransactItem::update(
            email_id,
            Update::new().set_if_not_exists(TRASHED_TIME, now.as_str()),
            Some(Condition::exists(MESSAGE_ID)),
        ));
    }
    match ctx.store.transact_write(actions).await {
        Ok(()) => {}
        Err(e) if e.is(ErrorCode::TransactionCanceled) => {
            if load_thread(ctx, thread_id).await?.has(TRASHED_TIME) {
                return Err(MailboxError::already_trashed(RecordKind::Thread));
            }
            return Err(e);
        }
        Err(e) => return Err(e),
    }
    info!("Trashed thread {}", thread_id);
    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::thread(EventAction::Trashed, thread_id),
    )
    .await;
    Ok(())
}

/// `POST /threads/{id}/untrash`: restores the thread and every member.
pub async fn untrash_thread(ctx: &MailboxContext, thread_id: &str) -> MailboxResult<()> {
    let thread = load_thread(ctx, thread_id).await?;
    if !thread.has(TRASHED_TIME) {
        return Err(MailboxError::not_trashed(RecordKind::Thread));
    }
    let mut actions = vec![TransactItem::update(
        thread_id,
        Update::new().remove(TRASHED_TIME),
        Some(is_thread_row().and(Condition::exists(TRASHED_TIME))),
    )];
    for email_id in thread.get_list(EMAIL_IDS) {
        actions.push(TransactItem::update(
            email_id,
            Update::new().remove(TRASHED_TIME),
            Some(Condition::exists(MESSAGE_ID)),
        ));
    }
    match ctx.store.transact_write(actions).await {
        Ok(()) => {}
        Err(e) if e.is(ErrorCode::TransactionCanceled) => {
            if !load_thread(ctx, thread_id).await?.has(TRASHED_TIME) {
                return Err(MailboxError::not_trashed(RecordKind::Thread));
            }
            return Err(e);
        }
        Err(e) => return Err(e),
    }
    info!("Restored thread {}", thread_id);
    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::thread(EventAction::Untrashed, thread_id),
    )
    .await;
    Ok(())
}

/// `DELETE /threads/{id}`: removes a trashed thread, its members and its
/// reply-draft. Raw messages are removed afterwards on a best-effort basis.
pub async fn delete_thread(ctx: &MailboxContext, thread_id: &str) -> MailboxResult<()> {
    let thread = load_thread(ctx, thread_id).await?;
    if !thread.has(TRASHED_TIME) {
        return Err(MailboxError::not_trashed(RecordKind::Thread));
    }
    let email_ids = thread.get_list(EMAIL_IDS);
    let mut actions = vec![TransactItem::delete(
        thread_id,
        Some(is_thread_row().and(Condition::exists(TRASHED_TIME))),
    )];
    for email_id in &email_ids {
        actions.push(TransactItem::delete(email_id, Some(deletable())));
    }
    if let Some(draft_id) = thread.get_s(DRAFT_ID) {
        if !email_ids.iter().any(|id| id == draft_id) {
            actions.push(TransactItem::delete(
                draft_id,
                Some(
                    Condition::begins_with(TYPE_YEAR_MONTH, EmailType::Draft.prefix())
                        .or(Condition::not_exists(MESSAGE_ID)),
                ),
            ));
        }
    }
    match ctx.store.transact_write(actions).await {
        Ok(()) => {}
        Err(e) if e.is(ErrorCode::TransactionCanceled) => {
            if !load_thread(ctx, thread_id).await?.has(TRASHED_TIME) {
                return Err(MailboxError::not_trashed(RecordKind::Thread));
            }
            // a member was restored on its own since the thread was trashed
            return Err(MailboxError::not_trashed(RecordKind::Email));
        }
        Err(e) => return Err(e),
    }

    for email_id in &email_ids {
        if let Err(e) = ctx.blobs.delete(email_id).await {
            warn!("Failed to delete raw message {}: {}", email_id, e);
        }
    }
    info!("Deleted thread {} with {} email(s)", thread_id, email_ids.len());
    notify_best_effort(
        ctx.notifier.as_ref(),
        MailboxEvent::thread(EventAction::Deleted, thread_id),
    )
    .await;
    Ok(())
}
