// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::modules::{
    attribute::{Item, ItemExt},
    context::MailboxContext,
    database::{schema::*, QueryRequest},
    error::{code::ErrorCode, MailboxResult},
    format::{generate_thread_id, parse_rejoined, EmailType},
};

/// Where a new email lands relative to the existing threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadDecision {
    /// The email stands alone.
    None,
    /// The replied email was standalone; both form a new thread.
    Create {
        thread_id: String,
        creating_email_id: String,
        creating_subject: String,
        creating_time: DateTime<Utc>,
    },
    /// The email is appended after the current tail of an existing thread.
    Exists {
        thread_id: String,
        previous_message_id: String,
    },
}

impl ThreadDecision {
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            ThreadDecision::None => None,
            ThreadDecision::Create { thread_id, .. } | ThreadDecision::Exists { thread_id, .. } => {
                Some(thread_id)
            }
        }
    }
}

/// The message-id a new email replies to: `In-Reply-To`, else the last `References` entry.
pub fn anchor_message_id<'a>(in_reply_to: &'a str, references: &'a str) -> Option<&'a str> {
    let in_reply_to = in_reply_to.trim();
    if !in_reply_to.is_empty() {
        return Some(in_reply_to);
    }
    references.split_whitespace().last()
}

/// `local` when `anchor` is `<local@domain>`, i.e. a message this mailbox sent.
pub fn local_message_id<'a>(anchor: &'a str, domain: &str) -> Option<&'a str> {
    let inner = anchor.strip_prefix('<')?.strip_suffix('>')?;
    let (local, host) = inner.rsplit_once('@')?;
    if local.is_empty() || !host.eq_ignore_ascii_case(domain) {
        return None;
    }
    Some(local)
}

/// Decides the thread of the email `message_id` from its reply headers.
pub async fn resolve_thread(
    ctx: &MailboxContext,
    message_id: &str,
    in_reply_to: &str,
    references: &str,
) -> MailboxResult<ThreadDecision> {
    let Some(anchor) = anchor_message_id(in_reply_to, references) else {
        return Ok(ThreadDecision::None);
    };

    let Some(prev) = find_replied_email(ctx, anchor).await? else {
        debug!("No stored email matches {}", anchor);
        return Ok(ThreadDecision::None);
    };
    let prev_id = prev.get_string(MESSAGE_ID);
    if prev_id == message_id {
        return Ok(ThreadDecision::None);
    }

    let Some(thread_id) = prev.get_s(THREAD_ID) else {
        let creating_time = parse_rejoined(
            prev.get_s(TYPE_YEAR_MONTH).unwrap_or_default(),
            prev.get_s(DATE_TIME).unwrap_or_default(),
        )
        .unwrap_or_else(Utc::now);
        return Ok(ThreadDecision::Create {
            thread_id: generate_thread_id(),
            creating_email_id: prev_id,
            creating_subject: prev.get_string(SUBJECT),
            creating_time,
        });
    };

    if prev.has(IS_THREAD_LATEST) {
        return Ok(ThreadDecision::Exists {
            thread_id: thread_id.to_string(),
            previous_message_id: prev_id,
        });
    }

    // mid-thread reply: attach after the tail, not after the stated parent
    let thread = match ctx.store.get_item(thread_id).await {
        Ok(thread) => thread,
        Err(e) if e.is(ErrorCode::NotFound) => {
            warn!(
                "Email {} refers to missing thread {}; storing the reply standalone",
                prev_id, thread_id
            );
            return Ok(ThreadDecision::None);
        }
        Err(e) => return Err(e),
    };
    let previous_message_id = thread
        .get_list(EMAIL_IDS)
        .pop()
        .unwrap_or(prev_id);
    Ok(ThreadDecision::Exists {
        thread_id: thread_id.to_string(),
        previous_message_id,
    })
}

async fn find_replied_email(ctx: &MailboxContext, anchor: &str) -> MailboxResult<Option<Item>> {
    if let Some(local) = local_message_id(anchor, &ctx.env.message_id_domain) {
        match ctx.store.get_item(local).await {
            Ok(item)
                if item
                    .get_s(TYPE_YEAR_MONTH)
                    .is_some_and(|tym| tym.starts_with(&EmailType::Sent.prefix())) =>
            {
                return Ok(Some(item))
            }
            Ok(_) => debug!("{} is not a sent email; looking up {} by original id", local, anchor),
            Err(e) if e.is(ErrorCode::NotFound) => {}
            Err(e) => return Err(e),
        }
    }

    let output = ctx
        .store
        .query(QueryRequest::new(&ctx.env.original_index, anchor))
        .await?;
    if output.items.len() > 1 {
        debug!(
            "{} emails carry Message-ID {}; using the first",
            output.items.len(),
            anchor
        );
    }
    let Some(key) = output.items.first() else {
        return Ok(None);
    };
    match ctx.store.get_item(key.get_s(MESSAGE_ID).unwrap_or_default()).await {
        Ok(item) => Ok(Some(item)),
        Err(e) if e.is(ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}
