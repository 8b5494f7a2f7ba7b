// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::{
    context::MailboxContext,
    error::MailboxResult,
    storage::parts::{find_part, PartContent, PartKind},
};

pub const RAW_CONTENT_TYPE: &str = "message/rfc822";

/// The stored MIME message of an email.
pub async fn get_raw(ctx: &MailboxContext, message_id: &str) -> MailboxResult<PartContent> {
    let content = ctx.blobs.get(message_id).await?;
    Ok(PartContent {
        content,
        content_type: RAW_CONTENT_TYPE.to_string(),
        filename: format!("{}.eml", message_id),
    })
}

/// One attachment, inline or other part of an email, by content ID.
pub async fn get_part(
    ctx: &MailboxContext,
    message_id: &str,
    kind: PartKind,
    content_id: &str,
) -> MailboxResult<PartContent> {
    let raw = ctx.blobs.get(message_id).await?;
    find_part(&raw, kind, content_id.trim())
}
