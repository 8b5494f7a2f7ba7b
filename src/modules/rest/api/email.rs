// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::web::Data;
use poem_openapi::param::{Path, Query};
use poem_openapi::payload::{AttachmentType, Json};
use poem_openapi::OpenApi;

use crate::modules::context::MailboxContext;
use crate::modules::message::content::{get_part, get_raw};
use crate::modules::message::delete::delete_email;
use crate::modules::message::draft::{create_email, save_email, DraftResult, EmailInput};
use crate::modules::message::flag::mark_read;
use crate::modules::message::list::{list_emails, ListRequest, ListResult, ShowTrash, SortOrder};
use crate::modules::message::reparse::reparse_email;
use crate::modules::message::send::{send_email, SendResult};
use crate::modules::message::trash::{trash_email, untrash_email};
use crate::modules::message::{get_email, Email};
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::{content_response, ContentResponse};
use crate::modules::rest::ApiResult;
use crate::modules::storage::parts::PartKind;

pub struct EmailApi;

#[OpenApi(tag = "ApiTags::Email")]
impl EmailApi {
    /// Lists one month of inbox, sent or draft emails, newest first by default.
    #[oai(path = "/emails", method = "get", operation_id = "list_emails")]
    async fn list_emails(
        &self,
        ctx: Data<&MailboxContext>,
        /// `inbox`, `sent` or `draft`.
        #[oai(name = "type")]
        kind: Query<Option<String>>,
        /// Defaults to the current year.
        year: Query<Option<i32>>,
        /// 1-12, defaults to the current month.
        month: Query<Option<u32>>,
        order: Query<Option<SortOrder>>,
        #[oai(name = "pageSize")] page_size: Query<Option<u32>>,
        /// Cursor returned by the previous page, used with the same parameters.
        #[oai(name = "nextCursor")]
        next_cursor: Query<Option<String>>,
        #[oai(name = "showTrash")] show_trash: Query<Option<ShowTrash>>,
    ) -> ApiResult<Json<ListResult>> {
        let request = ListRequest {
            r#type: kind.0.unwrap_or_default(),
            year: year.0,
            month: month.0,
            order: order.0,
            page_size: page_size.0,
            next_cursor: next_cursor.0,
            show_trash: show_trash.0,
        };
        Ok(Json(list_emails(ctx.0, &request).await?))
    }

    /// Creates a draft, optionally as a reply and optionally sending it right away.
    #[oai(path = "/emails", method = "post", operation_id = "create_email")]
    async fn create_email(
        &self,
        ctx: Data<&MailboxContext>,
        payload: Json<EmailInput>,
    ) -> ApiResult<Json<DraftResult>> {
        Ok(Json(create_email(ctx.0, &payload.0).await?))
    }

    #[oai(path = "/emails/:id", method = "get", operation_id = "get_email")]
    async fn get_email(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<Json<Email>> {
        Ok(Json(get_email(ctx.0, id.0.trim()).await?))
    }

    /// Replaces the editable fields of a draft.
    #[oai(path = "/emails/:id", method = "put", operation_id = "save_email")]
    async fn save_email(
        &self,
        ctx: Data<&MailboxContext>,
        id: Path<String>,
        payload: Json<EmailInput>,
    ) -> ApiResult<Json<DraftResult>> {
        Ok(Json(save_email(ctx.0, id.0.trim(), &payload.0).await?))
    }

    /// Permanently removes a draft or a trashed email.
    #[oai(path = "/emails/:id", method = "delete", operation_id = "delete_email")]
    async fn delete_email(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<()> {
        Ok(delete_email(ctx.0, id.0.trim()).await?)
    }

    /// The stored MIME message, displayed inline.
    #[oai(path = "/emails/:id/raw", method = "get", operation_id = "get_raw_email")]
    async fn get_raw_email(
        &self,
        ctx: Data<&MailboxContext>,
        id: Path<String>,
    ) -> ApiResult<ContentResponse> {
        let mut part = get_raw(ctx.0, id.0.trim()).await?;
        part.filename.clear();
        Ok(content_response(part, AttachmentType::Inline))
    }

    /// The stored MIME message as an `.eml` download.
    #[oai(
        path = "/emails/:id/raw/download",
        method = "get",
        operation_id = "download_raw_email"
    )]
    async fn download_raw_email(
        &self,
        ctx: Data<&MailboxContext>,
        id: Path<String>,
    ) -> ApiResult<ContentResponse> {
        let part = get_raw(ctx.0, id.0.trim()).await?;
        Ok(content_response(part, AttachmentType::Attachment))
    }

    #[oai(
        path = "/emails/:id/attachments/:cid",
        method = "get",
        operation_id = "get_email_attachment"
    )]
    async fn get_email_attachment(
        &self,
        ctx: Data<&MailboxContext>,
        id: Path<String>,
        /// Content-ID without angle brackets.
        cid: Path<String>,
    ) -> ApiResult<ContentResponse> {
        let part = get_part(ctx.0, id.0.trim(), PartKind::Attachment, &cid.0).await?;
        Ok(content_response(part, AttachmentType::Attachment))
    }

    #[oai(
        path = "/emails/:id/inlines/:cid",
        method = "get",
        operation_id = "get_email_inline"
    )]
    async fn get_email_inline(
        &self,
        ctx: Data<&MailboxContext>,
        id: Path<String>,
        cid: Path<String>,
    ) -> ApiResult<ContentResponse> {
        let part = get_part(ctx.0, id.0.trim(), PartKind::Inline, &cid.0).await?;
        Ok(content_response(part, AttachmentType::Inline))
    }

    #[oai(
        path = "/emails/:id/others/:cid",
        method = "get",
        operation_id = "get_email_other_part"
    )]
    async fn get_email_other_part(
        &self,
        ctx: Data<&MailboxContext>,
        id: Path<String>,
        cid: Path<String>,
    ) -> ApiResult<ContentResponse> {
        let part = get_part(ctx.0, id.0.trim(), PartKind::Other, &cid.0).await?;
        Ok(content_response(part, AttachmentType::Attachment))
    }

    /// Sends a draft. The draft is replaced by a sent email under a new ID.
    #[oai(path = "/emails/:id/send", method = "post", operation_id = "send_email")]
    async fn send_email(
        &self,
        ctx: Data<&MailboxContext>,
        id: Path<String>,
    ) -> ApiResult<Json<SendResult>> {
        Ok(Json(send_email(ctx.0, id.0.trim()).await?))
    }

    #[oai(path = "/emails/:id/trash", method = "post", operation_id = "trash_email")]
    async fn trash_email(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<()> {
        Ok(trash_email(ctx.0, id.0.trim()).await?)
    }

    #[oai(path = "/emails/:id/untrash", method = "post", operation_id = "untrash_email")]
    async fn untrash_email(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<()> {
        Ok(untrash_email(ctx.0, id.0.trim()).await?)
    }

    /// Marks an inbox email as read.
    #[oai(path = "/emails/:id/read", method = "post", operation_id = "read_email")]
    async fn read_email(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<()> {
        Ok(mark_read(ctx.0, id.0.trim(), true).await?)
    }

    /// Marks an inbox email as unread.
    #[oai(path = "/emails/:id/unread", method = "post", operation_id = "unread_email")]
    async fn unread_email(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<()> {
        Ok(mark_read(ctx.0, id.0.trim(), false).await?)
    }

    /// Re-extracts the body and part listings from the stored MIME message.
    #[oai(path = "/emails/:id/reparse", method = "post", operation_id = "reparse_email")]
    async fn reparse_email(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<()> {
        Ok(reparse_email(ctx.0, id.0.trim()).await?)
    }
}
