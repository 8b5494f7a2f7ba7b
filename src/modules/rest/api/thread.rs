// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::web::Data;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

use crate::modules::context::MailboxContext;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::thread::{delete_thread, get_thread, trash_thread, untrash_thread, Thread};

pub struct ThreadApi;

#[OpenApi(tag = "ApiTags::Thread")]
impl ThreadApi {
    /// A thread together with its member emails in thread order.
    #[oai(path = "/threads/:id", method = "get", operation_id = "get_thread")]
    async fn get_thread(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<Json<Thread>> {
        Ok(Json(get_thread(ctx.0, id.0.trim()).await?))
    }

    /// Trashes the thread and every member.
    #[oai(path = "/threads/:id/trash", method = "post", operation_id = "trash_thread")]
    async fn trash_thread(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<()> {
        Ok(trash_thread(ctx.0, id.0.trim()).await?)
    }

    #[oai(path = "/threads/:id/untrash", method = "post", operation_id = "untrash_thread")]
    async fn untrash_thread(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<()> {
        Ok(untrash_thread(ctx.0, id.0.trim()).await?)
    }

    /// Permanently removes a trashed thread, its members and its reply draft.
    #[oai(path = "/threads/:id", method = "delete", operation_id = "delete_thread")]
    async fn delete_thread(&self, ctx: Data<&MailboxContext>, id: Path<String>) -> ApiResult<()> {
        Ok(delete_thread(ctx.0, id.0.trim()).await?)
    }
}
