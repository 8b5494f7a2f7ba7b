// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use http::header::CONTENT_TYPE;
use poem_openapi::payload::{Attachment, AttachmentType, Response};

use crate::modules::storage::parts::PartContent;

/// A stored MIME object served with its own `Content-Type` and a
/// `Content-Disposition` of `inline` or `attachment; filename="…"`.
pub type ContentResponse = Response<Attachment<Vec<u8>>>;

pub fn content_response(part: PartContent, disposition: AttachmentType) -> ContentResponse {
    let mut attachment = Attachment::new(part.content).attachment_type(disposition);
    if !part.filename.is_empty() {
        attachment = attachment.filename(part.filename);
    }
    let content_type = if part.content_type.is_empty() {
        "application/octet-stream".to_string()
    } else {
        part.content_type
    };
    Response::new(attachment).header(CONTENT_TYPE, content_type)
}
