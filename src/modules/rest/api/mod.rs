// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use email::EmailApi;
use inbound::InboundApi;
use info::InfoApi;
use poem_openapi::{OpenApiService, Tags};
use thread::ThreadApi;

use crate::rustmailbox_version;

pub mod email;
pub mod inbound;
pub mod info;
pub mod thread;

#[derive(Tags)]
pub enum ApiTags {
    /// Service build information
    Info,
    /// Listing, reading, composing and removing emails
    Email,
    /// Conversation threads
    Thread,
    /// Deliveries from the mail receiver
    Inbound,
}

type MailboxOpenApi = (InfoApi, EmailApi, ThreadApi, InboundApi);

pub fn create_openapi_service() -> OpenApiService<MailboxOpenApi, ()> {
    OpenApiService::new(
        (InfoApi, EmailApi, ThreadApi, InboundApi),
        "RustMailboxApi",
        rustmailbox_version!(),
    )
}
