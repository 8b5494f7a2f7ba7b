// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::web::Data;
use poem_openapi::payload::Json;
use poem_openapi::{Object, OpenApi};
use serde::{Deserialize, Serialize};

use crate::modules::context::MailboxContext;
use crate::modules::envelope::parse_inbound;
use crate::modules::message::ingest::receive_events;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct InboundResult {
    /// Message IDs of the stored emails, in delivery order.
    pub received: Vec<String>,
}

pub struct InboundApi;

#[OpenApi(tag = "ApiTags::Inbound")]
impl InboundApi {
    /// Ingests a mail receiver event, either a single event or a `Records` batch.
    #[oai(path = "/events/inbound", method = "post", operation_id = "receive_inbound")]
    async fn receive_inbound(
        &self,
        ctx: Data<&MailboxContext>,
        payload: Json<serde_json::Value>,
    ) -> ApiResult<Json<InboundResult>> {
        let events = parse_inbound(payload.0)?;
        let received = receive_events(ctx.0, events).await?;
        Ok(Json(InboundResult { received }))
    }
}
