// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Inbound mail events and the MIME projection stored on email records.

use serde::{Deserialize, Serialize};

use crate::{
    modules::error::{code::ErrorCode, MailboxResult},
    raise_error,
};

pub mod extractor;
pub mod text;
#[cfg(test)]
mod tests;

/// Headers the mail receiver already parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommonHeaders {
    pub date: String,
    pub subject: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub return_path: String,
    pub message_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMail {
    /// Key of the raw object in the blob store; becomes the record's `MessageID`.
    pub message_id: String,
    /// RFC3339 time the receiver accepted the message.
    pub timestamp: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: Vec<String>,
    #[serde(default)]
    pub common_headers: CommonHeaders,
}

/// One message delivered by the mail receiver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default)]
    pub event_source: String,
    pub mail: InboundMail,
    #[serde(default)]
    pub receipt: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct InboundRecord {
    ses: InboundEvent,
}

#[derive(Debug, Deserialize)]
struct InboundBatch {
    #[serde(rename = "Records")]
    records: Vec<InboundRecord>,
}

/// Accepts either a single event or a `{"Records":[{"ses":{…}}]}` batch.
pub fn parse_inbound(value: serde_json::Value) -> MailboxResult<Vec<InboundEvent>> {
    let invalid = |e: serde_json::Error| {
        raise_error!(
            format!("invalid inbound mail event: {}", e),
            ErrorCode::InvalidInput
        )
    };
    let events = if value.get("Records").is_some() {
        let batch: InboundBatch = serde_json::from_value(value).map_err(invalid)?;
        batch.records.into_iter().map(|r| r.ses).collect()
    } else {
        vec![serde_json::from_value::<InboundEvent>(value).map_err(invalid)?]
    };
    for event in &events {
        if event.mail.message_id.trim().is_empty() {
            return Err(raise_error!(
                "inbound mail event is missing mail.messageId".into(),
                ErrorCode::InvalidInput
            ));
        }
    }
    Ok(events)
}
