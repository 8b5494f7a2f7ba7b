// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders, PartType};

use crate::{
    modules::{
        attribute::{AttributeValue, Item},
        error::{code::ErrorCode, MailboxResult},
    },
    raise_error,
};

const CONTENT_ID: &str = "contentID";
const CONTENT_TYPE: &str = "contentType";
const CONTENT_TYPE_PARAMS: &str = "contentTypeParams";
const FILENAME: &str = "filename";

/// Where a non-body MIME part is listed on the email record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Attachment,
    Inline,
    Other,
}

/// Metadata of one non-body MIME part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartEntry {
    pub content_id: String,
    pub content_type: String,
    pub content_type_params: BTreeMap<String, String>,
    pub filename: String,
}

impl PartEntry {
    pub fn to_attribute(&self) -> AttributeValue {
        let mut map = Item::new();
        map.insert(CONTENT_ID.into(), self.content_id.as_str().into());
        map.insert(CONTENT_TYPE.into(), self.content_type.as_str().into());
        map.insert(
            CONTENT_TYPE_PARAMS.into(),
            AttributeValue::M(
                self.content_type_params
                    .iter()
                    .map(|(k, v)| (k.clone(), AttributeValue::S(v.clone())))
                    .collect(),
            ),
        );
        map.insert(FILENAME.into(), self.filename.as_str().into());
        AttributeValue::M(map)
    }

    pub fn from_attribute(value: &AttributeValue) -> Option<Self> {
        let map = value.as_m()?;
        let text = |name: &str| {
            map.get(name)
                .and_then(AttributeValue::as_s)
                .unwrap_or_default()
                .to_string()
        };
        let content_type_params = map
            .get(CONTENT_TYPE_PARAMS)
            .and_then(AttributeValue::as_m)
            .map(|params| {
                params
                    .iter()
                    .filter_map(|(k, v)| v.as_s().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            content_id: text(CONTENT_ID),
            content_type: text(CONTENT_TYPE),
            content_type_params,
            filename: text(FILENAME),
        })
    }
}

/// The non-body parts of a message, split by disposition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartListing {
    pub attachments: Vec<PartEntry>,
    pub inlines: Vec<PartEntry>,
    pub others: Vec<PartEntry>,
}

/// Bytes of one part together with what is needed to serve it.
#[derive(Debug, Clone)]
pub struct PartContent {
    pub content: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

pub fn parse_message(raw: &[u8]) -> MailboxResult<Message<'_>> {
    MessageParser::default().parse(raw).ok_or_else(|| {
        raise_error!(
            "failed to parse MIME message".into(),
            ErrorCode::InternalError
        )
    })
}

fn content_id(index: usize, part: &MessagePart<'_>) -> String {
    match part.content_id() {
        Some(cid) if !cid.trim().is_empty() => cid.trim().to_string(),
        _ => format!("part{}", index),
    }
}

fn content_type(part: &MessagePart<'_>) -> String {
    match part.content_type() {
        Some(ct) => match ct.subtype() {
            Some(subtype) => format!("{}/{}", ct.ctype(), subtype).to_lowercase(),
            None => ct.ctype().to_lowercase(),
        },
        None => match part.body {
            PartType::Text(_) => "text/plain".into(),
            PartType::Html(_) => "text/html".into(),
            PartType::Message(_) => "message/rfc822".into(),
            _ => "application/octet-stream".into(),
        },
    }
}

fn content_type_params(part: &MessagePart<'_>) -> BTreeMap<String, String> {
    part.content_type()
        .and_then(|ct| ct.attributes.as_ref())
        .map(|attributes| {
            attributes
                .iter()
                .map(|a| (a.name.to_lowercase(), a.value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn kind_of(part: &MessagePart<'_>) -> PartKind {
    match part.content_disposition() {
        Some(d) if d.ctype().eq_ignore_ascii_case("attachment") => PartKind::Attachment,
        Some(d) if d.ctype().eq_ignore_ascii_case("inline") => PartKind::Inline,
        _ => PartKind::Other,
    }
}

/// Yields `(index, kind, part)` for every part that is neither a container nor
/// one of the message's text or HTML bodies.
fn non_body_parts<'a, 'x>(
    message: &'a Message<'x>,
) -> Vec<(usize, PartKind, &'a MessagePart<'x>)> {
    let is_body = |index: usize| {
        message
            .text_body
            .iter()
            .chain(message.html_body.iter())
            .any(|id| *id as usize == index)
    };
    message
        .parts
        .iter()
        .enumerate()
        .filter(|(index, part)| match part.body {
            PartType::Multipart(_) => false,
            PartType::Text(_) | PartType::Html(_) => !is_body(*index),
            _ => *index != 0,
        })
        .map(|(index, part)| (index, kind_of(part), part))
        .collect()
}

pub fn list_parts(message: &Message<'_>) -> PartListing {
    let mut listing = PartListing::default();
    for (index, kind, part) in non_body_parts(message) {
        let entry = PartEntry {
            content_id: content_id(index, part),
            content_type: content_type(part),
            content_type_params: content_type_params(part),
            filename: part.attachment_name().unwrap_or_default().to_string(),
        };
        match kind {
            PartKind::Attachment => listing.attachments.push(entry),
            PartKind::Inline => listing.inlines.push(entry),
            PartKind::Other => listing.others.push(entry),
        }
    }
    listing
}

/// Finds the part listed under `kind` with the given content ID.
pub fn find_part(raw: &[u8], kind: PartKind, cid: &str) -> MailboxResult<PartContent> {
    let message = parse_message(raw)?;
    non_body_parts(&message)
        .into_iter()
        .find(|(index, part_kind, part)| *part_kind == kind && content_id(*index, part) == cid)
        .map(|(_, _, part)| PartContent {
            content: part.contents().to_vec(),
            content_type: content_type(part),
            filename: part.attachment_name().unwrap_or_default().to_string(),
        })
        .ok_or_else(|| {
            raise_error!(
                format!("part '{}' not found", cid),
                ErrorCode::NotFound
            )
        })
}
