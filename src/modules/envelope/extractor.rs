// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, Utc};
use mail_parser::{Address, Message, PartType};

use crate::{
    modules::{
        attribute::{AttributeValue, Item},
        database::{schema::*, Update},
        envelope::{text::GenerateText, InboundMail},
        error::{code::ErrorCode, MailboxResult},
        format::{clean_address, clean_addresses, format_date, format_date_time, EmailType},
        storage::parts::{list_parts, parse_message, PartEntry, PartListing},
    },
    raise_error,
};

/// Bodies and part metadata: everything a reparse rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageContent {
    pub text: String,
    pub html: String,
    pub parts: PartListing,
}

impl MessageContent {
    fn attributes(&self) -> [(&'static str, AttributeValue); 5] {
        let list = |entries: &[PartEntry]| {
            AttributeValue::L(entries.iter().map(PartEntry::to_attribute).collect())
        };
        [
            (TEXT, self.text.as_str().into()),
            (HTML, self.html.as_str().into()),
            (ATTACHMENTS, list(&self.parts.attachments)),
            (INLINES, list(&self.parts.inlines)),
            (OTHER_PARTS, list(&self.parts.others)),
        ]
    }

    pub fn apply_to(&self, item: &mut Item) {
        for (name, value) in self.attributes() {
            item.insert(name.to_string(), value);
        }
    }

    /// An update that sets exactly the five content attributes.
    pub fn to_update(&self) -> Update {
        self.attributes()
            .into_iter()
            .fold(Update::new(), |update, (name, value)| update.set(name, value))
    }
}

/// Header projection of a message, canonicalised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHeaders {
    pub original_message_id: String,
    pub subject: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub return_path: String,
    pub in_reply_to: String,
    pub references: String,
    pub date_sent: String,
}

impl MessageHeaders {
    pub fn apply_to(&self, item: &mut Item) {
        put_text(item, ORIGINAL_MESSAGE_ID, &self.original_message_id);
        item.insert(SUBJECT.into(), self.subject.as_str().into());
        item.insert(FROM.into(), AttributeValue::string_list(self.from.clone()));
        item.insert(TO.into(), AttributeValue::string_list(self.to.clone()));
        item.insert(CC.into(), AttributeValue::string_list(self.cc.clone()));
        item.insert(BCC.into(), AttributeValue::string_list(self.bcc.clone()));
        item.insert(
            REPLY_TO.into(),
            AttributeValue::string_list(self.reply_to.clone()),
        );
        put_text(item, RETURN_PATH, &self.return_path);
        put_text(item, IN_REPLY_TO, &self.in_reply_to);
        put_text(item, REFERENCES, &self.references);
        put_text(item, DATE_SENT, &self.date_sent);
    }
}

fn put_text(item: &mut Item, name: &str, value: &str) {
    if !value.is_empty() {
        item.insert(name.to_string(), value.into());
    }
}

/// Collapses folded header whitespace.
fn normalize_ids(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn header_text(message: &Message<'_>, name: &str) -> String {
    message
        .header_raw(name)
        .map(normalize_ids)
        .unwrap_or_default()
}

fn address_list(address: Option<&Address<'_>>) -> Vec<String> {
    let Some(address) = address else {
        return Vec::new();
    };
    let addrs: Vec<_> = match address {
        Address::List(addrs) => addrs.iter().collect(),
        Address::Group(groups) => groups
            .iter()
            .flat_map(|group| group.addresses.iter())
            .collect(),
    };
    let formatted: Vec<String> = addrs
        .into_iter()
        .filter_map(|addr| {
            let email = addr.address.as_deref()?;
            Some(match addr.name.as_deref() {
                Some(name) if !name.trim().is_empty() => format!("{} <{}>", name, email),
                _ => email.to_string(),
            })
        })
        .collect();
    clean_addresses(&formatted, false)
}

pub fn extract_headers(message: &Message<'_>) -> MessageHeaders {
    let return_path = header_text(message, "Return-Path");
    MessageHeaders {
        original_message_id: header_text(message, "Message-ID"),
        subject: message.subject().unwrap_or_default().to_string(),
        from: address_list(message.from()),
        to: address_list(message.to()),
        cc: address_list(message.cc()),
        bcc: address_list(message.bcc()),
        reply_to: address_list(message.reply_to()),
        return_path: clean_address(&return_path, true),
        in_reply_to: header_text(message, "In-Reply-To"),
        references: header_text(message, "References"),
        date_sent: format_date(&header_text(message, "Date")),
    }
}

/// Extracts the bodies and parts. Text generated from HTML never reaches the
/// text body unless `generate` asks for it.
pub fn extract_content(message: &Message<'_>, generate: GenerateText) -> MessageContent {
    let text = message
        .text_part(0)
        .and_then(|part| match &part.body {
            PartType::Text(text) => Some(text.to_string()),
            _ => None,
        })
        .unwrap_or_default();
    let html = message
        .html_part(0)
        .and_then(|part| match &part.body {
            PartType::Html(html) => Some(html.to_string()),
            _ => None,
        })
        .unwrap_or_default();
    MessageContent {
        text: generate.apply(&text, &html),
        html,
        parts: list_parts(message),
    }
}

pub fn parse_content(raw: &[u8], generate: GenerateText) -> MailboxResult<MessageContent> {
    let message = parse_message(raw)?;
    Ok(extract_content(&message, generate))
}

/// Builds the inbox record for a received message.
pub fn build_inbox_record(
    raw: &[u8],
    mail: &InboundMail,
    generate: GenerateText,
) -> MailboxResult<Item> {
    let received = DateTime::parse_from_rfc3339(mail.timestamp.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            raise_error!(
                format!("invalid mail timestamp '{}': {}", mail.timestamp, e),
                ErrorCode::InvalidInput
            )
        })?;
    let message = parse_message(raw)?;
    let mut headers = extract_headers(&message);
    let common = &mail.common_headers;
    if headers.original_message_id.is_empty() {
        headers.original_message_id = normalize_ids(&common.message_id);
    }
    if headers.subject.is_empty() {
        headers.subject = common.subject.clone();
    }
    if headers.from.is_empty() {
        headers.from = clean_addresses(&common.from, false);
    }
    if headers.to.is_empty() {
        headers.to = clean_addresses(&common.to, false);
    }
    if headers.return_path.is_empty() {
        headers.return_path = clean_address(&common.return_path, true);
    }
    if headers.date_sent.is_empty() {
        headers.date_sent = format_date(&common.date);
    }

    let mut item = Item::new();
    item.insert(MESSAGE_ID.into(), mail.message_id.as_str().into());
    item.insert(
        TYPE_YEAR_MONTH.into(),
        EmailType::Inbox.type_year_month(&received).into(),
    );
    item.insert(DATE_TIME.into(), format_date_time(&received).into());
    put_text(&mut item, SOURCE, &clean_address(&mail.source, true));
    item.insert(
        DESTINATION.into(),
        AttributeValue::string_list(clean_addresses(&mail.destination, true)),
    );
    headers.apply_to(&mut item);
    extract_content(&message, generate).apply_to(&mut item);
    item.insert(UNREAD.into(), true.into());
    Ok(item)
}
