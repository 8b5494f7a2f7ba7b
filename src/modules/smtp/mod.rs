// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use async_trait::async_trait;
use mail_send::mail_builder::{headers::address::Address, MessageBuilder};

use crate::modules::{error::MailboxResult, format::split_address};

pub mod client;

/// A message ready to leave the system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
    /// Message-ID of the email being replied to, with angle brackets.
    pub in_reply_to: String,
    /// Space separated Message-IDs, with angle brackets.
    pub references: String,
}

/// The result of a successful submission.
#[derive(Debug, Clone)]
pub struct SentMessage {
    /// New `MessageID` of the sent record.
    pub message_id: String,
    /// RFC 5322 `Message-ID` header, with angle brackets.
    pub original_message_id: String,
    /// The message exactly as submitted.
    pub raw: Vec<u8>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> MailboxResult<SentMessage>;
}

/// New sent-record ID. Hyphenated, so it never looks like a thread ID.
pub fn generate_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn strip_brackets(id: &str) -> String {
    id.trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}

fn to_address(list: &[String]) -> Option<Address<'static>> {
    let addresses: Vec<Address<'static>> = list
        .iter()
        .map(|s| split_address(s))
        .filter(|(_, addr)| !addr.is_empty())
        .map(|(name, addr)| {
            if name.is_empty() {
                Address::from(addr.to_string())
            } else {
                Address::from((name.to_string(), addr.to_string()))
            }
        })
        .collect();
    match addresses.len() {
        0 => None,
        1 => addresses.into_iter().next(),
        _ => Some(Address::new_list(addresses)),
    }
}

/// Assembles the RFC 5322 message for `email` under `Message-ID: <message_id@domain>`.
pub fn build_message(
    email: &OutboundEmail,
    message_id: &str,
    domain: &str,
) -> MessageBuilder<'static> {
    let mut builder = MessageBuilder::new()
        .subject(email.subject.clone())
        .message_id(format!("{}@{}", message_id, domain));
    if let Some(from) = to_address(&email.from) {
        builder = builder.from(from);
    }
    if let Some(to) = to_address(&email.to) {
        builder = builder.to(to);
    }
    if let Some(cc) = to_address(&email.cc) {
        builder = builder.cc(cc);
    }
    if let Some(bcc) = to_address(&email.bcc) {
        builder = builder.bcc(bcc);
    }
    if let Some(reply_to) = to_address(&email.reply_to) {
        builder = builder.reply_to(reply_to);
    }
    if !email.in_reply_to.trim().is_empty() {
        builder = builder.in_reply_to(strip_brackets(&email.in_reply_to));
    }
    let references: Vec<String> = email
        .references
        .split_whitespace()
        .map(strip_brackets)
        .collect();
    if !references.is_empty() {
        builder = builder.references(references);
    }
    if !email.text.is_empty() || email.html.is_empty() {
        builder = builder.text_body(email.text.clone());
    }
    if !email.html.is_empty() {
        builder = builder.html_body(email.html.clone());
    }
    builder
}
