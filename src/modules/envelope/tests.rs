// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::json;

use crate::modules::{
    attribute::{AttributeValue, ItemExt},
    database::schema::*,
    envelope::{
        extractor::{build_inbox_record, parse_content},
        parse_inbound,
        text::GenerateText,
        InboundMail,
    },
    error::code::ErrorCode,
    format::extract_type_year_month,
};

const REPLY: &str = "From: \"Bob Builder\" <bob@example.com>\r\n\
To: Alice <alice@example.com>, carol@example.com\r\n\
Cc: <dave@example.com>\r\n\
Subject: Re: Plans\r\n\
Message-ID: <b@x>\r\n\
In-Reply-To: <a@x>\r\n\
References: <root@x>\r\n <a@x>\r\n\
Return-Path: <bounce@example.com>\r\n\
Date: Wed, 31 Jan 2024 23:30:00 -0500\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Sounds good.\r\n";

const HTML_ONLY: &str = "From: bob@example.com\r\n\
To: alice@example.com\r\n\
Subject: Html\r\n\
Message-ID: <h@x>\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>Hello <b>there</b></p>\r\n";

fn mail(message_id: &str, timestamp: &str) -> InboundMail {
    InboundMail {
        message_id: message_id.into(),
        timestamp: timestamp.into(),
        source: "Bounce Handler <bounce@example.com>".into(),
        destination: vec!["alice@example.com".into()],
        ..Default::default()
    }
}

#[test]
fn test_inbox_record_projection() {
    let item = build_inbox_record(
        REPLY.as_bytes(),
        &mail("m-b", "2024-02-01T04:30:00.000Z"),
        GenerateText::Auto,
    )
    .unwrap();

    assert_eq!(item.get_s(MESSAGE_ID), Some("m-b"));
    assert_eq!(item.get_s(TYPE_YEAR_MONTH), Some("inbox#2024-02"));
    assert_eq!(item.get_s(DATE_TIME), Some("01-04:30:00"));
    assert_eq!(item.get_s(ORIGINAL_MESSAGE_ID), Some("<b@x>"));
    assert_eq!(item.get_s(SUBJECT), Some("Re: Plans"));
    assert_eq!(item.get_s(SOURCE), Some("bounce@example.com"));
    assert_eq!(item.get_s(RETURN_PATH), Some("bounce@example.com"));
    assert_eq!(item.get_list(FROM), vec!["Bob Builder <bob@example.com>"]);
    assert_eq!(
        item.get_list(TO),
        vec!["Alice <alice@example.com>", "carol@example.com"]
    );
    assert_eq!(item.get_list(CC), vec!["dave@example.com"]);
    assert!(item.get_list(BCC).is_empty());
    assert_eq!(item.get_s(IN_REPLY_TO), Some("<a@x>"));
    assert_eq!(item.get_s(REFERENCES), Some("<root@x> <a@x>"));
    assert_eq!(item.get_s(DATE_SENT), Some("2024-01-31T23:30:00-05:00"));
    assert_eq!(item.get_s(TEXT).map(str::trim), Some("Sounds good."));
    assert_eq!(item.get_s(HTML), Some(""));
    assert_eq!(item.get(UNREAD), Some(&AttributeValue::Bool(true)));
    assert_eq!(item.get(ATTACHMENTS), Some(&AttributeValue::L(vec![])));
    assert!(!item.has(THREAD_ID));

    // the partition key follows the receive time in UTC
    let tym = extract_type_year_month(item.get_s(TYPE_YEAR_MONTH).unwrap()).unwrap();
    assert_eq!((tym.year, tym.month), (2024, 2));
}

#[test]
fn test_invalid_timestamp() {
    let err = build_inbox_record(
        REPLY.as_bytes(),
        &mail("m-b", "yesterday"),
        GenerateText::Auto,
    )
    .unwrap_err();
    assert!(err.is(ErrorCode::InvalidInput));
}

#[test]
fn test_common_headers_fill_gaps() {
    let raw = "Content-Type: text/plain\r\n\r\nno headers\r\n";
    let mut inbound = mail("m-c", "2024-03-05T10:00:00Z");
    inbound.common_headers.subject = "From receiver".into();
    inbound.common_headers.message_id = "<c@x>".into();
    inbound.common_headers.from = vec!["Eve <eve@example.com>".into()];
    inbound.common_headers.date = "Tue, 05 Mar 2024 10:00:00 +0000".into();

    let item = build_inbox_record(raw.as_bytes(), &inbound, GenerateText::Off).unwrap();
    assert_eq!(item.get_s(SUBJECT), Some("From receiver"));
    assert_eq!(item.get_s(ORIGINAL_MESSAGE_ID), Some("<c@x>"));
    assert_eq!(item.get_list(FROM), vec!["Eve <eve@example.com>"]);
    assert_eq!(item.get_s(DATE_SENT), Some("2024-03-05T10:00:00Z"));
}

#[test]
fn test_generate_text_policy() {
    let auto = parse_content(HTML_ONLY.as_bytes(), GenerateText::Auto).unwrap();
    assert!(auto.html.contains("<b>there</b>"));
    assert!(auto.text.contains("Hello"));
    assert!(!auto.text.contains("<p>"));

    let off = parse_content(HTML_ONLY.as_bytes(), GenerateText::Off).unwrap();
    assert_eq!(off.text, "");

    let on = GenerateText::On.apply("stale text", "<p>fresh</p>");
    assert_eq!(on.trim(), "fresh");
    assert_eq!(GenerateText::Auto.apply("kept", "<p>ignored</p>"), "kept");
    assert_eq!(GenerateText::Auto.apply("", ""), "");

    assert_eq!("on".parse::<GenerateText>().unwrap(), GenerateText::On);
    assert!("sometimes"
        .parse::<GenerateText>()
        .unwrap_err()
        .is(ErrorCode::InvalidInput));
}

#[test]
fn test_content_update_sets_five_attributes() {
    let content = parse_content(REPLY.as_bytes(), GenerateText::Auto).unwrap();
    let update = content.to_update();
    assert_eq!(update.actions.len(), 5);
}

#[test]
fn test_parse_inbound_single_and_batch() {
    let single = json!({
        "eventSource": "aws:ses",
        "mail": {
            "messageId": "m1",
            "timestamp": "2024-01-02T03:04:05.000Z",
            "source": "a@example.com",
            "destination": ["b@example.com"],
            "commonHeaders": { "subject": "Hi", "from": ["a@example.com"] }
        },
        "receipt": {}
    });
    let events = parse_inbound(single.clone()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].mail.message_id, "m1");
    assert_eq!(events[0].mail.common_headers.subject, "Hi");

    let batch = json!({ "Records": [{ "ses": single }, { "ses": {
        "mail": { "messageId": "m2", "timestamp": "2024-01-02T03:04:05Z" }
    } }] });
    let ids: Vec<String> = parse_inbound(batch)
        .unwrap()
        .into_iter()
        .map(|e| e.mail.message_id)
        .collect();
    assert_eq!(ids, vec!["m1", "m2"]);

    let err = parse_inbound(json!({ "mail": { "timestamp": "x" } })).unwrap_err();
    assert!(err.is(ErrorCode::InvalidInput));
    let err = parse_inbound(json!({ "mail": { "messageId": " ", "timestamp": "x" } }))
        .unwrap_err();
    assert!(err.is(ErrorCode::InvalidInput));
}
