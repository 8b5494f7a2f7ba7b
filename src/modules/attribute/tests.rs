// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use crate::modules::{
    attribute::{
        codec::{decode, decode_item, encode, encode_item},
        cursor::{Cursor, QueryInfo},
        AttributeValue, Item, ItemExt,
    },
    error::code::ErrorCode,
};

fn sample_item() -> Item {
    let mut nested = BTreeMap::new();
    nested.insert("flag".to_string(), AttributeValue::Bool(false));
    nested.insert("nothing".to_string(), AttributeValue::Null(true));

    let mut item = Item::new();
    item.insert("MessageID".into(), "0100018c".into());
    item.insert("Count".into(), AttributeValue::N("42".into()));
    item.insert("Raw".into(), AttributeValue::B(vec![0, 1, 2, 254, 255]));
    item.insert(
        "To".into(),
        AttributeValue::string_list(["a@example.com", "b@example.com"]),
    );
    item.insert("Nested".into(), AttributeValue::M(nested));
    item.insert("Tags".into(), AttributeValue::Ss(vec!["x".into(), "y".into()]));
    item.insert("Scores".into(), AttributeValue::Ns(vec!["1".into(), "2.5".into()]));
    item.insert("Blobs".into(), AttributeValue::Bs(vec![vec![1], vec![2, 3]]));
    item
}

#[test]
fn test_encode_text_form() {
    assert_eq!(encode(&AttributeValue::S("hi".into())), r#"{"S":"hi"}"#);
    assert_eq!(encode(&AttributeValue::N("1".into())), r#"{"N":"1"}"#);
    assert_eq!(encode(&AttributeValue::Bool(true)), r#"{"BOOL":true}"#);
    assert_eq!(encode(&AttributeValue::Null(true)), r#"{"NULL":true}"#);
    assert_eq!(encode(&AttributeValue::B(b"hello".to_vec())), r#"{"B":"aGVsbG8="}"#);
    assert_eq!(
        encode(&AttributeValue::string_list(["a"])),
        r#"{"L":[{"S":"a"}]}"#
    );
}

#[test]
fn test_item_round_trip() {
    let item = sample_item();
    let text = encode_item(&item);
    assert_eq!(decode_item(&text).unwrap(), item);
}

#[test]
fn test_decode_errors() {
    let cases = [
        r#"{"S":"unterminated"#,
        r#"{"X":"unknown tag"}"#,
        r#"{"NULL":"yes"}"#,
        r#"{"B":"***"}"#,
        r#"{"S":"a","N":"1"}"#,
        r#"{"L":{"S":"a"}}"#,
        r#""bare""#,
    ];
    for case in cases {
        let err = decode(case).unwrap_err();
        assert!(err.is(ErrorCode::DecodeError), "{} should fail", case);
    }
    assert!(decode_item(r#"{"S":"not a map"}"#)
        .unwrap_err()
        .is(ErrorCode::DecodeError));
}

#[test]
fn test_item_accessors() {
    let item = sample_item();
    assert_eq!(item.get_s("MessageID"), Some("0100018c"));
    assert_eq!(item.get_string("Missing"), "");
    assert_eq!(item.get_list("To"), vec!["a@example.com", "b@example.com"]);
    assert_eq!(item.get_list("Tags"), vec!["x", "y"]);
    assert!(item.has("Nested"));
}

fn query_info(kind: &str) -> QueryInfo {
    QueryInfo {
        r#type: kind.into(),
        year: 2024,
        month: 1,
        order: "desc".into(),
    }
}

#[test]
fn test_cursor_round_trip() {
    let mut key = Item::new();
    key.insert("MessageID".into(), "abc".into());
    key.insert("TypeYearMonth".into(), "inbox#2024-01".into());
    key.insert("DateTime".into(), "05-10:11:12".into());

    let cursor = Cursor::new(query_info("inbox"), key);
    let encoded = cursor.encode();
    assert!(!encoded.contains('+') && !encoded.contains('/'));

    let decoded = Cursor::decode(&encoded).unwrap();
    assert_eq!(decoded, cursor);
    assert_eq!(decoded.encode(), encoded);
}

#[test]
fn test_cursor_query_mismatch() {
    let cursor = Cursor::new(query_info("inbox"), Item::new());
    cursor.ensure_matches(&query_info("inbox")).unwrap();
    let err = cursor.ensure_matches(&query_info("sent")).unwrap_err();
    assert!(err.is(ErrorCode::QueryNotMatch));
}

#[test]
fn test_cursor_decode_garbage() {
    assert!(Cursor::decode("%%%").unwrap_err().is(ErrorCode::DecodeError));
    let not_json = crate::base64_encode_url_safe!("plain text");
    assert!(Cursor::decode(&not_json).unwrap_err().is(ErrorCode::DecodeError));
    let no_key = crate::base64_encode_url_safe!(
        r#"{"queryInfo":{"type":"inbox","year":2024,"month":1,"order":"asc"}}"#
    );
    assert!(Cursor::decode(&no_key).unwrap_err().is(ErrorCode::DecodeError));
}
