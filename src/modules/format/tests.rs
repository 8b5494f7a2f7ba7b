// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{TimeZone, Utc};

use super::*;

#[test]
fn test_format_date() {
    assert_eq!(
        format_date("Tue, 1 Jul 2003 10:52:37 +0200"),
        "2003-07-01T10:52:37+02:00"
    );
    assert_eq!(
        format_date("Mon, 08 Jan 2024 09:00:00 +0000"),
        "2024-01-08T09:00:00Z"
    );
    assert_eq!(
        format_date("Tue, 1 Jul 2003 10:52:37 +0200 (CEST)"),
        "2003-07-01T10:52:37+02:00"
    );
    assert_eq!(format_date("not a date"), "");
    assert_eq!(format_date(""), "");
}

#[test]
fn test_format_type_year_month() {
    let t = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap();
    assert_eq!(format_type_year_month("inbox", &t).unwrap(), "inbox#2024-01");
    assert_eq!(format_type_year_month("thread", &t).unwrap(), "thread#2024-01");

    let err = format_type_year_month("spam", &t).unwrap_err();
    assert!(err.is(ErrorCode::InvalidEmailType));
}

#[test]
fn test_type_year_month_uses_utc() {
    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let t = offset.with_ymd_and_hms(2024, 2, 1, 1, 0, 0).unwrap();
    assert_eq!(EmailType::Sent.type_year_month(&t), "sent#2024-01");
    assert_eq!(format_date_time(&t), "31-23:00:00");
}

#[test]
fn test_format_date_time() {
    let t = Utc.with_ymd_and_hms(2023, 5, 7, 8, 9, 10).unwrap();
    assert_eq!(format_date_time(&t), "07-08:09:10");
}

#[test]
fn test_extract_type_year_month() {
    let ym = extract_type_year_month("draft#2023-11").unwrap();
    assert_eq!(ym.kind, EmailType::Draft);
    assert_eq!(ym.year, 2023);
    assert_eq!(ym.month, 11);
    assert_eq!(ym.to_string(), "draft#2023-11");

    let cases = [
        ("inbox2023-11", ErrorCode::InvalidFormat),
        ("inbox#202311", ErrorCode::InvalidFormat),
        ("inbox#2023-11-01", ErrorCode::InvalidFormat),
        ("junk#2023-11", ErrorCode::InvalidEmailType),
        ("inbox#999-11", ErrorCode::InvalidEmailYear),
        ("inbox#abcd-11", ErrorCode::InvalidEmailYear),
        ("inbox#2023-13", ErrorCode::InvalidEmailMonth),
        ("inbox#2023-0", ErrorCode::InvalidEmailMonth),
    ];
    for (input, code) in cases {
        let err = extract_type_year_month(input).unwrap_err();
        assert!(err.is(code), "{} should fail with {:?}", input, code);
    }
}

#[test]
fn test_type_year_month_round_trip() {
    let t = Utc.with_ymd_and_hms(1999, 12, 31, 12, 0, 0).unwrap();
    for kind in ["inbox", "sent", "draft", "thread"] {
        let formatted = format_type_year_month(kind, &t).unwrap();
        let extracted = extract_type_year_month(&formatted).unwrap();
        assert_eq!(extracted.kind.as_str(), kind);
        assert_eq!(extracted.year_month(), "1999-12");
    }
}

#[test]
fn test_rejoin_date() {
    assert_eq!(rejoin_date("2024-01", "05-10:11:12"), "2024-01-05T10:11:12Z");
    assert_eq!(
        rejoin_date("inbox#2024-01", "05-10:11:12"),
        "2024-01-05T10:11:12Z"
    );
    let t = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
    let parsed = parse_rejoined(
        &EmailType::Inbox.type_year_month(&t),
        &format_date_time(&t),
    )
    .unwrap();
    assert_eq!(parsed, t);
}

#[test]
fn test_clean_address() {
    assert_eq!(
        clean_address("\"John Doe\" <john@example.com>", false),
        "John Doe <john@example.com>"
    );
    assert_eq!(
        clean_address("John Doe <john@example.com>", false),
        "John Doe <john@example.com>"
    );
    assert_eq!(clean_address("<john@example.com>", false), "john@example.com");
    assert_eq!(clean_address("john@example.com", false), "john@example.com");
    assert_eq!(
        clean_address("\"John Doe\" <john@example.com>", true),
        "john@example.com"
    );
    assert_eq!(clean_address("  <john@example.com>  ", true), "john@example.com");
}

#[test]
fn test_clean_address_idempotent() {
    let inputs = [
        "\"John Doe\" <john@example.com>",
        "John <john@example.com>",
        "<john@example.com>",
        "john@example.com",
        "",
    ];
    for input in inputs {
        let once = clean_address(input, true);
        assert_eq!(clean_address(&once, true), once);
        let named = clean_address(input, false);
        assert_eq!(clean_address(&named, false), named);
    }
}

#[test]
fn test_generated_ids() {
    for _ in 0..20 {
        let draft = generate_draft_id();
        assert!(is_draft_id(&draft), "{}", draft);
        assert!(!is_thread_id(&draft));

        let thread = generate_thread_id();
        assert!(is_thread_id(&thread), "{}", thread);
        assert!(!is_draft_id(&thread));
    }
    assert!(!is_thread_id("0100018c-abcdef"));
    assert!(!is_draft_id("draft-123"));
}
