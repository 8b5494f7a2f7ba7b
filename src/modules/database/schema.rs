// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Attribute names of the stored records.

pub const MESSAGE_ID: &str = "MessageID";
pub const TYPE_YEAR_MONTH: &str = "TypeYearMonth";
pub const DATE_TIME: &str = "DateTime";
pub const ORIGINAL_MESSAGE_ID: &str = "OriginalMessageID";

pub const SUBJECT: &str = "Subject";
pub const SOURCE: &str = "Source";
pub const FROM: &str = "From";
pub const TO: &str = "To";
pub const CC: &str = "Cc";
pub const BCC: &str = "Bcc";
pub const REPLY_TO: &str = "ReplyTo";
pub const RETURN_PATH: &str = "ReturnPath";
pub const DESTINATION: &str = "Destination";
pub const IN_REPLY_TO: &str = "InReplyTo";
pub const REFERENCES: &str = "References";
pub const DATE_SENT: &str = "DateSent";

pub const TEXT: &str = "Text";
pub const HTML: &str = "HTML";
pub const ATTACHMENTS: &str = "Attachments";
pub const INLINES: &str = "Inlines";
pub const OTHER_PARTS: &str = "OtherParts";

pub const UNREAD: &str = "Unread";
pub const TRASHED_TIME: &str = "TrashedTime";
pub const THREAD_ID: &str = "ThreadID";
pub const IS_THREAD_LATEST: &str = "IsThreadLatest";

pub const EMAIL_IDS: &str = "EmailIDs";
pub const DRAFT_ID: &str = "DraftID";
pub const TIME_UPDATED: &str = "TimeUpdated";

/// Non-key attributes projected into the time index.
pub const TIME_INDEX_PROJECTION: &[&str] = &[SUBJECT, FROM, TO, UNREAD, TRASHED_TIME];
