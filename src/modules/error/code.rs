// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::http::StatusCode;
use poem_openapi::Enum;

#[derive(Copy, Clone, Debug, Enum, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000–10999)
    InvalidInput = 10000,
    InvalidFormat = 10010,
    InvalidEmailType = 10020,
    InvalidEmailYear = 10030,
    InvalidEmailMonth = 10040,
    DecodeError = 10050,
    QueryNotMatch = 10060,
    RequestTimeout = 10070,
    MethodNotAllowed = 10080,

    // Mailbox state errors (20000–20999)
    EmailIsNotDraft = 20000,
    ReadActionFailed = 20010,
    AlreadyTrashed = 20020,
    NotTrashed = 20030,

    // Resource errors (30000–30999)
    NotFound = 30000,
    TooManyRequests = 30010,

    // Store errors (40000–40999)
    ConditionalCheckFailed = 40000,
    TransactionCanceled = 40010,
    ConnectionPoolTimeout = 40020,

    // Delivery errors (50000–50999)
    MailerFailed = 50000,
    NotificationFailed = 50010,

    // Message queue errors (60000–60999)
    NatsRequestFailed = 60000,
    NatsConnectionFailed = 60010,
    NatsCreateStreamFailed = 60020,

    // Internal system errors (70000–70999)
    InternalError = 70000,
    UnhandledPoemError = 70010,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput
            | ErrorCode::InvalidFormat
            | ErrorCode::InvalidEmailType
            | ErrorCode::InvalidEmailYear
            | ErrorCode::InvalidEmailMonth
            | ErrorCode::DecodeError
            | ErrorCode::QueryNotMatch
            | ErrorCode::EmailIsNotDraft
            | ErrorCode::ReadActionFailed
            | ErrorCode::AlreadyTrashed
            | ErrorCode::NotTrashed => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::ConditionalCheckFailed
            | ErrorCode::TransactionCanceled
            | ErrorCode::ConnectionPoolTimeout
            | ErrorCode::MailerFailed
            | ErrorCode::NotificationFailed
            | ErrorCode::NatsRequestFailed
            | ErrorCode::NatsConnectionFailed
            | ErrorCode::NatsCreateStreamFailed
            | ErrorCode::InternalError
            | ErrorCode::UnhandledPoemError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
