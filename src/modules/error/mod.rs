// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Formatter;

use crate::raise_error;
use bb8::RunError;
use code::ErrorCode;
use poem::http::StatusCode;
use poem_openapi::{payload::Json, ApiResponse, Object};
use snafu::{Location, Snafu};

pub mod code;
pub mod handler;

/// The kind of record a trash-state error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Email,
    Thread,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Email => write!(f, "email"),
            RecordKind::Thread => write!(f, "thread"),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MailboxError {
    #[snafu(display("{message}"))]
    Generic {
        message: String,
        #[snafu(implicit)]
        location: Location,
        code: ErrorCode,
    },
    #[snafu(display("{kind} is already trashed"))]
    AlreadyTrashed {
        kind: RecordKind,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("{kind} is not trashed"))]
    NotTrashed {
        kind: RecordKind,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type MailboxResult<T, E = MailboxError> = std::result::Result<T, E>;

impl MailboxError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MailboxError::Generic { code, .. } => *code,
            MailboxError::AlreadyTrashed { .. } => ErrorCode::AlreadyTrashed,
            MailboxError::NotTrashed { .. } => ErrorCode::NotTrashed,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            MailboxError::Generic { location, .. }
            | MailboxError::AlreadyTrashed { location, .. }
            | MailboxError::NotTrashed { location, .. } => location,
        }
    }

    pub fn already_trashed(kind: RecordKind) -> Self {
        MailboxError::AlreadyTrashed {
            kind,
            location: Location::default(),
        }
    }

    pub fn not_trashed(kind: RecordKind) -> Self {
        MailboxError::NotTrashed {
            kind,
            location: Location::default(),
        }
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code() == code
    }
}

impl From<RunError<MailboxError>> for MailboxError {
    fn from(e: RunError<MailboxError>) -> Self {
        match e {
            RunError::User(e) => e,
            RunError::TimedOut => raise_error!(
                "Timed out while attempting to acquire a connection from the pool".into(),
                ErrorCode::ConnectionPoolTimeout
            ),
        }
    }
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Object)]
pub struct ApiError {
    pub message: String,
}

impl From<MailboxError> for ApiErrorResponse {
    fn from(error: MailboxError) -> Self {
        let code = error.code();
        let message = error.to_string();
        if code.status().is_server_error() {
            tracing::error!(
                "API error occurred: [{:#?}] {} at {:?}",
                code,
                message,
                error.location()
            );
        } else {
            tracing::warn!("API error occurred: [{:#?}] {}", code, message);
        }
        ApiErrorResponse::Generic(code.status(), Json(ApiError::new(message)))
    }
}

impl ApiError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, ApiResponse)]
pub enum ApiErrorResponse {
    Generic(StatusCode, Json<ApiError>),
}
