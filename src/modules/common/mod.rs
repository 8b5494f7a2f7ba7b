// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use super::error::code::ErrorCode;
use super::error::MailboxError;
use poem::error::ResponseError;
use poem::Body;
use poem::{http::StatusCode, Error, Response};
use tracing::error;

pub mod error;
pub mod log;
pub mod rustls;
pub mod timeout;

#[inline]
pub fn create_api_error_response(message: &str, code: ErrorCode) -> Error {
    MailboxError::Generic {
        message: message.into(),
        location: snafu::Location::default(),
        code,
    }
    .into()
}

impl ResponseError for MailboxError {
    fn status(&self) -> StatusCode {
        self.code().status()
    }

    fn as_response(&self) -> Response
    where
        Self: std::error::Error + Send + Sync + 'static,
    {
        let code = self.code();
        if code.status().is_server_error() {
            error!(
                error_code = code as u32,
                error_message = %self,
                error_location = ?self.location()
            );
        }
        Response::builder()
            .status(self.status())
            .body(
                Body::from_json(serde_json::json!({ "message": self.to_string() }))
                    .unwrap_or_else(|_| Body::empty()),
            )
    }
}
